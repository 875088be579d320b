//! Per-tick metrics: the named numeric series consumed by charting and analytics. One
//! `TickMetrics` row is produced at the end of every tick; the runner writes them to the
//! `metrics` CSV report.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::define_report;
use crate::handlers::valuation::valuation;
use crate::parameters::Parameters;
use crate::population::PopulationRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMetrics {
    /// Ticks completed.
    pub day: u64,
    /// The calendar date after the tick.
    pub date: NaiveDate,
    pub alive: usize,
    pub infected: usize,
    pub vaccinated: usize,
    pub died_of_age: usize,
    pub died_of_disease: usize,
    pub removed_by_surveillance: usize,
    pub virus_located: bool,
    pub total_production_cost: f64,
    pub total_sale_value: f64,
    pub total_vaccination_cost: f64,
    pub seasonal_males: usize,
}

define_report!(TickMetrics);

impl TickMetrics {
    /// Collects the metrics for the registry's current state. Monetary totals cover the
    /// census herd only and value every agent as it is now, so an agent infected after its own
    /// activation is already unsellable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn collect(
        registry: &PopulationRegistry,
        parameters: &Parameters,
        day: u64,
        date: NaiveDate,
    ) -> TickMetrics {
        let statistics = registry.statistics();
        let mut total_production_cost = 0.0;
        let mut total_sale_value = 0.0;
        let mut seasonal_males = 0;
        for agent in registry.iter() {
            if agent.census {
                let value = valuation(agent, &parameters.monetary);
                total_production_cost += value.production_cost;
                total_sale_value += value.sale_value;
            } else if agent.is_male() {
                seasonal_males += 1;
            }
        }

        TickMetrics {
            day,
            date,
            alive: statistics.alive,
            infected: statistics.infected,
            vaccinated: statistics.vaccinated,
            died_of_age: statistics.died_of_age,
            died_of_disease: statistics.died_of_disease,
            removed_by_surveillance: statistics.removed_by_surveillance,
            virus_located: statistics.virus_located,
            total_production_cost,
            total_sale_value,
            total_vaccination_cost: statistics.vaccinated as f64
                * parameters.monetary.vaccination_cost,
            seasonal_males,
        }
    }

    /// The numeric series of this row as `(name, value)` pairs. Booleans are 0 or 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn series(&self) -> [(&'static str, f64); 12] {
        [
            ("alive", self.alive as f64),
            ("infected", self.infected as f64),
            ("vaccinated", self.vaccinated as f64),
            ("died_of_age", self.died_of_age as f64),
            ("died_of_disease", self.died_of_disease as f64),
            ("removed_by_surveillance", self.removed_by_surveillance as f64),
            ("virus_located", f64::from(u8::from(self.virus_located))),
            ("total_production_cost", self.total_production_cost),
            ("total_sale_value", self.total_sale_value),
            ("total_vaccination_cost", self.total_vaccination_cost),
            ("seasonal_males", self.seasonal_males as f64),
            ("day", self.day as f64),
        ]
    }
}

/// Every row produced so far, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsHistory {
    rows: Vec<TickMetrics>,
}

impl MetricsHistory {
    pub fn push(&mut self, row: TickMetrics) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn rows(&self) -> &[TickMetrics] {
        &self.rows
    }

    #[must_use]
    pub fn last(&self) -> Option<&TickMetrics> {
        self.rows.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values of one named series over time, or `None` for an unknown name.
    #[must_use]
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                row.series()
                    .into_iter()
                    .find(|(series_name, _)| *series_name == name)
                    .map(|(_, value)| value)
            })
            .collect()
    }
}
