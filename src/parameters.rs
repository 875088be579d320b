//! Run configuration. `Parameters` is read once at the start of a run, validated, and stored in
//! the `Context`; nothing mutates it afterwards.
//!
//! Parameters are usually loaded from a JSON file. Every field has a default, so a file only
//! needs the values that differ from the defaults:
//!
//! ```json
//! {
//!     "initial_female_count": 50,
//!     "disease": { "transmission_chance": 0.05 },
//!     "interventions": { "vaccinations_per_day": 5 }
//! }
//! ```
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::boids::HeadingNormalization;
use crate::context::Context;
use crate::define_data_plugin;
use crate::error::HerdError;

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Edge length of the square space. Positions live in `[0, size]` on both axes.
    pub size: f64,
    pub initial_female_count: usize,
    /// Seasonal males per initial female; the male count is rounded to the nearest integer.
    pub males_per_female: f64,
    pub initial_infected_count: usize,
    pub initial_age_min_days: u32,
    pub initial_age_max_days: u32,
    /// Agents are removed on the tick their age reaches this value.
    pub max_age_days: u32,
    /// Calendar date of the first tick.
    pub start_date: NaiveDate,
    /// Number of ticks the runner executes.
    pub max_days: u64,
    pub disease: DiseaseParameters,
    pub reproduction: ReproductionParameters,
    pub movement: MovementParameters,
    pub interventions: InterventionParameters,
    pub monetary: MonetaryParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiseaseParameters {
    pub infection_radius: f64,
    pub transmission_chance: f64,
    /// Radius used by an infected agent once it has been vaccinated.
    pub vaccinated_infection_radius: f64,
    /// Transmission chance used by an infected agent once it has been vaccinated.
    pub vaccinated_transmission_chance: f64,
    pub duration_days: u32,
    /// Chance of dying at infection, divided by the agent's age in started years.
    pub base_mortality_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReproductionParameters {
    pub gestation_length_days: u32,
    pub female_fetus_chance: f64,
    pub mating_chance: f64,
    pub fertilization_chance: f64,
    pub min_mating_age_days: u32,
    pub max_mating_age_days: u32,
    /// First month (1-12) of the mating season.
    pub season_start_month: u32,
    /// Last month (1-12) of the mating season, inclusive.
    pub season_end_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementParameters {
    pub speed: f64,
    pub vision: f64,
    pub separation: f64,
    pub cohere_weight: f64,
    pub separate_weight: f64,
    pub align_weight: f64,
    pub heading_normalization: HeadingNormalization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterventionParameters {
    /// Number of agents tested on each surveillance day. Zero disables surveillance.
    pub sample_size: usize,
    /// Probability that a test of an infected female detects the infection.
    pub accuracy: f64,
    pub interval_days: u64,
    /// Vaccinations administered per day once the virus has been located.
    pub vaccinations_per_day: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonetaryParameters {
    /// Agents at least this old are valued at the adult weight.
    pub adult_age_days: u32,
    pub young_weight_kg: f64,
    pub adult_weight_kg: f64,
    pub cost_per_kg: f64,
    pub price_per_kg: f64,
    pub vaccination_cost: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            size: 1000.0,
            initial_female_count: 300,
            males_per_female: 0.01,
            initial_infected_count: 1,
            initial_age_min_days: 356,
            initial_age_max_days: 3560,
            max_age_days: 11 * 356,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            max_days: 730,
            disease: DiseaseParameters::default(),
            reproduction: ReproductionParameters::default(),
            movement: MovementParameters::default(),
            interventions: InterventionParameters::default(),
            monetary: MonetaryParameters::default(),
        }
    }
}

impl Default for DiseaseParameters {
    fn default() -> Self {
        DiseaseParameters {
            infection_radius: 10.0,
            transmission_chance: 0.02,
            vaccinated_infection_radius: 5.0,
            vaccinated_transmission_chance: 0.01,
            duration_days: 356,
            base_mortality_rate: 0.3,
        }
    }
}

impl Default for ReproductionParameters {
    fn default() -> Self {
        ReproductionParameters {
            gestation_length_days: 285,
            female_fetus_chance: 0.5,
            mating_chance: 0.8,
            fertilization_chance: 0.6,
            min_mating_age_days: 356,
            max_mating_age_days: 10 * 356,
            season_start_month: 4,
            season_end_month: 5,
        }
    }
}

impl Default for MovementParameters {
    fn default() -> Self {
        MovementParameters {
            speed: 50.0,
            vision: 50.0,
            separation: 10.0,
            cohere_weight: 0.05,
            separate_weight: 0.1,
            align_weight: 0.8,
            heading_normalization: HeadingNormalization::default(),
        }
    }
}

impl Default for InterventionParameters {
    fn default() -> Self {
        InterventionParameters {
            sample_size: 1,
            accuracy: 0.8,
            interval_days: 1,
            vaccinations_per_day: 1,
        }
    }
}

impl Default for MonetaryParameters {
    fn default() -> Self {
        MonetaryParameters {
            adult_age_days: 2 * 365,
            young_weight_kg: 250.0,
            adult_weight_kg: 550.0,
            cost_per_kg: 1.8,
            price_per_kg: 2.6,
            vaccination_cost: 9.0,
        }
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), HerdError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(HerdError::ConfigError(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), HerdError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(HerdError::ConfigError(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

fn check_ordered(low_name: &str, low: u32, high_name: &str, high: u32) -> Result<(), HerdError> {
    if low <= high {
        Ok(())
    } else {
        Err(HerdError::ConfigError(format!(
            "{low_name} ({low}) must not exceed {high_name} ({high})"
        )))
    }
}

impl Parameters {
    /// Reads parameters from a JSON file. Missing fields take their default values. The result
    /// is not validated; see [`Parameters::validate`].
    ///
    /// # Errors
    ///
    /// Returns `HerdError::IoError` if the file cannot be read and `HerdError::JsonError` if it
    /// is not a valid parameters document.
    pub fn from_json_file(path: &Path) -> Result<Parameters, HerdError> {
        trace!("loading parameters from {}", path.display());
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Number of seasonal males: `round(initial_female_count * males_per_female)`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn male_count(&self) -> usize {
        (self.initial_female_count as f64 * self.males_per_female).round() as usize
    }

    /// Checks every parameter and fails on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ConfigError` naming the offending parameter.
    pub fn validate(&self) -> Result<(), HerdError> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(HerdError::ConfigError(format!(
                "size must be positive, got {}",
                self.size
            )));
        }
        check_non_negative("males_per_female", self.males_per_female)?;
        if self.initial_infected_count > self.initial_female_count {
            return Err(HerdError::ConfigError(format!(
                "initial_infected_count ({}) must not exceed initial_female_count ({})",
                self.initial_infected_count, self.initial_female_count
            )));
        }
        check_ordered(
            "initial_age_min_days",
            self.initial_age_min_days,
            "initial_age_max_days",
            self.initial_age_max_days,
        )?;

        let disease = &self.disease;
        check_non_negative("disease.infection_radius", disease.infection_radius)?;
        check_probability("disease.transmission_chance", disease.transmission_chance)?;
        check_non_negative(
            "disease.vaccinated_infection_radius",
            disease.vaccinated_infection_radius,
        )?;
        check_probability(
            "disease.vaccinated_transmission_chance",
            disease.vaccinated_transmission_chance,
        )?;
        check_probability("disease.base_mortality_rate", disease.base_mortality_rate)?;

        let reproduction = &self.reproduction;
        check_probability(
            "reproduction.female_fetus_chance",
            reproduction.female_fetus_chance,
        )?;
        check_probability("reproduction.mating_chance", reproduction.mating_chance)?;
        check_probability(
            "reproduction.fertilization_chance",
            reproduction.fertilization_chance,
        )?;
        check_ordered(
            "reproduction.min_mating_age_days",
            reproduction.min_mating_age_days,
            "reproduction.max_mating_age_days",
            reproduction.max_mating_age_days,
        )?;
        for (name, month) in [
            ("reproduction.season_start_month", reproduction.season_start_month),
            ("reproduction.season_end_month", reproduction.season_end_month),
        ] {
            if !(1..=12).contains(&month) {
                return Err(HerdError::ConfigError(format!(
                    "{name} must be in 1..=12, got {month}"
                )));
            }
        }
        check_ordered(
            "reproduction.season_start_month",
            reproduction.season_start_month,
            "reproduction.season_end_month",
            reproduction.season_end_month,
        )?;

        let movement = &self.movement;
        check_non_negative("movement.speed", movement.speed)?;
        check_non_negative("movement.vision", movement.vision)?;
        check_non_negative("movement.separation", movement.separation)?;
        check_non_negative("movement.cohere_weight", movement.cohere_weight)?;
        check_non_negative("movement.separate_weight", movement.separate_weight)?;
        check_non_negative("movement.align_weight", movement.align_weight)?;

        let interventions = &self.interventions;
        check_probability("interventions.accuracy", interventions.accuracy)?;
        if interventions.interval_days == 0 {
            return Err(HerdError::ConfigError(
                "interventions.interval_days must be at least 1, got 0".to_string(),
            ));
        }

        let monetary = &self.monetary;
        check_non_negative("monetary.young_weight_kg", monetary.young_weight_kg)?;
        check_non_negative("monetary.adult_weight_kg", monetary.adult_weight_kg)?;
        check_non_negative("monetary.cost_per_kg", monetary.cost_per_kg)?;
        check_non_negative("monetary.price_per_kg", monetary.price_per_kg)?;
        check_non_negative("monetary.vaccination_cost", monetary.vaccination_cost)?;

        Ok(())
    }
}

define_data_plugin!(ParametersPlugin, Option<Parameters>, None);

pub trait ContextParametersExt {
    /// Validates `parameters` and stores them for the run.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ConfigError` if the parameters are invalid or were already set.
    fn set_parameters(&mut self, parameters: Parameters) -> Result<(), HerdError>;

    /// Loads parameters from a JSON file, validates and stores them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if validation fails.
    fn load_parameters(&mut self, path: &Path) -> Result<(), HerdError>;

    /// Returns the stored parameters, if any.
    fn get_parameters(&self) -> Option<&Parameters>;
}

impl ContextParametersExt for Context {
    fn set_parameters(&mut self, parameters: Parameters) -> Result<(), HerdError> {
        parameters.validate()?;
        let container = self.get_data_mut(ParametersPlugin);
        if container.is_some() {
            return Err(HerdError::ConfigError(
                "parameters have already been set".to_string(),
            ));
        }
        *container = Some(parameters);
        Ok(())
    }

    fn load_parameters(&mut self, path: &Path) -> Result<(), HerdError> {
        let parameters = Parameters::from_json_file(path)?;
        self.set_parameters(parameters)
    }

    fn get_parameters(&self) -> Option<&Parameters> {
        self.get_data(ParametersPlugin).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let parameters = Parameters::default();
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.male_count(), 3);
        assert_eq!(parameters.max_age_days, 3916);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let parameters: Parameters = serde_json::from_str(
            r#"{
                "size": 200.0,
                "start_date": "2023-03-15",
                "disease": { "transmission_chance": 0.5 },
                "movement": { "heading_normalization": "unit" }
            }"#,
        )
        .unwrap();
        assert_eq!(parameters.size, 200.0);
        assert_eq!(
            parameters.start_date,
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );
        assert_eq!(parameters.disease.transmission_chance, 0.5);
        assert_eq!(parameters.disease.duration_days, 356);
        assert_eq!(
            parameters.movement.heading_normalization,
            HeadingNormalization::Unit
        );
        assert_eq!(parameters.initial_female_count, 300);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Parameters, _> = serde_json::from_str(r#"{ "sise": 10.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_probability() {
        let mut parameters = Parameters::default();
        parameters.disease.transmission_chance = 1.5;
        match parameters.validate() {
            Err(HerdError::ConfigError(msg)) => {
                assert!(msg.contains("disease.transmission_chance"), "{msg}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_size() {
        let parameters = Parameters {
            size: 0.0,
            ..Parameters::default()
        };
        assert!(matches!(
            parameters.validate(),
            Err(HerdError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_more_infected_than_females() {
        let parameters = Parameters {
            initial_female_count: 2,
            initial_infected_count: 3,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn rejects_bad_season() {
        let mut parameters = Parameters::default();
        parameters.reproduction.season_start_month = 6;
        parameters.reproduction.season_end_month = 5;
        assert!(parameters.validate().is_err());

        parameters.reproduction.season_start_month = 0;
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let mut parameters = Parameters::default();
        parameters.interventions.interval_days = 0;
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn rejects_negative_speed() {
        let mut parameters = Parameters::default();
        parameters.movement.speed = -1.0;
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn context_set_and_get() {
        let mut context = Context::new();
        assert!(context.get_parameters().is_none());
        context.set_parameters(Parameters::default()).unwrap();
        assert_eq!(context.get_parameters(), Some(&Parameters::default()));
        assert!(context.set_parameters(Parameters::default()).is_err());
    }

    #[test]
    fn context_rejects_invalid() {
        let mut context = Context::new();
        let parameters = Parameters {
            males_per_female: -0.5,
            ..Parameters::default()
        };
        assert!(context.set_parameters(parameters).is_err());
        assert!(context.get_parameters().is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "initial_female_count": 12, "max_days": 10 }}"#).unwrap();

        let mut context = Context::new();
        context.load_parameters(file.path()).unwrap();
        let parameters = context.get_parameters().unwrap();
        assert_eq!(parameters.initial_female_count, 12);
        assert_eq!(parameters.max_days, 10);
    }

    #[test]
    fn load_missing_file() {
        let mut context = Context::new();
        let result = context.load_parameters(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(HerdError::IoError(_))));
    }
}
