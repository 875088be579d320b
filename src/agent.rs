//! Agent state. An `Agent` is plain data: the handlers read a copy, update it and hand it back
//! to the population registry, which is the only place that stores agents.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::parameters::{DiseaseParameters, ReproductionParameters};

/// Unique agent identifier. Ids are assigned in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pregnancy {
    #[default]
    NotPregnant,
    /// Pregnant since the tick `conceived_on`.
    Pregnant { conceived_on: u64 },
}

/// Kind-specific state. Only females carry a pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Female { pregnancy: Pregnancy },
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Infection {
    #[default]
    Healthy,
    /// Infected since the tick `infected_on`. `will_die` is drawn once, at infection.
    Infected { infected_on: u64, will_die: bool },
}

/// A vaccinated agent keeps its own reduced radius and chance for spreading the disease.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Vaccination {
    #[default]
    Unvaccinated,
    Vaccinated {
        infection_radius: f64,
        transmission_chance: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Valuation {
    pub production_cost: f64,
    pub sale_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Vec2,
    pub heading: Vec2,
    pub age_days: u32,
    pub infection: Infection,
    pub vaccination: Vaccination,
    pub valuation: Valuation,
    /// False for seasonal males, whose comings and goings leave the census counters alone.
    pub census: bool,
}

impl Agent {
    #[must_use]
    pub fn female(id: AgentId, position: Vec2, heading: Vec2, age_days: u32) -> Agent {
        Agent {
            id,
            kind: AgentKind::Female {
                pregnancy: Pregnancy::NotPregnant,
            },
            position,
            heading,
            age_days,
            infection: Infection::Healthy,
            vaccination: Vaccination::Unvaccinated,
            valuation: Valuation::default(),
            census: true,
        }
    }

    #[must_use]
    pub fn male(id: AgentId, position: Vec2, heading: Vec2, age_days: u32) -> Agent {
        Agent {
            id,
            kind: AgentKind::Male,
            position,
            heading,
            age_days,
            infection: Infection::Healthy,
            vaccination: Vaccination::Unvaccinated,
            valuation: Valuation::default(),
            census: false,
        }
    }

    #[must_use]
    pub fn sex(&self) -> Sex {
        match self.kind {
            AgentKind::Female { .. } => Sex::Female,
            AgentKind::Male => Sex::Male,
        }
    }

    #[must_use]
    pub fn is_female(&self) -> bool {
        self.sex() == Sex::Female
    }

    #[must_use]
    pub fn is_male(&self) -> bool {
        self.sex() == Sex::Male
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        matches!(self.infection, Infection::Infected { .. })
    }

    /// Males are outside the disease model and count as vaccinated.
    #[must_use]
    pub fn is_vaccinated(&self) -> bool {
        self.is_male() || matches!(self.vaccination, Vaccination::Vaccinated { .. })
    }

    /// Only healthy females can catch the disease.
    #[must_use]
    pub fn is_infectable(&self) -> bool {
        self.is_female() && !self.is_infected()
    }

    #[must_use]
    pub fn pregnancy(&self) -> Option<Pregnancy> {
        match self.kind {
            AgentKind::Female { pregnancy } => Some(pregnancy),
            AgentKind::Male => None,
        }
    }

    #[must_use]
    pub fn is_pregnant(&self) -> bool {
        matches!(self.pregnancy(), Some(Pregnancy::Pregnant { .. }))
    }

    /// A female that is not pregnant and whose age lies within the mating age range.
    #[must_use]
    pub fn is_fertile(&self, reproduction: &ReproductionParameters) -> bool {
        self.pregnancy() == Some(Pregnancy::NotPregnant)
            && (reproduction.min_mating_age_days..=reproduction.max_mating_age_days)
                .contains(&self.age_days)
    }

    /// The radius within which this agent spreads the disease while infected.
    #[must_use]
    pub fn infection_radius(&self, disease: &DiseaseParameters) -> f64 {
        match self.vaccination {
            Vaccination::Unvaccinated => disease.infection_radius,
            Vaccination::Vaccinated {
                infection_radius, ..
            } => infection_radius,
        }
    }

    /// The chance this agent passes the disease to an unvaccinated neighbor.
    #[must_use]
    pub fn transmission_chance(&self, disease: &DiseaseParameters) -> f64 {
        match self.vaccination {
            Vaccination::Unvaccinated => disease.transmission_chance,
            Vaccination::Vaccinated {
                transmission_chance,
                ..
            } => transmission_chance,
        }
    }

    /// Days since infection, or `None` when healthy.
    #[must_use]
    pub fn days_infected(&self, today: u64) -> Option<u64> {
        match self.infection {
            Infection::Healthy => None,
            Infection::Infected { infected_on, .. } => Some(today - infected_on),
        }
    }

    /// Days since conception, or `None` when not pregnant.
    #[must_use]
    pub fn days_pregnant(&self, today: u64) -> Option<u64> {
        match self.pregnancy() {
            Some(Pregnancy::Pregnant { conceived_on }) => Some(today - conceived_on),
            _ => None,
        }
    }

    pub(crate) fn set_pregnancy(&mut self, pregnancy: Pregnancy) {
        match &mut self.kind {
            AgentKind::Female { pregnancy: current } => *current = pregnancy,
            AgentKind::Male => panic!("Agent {} is male and cannot be pregnant", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reproduction() -> ReproductionParameters {
        ReproductionParameters::default()
    }

    #[test]
    fn fertility_window_is_inclusive() {
        let params = reproduction();
        let mut cow = Agent::female(AgentId(1), Vec2::ZERO, Vec2::new(1.0, 0.0), 0);
        assert!(!cow.is_fertile(&params));

        cow.age_days = params.min_mating_age_days;
        assert!(cow.is_fertile(&params));
        cow.age_days = params.max_mating_age_days;
        assert!(cow.is_fertile(&params));
        cow.age_days = params.max_mating_age_days + 1;
        assert!(!cow.is_fertile(&params));
    }

    #[test]
    fn pregnant_females_are_not_fertile() {
        let params = reproduction();
        let mut cow = Agent::female(AgentId(1), Vec2::ZERO, Vec2::new(1.0, 0.0), 1000);
        cow.set_pregnancy(Pregnancy::Pregnant { conceived_on: 5 });
        assert!(cow.is_pregnant());
        assert!(!cow.is_fertile(&params));
        assert_eq!(cow.days_pregnant(12), Some(7));
    }

    #[test]
    fn males_are_never_fertile_or_infectable() {
        let bull = Agent::male(AgentId(2), Vec2::ZERO, Vec2::new(0.0, 1.0), 1000);
        assert!(!bull.is_fertile(&reproduction()));
        assert!(!bull.is_infectable());
        assert!(bull.is_vaccinated());
        assert!(!bull.census);
        assert_eq!(bull.pregnancy(), None);
    }

    #[test]
    #[should_panic(expected = "is male and cannot be pregnant")]
    fn males_cannot_be_pregnant() {
        let mut bull = Agent::male(AgentId(2), Vec2::ZERO, Vec2::new(0.0, 1.0), 1000);
        bull.set_pregnancy(Pregnancy::Pregnant { conceived_on: 0 });
    }

    #[test]
    fn vaccination_replaces_spread_parameters() {
        let disease = DiseaseParameters::default();
        let mut cow = Agent::female(AgentId(1), Vec2::ZERO, Vec2::new(1.0, 0.0), 500);
        assert_eq!(cow.infection_radius(&disease), disease.infection_radius);
        assert_eq!(cow.transmission_chance(&disease), disease.transmission_chance);

        cow.vaccination = Vaccination::Vaccinated {
            infection_radius: 2.0,
            transmission_chance: 0.001,
        };
        assert!(cow.is_vaccinated());
        assert_eq!(cow.infection_radius(&disease), 2.0);
        assert_eq!(cow.transmission_chance(&disease), 0.001);
    }

    #[test]
    fn infection_days() {
        let mut cow = Agent::female(AgentId(1), Vec2::ZERO, Vec2::new(1.0, 0.0), 500);
        assert_eq!(cow.days_infected(3), None);
        cow.infection = Infection::Infected {
            infected_on: 3,
            will_die: false,
        };
        assert!(cow.is_infected());
        assert!(!cow.is_infectable());
        assert_eq!(cow.days_infected(10), Some(7));
    }
}
