//! The mating season. Seasonal males are built once and kept in a roster; they enter the space
//! when the calendar reaches the first month of the season and leave when it moves past the
//! last one. Both moves are census-neutral.
use chrono::{Datelike, NaiveDate};
use log::info;
use rand::Rng;

use crate::agent::{Agent, AgentId};
use crate::builder::random_position;
use crate::parameters::Parameters;
use crate::population::{PopulationRegistry, RemovalReason};

/// A change in male presence made by `SeasonState::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonChange {
    MalesArrived(usize),
    MalesLeft(usize),
}

#[derive(Debug, Clone, Default)]
pub struct SeasonState {
    roster: Vec<Agent>,
    males_present: bool,
}

/// Whether `date` falls in the mating season.
#[must_use]
pub fn in_mating_season(date: NaiveDate, parameters: &Parameters) -> bool {
    let reproduction = &parameters.reproduction;
    (reproduction.season_start_month..=reproduction.season_end_month).contains(&date.month())
}

impl SeasonState {
    #[must_use]
    pub fn new(roster: Vec<Agent>) -> SeasonState {
        SeasonState {
            roster,
            males_present: false,
        }
    }

    #[must_use]
    pub fn males_present(&self) -> bool {
        self.males_present
    }

    /// The seasonal males, in or out of the space.
    #[must_use]
    pub fn roster(&self) -> &[Agent] {
        &self.roster
    }

    /// Brings the males in or takes them out if `date` crossed a season boundary.
    ///
    /// Arriving males get their age reset to the minimum mating age and a random position.
    /// Leaving males keep their state in the roster for next season.
    pub fn update<R: Rng>(
        &mut self,
        date: NaiveDate,
        registry: &mut PopulationRegistry,
        parameters: &Parameters,
        rng: &mut R,
    ) -> Option<SeasonChange> {
        let in_season = in_mating_season(date, parameters);
        if in_season && !self.males_present {
            self.males_present = true;
            for male in &mut self.roster {
                male.age_days = parameters.reproduction.min_mating_age_days;
                male.position = random_position(rng, parameters.size);
                registry.add(*male);
            }
            info!(
                "{date}: mating season started, {} males added",
                self.roster.len()
            );
            return Some(SeasonChange::MalesArrived(self.roster.len()));
        }
        if !in_season && self.males_present {
            self.males_present = false;
            for male in &mut self.roster {
                *male = registry.remove(male.id, RemovalReason::SeasonEnd);
            }
            info!(
                "{date}: mating season over, {} males removed",
                self.roster.len()
            );
            return Some(SeasonChange::MalesLeft(self.roster.len()));
        }
        None
    }

    /// Forgets a male that left the space for good.
    pub fn drop_male(&mut self, id: AgentId) {
        self.roster.retain(|male| male.id != id);
    }
}
