//! Creates agents with fresh ids and correctly initialized state.
use std::f64::consts::TAU;

use rand::Rng;

use crate::agent::{Agent, AgentId};
use crate::geometry::Vec2;
use crate::parameters::Parameters;

/// Hands out agent ids in increasing order and builds agents of each kind.
#[derive(Debug, Clone, Default)]
pub struct AgentBuilder {
    next_id: u64,
}

impl AgentBuilder {
    #[must_use]
    pub fn new() -> AgentBuilder {
        AgentBuilder { next_id: 0 }
    }

    /// The next unused id. Ids are never reused.
    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// A female of the founding herd: random position, heading and age.
    pub fn founder<R: Rng>(&mut self, rng: &mut R, parameters: &Parameters) -> Agent {
        let position = random_position(rng, parameters.size);
        let heading = random_heading(rng);
        let age_days =
            rng.random_range(parameters.initial_age_min_days..=parameters.initial_age_max_days);
        Agent::female(self.next_id(), position, heading, age_days)
    }

    /// A newborn calf: always female, at her mother's position and heading.
    pub fn newborn(&mut self, position: Vec2, heading: Vec2) -> Agent {
        Agent::female(self.next_id(), position, heading, 0)
    }

    /// A seasonal male. His position and age are reset whenever he enters the space.
    pub fn seasonal_male<R: Rng>(&mut self, rng: &mut R, parameters: &Parameters) -> Agent {
        let position = random_position(rng, parameters.size);
        let heading = random_heading(rng);
        Agent::male(
            self.next_id(),
            position,
            heading,
            parameters.reproduction.min_mating_age_days,
        )
    }
}

/// A uniformly random point in the space.
pub fn random_position<R: Rng>(rng: &mut R, size: f64) -> Vec2 {
    Vec2::new(rng.random::<f64>() * size, rng.random::<f64>() * size)
}

/// A uniformly random unit heading.
pub fn random_heading<R: Rng>(rng: &mut R) -> Vec2 {
    let angle = rng.random::<f64>() * TAU;
    Vec2::new(angle.cos(), angle.sin())
}
