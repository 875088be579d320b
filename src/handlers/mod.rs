//! Per-agent behavior. Each handler owns one slice of an agent's state and runs once per tick
//! on a copy of the agent. Handlers read the rest of the population through a `WorldView` and
//! ask for changes to other agents by pushing `Effect`s, which the herd applies once the agent
//! has finished. A handler that removes its agent returns `ControlFlow::Break` with the reason,
//! and the remaining handlers are skipped.
use std::ops::ControlFlow;

use rand::Rng;

use crate::agent::{Agent, AgentId};
use crate::geometry::Vec2;
use crate::parameters::Parameters;
use crate::population::{PopulationRegistry, RemovalReason};

pub mod aging;
pub mod infection;
pub mod mating;
pub mod movement;
pub mod pregnancy;
pub mod vaccination;
pub mod valuation;

/// Read-only view of the world an agent acts in.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub registry: &'a PopulationRegistry,
    pub parameters: &'a Parameters,
    /// The current tick.
    pub today: u64,
}

/// A change to the population requested by an agent's handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Infect a healthy female. The mortality draw happens when this is applied.
    Infect(AgentId),
    /// Start a pregnancy, if the female is still not pregnant.
    Fertilize(AgentId),
    /// A newborn at the given position and heading.
    Spawn { position: Vec2, heading: Vec2 },
}

/// Runs every handler on `agent` in order: aging, pregnancy and infection (females), mating
/// (males), movement and valuation.
pub fn activate<R: Rng>(
    agent: &mut Agent,
    world: &WorldView,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) -> ControlFlow<RemovalReason> {
    aging::handle(agent, world.parameters)?;
    if agent.is_female() {
        pregnancy::handle(agent, world, rng, effects);
        infection::handle(agent, world, rng, effects)?;
    } else {
        mating::handle(agent, world, rng, effects);
    }
    movement::handle(agent, world);
    valuation::handle(agent, &world.parameters.monetary);
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Infection;
    use crate::space::SpatialIndex;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn removal_skips_later_handlers() {
        let parameters = Parameters::default();
        let mut registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        let old = Agent::female(
            AgentId(0),
            Vec2::new(500.0, 500.0),
            Vec2::new(1.0, 0.0),
            parameters.max_age_days - 1,
        );
        registry.add(old);
        registry.infect(AgentId(0), 0, false);

        let mut agent = *registry.get(AgentId(0)).unwrap();
        let world = WorldView {
            registry: &registry,
            parameters: &parameters,
            today: 3,
        };
        let mut rng = SmallRng::seed_from_u64(0);
        let mut effects = Vec::new();
        let outcome = activate(&mut agent, &world, &mut rng, &mut effects);

        assert_eq!(outcome, ControlFlow::Break(RemovalReason::Age));
        assert_eq!(agent.age_days, parameters.max_age_days);
        // Movement did not run.
        assert_eq!(agent.position, Vec2::new(500.0, 500.0));
        assert!(matches!(agent.infection, Infection::Infected { .. }));
        assert!(effects.is_empty());
    }

    #[test]
    fn full_activation_moves_and_values() {
        let parameters = Parameters::default();
        let mut registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        registry.add(Agent::female(
            AgentId(0),
            Vec2::new(500.0, 500.0),
            Vec2::new(1.0, 0.0),
            1000,
        ));

        let mut agent = *registry.get(AgentId(0)).unwrap();
        let world = WorldView {
            registry: &registry,
            parameters: &parameters,
            today: 0,
        };
        let mut rng = SmallRng::seed_from_u64(0);
        let mut effects = Vec::new();
        let outcome = activate(&mut agent, &world, &mut rng, &mut effects);

        assert_eq!(outcome, ControlFlow::Continue(()));
        assert_eq!(agent.age_days, 1001);
        assert_eq!(agent.position, Vec2::new(550.0, 500.0));
        assert!(agent.valuation.sale_value > 0.0);
    }
}
