//! Gestation. A pregnancy ends exactly `gestation_length_days` after conception; a female
//! calf is born with probability `female_fetus_chance`, and either way the mother can be
//! fertilized again.
use rand::Rng;

use crate::agent::{Agent, Pregnancy};
use crate::handlers::{Effect, WorldView};

pub fn handle<R: Rng>(
    agent: &mut Agent,
    world: &WorldView,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) {
    let Some(days_pregnant) = agent.days_pregnant(world.today) else {
        return;
    };
    let reproduction = &world.parameters.reproduction;
    if days_pregnant < u64::from(reproduction.gestation_length_days) {
        return;
    }
    if rng.random_bool(reproduction.female_fetus_chance) {
        effects.push(Effect::Spawn {
            position: agent.position,
            heading: agent.heading,
        });
    }
    agent.set_pregnancy(Pregnancy::NotPregnant);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::geometry::Vec2;
    use crate::parameters::Parameters;
    use crate::population::PopulationRegistry;
    use crate::space::SpatialIndex;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn run(parameters: &Parameters, agent: &mut Agent, today: u64) -> Vec<Effect> {
        let registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        let world = WorldView {
            registry: &registry,
            parameters,
            today,
        };
        let mut rng = SmallRng::seed_from_u64(99);
        let mut effects = Vec::new();
        handle(agent, &world, &mut rng, &mut effects);
        effects
    }

    fn pregnant_cow(conceived_on: u64) -> Agent {
        let mut cow = Agent::female(AgentId(0), Vec2::new(3.0, 4.0), Vec2::new(0.0, 1.0), 900);
        cow.set_pregnancy(Pregnancy::Pregnant { conceived_on });
        cow
    }

    #[test]
    fn nothing_before_term() {
        let parameters = Parameters::default();
        let mut cow = pregnant_cow(10);
        let effects = run(&parameters, &mut cow, 10 + 284);
        assert!(effects.is_empty());
        assert!(cow.is_pregnant());
    }

    #[test]
    fn delivers_at_term() {
        let mut parameters = Parameters::default();
        parameters.reproduction.female_fetus_chance = 1.0;
        let mut cow = pregnant_cow(10);
        let effects = run(&parameters, &mut cow, 10 + 285);
        assert_eq!(
            effects,
            vec![Effect::Spawn {
                position: Vec2::new(3.0, 4.0),
                heading: Vec2::new(0.0, 1.0),
            }]
        );
        assert!(!cow.is_pregnant());
    }

    #[test]
    fn resets_without_calf() {
        let mut parameters = Parameters::default();
        parameters.reproduction.female_fetus_chance = 0.0;
        let mut cow = pregnant_cow(0);
        let effects = run(&parameters, &mut cow, 285);
        assert!(effects.is_empty());
        assert!(!cow.is_pregnant());
    }

    #[test]
    fn not_pregnant_is_a_no_op() {
        let parameters = Parameters::default();
        let mut cow = Agent::female(AgentId(0), Vec2::ZERO, Vec2::new(0.0, 1.0), 900);
        let before = cow;
        assert!(run(&parameters, &mut cow, 500).is_empty());
        assert_eq!(cow, before);
    }
}
