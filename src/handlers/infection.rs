//! Disease progression and transmission. An infected female spreads the disease to healthy
//! females within her infection radius every day until the disease runs its course, then she
//! either dies or recovers according to the outcome drawn when she was infected.
use std::ops::ControlFlow;

use rand::Rng;

use crate::agent::{Agent, Infection};
use crate::handlers::{Effect, WorldView};
use crate::parameters::DiseaseParameters;
use crate::population::RemovalReason;

/// Multiplier applied to the transmission chance when the target is vaccinated.
pub const VACCINATED_TARGET_FACTOR: f64 = 0.75;

/// The chance that `infector` passes the disease to `target` in one day. The infector's own
/// chance applies (reduced if the infector is vaccinated), scaled down if the target is
/// vaccinated.
#[must_use]
pub fn transmission_chance(infector: &Agent, target: &Agent, disease: &DiseaseParameters) -> f64 {
    let chance = infector.transmission_chance(disease);
    if target.is_vaccinated() {
        chance * VACCINATED_TARGET_FACTOR
    } else {
        chance
    }
}

/// Chance of dying from an infection caught at `age_days`: the base rate divided by the age in
/// started years.
#[must_use]
pub fn mortality_chance(age_days: u32, base_mortality_rate: f64) -> f64 {
    let years = age_days.div_ceil(365).max(1);
    base_mortality_rate / f64::from(years)
}

/// Draws whether a newly infected agent will die of the disease. Vaccinated agents never do,
/// and no draw is made for them.
pub fn draw_will_die<R: Rng>(agent: &Agent, disease: &DiseaseParameters, rng: &mut R) -> bool {
    if agent.is_vaccinated() {
        return false;
    }
    rng.random_bool(mortality_chance(agent.age_days, disease.base_mortality_rate))
}

pub fn handle<R: Rng>(
    agent: &mut Agent,
    world: &WorldView,
    rng: &mut R,
    effects: &mut Vec<Effect>,
) -> ControlFlow<RemovalReason> {
    let Infection::Infected {
        infected_on,
        will_die,
    } = agent.infection
    else {
        return ControlFlow::Continue(());
    };
    let disease = &world.parameters.disease;

    if world.today - infected_on >= u64::from(disease.duration_days) {
        if will_die {
            return ControlFlow::Break(RemovalReason::Disease);
        }
        agent.infection = Infection::Healthy;
        return ControlFlow::Continue(());
    }

    let radius = agent.infection_radius(disease);
    for neighbor in world
        .registry
        .neighbors_of(agent.id, radius)
        .filter(|neighbor| neighbor.is_infectable())
    {
        if rng.random_bool(transmission_chance(agent, neighbor, disease)) {
            effects.push(Effect::Infect(neighbor.id));
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, Vaccination};
    use crate::geometry::Vec2;
    use crate::parameters::Parameters;
    use crate::population::PopulationRegistry;
    use crate::space::SpatialIndex;
    use approx::assert_relative_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cow(id: u64, x: f64) -> Agent {
        Agent::female(AgentId(id), Vec2::new(x, 500.0), Vec2::new(1.0, 0.0), 800)
    }

    fn vaccinated() -> Vaccination {
        Vaccination::Vaccinated {
            infection_radius: 5.0,
            transmission_chance: 0.01,
        }
    }

    #[test]
    fn mortality_by_age() {
        assert_relative_eq!(mortality_chance(0, 0.3), 0.3);
        assert_relative_eq!(mortality_chance(1, 0.3), 0.3);
        assert_relative_eq!(mortality_chance(365, 0.3), 0.3);
        assert_relative_eq!(mortality_chance(366, 0.3), 0.15);
        assert_relative_eq!(mortality_chance(1000, 0.3), 0.1);
    }

    #[test]
    fn vaccinated_never_die() {
        let disease = DiseaseParameters {
            base_mortality_rate: 1.0,
            ..DiseaseParameters::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        let mut target = cow(0, 0.0);
        target.age_days = 10;
        assert!(draw_will_die(&target, &disease, &mut rng));
        target.vaccination = vaccinated();
        assert!(!draw_will_die(&target, &disease, &mut rng));
    }

    #[test]
    fn vaccinated_target_factor() {
        let disease = DiseaseParameters::default();
        let infector = cow(0, 0.0);
        let mut target = cow(1, 1.0);
        let baseline = transmission_chance(&infector, &target, &disease);
        assert_relative_eq!(baseline, disease.transmission_chance);

        target.vaccination = vaccinated();
        assert_relative_eq!(
            transmission_chance(&infector, &target, &disease),
            0.75 * baseline
        );
    }

    #[test]
    fn vaccinated_infector_uses_reduced_chance() {
        let disease = DiseaseParameters::default();
        let mut infector = cow(0, 0.0);
        infector.vaccination = vaccinated();
        let target = cow(1, 1.0);
        assert_relative_eq!(transmission_chance(&infector, &target, &disease), 0.01);
    }

    fn spread(
        parameters: &Parameters,
        registry: &PopulationRegistry,
        today: u64,
    ) -> (ControlFlow<RemovalReason>, Agent, Vec<Effect>) {
        let mut agent = *registry.get(AgentId(0)).unwrap();
        let world = WorldView {
            registry,
            parameters,
            today,
        };
        let mut rng = SmallRng::seed_from_u64(17);
        let mut effects = Vec::new();
        let outcome = handle(&mut agent, &world, &mut rng, &mut effects);
        (outcome, agent, effects)
    }

    #[test]
    fn spreads_to_healthy_females_in_radius() {
        let mut parameters = Parameters::default();
        parameters.disease.transmission_chance = 1.0;
        let mut registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        registry.add(cow(0, 500.0));
        registry.add(cow(1, 505.0));
        registry.add(cow(2, 509.0));
        registry.add(cow(3, 510.0)); // exactly at the radius
        registry.add(cow(4, 495.0));
        registry.add(Agent::male(AgentId(5), Vec2::new(501.0, 500.0), Vec2::new(1.0, 0.0), 400));
        registry.infect(AgentId(0), 0, false);
        registry.infect(AgentId(4), 0, false);

        let (outcome, _, effects) = spread(&parameters, &registry, 1);
        assert_eq!(outcome, ControlFlow::Continue(()));
        assert_eq!(
            effects,
            vec![
                Effect::Infect(AgentId(1)),
                Effect::Infect(AgentId(2))
            ]
        );
    }

    #[test]
    fn vaccinated_infector_uses_reduced_radius() {
        let mut parameters = Parameters::default();
        parameters.disease.vaccinated_transmission_chance = 1.0;
        let mut registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        registry.add(cow(0, 500.0));
        registry.add(cow(1, 504.0));
        registry.add(cow(2, 506.0));
        registry.infect(AgentId(0), 0, false);
        registry.vaccinate(
            AgentId(0),
            Vaccination::Vaccinated {
                infection_radius: parameters.disease.vaccinated_infection_radius,
                transmission_chance: parameters.disease.vaccinated_transmission_chance,
            },
        );

        let (_, _, effects) = spread(&parameters, &registry, 1);
        assert_eq!(effects, vec![Effect::Infect(AgentId(1))]);
    }

    #[test]
    fn resolves_exactly_at_duration() {
        let mut parameters = Parameters::default();
        parameters.disease.transmission_chance = 1.0;
        let mut registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        registry.add(cow(0, 500.0));
        registry.add(cow(1, 501.0));
        registry.infect(AgentId(0), 10, false);

        let (outcome, agent, effects) = spread(&parameters, &registry, 10 + 355);
        assert_eq!(outcome, ControlFlow::Continue(()));
        assert!(agent.is_infected());
        assert_eq!(effects.len(), 1);

        // Recovers and infects nobody on the last day.
        let (outcome, agent, effects) = spread(&parameters, &registry, 10 + 356);
        assert_eq!(outcome, ControlFlow::Continue(()));
        assert!(!agent.is_infected());
        assert!(effects.is_empty());
    }

    #[test]
    fn dies_at_duration_when_fated() {
        let parameters = Parameters::default();
        let mut registry = PopulationRegistry::new(SpatialIndex::new(parameters.size, 50.0));
        registry.add(cow(0, 500.0));
        registry.infect(AgentId(0), 0, true);

        let (outcome, _, _) = spread(&parameters, &registry, 356);
        assert_eq!(outcome, ControlFlow::Break(RemovalReason::Disease));
    }
}
