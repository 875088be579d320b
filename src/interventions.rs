//! Disease control: surveillance sampling and the vaccination campaign it unlocks.
use log::{debug, info};
use rand::Rng;

use crate::agent::AgentId;
use crate::handlers::vaccination::vaccinate;
use crate::parameters::Parameters;
use crate::population::{PopulationRegistry, RemovalReason};
use crate::random::sample_multiple_from_known_length;

/// Tests a random sample of the live population every `interval_days` days. Each infected
/// female in the sample is detected with probability `accuracy`; detected females are removed
/// and the virus is marked as located. Returns the number removed.
pub fn run_surveillance<R: Rng>(
    registry: &mut PopulationRegistry,
    parameters: &Parameters,
    today: u64,
    rng: &mut R,
) -> usize {
    let interventions = &parameters.interventions;
    if interventions.sample_size == 0 || today % interventions.interval_days != 0 {
        return 0;
    }

    let sample = sample_multiple_from_known_length(
        rng,
        registry.ids().into_iter(),
        interventions.sample_size,
    );
    let mut removed = 0;
    for id in sample {
        let detectable = registry
            .get(id)
            .is_some_and(|agent| agent.is_female() && agent.is_infected());
        if !detectable || !rng.random_bool(interventions.accuracy) {
            continue;
        }
        registry.remove(id, RemovalReason::RandomCheck);
        removed += 1;
        debug!("day {today}: surveillance detected agent {id}");
        if !registry.statistics().virus_located {
            info!("day {today}: virus located by surveillance");
            registry.mark_virus_located();
        }
    }
    removed
}

/// Once the virus has been located, vaccinates up to `vaccinations_per_day` unvaccinated
/// females chosen uniformly at random. Returns the number vaccinated.
pub fn run_vaccination_campaign<R: Rng>(
    registry: &mut PopulationRegistry,
    parameters: &Parameters,
    rng: &mut R,
) -> usize {
    let quota = parameters.interventions.vaccinations_per_day;
    if !registry.statistics().virus_located || quota == 0 {
        return 0;
    }

    let candidates: Vec<AgentId> = registry
        .iter()
        .filter(|agent| agent.is_female() && !agent.is_vaccinated())
        .map(|agent| agent.id)
        .collect();
    let chosen = sample_multiple_from_known_length(rng, candidates.into_iter(), quota);
    for id in &chosen {
        vaccinate(registry, *id, &parameters.disease);
    }
    if !chosen.is_empty() {
        debug!("vaccinated {} agents", chosen.len());
    }
    chosen.len()
}
