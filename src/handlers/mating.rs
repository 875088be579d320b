//! The male side of reproduction. A male picks one fertile female within his vision at random
//! and fertilizes her with probability `mating_chance * fertilization_chance`.
use rand::Rng;

use crate::agent::{Agent, AgentId};
use crate::handlers::{Effect, WorldView};
use crate::random::sample_single_from_known_length;

pub fn handle<R: Rng>(agent: &Agent, world: &WorldView, rng: &mut R, effects: &mut Vec<Effect>) {
    let reproduction = &world.parameters.reproduction;
    let candidates: Vec<AgentId> = world
        .registry
        .neighbors_of(agent.id, world.parameters.movement.vision)
        .filter(|neighbor| neighbor.is_fertile(reproduction))
        .map(|neighbor| neighbor.id)
        .collect();

    let Some(mate) = sample_single_from_known_length(rng, candidates.into_iter()) else {
        return;
    };
    if rng.random_bool(reproduction.mating_chance * reproduction.fertilization_chance) {
        effects.push(Effect::Fertilize(mate));
    }
}
