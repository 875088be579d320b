use crate::agent::Agent;
use crate::boids::{self, Neighbor};
use crate::handlers::WorldView;

/// Moves the agent one boid step, flocking with every agent within its vision.
pub fn handle(agent: &mut Agent, world: &WorldView) {
    let movement = &world.parameters.movement;
    let neighbors: Vec<Neighbor> = world
        .registry
        .neighbors_of(agent.id, movement.vision)
        .map(|neighbor| Neighbor {
            position: neighbor.position,
            heading: neighbor.heading,
        })
        .collect();

    let (position, heading) = boids::step(
        agent.position,
        agent.heading,
        &neighbors,
        movement,
        world.parameters.size,
    );
    agent.position = position;
    agent.heading = heading;
}
