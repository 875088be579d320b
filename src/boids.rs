//! Boid-style flocking. Each tick an agent steers toward its neighbors (cohesion), away from
//! neighbors that are too close (separation) and along its neighbors' headings (alignment),
//! then moves `speed` units along the new heading, reflecting off the walls of the space.
use serde::{Deserialize, Serialize};

use crate::geometry::{distance, heading_towards, Vec2};
use crate::parameters::MovementParameters;

/// How the steered heading is rescaled before it is used to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingNormalization {
    /// Divide by the length of the heading as it was before steering. The result is only
    /// approximately unit length; this reproduces the reference numerics.
    #[default]
    PreUpdate,
    /// Divide by the length of the steered heading.
    Unit,
}

/// What an agent sees of a neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: Vec2,
    pub heading: Vec2,
}

/// Average unit heading from `position` toward each neighbor.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cohere(position: Vec2, neighbors: &[Neighbor]) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let mut sum = Vec2::ZERO;
    for neighbor in neighbors {
        sum += heading_towards(position, neighbor.position);
    }
    sum / neighbors.len() as f64
}

/// Negated sum of the unit headings toward neighbors closer than `separation`.
#[must_use]
pub fn separate(position: Vec2, neighbors: &[Neighbor], separation: f64) -> Vec2 {
    let mut away = Vec2::ZERO;
    for neighbor in neighbors {
        if distance(position, neighbor.position) < separation {
            away -= heading_towards(position, neighbor.position);
        }
    }
    away
}

/// Average heading of the neighbors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn align(neighbors: &[Neighbor]) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let mut sum = Vec2::ZERO;
    for neighbor in neighbors {
        sum += neighbor.heading;
    }
    sum / neighbors.len() as f64
}

/// The heading after steering, before any boundary reflection.
#[must_use]
pub fn steer(
    position: Vec2,
    heading: Vec2,
    neighbors: &[Neighbor],
    movement: &MovementParameters,
) -> Vec2 {
    let steering = cohere(position, neighbors) * movement.cohere_weight
        + separate(position, neighbors, movement.separation) * movement.separate_weight
        + align(neighbors) * movement.align_weight;
    let steered = heading + steering / 2.0;

    let norm = match movement.heading_normalization {
        HeadingNormalization::PreUpdate => heading.norm(),
        HeadingNormalization::Unit => steered.norm(),
    };
    if norm > 0.0 {
        steered / norm
    } else {
        steered
    }
}

/// Inverts each heading component whose move would end at or beyond a wall.
#[must_use]
pub fn reflect(position: Vec2, heading: Vec2, speed: f64, size: f64) -> Vec2 {
    let hits_wall = |coordinate: f64, component: f64| {
        let next = coordinate + component * speed;
        next <= 0.0 || next >= size
    };
    let mut reflected = heading;
    if hits_wall(position.x, heading.x) {
        reflected.x = -reflected.x;
    }
    if hits_wall(position.y, heading.y) {
        reflected.y = -reflected.y;
    }
    reflected
}

/// Moves `speed` units along `heading`. An axis whose move would still leave `[0, size]`
/// keeps its coordinate.
#[must_use]
pub fn advance(position: Vec2, heading: Vec2, speed: f64, size: f64) -> Vec2 {
    let stay_inside = |coordinate: f64, component: f64| {
        let next = coordinate + component * speed;
        if (0.0..=size).contains(&next) {
            next
        } else {
            coordinate
        }
    };
    Vec2::new(
        stay_inside(position.x, heading.x),
        stay_inside(position.y, heading.y),
    )
}

/// One full movement step: steer, reflect, advance. Returns the new position and heading.
#[must_use]
pub fn step(
    position: Vec2,
    heading: Vec2,
    neighbors: &[Neighbor],
    movement: &MovementParameters,
    size: f64,
) -> (Vec2, Vec2) {
    let steered = steer(position, heading, neighbors, movement);
    let heading = reflect(position, steered, movement.speed, size);
    (advance(position, heading, movement.speed, size), heading)
}
