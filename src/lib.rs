//! A seasonal herd population and disease simulation.
//!
//! Herdsim models a herd of animals in a bounded square pasture, advanced one simulated day
//! per tick. Every animal flocks with its neighbors, ages, and may become pregnant and calve.
//! A disease spreads between nearby females and either kills them or runs its course.
//! Surveillance sampling looks for the disease, and once it has been found a vaccination
//! campaign starts. Males only join the herd during the mating season.
//!
//! The simulation is hosted by a `Context` that provides:
//! * a notion of simulated time, with plans scheduled on future days,
//! * seeded random number generators, so a run replays exactly under a fixed seed,
//! * typed data containers holding each module's state,
//! * CSV reports.
//!
//! The model itself is made of:
//! * [`space`]: the spatial index answering "who is within radius r",
//! * [`boids`]: the flocking movement,
//! * [`handlers`]: aging, pregnancy, infection, mating, vaccination and valuation,
//! * [`population`]: the registry of live agents and the herd counters,
//! * [`season`] and [`interventions`]: the mating season, surveillance and vaccination,
//! * [`herd`]: the orchestrator that runs one tick.
//!
//! A run is usually started through [`runner::run_with_args`]:
//!
//! ```no_run
//! fn main() {
//!     let context = herdsim::runner::run_with_args().unwrap();
//!     let herd = herdsim::herd::ContextHerdExt::herd(&context).unwrap();
//!     println!("{} animals left", herd.statistics().alive);
//! }
//! ```
pub mod agent;
pub mod boids;
pub mod builder;
pub mod context;
pub mod error;
pub mod geometry;
pub mod handlers;
pub mod hashing;
pub mod herd;
pub mod interventions;
pub mod log;
pub mod metrics;
pub mod parameters;
pub mod plan;
pub mod population;
pub mod random;
pub mod report;
pub mod runner;
pub mod season;
pub mod snapshot;
pub mod space;

pub use agent::{Agent, AgentId, Sex};
pub use context::Context;
pub use error::HerdError;
pub use herd::{ContextHerdExt, Herd};
pub use metrics::TickMetrics;
pub use parameters::{ContextParametersExt, Parameters};
pub use population::RemovalReason;

// Re-exported for use in macros
pub use csv;
pub use paste;
pub use rand;
