//! The tick orchestrator. `Herd` owns the whole simulation state and advances it one day per
//! `step`:
//!
//! 1. seasonal males arrive or leave when the calendar crosses a season boundary,
//! 2. the vaccination campaign runs once the virus has been located,
//! 3. surveillance samples the population on its interval,
//! 4. every live agent is activated once, in a freshly shuffled order,
//! 5. the clock advances one day,
//! 6. the metrics for the day are collected.
//!
//! `Herd` draws every random number from the generator passed to `step`, in the order above, so
//! a seeded generator replays a run exactly. `ContextHerdExt` hosts a herd in a `Context`,
//! drives it from the `HerdRng` stream and schedules one tick per simulated day.
use std::ops::ControlFlow;

use chrono::NaiveDate;
use log::{debug, error, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::agent::{Agent, AgentId};
use crate::builder::AgentBuilder;
use crate::context::Context;
use crate::error::HerdError;
use crate::geometry::Vec2;
use crate::handlers::infection::draw_will_die;
use crate::handlers::{self, valuation, vaccination, Effect, WorldView};
use crate::interventions::{run_surveillance, run_vaccination_campaign};
use crate::metrics::{MetricsHistory, TickMetrics};
use crate::parameters::{ContextParametersExt, Parameters};
use crate::population::{PopulationRegistry, RemovalReason, Statistics};
use crate::random::{sample_multiple_from_known_length, ContextRandomExt};
use crate::report::ContextReportExt;
use crate::season::SeasonState;
use crate::snapshot::AgentSnapshot;
use crate::space::SpatialIndex;
use crate::{define_data_plugin, define_rng};

#[derive(Debug, Clone)]
pub struct Herd {
    parameters: Parameters,
    registry: PopulationRegistry,
    builder: AgentBuilder,
    season: SeasonState,
    day: u64,
    date: NaiveDate,
    history: MetricsHistory,
    effects: Vec<Effect>,
}

impl Herd {
    /// Builds the initial population: the seasonal male roster (kept out of the space until
    /// the season starts), the founding females, and the initial infections chosen uniformly
    /// among the founders.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ConfigError` if the parameters are invalid.
    pub fn new<R: Rng>(parameters: Parameters, rng: &mut R) -> Result<Herd, HerdError> {
        let mut herd = Herd::empty(parameters)?;

        let roster = (0..herd.parameters.male_count())
            .map(|_| herd.builder.seasonal_male(rng, &herd.parameters))
            .collect();
        herd.season = SeasonState::new(roster);

        for _ in 0..herd.parameters.initial_female_count {
            let mut founder = herd.builder.founder(rng, &herd.parameters);
            valuation::handle(&mut founder, &herd.parameters.monetary);
            herd.registry.add(founder);
        }

        let founders = herd.registry.ids();
        let seeded = sample_multiple_from_known_length(
            rng,
            founders.into_iter(),
            herd.parameters.initial_infected_count,
        );
        for id in seeded {
            herd.infect(id, rng);
        }

        debug!(
            "herd created with {} females and {} seasonal males, {} infected",
            herd.registry.statistics().alive,
            herd.season.roster().len(),
            herd.registry.statistics().infected
        );
        Ok(herd)
    }

    /// A herd with no agents and no seasonal males. Agents are added with `add_female`.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ConfigError` if the parameters are invalid.
    pub fn empty(parameters: Parameters) -> Result<Herd, HerdError> {
        parameters.validate()?;
        // Most queries use the vision or the infection radius.
        let typical_radius = parameters
            .movement
            .vision
            .max(parameters.disease.infection_radius);
        let cell_size = if typical_radius > 0.0 {
            typical_radius.min(parameters.size)
        } else {
            parameters.size
        };

        Ok(Herd {
            registry: PopulationRegistry::new(SpatialIndex::new(parameters.size, cell_size)),
            builder: AgentBuilder::new(),
            season: SeasonState::default(),
            day: 0,
            date: parameters.start_date,
            history: MetricsHistory::default(),
            effects: Vec::new(),
            parameters,
        })
    }

    /// Adds a healthy, unvaccinated, non-pregnant female.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the space.
    pub fn add_female(&mut self, position: Vec2, heading: Vec2, age_days: u32) -> AgentId {
        let mut female = Agent::female(self.builder.next_id(), position, heading, age_days);
        valuation::handle(&mut female, &self.parameters.monetary);
        self.registry.add(female);
        female.id
    }

    /// Infects a live, healthy female today, drawing whether she will die of it. Returns false
    /// if the agent cannot be infected.
    pub fn infect<R: Rng>(&mut self, id: AgentId, rng: &mut R) -> bool {
        let Some(agent) = self.registry.get(id).filter(|agent| agent.is_infectable()) else {
            return false;
        };
        let will_die = draw_will_die(agent, &self.parameters.disease, rng);
        self.registry.infect(id, self.day, will_die);
        true
    }

    /// Starts a pregnancy today. Returns false unless the agent is a female that is not
    /// already pregnant.
    pub fn fertilize(&mut self, id: AgentId) -> bool {
        self.registry.fertilize(id, self.day)
    }

    /// Vaccinates an unvaccinated female.
    ///
    /// # Panics
    ///
    /// Panics if the agent is not live, is male or is already vaccinated.
    pub fn vaccinate(&mut self, id: AgentId) {
        vaccination::vaccinate(&mut self.registry, id, &self.parameters.disease);
    }

    /// Advances the simulation by one day and returns the metrics at the end of it.
    ///
    /// # Panics
    ///
    /// Panics if the calendar runs past the last representable date.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> TickMetrics {
        let today = self.day;
        self.season
            .update(self.date, &mut self.registry, &self.parameters, rng);
        run_vaccination_campaign(&mut self.registry, &self.parameters, rng);
        run_surveillance(&mut self.registry, &self.parameters, today, rng);

        let mut order = self.registry.ids();
        order.shuffle(rng);
        for id in order {
            self.activate(id, today, rng);
        }

        self.day += 1;
        self.date = self
            .date
            .succ_opt()
            .expect("Simulation date is out of range");

        let metrics = TickMetrics::collect(&self.registry, &self.parameters, self.day, self.date);
        trace!(
            "day {} ({}): {} alive, {} infected",
            self.day,
            self.date,
            metrics.alive,
            metrics.infected
        );
        self.history.push(metrics.clone());
        metrics
    }

    fn activate<R: Rng>(&mut self, id: AgentId, today: u64, rng: &mut R) {
        // Agents removed earlier in the tick take no further action.
        let Some(mut agent) = self.registry.get(id).copied() else {
            return;
        };
        let world = WorldView {
            registry: &self.registry,
            parameters: &self.parameters,
            today,
        };
        let outcome = handlers::activate(&mut agent, &world, rng, &mut self.effects);
        self.registry.commit(agent);

        let effects = std::mem::take(&mut self.effects);
        for effect in &effects {
            self.apply(*effect, today, rng);
        }
        self.effects = effects;
        self.effects.clear();

        if let ControlFlow::Break(reason) = outcome {
            self.remove(id, reason);
        }
    }

    fn apply<R: Rng>(&mut self, effect: Effect, today: u64, rng: &mut R) {
        match effect {
            Effect::Infect(target) => {
                self.infect(target, rng);
            }
            Effect::Fertilize(target) => {
                self.registry.fertilize(target, today);
            }
            Effect::Spawn { position, heading } => {
                let mut calf = self.builder.newborn(position, heading);
                valuation::handle(&mut calf, &self.parameters.monetary);
                self.registry.add(calf);
                debug!("day {today}: agent {} born", calf.id);
            }
        }
    }

    fn remove(&mut self, id: AgentId, reason: RemovalReason) {
        let agent = self.registry.remove(id, reason);
        if agent.is_male() {
            self.season.drop_male(id);
        }
        if reason == RemovalReason::Disease {
            debug!("day {}: agent {id} died of the disease", self.day);
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn registry(&self) -> &PopulationRegistry {
        &self.registry
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        self.registry.statistics()
    }

    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.registry.get(id)
    }

    #[must_use]
    pub fn season(&self) -> &SeasonState {
        &self.season
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn day(&self) -> u64 {
        self.day
    }

    /// The calendar date of the next tick.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    /// The live agents in id order, as a renderer sees them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.registry
            .iter()
            .map(|agent| AgentSnapshot::of(agent, &self.parameters.reproduction))
            .collect()
    }
}

define_rng!(HerdRng);

define_data_plugin!(HerdPlugin, Option<Herd>, None);

pub trait ContextHerdExt {
    /// Builds the herd from the parameters stored in the context, drawing from `HerdRng`, and
    /// schedules the first daily tick. Each tick schedules the next until `max_days` ticks
    /// have run. If the `TickMetrics` report has been added, every tick writes a row to it.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::ConfigError` if no parameters have been set or the herd already
    /// exists.
    ///
    /// # Panics
    ///
    /// Panics if the random module has not been initialized.
    fn init_herd(&mut self) -> Result<(), HerdError>;

    fn herd(&self) -> Option<&Herd>;

    /// Runs one tick of the herd with `HerdRng` and returns its metrics.
    ///
    /// # Panics
    ///
    /// Panics if the herd has not been initialized.
    fn step_herd(&mut self) -> TickMetrics;

    /// The current live agents, or nothing if there is no herd.
    fn herd_snapshot(&self) -> Vec<AgentSnapshot>;
}

fn schedule_tick(context: &mut Context, day: u64) {
    context.add_plan(day, move |context| {
        let metrics = context.step_herd();
        if context.has_report::<TickMetrics>() {
            if let Err(err) = context.send_report(metrics) {
                error!("failed to write metrics for day {day}: {err}");
                context.shutdown();
                return;
            }
        }
        let max_days = context
            .herd()
            .map_or(0, |herd| herd.parameters().max_days);
        if day + 1 < max_days {
            schedule_tick(context, day + 1);
        }
    });
}

impl ContextHerdExt for Context {
    fn init_herd(&mut self) -> Result<(), HerdError> {
        if self.herd().is_some() {
            return Err(HerdError::ConfigError(
                "the herd has already been initialized".to_string(),
            ));
        }
        let parameters = self.get_parameters().cloned().ok_or_else(|| {
            HerdError::ConfigError("parameters must be set before the herd is built".to_string())
        })?;
        let max_days = parameters.max_days;

        let herd = self.sample(HerdRng, |rng| Herd::new(parameters, rng))?;
        *self.get_data_mut(HerdPlugin) = Some(herd);
        if max_days > 0 {
            let today = self.get_current_day();
            schedule_tick(self, today);
        }
        Ok(())
    }

    fn herd(&self) -> Option<&Herd> {
        self.get_data(HerdPlugin).and_then(Option::as_ref)
    }

    fn step_herd(&mut self) -> TickMetrics {
        let mut herd = self
            .get_data_mut(HerdPlugin)
            .take()
            .expect("The herd must be initialized with init_herd before it can step");
        let metrics = self.sample(HerdRng, |rng| herd.step(rng));
        *self.get_data_mut(HerdPlugin) = Some(herd);
        metrics
    }

    fn herd_snapshot(&self) -> Vec<AgentSnapshot> {
        self.herd().map(Herd::snapshot).unwrap_or_default()
    }
}
