//! The population registry: the authoritative set of live agents, their positions in the
//! spatial index and the aggregate counters. Every change in population size goes through
//! `add` and `remove`, which keep the three in step.
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, Infection, Pregnancy, Vaccination};
use crate::space::SpatialIndex;

/// Why an agent left the space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Age,
    Disease,
    /// Detected by surveillance sampling.
    RandomCheck,
    /// A seasonal male leaving at the end of the mating season.
    SeasonEnd,
}

/// Aggregate counters over the census herd (seasonal males excluded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub alive: usize,
    pub infected: usize,
    /// Vaccinations administered so far.
    pub vaccinated: usize,
    pub died_of_age: usize,
    pub died_of_disease: usize,
    pub removed_by_surveillance: usize,
    /// Set the first time surveillance detects an infection; never reset.
    pub virus_located: bool,
}

fn decrement(counter: &mut usize, name: &str) {
    *counter = counter
        .checked_sub(1)
        .unwrap_or_else(|| panic!("The {name} counter would become negative"));
}

#[derive(Debug, Clone)]
pub struct PopulationRegistry {
    // Indexed by agent id; ids are dense and never reused.
    agents: Vec<Option<Agent>>,
    live_count: usize,
    index: SpatialIndex,
    statistics: Statistics,
}

impl PopulationRegistry {
    #[must_use]
    pub fn new(index: SpatialIndex) -> PopulationRegistry {
        PopulationRegistry {
            agents: Vec::new(),
            live_count: 0,
            index,
            statistics: Statistics::default(),
        }
    }

    /// Places `agent` in the space. Census agents are counted as alive, and as infected if
    /// they already are.
    ///
    /// # Panics
    ///
    /// Panics if an agent with the same id is live or the position is outside the space.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, agent: Agent) {
        let slot = agent.id.0 as usize;
        if slot >= self.agents.len() {
            self.agents.resize(slot + 1, None);
        }
        assert!(
            self.agents[slot].is_none(),
            "Agent {} is already in the population",
            agent.id
        );
        self.index.place(agent.id, agent.position);
        if agent.census {
            self.statistics.alive += 1;
            if agent.is_infected() {
                self.statistics.infected += 1;
            }
        }
        self.agents[slot] = Some(agent);
        self.live_count += 1;
    }

    /// Takes the agent out of the space and the live set and returns its final state.
    ///
    /// For census agents the alive counter goes down, the infected counter too if the agent
    /// was infected, and the counter for `reason` goes up. Seasonal males leave the counters
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if the agent is not live, or if a census agent is removed for `SeasonEnd`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn remove(&mut self, id: AgentId, reason: RemovalReason) -> Agent {
        let agent = self
            .agents
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("Agent {id} is not in the population"));
        self.index.remove(id);
        self.live_count -= 1;

        if agent.census {
            decrement(&mut self.statistics.alive, "alive");
            if agent.is_infected() {
                decrement(&mut self.statistics.infected, "infected");
            }
            match reason {
                RemovalReason::Age => self.statistics.died_of_age += 1,
                RemovalReason::Disease => self.statistics.died_of_disease += 1,
                RemovalReason::RandomCheck => self.statistics.removed_by_surveillance += 1,
                RemovalReason::SeasonEnd => {
                    panic!("Agent {id} is part of the census and cannot leave with the season")
                }
            }
        }
        agent
    }

    /// Writes back an agent's state after its handlers ran, moving it in the spatial index.
    /// A change in infection status is reflected in the infected counter.
    ///
    /// # Panics
    ///
    /// Panics if the agent is not live.
    pub fn commit(&mut self, agent: Agent) {
        let stored = self
            .get_mut(agent.id)
            .unwrap_or_else(|| panic!("Cannot commit agent {}: not in the population", agent.id));
        let was_infected = stored.is_infected();
        *stored = agent;

        if agent.census {
            match (was_infected, agent.is_infected()) {
                (false, true) => self.statistics.infected += 1,
                (true, false) => decrement(&mut self.statistics.infected, "infected"),
                _ => {}
            }
        }
        self.index.place(agent.id, agent.position);
    }

    /// Infects a healthy female on day `today`.
    ///
    /// # Panics
    ///
    /// Panics if the agent is not live or cannot be infected.
    pub fn infect(&mut self, id: AgentId, today: u64, will_die: bool) {
        let agent = self
            .get_mut(id)
            .unwrap_or_else(|| panic!("Cannot infect agent {id}: not in the population"));
        assert!(agent.is_infectable(), "Agent {id} cannot be infected");
        agent.infection = Infection::Infected {
            infected_on: today,
            will_die,
        };
        if agent.census {
            self.statistics.infected += 1;
        }
    }

    /// Starts a pregnancy on day `today` if the agent is a female that is not already
    /// pregnant. Returns whether she became pregnant.
    pub fn fertilize(&mut self, id: AgentId, today: u64) -> bool {
        match self.get_mut(id) {
            Some(agent) if agent.pregnancy() == Some(Pregnancy::NotPregnant) => {
                agent.set_pregnancy(Pregnancy::Pregnant {
                    conceived_on: today,
                });
                true
            }
            _ => false,
        }
    }

    /// Vaccinates an unvaccinated female.
    ///
    /// # Panics
    ///
    /// Panics if the agent is not live, is male or is already vaccinated.
    pub fn vaccinate(&mut self, id: AgentId, vaccination: Vaccination) {
        let agent = self
            .get_mut(id)
            .unwrap_or_else(|| panic!("Cannot vaccinate agent {id}: not in the population"));
        assert!(
            agent.is_female() && agent.vaccination == Vaccination::Unvaccinated,
            "Agent {id} cannot be vaccinated"
        );
        agent.vaccination = vaccination;
        self.statistics.vaccinated += 1;
    }

    pub fn mark_virus_located(&mut self) {
        self.statistics.virus_located = true;
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0 as usize).and_then(Option::as_ref)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Live agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().flatten()
    }

    /// Ids of the live agents in increasing order.
    #[must_use]
    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|agent| agent.id).collect()
    }

    /// Live agents other than `id` strictly within `radius` of `id`'s position, in id order.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    pub fn neighbors_of(&self, id: AgentId, radius: f64) -> impl Iterator<Item = &Agent> {
        let position = self
            .index
            .position(id)
            .unwrap_or_else(|| panic!("Agent {id} is not in the spatial index"));
        self.index
            .neighbors_within(position, radius)
            .into_iter()
            .filter(move |neighbor| *neighbor != id)
            .filter_map(move |neighbor| self.get(neighbor))
    }

    /// Number of live agents, seasonal males included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }
}
