//! Read-only view of the live agents for rendering.
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, Sex};
use crate::geometry::Vec2;
use crate::parameters::ReproductionParameters;

/// How a renderer should draw an agent. When several apply, the first listed wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portrayal {
    Male,
    InfectedUnvaccinated,
    InfectedVaccinated,
    Vaccinated,
    Infertile,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: Vec2,
    pub heading: Vec2,
    pub sex: Sex,
    pub age_days: u32,
    pub infected: bool,
    pub vaccinated: bool,
    pub fertile: bool,
    pub pregnant: bool,
    pub portrayal: Portrayal,
}

impl AgentSnapshot {
    #[must_use]
    pub fn of(agent: &Agent, reproduction: &ReproductionParameters) -> AgentSnapshot {
        let infected = agent.is_infected();
        let vaccinated = agent.is_vaccinated();
        let fertile = agent.is_fertile(reproduction);
        let portrayal = match (agent.sex(), infected, vaccinated) {
            (Sex::Male, _, _) => Portrayal::Male,
            (_, true, false) => Portrayal::InfectedUnvaccinated,
            (_, true, true) => Portrayal::InfectedVaccinated,
            (_, false, true) => Portrayal::Vaccinated,
            _ if !fertile => Portrayal::Infertile,
            _ => Portrayal::Normal,
        };
        AgentSnapshot {
            id: agent.id,
            position: agent.position,
            heading: agent.heading,
            sex: agent.sex(),
            age_days: agent.age_days,
            infected,
            vaccinated,
            fertile,
            pregnant: agent.is_pregnant(),
            portrayal,
        }
    }
}
