use crate::agent::{Agent, Valuation};
use crate::parameters::MonetaryParameters;

/// Production cost and sale value of an agent at its current age. An infected agent cannot be
/// sold.
#[must_use]
pub fn valuation(agent: &Agent, monetary: &MonetaryParameters) -> Valuation {
    let weight = if agent.age_days < monetary.adult_age_days {
        monetary.young_weight_kg
    } else {
        monetary.adult_weight_kg
    };
    Valuation {
        production_cost: weight * monetary.cost_per_kg,
        sale_value: if agent.is_infected() {
            0.0
        } else {
            weight * monetary.price_per_kg
        },
    }
}

pub fn handle(agent: &mut Agent, monetary: &MonetaryParameters) {
    agent.valuation = valuation(agent, monetary);
}
