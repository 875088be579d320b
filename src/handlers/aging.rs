use std::ops::ControlFlow;

use crate::agent::Agent;
use crate::parameters::Parameters;
use crate::population::RemovalReason;

/// Ages the agent by one day and removes it once it reaches the maximum age.
pub fn handle(agent: &mut Agent, parameters: &Parameters) -> ControlFlow<RemovalReason> {
    agent.age_days += 1;
    if agent.age_days >= parameters.max_age_days {
        ControlFlow::Break(RemovalReason::Age)
    } else {
        ControlFlow::Continue(())
    }
}
