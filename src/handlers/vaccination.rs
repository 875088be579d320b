//! Vaccination is triggered by the campaign, never by the agent itself. It swaps the agent's
//! spreading parameters for the reduced ones and leaves its infection state alone.
use crate::agent::{AgentId, Vaccination};
use crate::parameters::DiseaseParameters;
use crate::population::PopulationRegistry;

/// The state of a freshly vaccinated agent.
#[must_use]
pub fn vaccinated(disease: &DiseaseParameters) -> Vaccination {
    Vaccination::Vaccinated {
        infection_radius: disease.vaccinated_infection_radius,
        transmission_chance: disease.vaccinated_transmission_chance,
    }
}

/// Vaccinates an unvaccinated female.
///
/// # Panics
///
/// Panics if the agent is not live, is male or is already vaccinated.
pub fn vaccinate(registry: &mut PopulationRegistry, id: AgentId, disease: &DiseaseParameters) {
    registry.vaccinate(id, vaccinated(disease));
}
