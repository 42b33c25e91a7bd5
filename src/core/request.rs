use thiserror::Error;

use super::selection::SelectionState;
use super::types::{CompareRequest, ScenarioKind, ScenarioParameters, SimulationRequest};

/// Client-side precondition failures. These surface immediately and never
/// reach the network layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("select a digital twin before running a simulation")]
    MissingTwin,
    #[error("select at least one target goal")]
    NoGoalsSelected,
}

/// Assemble a single-run request. Validation order: twin first, then the
/// goal set.
pub fn build_request(
    selection: &SelectionState,
    params: &ScenarioParameters,
) -> Result<SimulationRequest, ValidationError> {
    let twin = selection.twin().ok_or(ValidationError::MissingTwin)?;
    if selection.goals().is_empty() {
        return Err(ValidationError::NoGoalsSelected);
    }

    Ok(SimulationRequest {
        digital_twin_id: twin.id,
        project_id: selection.project_id(),
        scenario_type: params.scenario,
        simulation_name: params.scenario.simulation_label(),
        target_sdgs: selection.goals().iter().copied().collect(),
        funding_percentage: params.funding_percentage,
        timeline_years: params.timeline_years,
        delay_months: params.delay_months,
        scale_factor: params.scale_factor,
    })
}

/// Assemble a compare request covering every scenario kind, in canonical
/// order. Same preconditions as a single run.
pub fn build_compare_request(
    selection: &SelectionState,
    params: &ScenarioParameters,
) -> Result<CompareRequest, ValidationError> {
    let twin = selection.twin().ok_or(ValidationError::MissingTwin)?;
    if selection.goals().is_empty() {
        return Err(ValidationError::NoGoalsSelected);
    }

    Ok(CompareRequest {
        digital_twin_id: twin.id,
        target_sdgs: selection.goals().iter().copied().collect(),
        scenarios: ScenarioKind::CANONICAL_ORDER.to_vec(),
        funding_percentage: params.funding_percentage,
        timeline_years: params.timeline_years,
    })
}
