mod classify;
mod compare;
mod request;
mod selection;
mod types;

pub use classify::{
    ClassifiedOutcome, ClassifiedResult, Direction, HeaderStats, change_percent, classify,
    direction_of,
};
pub use compare::{ScenarioSummary, aggregate};
pub use request::{ValidationError, build_compare_request, build_request};
pub use selection::{SelectionState, SelectionUpdate};
pub use types::{
    BaselineIndicator, CompareRequest, ComparisonSet, GoalCatalog, GoalOutcome, ScenarioKind,
    ScenarioOutcome, ScenarioParameters, SimulationRequest, SimulationResult, TimelinePoint,
    TwinDetail, TwinSummary,
};
