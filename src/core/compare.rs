use super::classify::{Direction, direction_of};
use super::types::{ComparisonSet, ScenarioKind, ScenarioOutcome};

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioSummary {
    pub scenario: ScenarioKind,
    pub affected_population: u64,
    /// Arithmetic mean of `change` over the primary outcomes only; `None`
    /// when the scenario has no primary outcomes.
    pub mean_primary_change: Option<f64>,
    pub confidence: f64,
}

impl ScenarioSummary {
    pub fn polarity(&self) -> Option<Direction> {
        self.mean_primary_change.map(direction_of)
    }

    pub fn mean_change_display(&self) -> String {
        match self.mean_primary_change {
            Some(mean) => {
                let arrow = if mean > 0.0 { "↑" } else { "↓" };
                format!("{arrow} {:.1}", mean.abs())
            }
            None => "N/A".to_string(),
        }
    }
}

/// Summarize a comparison response. Scenarios always come out in
/// [`ScenarioKind::CANONICAL_ORDER`], whatever order the response map held;
/// scenarios absent from the response are skipped.
pub fn aggregate(set: &ComparisonSet) -> Vec<ScenarioSummary> {
    ScenarioKind::CANONICAL_ORDER
        .iter()
        .filter_map(|kind| {
            set.scenarios
                .get(kind)
                .map(|outcome| summarize(*kind, outcome))
        })
        .collect()
}

fn summarize(scenario: ScenarioKind, outcome: &ScenarioOutcome) -> ScenarioSummary {
    let primary_changes: Vec<f64> = outcome
        .outcomes
        .iter()
        .filter(|(_, o)| !o.is_secondary)
        .map(|(_, o)| o.change)
        .collect();

    let mean_primary_change = if primary_changes.is_empty() {
        None
    } else {
        Some(primary_changes.iter().sum::<f64>() / primary_changes.len() as f64)
    };

    ScenarioSummary {
        scenario,
        affected_population: outcome.affected_population,
        mean_primary_change,
        confidence: outcome.confidence,
    }
}
