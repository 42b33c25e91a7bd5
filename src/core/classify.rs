use super::types::{SimulationResult, TimelinePoint};

/// Visual polarity of an outcome, decided by the sign of `change` alone.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Improved,
    Worsened,
}

#[derive(Clone, Debug)]
pub struct ClassifiedOutcome {
    pub goal_number: u32,
    pub goal_name: String,
    pub baseline: f64,
    pub final_value: f64,
    pub change: f64,
    pub unit: String,
    /// `None` when the baseline is zero and the percentage is undefined.
    pub change_percent: Option<f64>,
    pub direction: Direction,
    pub timeline: Vec<TimelinePoint>,
}

impl ClassifiedOutcome {
    /// One-decimal percent string, or the `N/A` placeholder for a zero
    /// baseline. Never yields NaN or infinity.
    pub fn change_percent_display(&self) -> String {
        match self.change_percent {
            Some(percent) => format!("{percent:.1}%"),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HeaderStats {
    pub confidence_percent: f64,
    pub goals_impacted: usize,
    pub affected_population: u64,
}

#[derive(Clone, Debug)]
pub struct ClassifiedResult {
    pub label: String,
    pub timeline_years: u32,
    pub header: HeaderStats,
    pub explanation: String,
    pub policy_insight: String,
    pub risk_warning: Option<String>,
    pub primary: Vec<ClassifiedOutcome>,
    pub secondary: Vec<ClassifiedOutcome>,
}

pub fn change_percent(change: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some(change / baseline * 100.0)
    }
}

pub fn direction_of(change: f64) -> Direction {
    if change > 0.0 {
        Direction::Improved
    } else {
        Direction::Worsened
    }
}

/// Partition a simulation response into primary and secondary outcomes,
/// preserving the response's insertion order within each partition, and
/// derive the per-goal display metrics.
pub fn classify(result: &SimulationResult) -> ClassifiedResult {
    let mut primary = Vec::new();
    let mut secondary = Vec::new();

    for (goal_number, outcome) in &result.predicted_outcomes {
        let classified = ClassifiedOutcome {
            goal_number: *goal_number,
            goal_name: outcome.sdg_name.clone(),
            baseline: outcome.baseline,
            final_value: outcome.final_value,
            change: outcome.change,
            unit: outcome.unit.clone(),
            change_percent: change_percent(outcome.change, outcome.baseline),
            direction: direction_of(outcome.change),
            timeline: outcome.timeline.clone(),
        };
        if outcome.is_secondary {
            secondary.push(classified);
        } else {
            primary.push(classified);
        }
    }

    ClassifiedResult {
        label: result.simulation_name.clone(),
        timeline_years: result.timeline_years,
        header: HeaderStats {
            confidence_percent: result.confidence_score * 100.0,
            goals_impacted: result.predicted_outcomes.len(),
            affected_population: result.affected_population,
        },
        explanation: result.explanation.clone(),
        policy_insight: result.policy_insight.clone(),
        risk_warning: result.risk_warning.clone(),
        primary,
        secondary,
    }
}
