use crate::core::{ClassifiedOutcome, ClassifiedResult, Direction, ScenarioKind, ScenarioSummary};

/// Token binding a response to the request that triggered it. Only the
/// latest ticket may commit; older completions are discarded unseen.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RequestTicket(u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommitOutcome {
    Committed,
    Stale,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatBox {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GoalCard {
    pub goal_number: u32,
    pub title: String,
    pub change_badge: String,
    pub baseline_line: String,
    pub final_line: String,
    pub polarity: Direction,
    pub has_chart: bool,
}

/// Labeled numeric series handed to the chart-drawing collaborator. Color
/// and fill follow `polarity`, not per-goal styling.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub goal_number: u32,
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub polarity: Direction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SingleRunView {
    pub title: String,
    pub subtitle: String,
    pub stats: Vec<StatBox>,
    pub explanation: String,
    pub policy_insight: String,
    pub risk_warning: Option<String>,
    pub primary_cards: Vec<GoalCard>,
    pub secondary_cards: Vec<GoalCard>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonCard {
    pub scenario: ScenarioKind,
    pub heading: String,
    pub affected_population: String,
    pub mean_change: String,
    pub confidence: String,
    pub polarity: Option<Direction>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonView {
    pub title: String,
    pub subtitle: String,
    pub cards: Vec<ComparisonCard>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultsView {
    Single(SingleRunView),
    Comparison(ComparisonView),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ErrorPanel {
    pub title: String,
    pub message: String,
}

/// Two-phase results surface. Phase 1 commits the structural view; phase 2
/// (chart construction) becomes available only once a structural view is in
/// place, since chart collaborators need a committed layout to draw into.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    generation: u64,
    committed: Option<ResultsView>,
    error: Option<ErrorPanel>,
    chart_jobs: Vec<ChartSpec>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request. Any response still in flight for an earlier
    /// ticket loses the right to render.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket(self.generation)
    }

    pub fn commit_single(
        &mut self,
        ticket: RequestTicket,
        result: &ClassifiedResult,
        twin_name: &str,
    ) -> CommitOutcome {
        if ticket.0 != self.generation {
            return CommitOutcome::Stale;
        }

        let view = build_single_view(result, twin_name);
        self.chart_jobs = chart_jobs_for(result);
        self.committed = Some(ResultsView::Single(view));
        self.error = None;
        CommitOutcome::Committed
    }

    pub fn commit_comparison(
        &mut self,
        ticket: RequestTicket,
        summaries: &[ScenarioSummary],
        twin_name: &str,
        timeline_years: u32,
    ) -> CommitOutcome {
        if ticket.0 != self.generation {
            return CommitOutcome::Stale;
        }

        self.chart_jobs.clear();
        self.committed = Some(ResultsView::Comparison(build_comparison_view(
            summaries,
            twin_name,
            timeline_years,
        )));
        self.error = None;
        CommitOutcome::Committed
    }

    /// Record a failed request. The previous view stays in place; only the
    /// latest ticket's failure is surfaced.
    pub fn fail(&mut self, ticket: RequestTicket, title: &str, message: &str) -> CommitOutcome {
        if ticket.0 != self.generation {
            return CommitOutcome::Stale;
        }
        self.error = Some(ErrorPanel {
            title: title.to_string(),
            message: message.to_string(),
        });
        CommitOutcome::Committed
    }

    /// Phase 2: drain the chart construction jobs queued by the latest
    /// structural commit. Empty until a single-run view is committed.
    pub fn take_chart_jobs(&mut self) -> Vec<ChartSpec> {
        std::mem::take(&mut self.chart_jobs)
    }

    /// Drop the committed view, e.g. when the selected twin changes and the
    /// results no longer describe it.
    pub fn invalidate(&mut self) {
        self.committed = None;
        self.chart_jobs.clear();
    }

    pub fn view(&self) -> Option<&ResultsView> {
        self.committed.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorPanel> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

fn build_single_view(result: &ClassifiedResult, twin_name: &str) -> SingleRunView {
    SingleRunView {
        title: result.label.clone(),
        subtitle: format!("{twin_name} - {} Year Projection", result.timeline_years),
        stats: vec![
            StatBox {
                value: format!("{}%", result.header.confidence_percent),
                label: "Confidence".to_string(),
            },
            StatBox {
                value: group_thousands(result.header.affected_population),
                label: "People Affected".to_string(),
            },
            StatBox {
                value: result.header.goals_impacted.to_string(),
                label: "SDGs Impacted".to_string(),
            },
        ],
        explanation: result.explanation.clone(),
        policy_insight: result.policy_insight.clone(),
        risk_warning: result.risk_warning.clone(),
        primary_cards: result.primary.iter().map(goal_card).collect(),
        secondary_cards: result.secondary.iter().map(goal_card).collect(),
    }
}

fn goal_card(outcome: &ClassifiedOutcome) -> GoalCard {
    let arrow = match outcome.direction {
        Direction::Improved => "↑",
        Direction::Worsened => "↓",
    };
    GoalCard {
        goal_number: outcome.goal_number,
        title: format!("SDG {}: {}", outcome.goal_number, outcome.goal_name),
        change_badge: format!(
            "{arrow} {:.1} {} ({})",
            outcome.change.abs(),
            outcome.unit,
            outcome.change_percent_display()
        ),
        baseline_line: format!("Baseline: {} {}", outcome.baseline, outcome.unit),
        final_line: format!("Final: {} {}", outcome.final_value, outcome.unit),
        polarity: outcome.direction,
        has_chart: !outcome.timeline.is_empty(),
    }
}

fn chart_jobs_for(result: &ClassifiedResult) -> Vec<ChartSpec> {
    result
        .primary
        .iter()
        .chain(result.secondary.iter())
        .filter(|outcome| !outcome.timeline.is_empty())
        .map(|outcome| ChartSpec {
            goal_number: outcome.goal_number,
            series_label: outcome.goal_name.clone(),
            labels: outcome
                .timeline
                .iter()
                .map(|point| format!("Year {}", point.year))
                .collect(),
            values: outcome.timeline.iter().map(|point| point.value).collect(),
            polarity: outcome.direction,
        })
        .collect()
}

fn build_comparison_view(
    summaries: &[ScenarioSummary],
    twin_name: &str,
    timeline_years: u32,
) -> ComparisonView {
    ComparisonView {
        title: "Scenario Comparison".to_string(),
        subtitle: format!("{twin_name} - {timeline_years} Year Projections"),
        cards: summaries
            .iter()
            .map(|summary| ComparisonCard {
                scenario: summary.scenario,
                heading: summary.scenario.display_name().to_string(),
                affected_population: group_thousands(summary.affected_population),
                mean_change: summary.mean_change_display(),
                confidence: format!("{:.0}%", summary.confidence * 100.0),
                polarity: summary.polarity(),
            })
            .collect(),
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
