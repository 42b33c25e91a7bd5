use std::collections::BTreeSet;

use super::types::TwinSummary;

/// Description of the display update a selection transition requires, so a
/// rendering surface can refresh exactly the affected control and nothing
/// else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionUpdate {
    GoalSelected(u32),
    GoalDeselected(u32),
    TwinChanged { results_invalidated: bool },
    TwinCleared { results_invalidated: bool },
    ProjectChanged { project_id: Option<u64> },
    GoalsCleared,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    goals: BTreeSet<u32>,
    twin: Option<TwinSummary>,
    project_id: Option<u64>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the goal if absent, remove it if present. Callers are expected
    /// to pass only catalog-backed goal numbers.
    pub fn toggle_goal(&mut self, goal: u32) -> SelectionUpdate {
        if self.goals.remove(&goal) {
            SelectionUpdate::GoalDeselected(goal)
        } else {
            self.goals.insert(goal);
            SelectionUpdate::GoalSelected(goal)
        }
    }

    /// Replace the chosen twin. Switching to a different twin invalidates
    /// any loaded results; they must not be attributed to the new twin.
    pub fn select_twin(&mut self, twin: TwinSummary) -> SelectionUpdate {
        let results_invalidated = self.twin.as_ref().is_some_and(|t| t.id != twin.id);
        self.twin = Some(twin);
        SelectionUpdate::TwinChanged {
            results_invalidated,
        }
    }

    pub fn clear_twin(&mut self) -> SelectionUpdate {
        let results_invalidated = self.twin.take().is_some();
        SelectionUpdate::TwinCleared {
            results_invalidated,
        }
    }

    pub fn select_project(&mut self, project_id: Option<u64>) -> SelectionUpdate {
        self.project_id = project_id;
        SelectionUpdate::ProjectChanged { project_id }
    }

    pub fn clear_goals(&mut self) -> SelectionUpdate {
        self.goals.clear();
        SelectionUpdate::GoalsCleared
    }

    pub fn goals(&self) -> &BTreeSet<u32> {
        &self.goals
    }

    pub fn is_goal_selected(&self, goal: u32) -> bool {
        self.goals.contains(&goal)
    }

    pub fn twin(&self) -> Option<&TwinSummary> {
        self.twin.as_ref()
    }

    pub fn project_id(&self) -> Option<u64> {
        self.project_id
    }
}
