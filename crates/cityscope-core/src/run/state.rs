use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl StepStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Running => "Running",
            Self::Done => "Done",
            Self::Error => "Error",
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// One visible unit of backend progress: an agent handoff or a tool
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Which result pane the UI should present; driven by protocol
/// milestones, not user navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    Steps,
    Overview,
    Sources,
}

/// Lifecycle of the current run. Replaces the original's
/// null-query-as-not-started sentinel with an explicit tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    InProgress { query: String },
    Completed { query: String },
    /// The run was given up on (stalled past its deadline) rather than
    /// finishing its stream.
    Failed { query: String },
}

/// Snapshot of one query submission, cheap to clone for rendering.
///
/// Owned exclusively by the run state machine; a new submission replaces
/// the previous run's state wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub phase: RunPhase,
    /// Insertion order is arrival order; entries are only appended or
    /// status-upgraded mid-run, never removed.
    pub steps: Vec<Step>,
    pub has_final_answer: bool,
    pub final_answer: String,
    pub active_view: ActiveView,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::NotStarted,
            steps: Vec::new(),
            has_final_answer: false,
            final_answer: String::new(),
            active_view: ActiveView::Steps,
        }
    }

    pub fn submitted_query(&self) -> Option<&str> {
        match &self.phase {
            RunPhase::NotStarted => None,
            RunPhase::InProgress { query }
            | RunPhase::Completed { query }
            | RunPhase::Failed { query } => Some(query),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, RunPhase::Completed { .. })
    }

    /// The run reached a terminal phase, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, RunPhase::Completed { .. } | RunPhase::Failed { .. })
    }

    pub fn running_step_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Running)
            .count()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
