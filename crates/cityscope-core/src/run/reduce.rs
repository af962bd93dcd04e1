use crate::run::action::RunAction;
use crate::run::state::{ActiveView, RunPhase, RunState, Step, StepStatus};

/// Applies one action to the run state.
///
/// Mid-run mutation is monotonic: steps are appended or status-upgraded,
/// never removed. Only `BeginRun` replaces the state wholesale.
pub fn reduce(state: &mut RunState, action: RunAction) {
    match action {
        RunAction::BeginRun { query } => handle_begin_run(state, query),
        RunAction::StartStep { id, title, detail } => handle_start_step(state, id, title, detail),
        RunAction::CompleteRunningSteps => handle_complete_running_steps(state),
        RunAction::SetFinalAnswer { text } => handle_set_final_answer(state, text),
        RunAction::FinalizeRun => handle_finalize_run(state),
        RunAction::FailRun => handle_fail_run(state),
    }
}

fn handle_begin_run(state: &mut RunState, query: String) {
    state.phase = RunPhase::InProgress { query };
    state.steps.clear();
    state.has_final_answer = false;
    state.final_answer.clear();
    state.active_view = ActiveView::Steps;
}

fn handle_start_step(state: &mut RunState, id: String, title: String, detail: Option<String>) {
    // Duplicate ids from a misbehaving backend stay distinct entries;
    // the ledger is append-only.
    state.steps.push(Step {
        id,
        title,
        status: StepStatus::Running,
        detail,
    });
}

fn handle_complete_running_steps(state: &mut RunState) {
    for step in &mut state.steps {
        if step.status == StepStatus::Running {
            step.status = StepStatus::Done;
        }
    }
}

fn handle_set_final_answer(state: &mut RunState, text: String) {
    state.final_answer = text;
    state.has_final_answer = true;
    state.active_view = ActiveView::Overview;
}

fn handle_finalize_run(state: &mut RunState) {
    for step in &mut state.steps {
        if !step.status.is_settled() {
            step.status = StepStatus::Done;
        }
    }
    if let RunPhase::InProgress { query } = &state.phase {
        state.phase = RunPhase::Completed {
            query: query.clone(),
        };
    }
}

fn handle_fail_run(state: &mut RunState) {
    for step in &mut state.steps {
        if !step.status.is_settled() {
            step.status = StepStatus::Error;
        }
    }
    if let RunPhase::InProgress { query } = &state.phase {
        state.phase = RunPhase::Failed {
            query: query.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(query: &str) -> RunState {
        let mut state = RunState::new();
        reduce(
            &mut state,
            RunAction::BeginRun {
                query: query.to_string(),
            },
        );
        state
    }

    fn start_step(state: &mut RunState, id: &str, title: &str) {
        reduce(state, RunAction::CompleteRunningSteps);
        reduce(
            state,
            RunAction::StartStep {
                id: id.to_string(),
                title: title.to_string(),
                detail: None,
            },
        );
    }

    #[test]
    fn test_begin_run_resets_everything() {
        let mut state = started("first");
        start_step(&mut state, "s1", "Doing things");
        reduce(
            &mut state,
            RunAction::SetFinalAnswer {
                text: "done".to_string(),
            },
        );

        reduce(
            &mut state,
            RunAction::BeginRun {
                query: "second".to_string(),
            },
        );

        assert_eq!(state.submitted_query(), Some("second"));
        assert!(state.steps.is_empty());
        assert!(!state.has_final_answer);
        assert!(state.final_answer.is_empty());
        assert_eq!(state.active_view, ActiveView::Steps);
    }

    #[test]
    fn test_new_step_closes_previous_running_step() {
        let mut state = started("q");
        start_step(&mut state, "s1", "Step one");
        start_step(&mut state, "s2", "Step two");

        assert_eq!(state.steps.len(), 2);
        assert_eq!(state.steps[0].status, StepStatus::Done);
        assert_eq!(state.steps[1].status, StepStatus::Running);
        assert_eq!(state.running_step_count(), 1);
    }

    #[test]
    fn test_duplicate_step_ids_stay_distinct() {
        let mut state = started("q");
        start_step(&mut state, "same", "First arrival");
        start_step(&mut state, "same", "Second arrival");

        assert_eq!(state.steps.len(), 2);
        assert_eq!(state.steps[0].title, "First arrival");
        assert_eq!(state.steps[1].title, "Second arrival");
    }

    #[test]
    fn test_complete_running_settles_multiple_running_steps() {
        // Backend protocol violation: several steps running at once.
        let mut state = started("q");
        for id in ["a", "b"] {
            reduce(
                &mut state,
                RunAction::StartStep {
                    id: id.to_string(),
                    title: id.to_string(),
                    detail: None,
                },
            );
        }
        assert_eq!(state.running_step_count(), 2);

        reduce(&mut state, RunAction::CompleteRunningSteps);
        assert_eq!(state.running_step_count(), 0);
        assert!(state.steps.iter().all(|s| s.status == StepStatus::Done));
    }

    #[test]
    fn test_set_final_answer_reveals_overview() {
        let mut state = started("q");
        reduce(
            &mut state,
            RunAction::SetFinalAnswer {
                text: "The road is in fair condition.".to_string(),
            },
        );

        assert!(state.has_final_answer);
        assert_eq!(state.final_answer, "The road is in fair condition.");
        assert_eq!(state.active_view, ActiveView::Overview);
    }

    #[test]
    fn test_finalize_forces_running_steps_done() {
        let mut state = started("q");
        start_step(&mut state, "s1", "Still running");

        reduce(&mut state, RunAction::FinalizeRun);

        assert_eq!(state.running_step_count(), 0);
        assert_eq!(state.steps[0].status, StepStatus::Done);
        assert!(state.is_completed());
    }

    #[test]
    fn test_finalize_preserves_error_steps() {
        let mut state = started("q");
        start_step(&mut state, "s1", "Failed step");
        state.steps[0].status = StepStatus::Error;

        reduce(&mut state, RunAction::FinalizeRun);

        assert_eq!(state.steps[0].status, StepStatus::Error);
    }

    #[test]
    fn test_fail_marks_unsettled_steps_errored() {
        let mut state = started("q");
        start_step(&mut state, "s1", "Settled");
        start_step(&mut state, "s2", "Still running");

        reduce(&mut state, RunAction::FailRun);

        assert_eq!(state.steps[0].status, StepStatus::Done);
        assert_eq!(state.steps[1].status, StepStatus::Error);
        assert!(state.is_finished());
        assert!(!state.is_completed());
    }

    #[test]
    fn test_every_action_is_total_from_not_started() {
        // No action panics or errors from the initial state.
        for action in [
            RunAction::CompleteRunningSteps,
            RunAction::FailRun,
            RunAction::SetFinalAnswer {
                text: "t".to_string(),
            },
            RunAction::FinalizeRun,
            RunAction::StartStep {
                id: "s".to_string(),
                title: "t".to_string(),
                detail: None,
            },
        ] {
            let mut state = RunState::new();
            reduce(&mut state, action);
        }
    }

    #[test]
    fn test_finalize_without_run_stays_not_started() {
        let mut state = RunState::new();
        reduce(&mut state, RunAction::FinalizeRun);
        assert_eq!(state.phase, RunPhase::NotStarted);
    }
}
