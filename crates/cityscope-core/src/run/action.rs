/// State transitions for one run, applied in arrival order.
///
/// Every action is valid in every reachable state; there is no
/// illegal-transition error case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunAction {
    /// A new query was submitted: clear the ledger and the previous
    /// answer, remember the query.
    BeginRun { query: String },

    /// A handoff or tool invocation began; appended as `running`.
    StartStep {
        id: String,
        title: String,
        detail: Option<String>,
    },

    /// Close out whatever is currently running (normally at most one
    /// step, but a misbehaving backend may have produced several).
    CompleteRunningSteps,

    /// Terminal text arrived; reveals the result view.
    SetFinalAnswer { text: String },

    /// The stream ended (success or failure); no step may stay running.
    FinalizeRun,

    /// The run stalled past its deadline; surviving steps are marked as
    /// errored instead of done.
    FailRun,
}
