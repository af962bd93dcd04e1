use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::RunTransport;
use crate::auth::{Identity, IdentityProvider};
use crate::run::action::RunAction;
use crate::run::interpret::interpret_frame;
use crate::run::reduce::reduce;
use crate::run::state::RunState;
use crate::session::SessionManager;

/// Orchestrates one query submission end-to-end: ensure session, open the
/// stream, interpret frames, reduce actions into [`RunState`].
///
/// The controller owns the state exclusively; observers read snapshots
/// through a watch channel and must never mutate them.
pub struct RunController {
    transport: Arc<dyn RunTransport>,
    sessions: SessionManager,
    identity: Arc<dyn IdentityProvider>,
    state: watch::Sender<RunState>,
    run_seq: AtomicU64,
    run_timeout: Option<Duration>,
}

impl RunController {
    pub fn new(transport: Arc<dyn RunTransport>, identity: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(RunState::new());
        Self {
            sessions: SessionManager::new(transport.clone()),
            transport,
            identity,
            state,
            run_seq: AtomicU64::new(0),
            run_timeout: None,
        }
    }

    /// Fails a run whose stream goes silent for longer than `timeout`.
    /// Without this, a stalled backend leaves the run in progress forever.
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Submits a query as a new run. Fire and forget: progress and the
    /// final answer are observable through `subscribe`/`snapshot`.
    ///
    /// Submitting while another run is in flight is always safe: the newer
    /// run wins and the older one becomes inert. Its stream may keep
    /// reading to completion but none of its actions apply any more.
    pub fn submit_query(self: &Arc<Self>, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let user_id = match self.identity.identity() {
            Identity::Authenticated { user_id } => user_id,
            other => {
                debug!("ignoring submission without an authenticated user ({other:?})");
                return;
            }
        };

        let run_id = self.run_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.apply_if_current(
            run_id,
            RunAction::BeginRun {
                query: query.to_string(),
            },
        );

        let controller = Arc::clone(self);
        let query = query.to_string();
        tokio::spawn(async move {
            controller.drive_run(run_id, &user_id, &query).await;
        });
    }

    async fn drive_run(&self, run_id: u64, user_id: &str, query: &str) {
        let session = match self.sessions.ensure_session(user_id).await {
            Ok(session) => session,
            Err(err) => {
                // No stream was opened: the run is abandoned with an empty
                // ledger rather than finalized.
                warn!("run {run_id} abandoned, session not ensured: {err}");
                return;
            }
        };

        let mut frames = match self.transport.open_run(&session, query).await {
            Ok(frames) => frames,
            Err(err) => {
                warn!("run {run_id} failed to open stream: {err}");
                self.apply_if_current(run_id, RunAction::FinalizeRun);
                return;
            }
        };

        loop {
            let next = match self.run_timeout {
                Some(limit) => match tokio::time::timeout(limit, frames.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!("run {run_id} stalled for {limit:?}; giving up");
                        self.apply_if_current(run_id, RunAction::FailRun);
                        return;
                    }
                },
                None => frames.next().await,
            };
            let Some(frame) = next else {
                break;
            };

            let payload = match frame {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("run {run_id} stream failed: {err}");
                    break;
                }
            };

            for action in interpret_frame(&payload) {
                if !self.apply_if_current(run_id, action) {
                    debug!("run {run_id} superseded; dropping the rest of its stream");
                    return;
                }
            }
        }

        self.apply_if_current(run_id, RunAction::FinalizeRun);
    }

    /// Applies the action only when `run_id` is still the newest run.
    /// This is the whole cancellation mechanism: superseded runs no-op.
    ///
    /// The counter is read inside the watch closure so the check and the
    /// reduction are serialized with a newer run's `BeginRun` by the
    /// channel's lock; a stale task can never land an action after the
    /// check but behind a newer run's reset.
    fn apply_if_current(&self, run_id: u64, action: RunAction) -> bool {
        self.state.send_if_modified(|state| {
            if self.run_seq.load(Ordering::SeqCst) != run_id {
                return false;
            }
            reduce(state, action);
            true
        })
    }
}
