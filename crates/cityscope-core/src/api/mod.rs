pub mod client;
pub mod error;
pub mod event;
pub mod sse;

use async_trait::async_trait;

pub use client::AgentClient;
pub use error::ApiError;
pub use event::{EventContent, EventPart, FunctionCall, RunEvent};
pub use sse::{FrameStream, decode_frames};

use crate::session::Session;

/// Backend surface the run pipeline depends on.
///
/// Implemented by [`AgentClient`] over HTTP and by in-memory fakes in
/// tests. Swapping the implementation is also the seam for adding real
/// stream abortion later without touching the reducer.
#[async_trait]
pub trait RunTransport: Send + Sync + 'static {
    /// Create a backend session for `(app, user, session)`.
    ///
    /// A "session already exists" response maps to
    /// [`ApiError::SessionConflict`]; callers treat it as
    /// success-with-reuse.
    async fn create_session(&self, user_id: &str, session_id: &str) -> Result<Session, ApiError>;

    /// Open the streamed run for one query and return its frame sequence.
    async fn open_run(&self, session: &Session, query: &str) -> Result<FrameStream, ApiError>;
}
