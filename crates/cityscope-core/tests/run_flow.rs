//! End-to-end run flow: raw response bytes in, rendered run state out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::watch;
use tokio_util::bytes::Bytes;

use cityscope_core::api::{ApiError, FrameStream, RunTransport, decode_frames};
use cityscope_core::auth::StaticIdentity;
use cityscope_core::run::{ActiveView, RunController, RunPhase, RunState, StepStatus};
use cityscope_core::session::Session;

/// Serves one canned byte response, chunked to cross frame boundaries the
/// way a real network read does.
struct CannedTransport {
    chunks: Vec<&'static str>,
}

#[async_trait]
impl RunTransport for CannedTransport {
    async fn create_session(&self, user_id: &str, session_id: &str) -> Result<Session, ApiError> {
        Ok(Session {
            id: session_id.to_string(),
            user_id: user_id.to_string(),
        })
    }

    async fn open_run(&self, _session: &Session, _query: &str) -> Result<FrameStream, ApiError> {
        let chunks: Vec<Result<Bytes, std::io::Error>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk.as_bytes())))
            .collect();
        Ok(decode_frames(stream::iter(chunks)))
    }
}

async fn completed_state(mut rx: watch::Receiver<RunState>) -> RunState {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(RunState::is_completed))
        .await
        .expect("run did not complete in time")
        .expect("state channel closed")
        .clone()
}

#[tokio::test]
async fn test_road_condition_query_end_to_end() {
    // The orchestrator hands off to geo_agent, geo_agent runs a tool, then
    // the answer text arrives. Chunk splits land mid-line on purpose.
    let body = concat!(
        "data: {\"id\": \"e1\", \"author\": \"city_agent\", \"content\": {\"parts\": [",
        "{\"functionCall\": {\"name\": \"transfer_to_agent\", \"args\": {\"agent_name\": \"geo_agent\"}}}]}}\n",
        "data: {\"id\": \"e2\", \"author\": \"geo_agent\", \"content\": {\"parts\": [",
        "{\"functionCall\": {\"name\": \"lookup_road_condition\", \"args\": {\"road\": \"Longfields Rd\"}}}]}}\n",
        ": keep-alive\n",
        "data: {\"id\": \"e3\", \"author\": \"geo_agent\", \"content\": {\"parts\": [",
        "{\"text\": \"The road is in fair condition.\"}]}}\n",
    );
    let mid = body.len() / 2;
    let transport = Arc::new(CannedTransport {
        chunks: vec![&body[..mid], &body[mid..]],
    });

    let controller = Arc::new(RunController::new(transport, StaticIdentity::new("inspector")));
    let rx = controller.subscribe();

    controller.submit_query("What is the road condition of Longfields Rd?");
    let state = completed_state(rx).await;

    assert_eq!(
        state.submitted_query(),
        Some("What is the road condition of Longfields Rd?")
    );
    assert_eq!(state.steps.len(), 2);
    assert_eq!(state.steps[0].title, "Transferring to geo_agent");
    assert_eq!(
        state.steps[1].title,
        "Agent geo_agent is running tool lookup_road_condition"
    );
    assert!(state.steps.iter().all(|s| s.status == StepStatus::Done));
    assert!(state.has_final_answer);
    assert_eq!(state.final_answer, "The road is in fair condition.");
    assert_eq!(state.active_view, ActiveView::Overview);
}

#[tokio::test]
async fn test_stream_without_answer_still_finishes_clean() {
    let transport = Arc::new(CannedTransport {
        chunks: vec![
            "data: {\"id\": \"e1\", \"author\": \"city_agent\", \"content\": {\"parts\": [\
             {\"functionCall\": {\"name\": \"transfer_to_agent\", \"args\": {\"agent_name\": \"geo_agent\"}}}]}}\n",
        ],
    });

    let controller = Arc::new(RunController::new(transport, StaticIdentity::new("inspector")));
    let rx = controller.subscribe();

    controller.submit_query("anything");
    let state = completed_state(rx).await;

    assert_eq!(state.steps.len(), 1);
    assert_eq!(state.steps[0].status, StepStatus::Done);
    assert!(!state.has_final_answer);
    assert_eq!(state.active_view, ActiveView::Steps);
}

#[tokio::test]
async fn test_garbage_frames_do_not_poison_the_run() {
    let transport = Arc::new(CannedTransport {
        chunks: vec![
            "data: not json at all\n",
            "data: {\"id\": \"e1\", \"author\": \"geo_agent\", \"content\": {\"parts\": [\
             {\"text\": \"Still answered.\"}]}}\n",
        ],
    });

    let controller = Arc::new(RunController::new(transport, StaticIdentity::new("inspector")));
    let rx = controller.subscribe();

    controller.submit_query("anything");
    let state = completed_state(rx).await;

    assert!(state.steps.is_empty());
    assert_eq!(state.final_answer, "Still answered.");
    assert!(matches!(state.phase, RunPhase::Completed { .. }));
}
