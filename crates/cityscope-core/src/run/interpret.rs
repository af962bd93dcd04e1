use tracing::warn;

use crate::api::event::{FunctionCall, HANDOFF_CALL_NAME, RunEvent};
use crate::run::action::RunAction;

/// Maps one decoded frame payload to the actions it implies.
///
/// A payload that fails to parse yields no actions; one malformed frame
/// must not abort the run.
pub fn interpret_frame(payload: &str) -> Vec<RunAction> {
    match serde_json::from_str::<RunEvent>(payload) {
        Ok(event) => interpret_event(&event),
        Err(err) => {
            warn!("dropping malformed frame: {err}");
            Vec::new()
        }
    }
}

/// A single event may carry several content parts; the resulting actions
/// keep the part order.
pub fn interpret_event(event: &RunEvent) -> Vec<RunAction> {
    let mut actions = Vec::new();
    let Some(content) = &event.content else {
        return actions;
    };

    for part in &content.parts {
        if let Some(call) = &part.function_call {
            actions.push(RunAction::CompleteRunningSteps);
            actions.push(RunAction::StartStep {
                id: event.id.clone(),
                title: step_title(&event.author, call),
                detail: call_detail(call),
            });
        }
        if let Some(text) = &part.text {
            actions.push(RunAction::SetFinalAnswer { text: text.clone() });
        }
    }

    actions
}

fn step_title(author: &str, call: &FunctionCall) -> String {
    if call.name == HANDOFF_CALL_NAME {
        let target = call
            .args
            .get("agent_name")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown agent");
        format!("Transferring to {target}")
    } else {
        format!("Agent {author} is running tool {}", call.name)
    }
}

fn call_detail(call: &FunctionCall) -> Option<String> {
    match &call.args {
        serde_json::Value::Object(map) if !map.is_empty() => {
            serde_json::to_string(&call.args).ok()
        }
        _ => None,
    }
}
