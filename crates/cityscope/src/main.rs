use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Result, WrapErr, bail};
use url::Url;

use cityscope_core::api::AgentClient;
use cityscope_core::auth::StaticIdentity;
use cityscope_core::config::load_config;
use cityscope_core::run::{RunController, RunPhase, Step, StepStatus};
use cityscope_core::suggestions::QUICK_QUERIES;

/// Ask the Cityscope multi-agent backend a question and watch the agents
/// work through it.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Question to send; omit to list the quick queries
    query: Option<String>,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = "CITYSCOPE_BACKEND_URL")]
    backend_url: Option<String>,

    /// User id for session creation (overrides the config file)
    #[arg(long, env = "CITYSCOPE_USER")]
    user: Option<String>,

    /// Backend application name (overrides the config file)
    #[arg(long)]
    app_name: Option<String>,

    /// Give up on the run after this many seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("cityscope={log_level},cityscope_core={log_level}"))
        .init();

    let Some(query) = args.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        println!("No query given. Some things you could ask:");
        for suggestion in QUICK_QUERIES {
            println!("  cityscope \"{suggestion}\"");
        }
        return Ok(());
    };

    let config = load_config()?;
    let backend_url = args.backend_url.as_deref().unwrap_or(config.backend_url());
    let app_name = args.app_name.as_deref().unwrap_or(config.app_name());
    let user_id = args
        .user
        .as_deref()
        .or(config.user_id.as_deref())
        .unwrap_or("local");

    let base_url =
        Url::parse(backend_url).wrap_err_with(|| format!("invalid backend URL: {backend_url}"))?;
    let client = Arc::new(AgentClient::new(base_url, app_name)?);
    let controller = Arc::new(
        RunController::new(client, StaticIdentity::new(user_id))
            .with_run_timeout(Duration::from_secs(args.timeout_secs)),
    );

    let mut rx = controller.subscribe();
    controller.submit_query(query);

    // Backstop past the run's own deadline; covers a hung session request,
    // which the run timeout does not.
    let deadline = tokio::time::sleep(Duration::from_secs(args.timeout_secs + 30));
    tokio::pin!(deadline);

    // Steps are append-only mid-run; each one is printed once, on arrival.
    let mut printed = 0;
    loop {
        tokio::select! {
            () = &mut deadline => {
                bail!("gave up waiting for the backend after {} seconds", args.timeout_secs + 30);
            }
            changed = rx.changed() => {
                changed.wrap_err("run state channel closed unexpectedly")?;
                let state = rx.borrow_and_update().clone();

                for step in &state.steps[printed..] {
                    print_step(step);
                }
                printed = state.steps.len();

                if state.is_finished() {
                    if matches!(state.phase, RunPhase::Failed { .. }) {
                        bail!("the backend stopped responding mid-run");
                    }
                    if state.has_final_answer {
                        println!("\n{}", state.final_answer);
                    } else {
                        println!("\n{}", "The run finished without an answer.".yellow());
                    }
                    return Ok(());
                }
            }
        }
    }
}

fn print_step(step: &Step) {
    let label = match step.status {
        StepStatus::Running => step.status.label().cyan(),
        StepStatus::Error => step.status.label().red(),
        StepStatus::Queued | StepStatus::Done => step.status.label().normal(),
    };
    match &step.detail {
        Some(detail) => println!("[{label}] {} {}", step.title, detail.dimmed()),
        None => println!("[{label}] {}", step.title),
    }
}
