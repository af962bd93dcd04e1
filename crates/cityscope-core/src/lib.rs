// Client-side core for the Cityscope agent search: session handling, run
// streaming, and the state machine the UI renders.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod run;
pub mod session;
pub mod suggestions;
