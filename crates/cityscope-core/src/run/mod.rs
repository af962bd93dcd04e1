pub mod action;
pub mod controller;
pub mod interpret;
pub mod reduce;
pub mod state;

pub use action::RunAction;
pub use controller::RunController;
pub use interpret::interpret_frame;
pub use reduce::reduce;
pub use state::{ActiveView, RunPhase, RunState, Step, StepStatus};
