//! Styling workflow domain types.
//!
//! The state machine itself lives in `couture-application`; this module
//! holds the states, the actions a presentation layer may offer, the
//! read-only snapshot it renders from, and the user-facing failure texts.

mod messages;
mod snapshot;
mod state;
mod view;

pub use messages::{
    INTAKE_FAILURE_MESSAGE, render_failure_message, suggestion_failure_message,
};
pub use snapshot::{SessionSnapshot, TryOnSelection};
pub use state::{WorkflowAction, WorkflowState};
pub use view::VariationView;
