//! Styling Workflow State Machine.

mod session;
mod styling_workflow;

pub use styling_workflow::{StylingWorkflow, WorkflowOptions};
