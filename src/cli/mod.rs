pub mod orchestration;

pub use orchestration::{Outcome, Plan, PublishWorkflow, WorkflowOptions};
