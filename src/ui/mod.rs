//! User interface module - terminal reporting of workflow outcomes.
//!
//! - `formatter` - rendering and styled printing of individual messages
//! - This module - reporting a whole [`Outcome`]

use crate::cli::Outcome;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    describe_target, display_error, display_plan, display_published, display_skip,
    display_status, display_success, render_plan,
};

/// Prints the final outcome of a workflow run.
///
/// # Arguments
/// * `outcome` - Result of the workflow
/// * `steps` - Generator steps, shown in dry-run plans
pub fn report_outcome(outcome: &Outcome, steps: &[String]) {
    match outcome {
        Outcome::Skipped(reason) => display_skip(reason),
        Outcome::Planned(plan) => display_plan(plan, steps),
        Outcome::Published { target, commit } => display_published(target, commit),
    }
}
