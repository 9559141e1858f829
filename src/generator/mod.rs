//! Documentation generator support
//!
//! - `executor`: runs the configured build steps as external processes
//! - `cleanup`: strips vendored theme assets from the rendered tree

pub mod cleanup;
pub mod executor;

pub use cleanup::remove_matching;
pub use executor::{run_steps, CommandRunner, SystemRunner};
