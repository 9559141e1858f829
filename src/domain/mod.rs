//! Domain logic - publish rules independent of git and process execution

pub mod decision;
pub mod target;

pub use decision::{decide, Decision};
pub use target::{resolve_target, PublishTarget};
