pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod env;
pub mod error;
pub mod fsops;
pub mod generator;
pub mod git;
pub mod ui;

pub use error::{PublishError, Result};
