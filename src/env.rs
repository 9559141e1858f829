//! CI environment inputs.
//!
//! Every variable has a provider-neutral name and falls back to the Travis CI
//! name when unset, so the same binary runs unchanged on Travis and on any CI
//! that exports the neutral names.

use std::path::PathBuf;

use crate::error::{PublishError, Result};

pub const REPO_SLUG: (&str, &str) = ("REPO_SLUG", "TRAVIS_REPO_SLUG");
pub const BUILD_DIR: (&str, &str) = ("BUILD_DIR", "TRAVIS_BUILD_DIR");
pub const TAG: (&str, &str) = ("TAG", "TRAVIS_TAG");
pub const BRANCH: (&str, &str) = ("BRANCH", "TRAVIS_BRANCH");
pub const IS_PULL_REQUEST: (&str, &str) = ("IS_PULL_REQUEST", "TRAVIS_PULL_REQUEST");

/// Values the workflow reads from the CI environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiEnvironment {
    /// `owner/name` of the source repository.
    pub repo_slug: Option<String>,
    /// Root of the checkout the generator runs in.
    pub build_dir: PathBuf,
    /// Release tag, `None` when not a tag build.
    pub tag: Option<String>,
    /// Branch being built.
    pub branch: Option<String>,
    pub is_pull_request: bool,
}

impl CiEnvironment {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the environment from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. A missing build directory defaults to the
    /// current directory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |(name, fallback): (&str, &str)| {
            non_empty(lookup(name)).or_else(|| non_empty(lookup(fallback)))
        };

        let build_dir = match read(BUILD_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(|e| {
                PublishError::environment(format!("Cannot determine current directory: {}", e))
            })?,
        };

        Ok(CiEnvironment {
            repo_slug: read(REPO_SLUG),
            build_dir,
            tag: read(TAG),
            branch: read(BRANCH),
            is_pull_request: read(IS_PULL_REQUEST)
                .map(|value| parse_pull_request(&value))
                .unwrap_or(false),
        })
    }

    /// Repository slug, required once the workflow decides to publish.
    pub fn require_slug(&self) -> Result<&str> {
        self.repo_slug.as_deref().ok_or_else(|| {
            PublishError::environment(format!(
                "{} (or {}) must be set to publish",
                REPO_SLUG.0, REPO_SLUG.1
            ))
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Interprets a pull-request flag.
///
/// Only explicit negatives mean "not a pull request"; Travis exports the PR
/// number here, so anything else counts as one.
pub fn parse_pull_request(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "no"
    )
}
