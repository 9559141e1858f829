use regex::Regex;

use crate::boundary::SkipReason;
use crate::config::Config;
use crate::domain::target::{resolve_target, PublishTarget};
use crate::env::CiEnvironment;
use crate::error::{PublishError, Result};

/// Outcome of the publish gate
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Skip(SkipReason),
    Publish(PublishTarget),
}

/// Decides whether this CI run publishes documentation, and where.
///
/// Pull requests never publish. Otherwise a run publishes when it builds the
/// default branch or carries a tag. Tags are further filtered by the optional
/// `pages.tag_pattern`.
pub fn decide(env: &CiEnvironment, config: &Config) -> Result<Decision> {
    if env.is_pull_request {
        return Ok(Decision::Skip(SkipReason::PullRequest));
    }

    let on_default_branch = env.branch.as_deref() == Some(config.default_branch.as_str());
    if !on_default_branch && env.tag.is_none() {
        return Ok(Decision::Skip(SkipReason::UnpublishedBranch {
            branch: env.branch.clone(),
        }));
    }

    if let (Some(tag), Some(pattern)) = (&env.tag, &config.pages.tag_pattern) {
        let re = Regex::new(pattern).map_err(|e| {
            PublishError::config(format!("pages.tag_pattern '{}' is invalid: {}", pattern, e))
        })?;
        if !re.is_match(tag) {
            return Ok(Decision::Skip(SkipReason::TagFiltered {
                tag: tag.clone(),
                pattern: pattern.clone(),
            }));
        }
    }

    let target = resolve_target(env.tag.as_deref(), env.branch.as_deref(), config)?;
    Ok(Decision::Publish(target))
}
