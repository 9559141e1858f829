use std::fmt;

use crate::domain::PublishTarget;

/// Reasons the workflow stops early without publishing.
/// These are not errors: the process still exits successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Pull-request builds never publish
    PullRequest,
    /// Branch is not the default branch and no tag is set
    UnpublishedBranch { branch: Option<String> },
    /// Tag does not match the configured tag pattern
    TagFiltered { tag: String, pattern: String },
    /// Published tree already matches the new build output
    NoChanges { target: PublishTarget },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PullRequest => {
                write!(f, "Pull request build, documentation is not published")
            }
            SkipReason::UnpublishedBranch { branch } => match branch {
                Some(branch) => write!(
                    f,
                    "Branch '{}' is not published and no tag is set, nothing to do",
                    branch
                ),
                None => write!(f, "No branch or tag set, nothing to do"),
            },
            SkipReason::TagFiltered { tag, pattern } => {
                write!(f, "Tag '{}' does not match pattern '{}'", tag, pattern)
            }
            SkipReason::NoChanges { target } => {
                write!(f, "No changes to publish in '{}'", target.dir_name())
            }
        }
    }
}
