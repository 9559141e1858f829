use crate::config::{is_plain_dir_name, Config};
use crate::error::{PublishError, Result};

/// Destination of a publish run inside the publishing branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    /// Default-branch documentation, replaced on every run
    Latest { dir: String },
    /// Versioned snapshot for a release tag
    Tag { name: String },
}

impl PublishTarget {
    /// Subdirectory of the publishing branch receiving the build output
    pub fn dir_name(&self) -> &str {
        match self {
            PublishTarget::Latest { dir } => dir,
            PublishTarget::Tag { name } => name,
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, PublishTarget::Latest { .. })
    }
}

/// Picks the destination for a run that passed the publish gate.
///
/// A non-empty tag always wins; otherwise only the default branch maps to the
/// latest directory. Reaching the final arm means the caller gated the run
/// incorrectly, which is reported instead of silently publishing somewhere.
pub fn resolve_target(
    tag: Option<&str>,
    branch: Option<&str>,
    config: &Config,
) -> Result<PublishTarget> {
    match tag.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tag) => {
            validate_tag_dir(tag, config)?;
            Ok(PublishTarget::Tag {
                name: tag.to_string(),
            })
        }
        None if branch == Some(config.default_branch.as_str()) => Ok(PublishTarget::Latest {
            dir: config.pages.latest_dir.clone(),
        }),
        None => Err(PublishError::inconsistent(format!(
            "neither a tag is set nor is branch '{}' the default branch '{}'",
            branch.unwrap_or("<unset>"),
            config.default_branch
        ))),
    }
}

fn validate_tag_dir(tag: &str, config: &Config) -> Result<()> {
    if !is_plain_dir_name(tag) {
        return Err(PublishError::inconsistent(format!(
            "tag '{}' cannot be used as a directory name",
            tag
        )));
    }
    if tag == config.pages.latest_dir {
        return Err(PublishError::inconsistent(format!(
            "tag '{}' collides with the latest documentation directory",
            tag
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_wins() {
        let config = Config::default();
        let target = resolve_target(Some("v1.2.3"), Some("master"), &config).unwrap();
        assert_eq!(
            target,
            PublishTarget::Tag {
                name: "v1.2.3".to_string()
            }
        );
        assert_eq!(target.dir_name(), "v1.2.3");
        assert!(!target.is_latest());
    }

    #[test]
    fn test_default_branch_is_latest() {
        let config = Config::default();
        let target = resolve_target(None, Some("master"), &config).unwrap();
        assert_eq!(target.dir_name(), "latest");
        assert!(target.is_latest());
    }

    #[test]
    fn test_empty_tag_ignored() {
        let config = Config::default();
        let target = resolve_target(Some(""), Some("master"), &config).unwrap();
        assert!(target.is_latest());
    }

    #[test]
    fn test_custom_latest_dir() {
        let mut config = Config::default();
        config.pages.latest_dir = "dev".to_string();
        let target = resolve_target(None, Some("master"), &config).unwrap();
        assert_eq!(target.dir_name(), "dev");
    }

    #[test]
    fn test_other_branch_is_inconsistent() {
        let config = Config::default();
        let err = resolve_target(None, Some("feature/x"), &config).unwrap_err();
        assert!(matches!(err, PublishError::Inconsistent(_)));
        assert!(err.to_string().contains("feature/x"));
    }

    #[test]
    fn test_unset_branch_is_inconsistent() {
        let config = Config::default();
        assert!(resolve_target(None, None, &config).is_err());
    }

    #[test]
    fn test_tag_with_separator_rejected() {
        let config = Config::default();
        assert!(resolve_target(Some("release/1.0"), None, &config).is_err());
        assert!(resolve_target(Some(".."), None, &config).is_err());
    }

    #[test]
    fn test_tag_named_latest_rejected() {
        let config = Config::default();
        let err = resolve_target(Some("latest"), None, &config).unwrap_err();
        assert!(err.to_string().contains("collides"));
    }
}
