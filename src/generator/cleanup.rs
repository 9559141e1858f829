use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PublishError, Result};

/// Removes every entry of `output` matching one of `patterns`.
///
/// Patterns are relative to `output`. Directories are removed recursively.
/// Returns the removed paths in match order.
pub fn remove_matching(output: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&output.to_string_lossy());
    let mut removed = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", base, pattern);
        let paths = glob::glob(&full).map_err(|e| {
            PublishError::config(format!("cleanup pattern '{}' is invalid: {}", pattern, e))
        })?;

        for entry in paths {
            let path = entry.map_err(|e| PublishError::Io(e.into()))?;
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            debug!("removed vendored asset {}", path.display());
            removed.push(path);
        }
    }

    Ok(removed)
}
