//! Filesystem moves for the build output and the disposable checkout.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

/// Removes `path` recursively, doing nothing if it does not exist.
pub fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Moves the directory `src` to `dest`.
///
/// `dest` must not exist. A rename is tried first; when it fails (typically
/// across filesystems) the tree is copied and the source removed.
pub fn move_tree(src: &Path, dest: &Path) -> io::Result<()> {
    move_tree_with(src, dest, |from, to| fs::rename(from, to))
}

fn move_tree_with<F>(src: &Path, dest: &Path, rename: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    match rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(
                "rename {} -> {} failed ({}), copying instead",
                src.display(),
                dest.display(),
                e
            );
            copy_tree(src, dest)?;
            fs::remove_dir_all(src)
        }
    }
}

/// Copies a directory tree.
///
/// Symlinks are never followed: on Unix they are recreated as links with the
/// same target, elsewhere they are skipped.
pub fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;

    for entry in WalkDir::new(src) {
        let entry = entry?;
        let path = entry.path();

        let Ok(relative) = path.strip_prefix(src) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(path, &target)?;
        } else {
            fs::copy(path, &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, _target: &Path) -> io::Result<()> {
    debug!("skipping symlink {}", link.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_dir_if_exists(&dir.path().join("absent")).is_ok());
    }

    #[test]
    fn test_remove_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("latest");
        fs::create_dir_all(target.join("nested")).unwrap();
        fs::write(target.join("nested/stale.html"), "old").unwrap();

        remove_dir_if_exists(&target).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_move_tree_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("html");
        fs::create_dir_all(src.join("_static")).unwrap();
        fs::write(src.join("index.html"), "<html/>").unwrap();
        fs::write(src.join("_static/site.css"), "body{}").unwrap();

        let dest = dir.path().join("gh-pages/v1.0.0");
        move_tree(&src, &dest).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "<html/>");
        assert_eq!(
            fs::read_to_string(dest.join("_static/site.css")).unwrap(),
            "body{}"
        );
    }

    #[test]
    fn test_copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        fs::create_dir_all(src.join("b/c")).unwrap();
        fs::write(src.join("b/c/d.txt"), "deep").unwrap();

        let dest = dir.path().join("copy");
        copy_tree(&src, &dest).unwrap();

        assert!(src.exists());
        assert_eq!(fs::read_to_string(dest.join("b/c/d.txt")).unwrap(), "deep");
    }

    #[test]
    fn test_move_tree_falls_back_to_copy() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("html");
        fs::create_dir_all(src.join("_static")).unwrap();
        fs::write(src.join("index.html"), "<html/>").unwrap();
        fs::write(src.join("_static/site.css"), "body{}").unwrap();

        let dest = dir.path().join("gh-pages/latest");
        move_tree_with(&src, &dest, |_, _| {
            Err(io::Error::new(io::ErrorKind::Other, "cross-device link"))
        })
        .unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "<html/>");
        assert_eq!(
            fs::read_to_string(dest.join("_static/site.css")).unwrap(),
            "body{}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_keeps_symlinks_as_links() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("html");
        fs::create_dir_all(src.join("_static")).unwrap();
        fs::write(src.join("_static/site.css"), "body{}").unwrap();
        symlink(".", src.join("self")).unwrap();
        symlink("_static", src.join("static")).unwrap();

        let dest = dir.path().join("out");
        copy_tree(&src, &dest).unwrap();

        assert_eq!(fs::read_link(dest.join("self")).unwrap(), Path::new("."));
        assert_eq!(fs::read_link(dest.join("static")).unwrap(), Path::new("_static"));
        assert!(fs::symlink_metadata(dest.join("static"))
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(
            fs::read_to_string(dest.join("_static/site.css")).unwrap(),
            "body{}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_move_tree_fallback_survives_symlink_loop() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("html");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("index.html"), "<html/>").unwrap();
        symlink(".", src.join("self")).unwrap();

        let dest = dir.path().join("gh-pages/v1.0.0");
        move_tree_with(&src, &dest, |_, _| {
            Err(io::Error::new(io::ErrorKind::Other, "cross-device link"))
        })
        .unwrap();

        assert!(!src.exists());
        assert!(dest.join("index.html").is_file());
        assert_eq!(fs::read_link(dest.join("self")).unwrap(), Path::new("."));
    }
}
