use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use git2::Oid;

use crate::error::{PublishError, Result};
use crate::git::{CommitIdentity, PagesBackend, PagesCheckout, RemoteSpec, StagedTree};

/// Mock backend for testing without actual git operations
///
/// Every call is appended to a shared log so tests can assert on the exact
/// sequence of Git operations the workflow performed.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    calls: Arc<Mutex<Vec<String>>>,
    unchanged: bool,
    fail_push: bool,
}

impl MockBackend {
    /// Create a backend whose checkouts always report changes
    pub fn new() -> Self {
        Self::default()
    }

    /// Make staging report that nothing changed
    pub fn with_unchanged(mut self, unchanged: bool) -> Self {
        self.unchanged = unchanged;
        self
    }

    /// Make every push fail
    pub fn with_failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Calls recorded so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(calls: &Mutex<Vec<String>>, call: String) {
        calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl PagesBackend for MockBackend {
    type Checkout = MockCheckout;

    fn checkout(&self, remote: &RemoteSpec, dest: &Path) -> Result<MockCheckout> {
        Self::record(
            &self.calls,
            format!("checkout {} {}", remote.url, remote.branch),
        );
        fs::create_dir_all(dest)?;

        Ok(MockCheckout {
            workdir: dest.to_path_buf(),
            calls: Arc::clone(&self.calls),
            unchanged: self.unchanged,
            fail_push: self.fail_push,
        })
    }
}

/// Checkout handed out by [`MockBackend`], backed by a plain directory
#[derive(Debug)]
pub struct MockCheckout {
    workdir: PathBuf,
    calls: Arc<Mutex<Vec<String>>>,
    unchanged: bool,
    fail_push: bool,
}

impl PagesCheckout for MockCheckout {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn stage_all(&self) -> Result<StagedTree> {
        MockBackend::record(&self.calls, "stage_all".to_string());
        Ok(StagedTree {
            tree: Oid::zero(),
            unchanged: self.unchanged,
        })
    }

    fn commit(
        &self,
        _staged: &StagedTree,
        identity: &CommitIdentity,
        message: &str,
    ) -> Result<Oid> {
        let subject = message.lines().next().unwrap_or_default();
        MockBackend::record(
            &self.calls,
            format!("commit {} <{}> {}", identity.name, identity.email, subject),
        );
        Ok(Oid::from_bytes(&[7; 20])?)
    }

    fn push(&self) -> Result<()> {
        MockBackend::record(&self.calls, "push".to_string());
        if self.fail_push {
            return Err(PublishError::remote("Push failed: mock rejection"));
        }
        Ok(())
    }
}
