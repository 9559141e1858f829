//! Git operations on the publishing branch
//!
//! The workflow only needs four things from Git: a fresh checkout of the
//! publishing branch, staging of everything in its working tree, a commit,
//! and a push back to the same branch. They are expressed as two traits so
//! the workflow can be driven against a recording mock in tests.
//!
//! - [repository::Git2Backend]: real implementation using the `git2` crate
//! - [mock::MockBackend]: records calls without touching any repository
//!
//! # Usage
//!
//! ```rust
//! # use docs_publish::git::{PagesBackend, PagesCheckout, RemoteSpec, COMMIT_IDENTITY, COMMIT_MESSAGE};
//! # use std::path::Path;
//! # fn example<B: PagesBackend>(backend: &B, remote: &RemoteSpec) -> docs_publish::Result<()> {
//! let checkout = backend.checkout(remote, Path::new("gh-pages"))?;
//! let staged = checkout.stage_all()?;
//! if !staged.unchanged {
//!     checkout.commit(&staged, &COMMIT_IDENTITY, COMMIT_MESSAGE)?;
//!     checkout.push()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockBackend;
pub use repository::Git2Backend;

use std::path::Path;

use git2::Oid;

use crate::error::Result;

/// Author and committer of every documentation commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: &'static str,
    pub email: &'static str,
}

pub const COMMIT_IDENTITY: CommitIdentity = CommitIdentity {
    name: "docs-publish",
    email: "docs-publish@users.noreply.github.com",
};

/// `[ci skip]` keeps the push from triggering another CI run.
pub const COMMIT_MESSAGE: &str = "Automated documentation update\n\n[ci skip]";

/// Where the publishing branch lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    /// Remote name used inside the checkout (e.g. "origin")
    pub name: String,
    /// Clone and push URL
    pub url: String,
    /// Publishing branch (e.g. "gh-pages")
    pub branch: String,
}

/// Result of staging the whole working tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedTree {
    /// Tree written from the index
    pub tree: Oid,
    /// True when `tree` equals the tree of the branch's current commit
    pub unchanged: bool,
}

/// Produces fresh checkouts of the publishing branch
pub trait PagesBackend {
    type Checkout: PagesCheckout;

    /// Check out `remote.branch` from `remote.url` into `dest`.
    ///
    /// `dest` must not exist or be empty.
    ///
    /// # Errors
    /// * `PublishError::Remote` if the branch cannot be cloned
    fn checkout(&self, remote: &RemoteSpec, dest: &Path) -> Result<Self::Checkout>;
}

/// A checked-out publishing branch
pub trait PagesCheckout {
    /// Root of the working tree
    fn workdir(&self) -> &Path;

    /// Stage additions, modifications and deletions of the whole tree and
    /// compare the result with the current commit.
    fn stage_all(&self) -> Result<StagedTree>;

    /// Commit a staged tree on top of the branch head.
    ///
    /// # Returns
    /// * `Ok(Oid)` - Id of the new commit
    fn commit(&self, staged: &StagedTree, identity: &CommitIdentity, message: &str)
        -> Result<Oid>;

    /// Push the branch head to the remote branch of the same name.
    ///
    /// # Errors
    /// * `PublishError::Remote` on network, authentication or rejection errors
    fn push(&self) -> Result<()>;
}
