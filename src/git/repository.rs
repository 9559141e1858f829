use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{
    Cred, CredentialType, FetchOptions, IndexAddOption, Oid, PushOptions, RemoteCallbacks,
    Repository, Signature,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{PublishError, Result};
use crate::git::{CommitIdentity, PagesBackend, PagesCheckout, RemoteSpec, StagedTree};

/// Credential attempts before giving up, libgit2 retries the callback forever.
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// Publishing-branch access through libgit2
#[derive(Debug, Default, Clone)]
pub struct Git2Backend {
    token: Option<String>,
}

impl Git2Backend {
    /// Create a backend authenticating with `token` over HTTPS when given.
    pub fn new(token: Option<String>) -> Self {
        Git2Backend { token }
    }
}

impl PagesBackend for Git2Backend {
    type Checkout = Git2Checkout;

    #[instrument(skip(self, remote), fields(branch = %remote.branch), level = "debug")]
    fn checkout(&self, remote: &RemoteSpec, dest: &Path) -> Result<Git2Checkout> {
        info!(
            "cloning branch '{}' into {}",
            remote.branch,
            dest.display()
        );

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(self.token.as_deref()));

        let remote_name = remote.name.clone();
        // Only the publishing branch is fetched, never the source history.
        let refspec = format!(
            "+refs/heads/{branch}:refs/remotes/{name}/{branch}",
            branch = remote.branch,
            name = remote.name
        );
        let repo = RepoBuilder::new()
            .branch(&remote.branch)
            .fetch_options(fetch_options)
            .remote_create(move |repo, _name, url| {
                repo.remote_with_fetch(&remote_name, url, &refspec)
            })
            .clone(&remote.url, dest)
            .map_err(|e| {
                PublishError::remote(format!(
                    "Cannot clone branch '{}' from {}: {}",
                    remote.branch,
                    redact(&remote.url),
                    e
                ))
            })?;

        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dest.to_path_buf());

        Ok(Git2Checkout {
            repo,
            workdir,
            remote: remote.clone(),
            token: self.token.clone(),
        })
    }
}

/// Working tree of the publishing branch backed by a git2 repository
pub struct Git2Checkout {
    repo: Repository,
    workdir: PathBuf,
    remote: RemoteSpec,
    token: Option<String>,
}

impl PagesCheckout for Git2Checkout {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn stage_all(&self) -> Result<StagedTree> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        // add_all never drops entries whose files vanished.
        index.update_all(["*"], None)?;
        index.write()?;

        let tree = index.write_tree()?;
        let head_tree = self.repo.head()?.peel_to_tree()?.id();
        debug!("staged tree {} (head tree {})", tree, head_tree);

        Ok(StagedTree {
            tree,
            unchanged: tree == head_tree,
        })
    }

    fn commit(
        &self,
        staged: &StagedTree,
        identity: &CommitIdentity,
        message: &str,
    ) -> Result<Oid> {
        let signature = Signature::now(identity.name, identity.email)?;
        let tree = self.repo.find_tree(staged.tree)?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        info!("created commit {}", oid);

        Ok(oid)
    }

    #[instrument(skip(self), fields(branch = %self.remote.branch), level = "debug")]
    fn push(&self) -> Result<()> {
        let mut remote = self.repo.find_remote(&self.remote.name).map_err(|e| {
            PublishError::remote(format!(
                "Cannot find remote '{}': {}",
                self.remote.name, e
            ))
        })?;

        let mut callbacks = remote_callbacks(self.token.as_deref());
        // A rejected ref does not fail push() itself, only this callback sees it.
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                warn!("remote rejected {}: {}", refname, status);
                Err(git2::Error::from_str(&format!(
                    "Push rejected for {}: {}",
                    refname, status
                )))
            }
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!(
            "refs/heads/{branch}:refs/heads/{branch}",
            branch = self.remote.branch
        );
        info!("pushing {} to {}", refspec, redact(&self.remote.url));

        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    PublishError::remote(format!("Network error during push: {}", e))
                } else {
                    PublishError::remote(format!(
                        "Failed to push branch '{}': {}",
                        self.remote.branch, e
                    ))
                }
            })
    }
}

/// Credentials: token over HTTPS, then SSH keys, then the SSH agent, then
/// whatever libgit2 finds by default.
fn remote_callbacks(token: Option<&str>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token {
                return Cred::userpass_plaintext("x-access-token", token);
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            if let Some(ssh_dir) = dirs::home_dir().map(|home| home.join(".ssh")) {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = ssh_dir.join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        Cred::default()
    });

    callbacks
}

/// Strips userinfo from a URL before it reaches logs or error messages.
fn redact(url: &str) -> String {
    match (url.find("://"), url.find('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_token() {
        assert_eq!(
            redact("https://secret@github.com/owner/repo.git"),
            "https://***@github.com/owner/repo.git"
        );
    }

    #[test]
    fn test_redact_leaves_plain_urls() {
        assert_eq!(
            redact("https://github.com/owner/repo.git"),
            "https://github.com/owner/repo.git"
        );
        assert_eq!(redact("/tmp/remote.git"), "/tmp/remote.git");
    }

    #[test]
    fn test_clone_missing_remote_fails() {
        let dir = tempfile::tempdir().unwrap();
        let remote = RemoteSpec {
            name: "origin".to_string(),
            url: dir.path().join("absent.git").to_string_lossy().into_owned(),
            branch: "gh-pages".to_string(),
        };

        let result = Git2Backend::default().checkout(&remote, &dir.path().join("checkout"));
        match result {
            Err(err) => assert!(err.to_string().contains("Cannot clone branch 'gh-pages'")),
            Ok(_) => panic!("clone of a missing remote should fail"),
        }
    }

    #[test]
    fn test_checkout_fetches_only_the_publishing_branch() {
        let dir = tempfile::tempdir().unwrap();
        let remote_path = dir.path().join("remote.git");
        let bare = Repository::init_bare(&remote_path).unwrap();

        let sig = Signature::now("Seed", "seed@example.com").unwrap();
        for (branch, file) in [("master", "README"), ("gh-pages", "index.html")] {
            let mut builder = bare.treebuilder(None).unwrap();
            let blob = bare.blob(b"content").unwrap();
            builder.insert(file, blob, 0o100644).unwrap();
            let tree = bare.find_tree(builder.write().unwrap()).unwrap();
            bare.commit(
                Some(format!("refs/heads/{}", branch).as_str()),
                &sig,
                &sig,
                "seed",
                &tree,
                &[],
            )
            .unwrap();
        }
        bare.set_head("refs/heads/master").unwrap();

        let remote = RemoteSpec {
            name: "origin".to_string(),
            url: remote_path.to_string_lossy().into_owned(),
            branch: "gh-pages".to_string(),
        };
        let checkout = Git2Backend::default()
            .checkout(&remote, &dir.path().join("checkout"))
            .unwrap();

        assert!(checkout.workdir().join("index.html").is_file());
        assert!(!checkout.workdir().join("README").exists());
        assert!(checkout
            .repo
            .find_reference("refs/remotes/origin/gh-pages")
            .is_ok());
        assert!(checkout
            .repo
            .find_reference("refs/remotes/origin/master")
            .is_err());
    }
}
