//! Main workflow orchestration logic
//!
//! This module contains the publish workflow independent of argument parsing,
//! so it can be driven programmatically with any Git backend and command
//! runner.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::boundary::SkipReason;
use crate::config::Config;
use crate::domain::{decide, Decision, PublishTarget};
use crate::env::CiEnvironment;
use crate::error::{PublishError, Result};
use crate::fsops;
use crate::generator::{self, CommandRunner};
use crate::git::{
    PagesBackend, PagesCheckout, RemoteSpec, COMMIT_IDENTITY, COMMIT_MESSAGE,
};

/// Options for the publish workflow
///
/// Mirrors the CLI flags that change workflow behaviour, decoupled from clap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Decide and plan only: no build, no checkout, no push
    pub dry_run: bool,

    /// Publish the existing output tree without running the generator
    pub skip_build: bool,
}

/// Everything a publish run would touch, resolved up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub target: PublishTarget,
    pub remote: RemoteSpec,
    /// Directory the generator steps run in
    pub working_dir: PathBuf,
    /// Rendered HTML tree
    pub output_dir: PathBuf,
    /// Disposable checkout of the publishing branch
    pub checkout_dir: PathBuf,
    pub run_generator: bool,
}

impl Plan {
    /// Resolve paths and remote for a publish target.
    pub fn new(
        target: PublishTarget,
        env: &CiEnvironment,
        config: &Config,
        options: WorkflowOptions,
    ) -> Result<Self> {
        let slug = env.require_slug()?;

        Ok(Plan {
            target,
            remote: RemoteSpec {
                name: config.remote.name.clone(),
                url: config.remote.url_for(slug),
                branch: config.pages.branch.clone(),
            },
            working_dir: env.build_dir.join(&config.generator.working_dir),
            output_dir: env.build_dir.join(&config.generator.output_dir),
            checkout_dir: env.build_dir.join(&config.pages.checkout_dir),
            run_generator: !options.skip_build,
        })
    }
}

/// Result of a workflow run that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing was published, for a non-error reason
    Skipped(SkipReason),
    /// Dry run: what would have happened
    Planned(Plan),
    /// A commit was created and pushed
    Published { target: PublishTarget, commit: String },
}

/// Main publish workflow
///
/// Orchestrates the documentation publishing process:
/// 1. Decide whether this CI run publishes at all
/// 2. Run the documentation generator
/// 3. Strip vendored theme assets from the output
/// 4. Check out the publishing branch into a fresh directory
/// 5. Replace the destination directory with the output
/// 6. Stage, and commit and push when something changed
///
/// Every failure aborts the run immediately; there is no cleanup or retry.
pub struct PublishWorkflow<'a, B, R> {
    config: &'a Config,
    env: &'a CiEnvironment,
    backend: B,
    runner: R,
    options: WorkflowOptions,
}

impl<'a, B, R> PublishWorkflow<'a, B, R>
where
    B: PagesBackend,
    R: CommandRunner,
{
    pub fn new(
        config: &'a Config,
        env: &'a CiEnvironment,
        backend: B,
        runner: R,
        options: WorkflowOptions,
    ) -> Self {
        PublishWorkflow {
            config,
            env,
            backend,
            runner,
            options,
        }
    }

    /// Run the workflow to completion.
    ///
    /// # Returns
    /// * `Ok(Outcome)` - skipped, planned (dry run) or published
    /// * `Err` - the first failing step
    #[instrument(skip(self), level = "debug")]
    pub fn run(&self) -> Result<Outcome> {
        let target = match decide(self.env, self.config)? {
            Decision::Skip(reason) => {
                info!("skipping: {}", reason);
                return Ok(Outcome::Skipped(reason));
            }
            Decision::Publish(target) => target,
        };

        let plan = Plan::new(target, self.env, self.config, self.options)?;
        if self.options.dry_run {
            return Ok(Outcome::Planned(plan));
        }

        self.publish(plan)
    }

    fn publish(&self, plan: Plan) -> Result<Outcome> {
        if plan.run_generator {
            fs::create_dir_all(&plan.working_dir)?;
            generator::run_steps(
                &self.runner,
                &self.config.generator.steps,
                &plan.working_dir,
            )?;
        }

        if !plan.output_dir.is_dir() {
            return Err(PublishError::config(format!(
                "Build output {} does not exist",
                plan.output_dir.display()
            )));
        }

        let removed =
            generator::remove_matching(&plan.output_dir, &self.config.generator.cleanup)?;
        debug!("removed {} vendored asset paths", removed.len());

        // The checkout is disposable: never reuse state from an earlier run.
        fsops::remove_dir_if_exists(&plan.checkout_dir)?;
        let checkout = self.backend.checkout(&plan.remote, &plan.checkout_dir)?;

        let dest = checkout.workdir().join(plan.target.dir_name());
        fsops::remove_dir_if_exists(&dest)?;
        fsops::move_tree(&plan.output_dir, &dest)?;
        info!(
            "moved {} to {}",
            plan.output_dir.display(),
            dest.display()
        );

        if self.config.pages.nojekyll {
            fs::write(checkout.workdir().join(".nojekyll"), "")?;
        }

        let staged = checkout.stage_all()?;
        if staged.unchanged {
            return Ok(Outcome::Skipped(SkipReason::NoChanges {
                target: plan.target,
            }));
        }

        let commit = checkout.commit(&staged, &COMMIT_IDENTITY, COMMIT_MESSAGE)?;
        checkout.push()?;

        Ok(Outcome::Published {
            target: plan.target,
            commit: commit.to_string(),
        })
    }
}
