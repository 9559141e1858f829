use std::path::Path;
use std::process::Command;

use tracing::{debug, info, instrument};

use crate::config::CommandStep;
use crate::error::{PublishError, Result};

/// Runs one external command of the documentation build
pub trait CommandRunner {
    /// Run `step` inside `cwd`, failing on any non-zero exit status.
    fn run(&self, step: &CommandStep, cwd: &Path) -> Result<()>;
}

/// Executes generator steps as child processes
///
/// Output is inherited so the generator's own logs land in the CI job log.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    /// Execute a generator step
    ///
    /// # Returns
    /// * `Ok(())` if the command exits with status 0
    /// * `Err(PublishError::Spawn)` if the program cannot be started
    /// * `Err(PublishError::CommandFailed)` on any other exit status
    #[instrument(skip(self, step), fields(step = %step), level = "debug")]
    fn run(&self, step: &CommandStep, cwd: &Path) -> Result<()> {
        info!("running {} in {}", step, cwd.display());

        let status = Command::new(&step.program)
            .args(&step.args)
            .current_dir(cwd)
            .status()
            .map_err(|source| PublishError::Spawn {
                program: step.program.clone(),
                source,
            })?;

        debug!("{} exited with {}", step.program, status);

        if !status.success() {
            return Err(PublishError::CommandFailed {
                program: step.program.clone(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// Runs every step in order, stopping at the first failure.
pub fn run_steps<R: CommandRunner + ?Sized>(
    runner: &R,
    steps: &[CommandStep],
    cwd: &Path,
) -> Result<()> {
    for step in steps {
        runner.run(step, cwd)?;
    }
    Ok(())
}
