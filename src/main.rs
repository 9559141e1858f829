use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docs_publish::cli::{PublishWorkflow, WorkflowOptions};
use docs_publish::config;
use docs_publish::env::CiEnvironment;
use docs_publish::generator::SystemRunner;
use docs_publish::git::Git2Backend;
use docs_publish::{ui, PublishError};

#[derive(clap::Parser)]
#[command(
    name = "docs-publish",
    about = "Publish generated documentation to a gh-pages branch from CI",
    version
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Publish the existing build output without running the generator")]
    skip_build: bool,

    #[arg(long, value_name = "path", help = "Override the BUILD_DIR environment variable")]
    build_dir: Option<PathBuf>,

    #[arg(long, help = "Print the effective configuration and exit")]
    print_config: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(err) = run(Args::parse()) {
        debug!("{err:?}");
        ui::display_error(&format!("{err:#}"));
        let code = err
            .downcast_ref::<PublishError>()
            .map_or(1, PublishError::exit_code);
        exit(code);
    }

    exit(0)
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut env = CiEnvironment::from_env()?;
    if let Some(build_dir) = args.build_dir {
        env.build_dir = build_dir;
    }

    let token = std::env::var(&config.remote.token_env)
        .ok()
        .filter(|t| !t.is_empty());
    let options = WorkflowOptions {
        dry_run: args.dry_run,
        skip_build: args.skip_build,
    };

    let workflow = PublishWorkflow::new(
        &config,
        &env,
        Git2Backend::new(token),
        SystemRunner,
        options,
    );
    let outcome = workflow.run()?;

    let steps: Vec<String> = config
        .generator
        .steps
        .iter()
        .map(ToString::to_string)
        .collect();
    ui::report_outcome(&outcome, &steps);

    Ok(())
}
