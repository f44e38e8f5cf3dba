//! Command handlers

use std::path::PathBuf;

use anyhow::Result;
use bowser_core::{markers, watch, Error, WatchOutcome, WatchStrategy};
use clap::ArgMatches;

use super::build_cli;

/// Parse the command line and run the selected command.
pub async fn run_cli() -> Result<()> {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("watch", watch_matches)) => {
            handle_watch(matches.get_flag("debug"), watch_matches).await
        }
        _ => Err(Error::invalid_config("unknown command").into()),
    }
}

async fn handle_watch(debug: bool, matches: &ArgMatches) -> Result<()> {
    let config = bowser_core::load_app_configuration()?;
    init_tracing(debug || config.verbose);

    let root = matches
        .get_one::<String>("dir")
        .map(PathBuf::from)
        .ok_or_else(|| Error::invalid_config("missing watch directory"))?;
    if !root.is_dir() {
        return Err(Error::invalid_config(format!(
            "{} is not a directory",
            root.display()
        ))
        .into());
    }

    let strategy = parse_strategy(&root, matches)?;
    let abort_marker = matches
        .get_one::<String>("abort-marker")
        .map_or_else(|| root.join(markers::ABORT), PathBuf::from);
    let dry_run = matches.get_flag("dry-run");

    let backends = bowser_core::provide_backends(&root, &config, dry_run)?;
    if backends.is_empty() {
        tracing::warn!("No backends configured; ready subtrees will only be marked complete.");
    }
    if dry_run {
        tracing::info!("Dry run: uploads go to an in-memory store.");
    }

    let interrupt = bowser_core::interrupt_channel().await?;
    let outcome = watch::execute(&root, &backends, strategy, abort_marker, interrupt).await?;

    match outcome {
        WatchOutcome::Completed => tracing::info!("Watch completed."),
        WatchOutcome::Preempted => tracing::warn!("Watch preempted by abort marker."),
        WatchOutcome::Interrupted => tracing::info!("Watch interrupted."),
    }
    Ok(())
}

fn parse_strategy(root: &std::path::Path, matches: &ArgMatches) -> Result<WatchStrategy> {
    let strategy = matches
        .get_one::<String>("strategy")
        .map_or("sentinel", String::as_str);
    match strategy {
        "count" => {
            let limit = matches
                .get_one::<u32>("count")
                .copied()
                .ok_or_else(|| Error::invalid_config("--strategy count requires --count N"))?;
            if limit == 0 {
                return Err(Error::invalid_config("--count must be positive").into());
            }
            Ok(WatchStrategy::count(limit))
        }
        _ => {
            if matches.get_one::<u32>("count").is_some() {
                return Err(
                    Error::invalid_config("--count only applies to --strategy count").into(),
                );
            }
            Ok(WatchStrategy::sentinel(root))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
