use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_monitor::adapters::messages::COMMAND_KEY;
use departure_monitor::board::render_board;
use departure_monitor::config::{AppConfig, config_path};
use departure_monitor::engine::{AggregateError, Aggregator};
use departure_monitor::source::SourcePath;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let path = config_path();
    let config = match AppConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let paths = match config.source_paths() {
        Ok(paths) => paths,
        Err(e) => {
            error!(error = %e, "failed to set up sources");
            return ExitCode::FAILURE;
        }
    };

    info!(
        config = %path.display(),
        sources = paths.len(),
        lines = config.lines,
        timezone = %config.timezone,
        "departure monitor starting"
    );

    let aggregator = Aggregator::new(config.engine.clone());
    let cycles = run(&aggregator, &paths, &config, tokio::signal::ctrl_c()).await;

    info!(cycles, "shutting down");
    ExitCode::SUCCESS
}

/// Aggregate and print the board every refresh interval until `shutdown`
/// completes, also when it completes in the middle of a cycle.
///
/// Returns the number of cycles that finished.
async fn run<S: Future>(
    aggregator: &Aggregator,
    paths: &[Arc<SourcePath>],
    config: &AppConfig,
    shutdown: S,
) -> usize {
    let mut interval = tokio::time::interval(config.refresh_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    // Last successfully rendered board, kept on screen when a cycle aborts
    let mut board: Option<String> = None;
    let mut cycles = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => return cycles,
        }

        let result = tokio::select! {
            result = aggregator.aggregate(paths, config.timezone, config.lines) => result,
            _ = &mut shutdown => return cycles,
        };
        cycles += 1;

        match result {
            Ok(aggregation) => {
                if let Some(command) = aggregation.side_data.get(COMMAND_KEY) {
                    info!(%command, "message server sent a command; commands are not executed");
                }
                let rendered = render_board(&aggregation, config.lines);
                println!("{rendered}");
                board = Some(rendered);
            }
            Err(e @ AggregateError::Aborted { .. }) => {
                warn!(error = %e, "aggregation aborted, keeping previous board");
                if let Some(previous) = &board {
                    println!("{previous}");
                }
            }
        }
    }
}
