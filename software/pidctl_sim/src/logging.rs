//! Per-run logging: a log file named after the scenario, plus optional terminal output

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::{Scenario, SimError};

/// Level filter used when neither the scenario nor `RUST_LOG` sets one
const DEFAULT_FILTER: &str = "info";

/// Keeps the background log writers alive.
/// Dropping it flushes anything still queued, so hold it until the run is done.
#[must_use = "logs are lost when the session is dropped"]
pub struct LogSession {
    log_path: PathBuf,
    _guards: Vec<WorkerGuard>,
}

impl LogSession {
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// `<op_dir>/logs/<scenario name>.log`
pub fn log_path(op_dir: &Path, scenario: &Scenario) -> PathBuf {
    op_dir.join("logs").join(format!("{}.log", scenario.name))
}

/// Install the process-wide subscriber for one scenario run.
///
/// The log file is truncated, so it only ever describes the latest run
/// of that scenario, like the CSV trace beside it. Terminal output can be
/// turned off for tests and batch runs.
///
/// The level filter is the scenario's `log_filter` if given,
/// then `RUST_LOG`, then `info`.
/// Fails with [`SimError::Logging`] if a global subscriber already exists.
pub fn init_logging(
    op_dir: &Path,
    scenario: &Scenario,
    terminal: bool,
) -> Result<LogSession, SimError> {
    if tracing::dispatcher::has_been_set() {
        return Err(SimError::Logging(
            "a global subscriber is already installed".into(),
        ));
    }

    let filter = match scenario.log_filter.as_deref() {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER)),
    }
    .map_err(|e| SimError::Logging(format!("bad log filter: {e}")))?;

    let log_path = log_path(op_dir, scenario);
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let (file_writer, file_guard) = tracing_appender::non_blocking(File::create(&log_path)?);
    let mut guards = vec![file_guard];

    let file_layer = fmt::layer()
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(file_writer)
        .with_ansi(false);

    let terminal_layer = terminal.then(|| {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(terminal_layer)
        .try_init()
        .map_err(|e| SimError::Logging(format!("unable to install subscriber: {e}")))?;

    info!(
        scenario = %scenario.name,
        steps = scenario.steps,
        controller = ?scenario.controller,
        plant = ?scenario.plant,
        "Logging scenario run"
    );

    Ok(LogSession {
        log_path,
        _guards: guards,
    })
}
