//! Guest Metrics - Repair Binary Entry Point
//!
//! Recomputes the metrics snapshot of every entity in the file store named by
//! `GUEST_METRICS_DATA_DIR`. Exits non-zero if any entity failed.

use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use guest_metrics::{EngineConfig, EngineResult, MetricsEngine};

fn main() -> EngineResult<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::from_env();
    info!(data_dir = %config.data_dir.display(), "opening visit store");

    let engine = MetricsEngine::open(config)?;
    let report = engine.recompute_all()?;

    for (entity_key, error) in &report.failures {
        warn!(entity_key = %entity_key, error = %error, "entity left stale");
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
