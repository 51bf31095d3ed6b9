use crate::cli::RunArgs;
use crate::formatter;
use anyhow::{Context, Result};
use stacload_config::StacLoadConfig;
use stacload_core::{
    ClientFactory, FixtureSet, LoadRunner, RunSummary, ScenarioCatalog, ScenarioError,
};
use stacload_http::{HttpClient, HttpConfig, HttpError, HttpManager};
use stacload_resilience::{ShutdownCoordinator, ShutdownError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Run a load test and print its report
pub async fn run_command(mut config: StacLoadConfig, args: &RunArgs) -> Result<()> {
    args.apply(&mut config);
    config
        .validate_all()
        .context("Invalid run configuration")?;

    let fixtures = Arc::new(
        FixtureSet::from_config(&config.fixtures).context("Failed to load fixture documents")?,
    );

    let http_config = HttpConfig::from(&config);
    info!("Load testing {}", http_config.base_url);
    let runner = LoadRunner::new(
        config.run.clone(),
        ScenarioCatalog::stac(),
        fixtures,
        http_clients(http_config),
    );

    let stop_on_ctrl_c = tokio::spawn(stop_on_ctrl_c(runner.coordinator()));
    let result = runner.run().await;
    stop_on_ctrl_c.abort();

    let summary = result.map_err(|e| {
        let context = failure_context(&e);
        anyhow::Error::new(e).context(context)
    })?;
    formatter::print_run_summary(&summary);

    if let Some(ref path) = args.report_json {
        write_report(&summary, path)?;
        formatter::print_info(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

// Configuration problems are reported as such, before any traffic was sent
fn failure_context(error: &ScenarioError) -> &'static str {
    if error.is_fatal() {
        "Load run could not start"
    } else {
        "Load run failed"
    }
}

/// One reqwest client per user
fn http_clients(config: HttpConfig) -> ClientFactory {
    Arc::new(move |_: usize| -> Result<Arc<dyn HttpClient>, HttpError> {
        let client: Arc<dyn HttpClient> = Arc::new(HttpManager::new(config.clone())?);
        Ok(client)
    })
}

async fn stop_on_ctrl_c(coordinator: Arc<ShutdownCoordinator>) {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        return;
    }

    info!("Ctrl+C received, letting users finish their current scenario");
    match coordinator.shutdown().await {
        Ok(()) | Err(ShutdownError::AlreadyShuttingDown) => {}
        Err(e) => warn!("{}", e),
    }
}

fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create report directory")?;
    }
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize report")?;
    fs::write(path, json).context(format!("Failed to write report to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacload_http::HttpError;

    #[test]
    fn test_startup_errors_are_reported_as_such() {
        let error = ScenarioError::NoEligibleScenario("include [nonexistent_tag]".into());
        assert_eq!(failure_context(&error), "Load run could not start");

        let error = ScenarioError::Config("unknown scenario 'nope'".into());
        assert_eq!(failure_context(&error), "Load run could not start");

        let error = ScenarioError::Transport {
            label: "get-landing".into(),
            source: HttpError::Connection("refused".into()),
        };
        assert_eq!(failure_context(&error), "Load run failed");
    }

    #[test]
    fn test_report_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let summary = RunSummary {
            seed: 3,
            stopped_early: false,
            users: Vec::new(),
            report: stacload_core::MetricsCollector::new().report(),
        };

        write_report(&summary, &path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["seed"], serde_json::json!(3));
    }
}
