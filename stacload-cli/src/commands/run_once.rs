use crate::formatter;
use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stacload_config::StacLoadConfig;
use stacload_core::{
    FixtureSet, MetricsCollector, ScenarioCatalog, ScenarioError, ScenarioExecutor,
};
use stacload_http::{HttpConfig, HttpManager};
use std::sync::Arc;
use tracing::info;

/// Execute one named scenario once, including weight-0 ones, and print each
/// request it issued
pub async fn run_once_command(
    config: &StacLoadConfig,
    scenario: &str,
    seed: Option<u64>,
) -> Result<()> {
    let catalog = ScenarioCatalog::stac();
    let definition = catalog.get(scenario).ok_or_else(|| {
        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        anyhow!(
            "Unknown scenario: {}. Available scenarios: {}",
            scenario,
            names.join(", ")
        )
    })?;

    let fixtures = Arc::new(
        FixtureSet::from_config(&config.fixtures).context("Failed to load fixture documents")?,
    );
    let client = HttpManager::new(HttpConfig::from(config)).context("Failed to build HTTP client")?;
    let metrics = MetricsCollector::new();
    let executor = ScenarioExecutor::new(Arc::new(client), Arc::new(metrics.clone()), fixtures);

    let seed = seed.unwrap_or_else(rand::random::<u64>);
    info!("Running {} once with seed {}", definition.name, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    match executor.execute(definition, &mut rng).await {
        Ok(report) => {
            formatter::print_table(
                &["label", "status", "ms"],
                &formatter::outcome_rows(&report.outcomes),
            );
            formatter::print_success(&format!(
                "{} issued {} requests",
                report.scenario,
                report.request_count()
            ));
            Ok(())
        }
        Err(ScenarioError::EmptyDependency { scenario, reason }) => {
            print_recorded(&metrics);
            formatter::print_warning(&format!("{} skipped: {}", scenario, reason));
            Ok(())
        }
        Err(e) => {
            print_recorded(&metrics);
            Err(e).context(format!("Scenario {} failed", definition.name))
        }
    }
}

// The executor flushes outcomes to the sink even when it stops early.
fn print_recorded(metrics: &MetricsCollector) {
    let report = metrics.report();
    formatter::print_table(
        &["label", "requests", "failures", "mean ms", "p50 ms", "p95 ms", "p99 ms", "max ms"],
        &formatter::report_rows(&report),
    );
}
