//! Load run orchestration

use crate::catalog::ScenarioCatalog;
use crate::error::{ScenarioError, ScenarioResult};
use crate::executor::ScenarioExecutor;
use crate::fixtures::FixtureSet;
use crate::metrics::{MetricsCollector, MetricsReport, MetricsSink};
use crate::selector::ScenarioSelector;
use crate::tags::TagFilter;
use crate::user::{SimulatedUser, UserSummary};
use serde::Serialize;
use stacload_config::RunConfig;
use stacload_http::{HttpClient, HttpError};
use stacload_resilience::{ShutdownCoordinator, ShutdownError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Builds the HTTP client for user `n`
pub type ClientFactory =
    Arc<dyn Fn(usize) -> Result<Arc<dyn HttpClient>, HttpError> + Send + Sync>;

/// Factory handing every user the same client
pub fn shared_client(client: Arc<dyn HttpClient>) -> ClientFactory {
    Arc::new(move |_: usize| -> Result<Arc<dyn HttpClient>, HttpError> { Ok(client.clone()) })
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    /// The run ended on a stop request or the duration bound
    pub stopped_early: bool,
    pub users: Vec<UserSummary>,
    pub report: MetricsReport,
}

impl RunSummary {
    pub fn iterations(&self) -> u64 {
        self.users.iter().map(|u| u.iterations).sum()
    }

    pub fn transport_failures(&self) -> u64 {
        self.users.iter().map(|u| u.transport_failures).sum()
    }

    pub fn empty_dependencies(&self) -> u64 {
        self.users.iter().map(|u| u.empty_dependencies).sum()
    }
}

/// Drives `users` simulated users against one target
pub struct LoadRunner {
    config: RunConfig,
    catalog: ScenarioCatalog,
    fixtures: Arc<FixtureSet>,
    clients: ClientFactory,
    metrics: MetricsCollector,
    coordinator: Arc<ShutdownCoordinator>,
}

impl LoadRunner {
    pub fn new(
        config: RunConfig,
        catalog: ScenarioCatalog,
        fixtures: Arc<FixtureSet>,
        clients: ClientFactory,
    ) -> Self {
        let coordinator = Arc::new(ShutdownCoordinator::with_timeouts(
            config.shutdown_grace,
            Duration::from_millis(500),
        ));

        Self {
            config,
            catalog,
            fixtures,
            clients,
            metrics: MetricsCollector::new(),
            coordinator,
        }
    }

    /// Coordinator that stops this run; trigger it from outside to end early
    pub fn coordinator(&self) -> Arc<ShutdownCoordinator> {
        self.coordinator.clone()
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    pub async fn run(self) -> ScenarioResult<RunSummary> {
        let config = self.config;
        if config.users == 0 {
            return Err(ScenarioError::Config("users must be greater than 0".into()));
        }

        let catalog = self.catalog.with_weights(&config.weights)?;
        let filter = TagFilter::from(&config);
        let selector = Arc::new(ScenarioSelector::new(&catalog, &filter)?);

        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        info!(
            "Starting run: {} users over {:?}, {} scenarios eligible, seed {}",
            config.users,
            config.ramp_up,
            selector.eligible().len(),
            seed
        );

        let clients = (0..config.users)
            .map(|index| {
                (self.clients)(index).map_err(|e| {
                    ScenarioError::Config(format!("HTTP client for user {}: {}", index, e))
                })
            })
            .collect::<ScenarioResult<Vec<_>>>()?;

        let coordinator = self.coordinator;
        let metrics = self.metrics;
        let sink: Arc<dyn MetricsSink> = Arc::new(metrics.clone());
        let start = Instant::now();

        let deadline = config
            .duration
            .map(|duration| spawn_deadline(coordinator.clone(), duration));
        let reporter = spawn_progress_reporter(metrics.clone(), config.report_interval);

        let mut ramp_listener = coordinator.subscribe();
        let mut handles: Vec<JoinHandle<UserSummary>> = Vec::with_capacity(config.users);

        for (index, client) in clients.into_iter().enumerate() {
            let offset = config
                .ramp_up
                .mul_f64(index as f64 / config.users as f64);
            tokio::select! {
                _ = tokio::time::sleep_until(start + offset) => {}
                _ = ramp_listener.recv() => {
                    info!("Stop requested during ramp-up, {} users started", index);
                    break;
                }
            }

            let executor = ScenarioExecutor::new(client, sink.clone(), self.fixtures.clone());
            let user = SimulatedUser::new(
                index,
                selector.clone(),
                executor,
                seed.wrapping_add(index as u64),
            )
            .with_think_time(config.think_time)
            .with_iterations(config.iterations);

            let guard = coordinator.task_started();
            let listener = coordinator.subscribe();
            handles.push(tokio::spawn(async move {
                let _guard = guard;
                user.run(listener).await
            }));
        }

        let mut users = Vec::with_capacity(handles.len());
        for result in futures::future::join_all(handles).await {
            match result {
                Ok(summary) => users.push(summary),
                Err(e) => error!("User task failed: {}", e),
            }
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }
        reporter.abort();

        let stopped_early = coordinator.is_shutting_down();
        let report = metrics.report();
        info!(
            "Run finished: {} requests, {} failures, {:.1} req/s",
            report.total_requests, report.total_failures, report.requests_per_second
        );

        Ok(RunSummary {
            seed,
            stopped_early,
            users,
            report,
        })
    }
}

fn spawn_deadline(coordinator: Arc<ShutdownCoordinator>, duration: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        info!("Run duration of {:?} elapsed, stopping users", duration);
        match coordinator.shutdown().await {
            Ok(()) | Err(ShutdownError::AlreadyShuttingDown) => {}
            Err(e) => warn!("{}", e),
        }
    })
}

fn spawn_progress_reporter(metrics: MetricsCollector, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let (requests, failures) = metrics.totals();
            let elapsed = metrics.elapsed().as_secs_f64();
            info!(
                "{:.0}s elapsed: {} requests, {} failures, {:.1} req/s",
                elapsed,
                requests,
                failures,
                if elapsed > 0.0 {
                    requests as f64 / elapsed
                } else {
                    0.0
                }
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stacload_http::{HttpMethod, MockHttpClient};

    fn run_config(users: usize, iterations: Option<u64>) -> RunConfig {
        RunConfig {
            users,
            ramp_up: Duration::ZERO,
            iterations,
            seed: Some(42),
            ..Default::default()
        }
    }

    fn runner(config: RunConfig, client: &MockHttpClient) -> LoadRunner {
        LoadRunner::new(
            config,
            ScenarioCatalog::stac(),
            Arc::new(FixtureSet::embedded().unwrap()),
            shared_client(Arc::new(client.clone())),
        )
    }

    #[tokio::test]
    async fn test_no_eligible_scenario_fails_before_any_request() {
        let client = MockHttpClient::new();
        let mut config = run_config(3, Some(5));
        config.tags = vec!["nonexistent_tag".to_string()];

        let result = runner(config, &client).run().await;
        assert!(matches!(result, Err(ScenarioError::NoEligibleScenario(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_weight_override_is_fatal() {
        let client = MockHttpClient::new();
        let mut config = run_config(1, Some(1));
        config.weights.insert("bogus".to_string(), 1);

        let result = runner(config, &client).run().await;
        assert!(matches!(result, Err(ScenarioError::Config(_))));
    }

    #[tokio::test]
    async fn test_iterations_per_user() {
        let client = MockHttpClient::new();
        let mut config = run_config(3, Some(4));
        config.tags = vec!["root_catalog".to_string(), "all_collections".to_string()];

        let summary = runner(config, &client).run().await.unwrap();
        assert_eq!(summary.users.len(), 3);
        assert!(summary.users.iter().all(|u| u.iterations == 4));
        assert_eq!(summary.iterations(), 12);
        assert_eq!(summary.report.total_requests, 12);
        assert_eq!(client.call_count(), 12);
        assert!(!summary.stopped_early);
        assert_eq!(summary.seed, 42);
    }

    #[tokio::test]
    async fn test_weight_override_enables_create_item() {
        let client = MockHttpClient::new();
        let mut config = run_config(1, Some(3));
        config.tags = vec!["create_item".to_string()];
        config.weights.insert("create-item".to_string(), 1);

        let summary = runner(config, &client).run().await.unwrap();
        assert_eq!(summary.report.label("post-create-item").unwrap().requests, 3);
    }

    #[tokio::test]
    async fn test_duration_bounds_unlimited_run() {
        let client = MockHttpClient::new();
        let mut config = run_config(2, None);
        config.tags = vec!["root_catalog".to_string()];
        config.duration = Some(Duration::from_millis(200));
        config.think_time = stacload_config::ThinkTime::constant(Duration::from_millis(10));

        let summary = runner(config, &client).run().await.unwrap();
        assert!(summary.stopped_early);
        assert!(summary.iterations() > 0);
        assert!(summary.users.iter().all(|u| !u.aborted));
    }

    #[tokio::test]
    async fn test_external_stop_during_ramp_up() {
        let client = MockHttpClient::new().with_json(HttpMethod::Get, "/", json!({}));
        let mut config = run_config(10, None);
        config.tags = vec!["root_catalog".to_string()];
        config.ramp_up = Duration::from_secs(10);
        config.think_time = stacload_config::ThinkTime::constant(Duration::from_millis(10));

        let runner = runner(config, &client);
        let coordinator = runner.coordinator();
        let handle = tokio::spawn(runner.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        coordinator.shutdown().await.unwrap();

        let summary = handle.await.unwrap().unwrap();
        assert!(summary.stopped_early);
        // ten users over ten seconds: only the first one had started
        assert_eq!(summary.users.len(), 1);
    }

    #[tokio::test]
    async fn test_same_seed_same_scenarios() {
        let sequence = || async {
            let client = MockHttpClient::new();
            let config = run_config(1, Some(30));
            runner(config, &client).run().await.unwrap();
            client
                .calls()
                .into_iter()
                .map(|c| c.label)
                .collect::<Vec<_>>()
        };

        assert_eq!(sequence().await, sequence().await);
    }
}
