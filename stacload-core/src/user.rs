//! Simulated user control loop

use crate::error::ScenarioError;
use crate::executor::ScenarioExecutor;
use crate::selector::ScenarioSelector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use stacload_config::ThinkTime;
use stacload_resilience::{ShutdownListener, ShutdownSignal};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What one user did during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: usize,
    /// Scenario invocations that ran to an end (success or error)
    pub iterations: u64,
    pub completed: u64,
    pub transport_failures: u64,
    pub empty_dependencies: u64,
    /// An in-flight scenario was dropped by a forced stop
    pub aborted: bool,
}

impl UserSummary {
    fn new(user_id: usize) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// One virtual client: select, execute, think, repeat
pub struct SimulatedUser {
    id: usize,
    selector: Arc<ScenarioSelector>,
    executor: ScenarioExecutor,
    rng: StdRng,
    think_time: ThinkTime,
    iterations: Option<u64>,
}

impl SimulatedUser {
    pub fn new(
        id: usize,
        selector: Arc<ScenarioSelector>,
        executor: ScenarioExecutor,
        seed: u64,
    ) -> Self {
        Self {
            id,
            selector,
            executor,
            rng: StdRng::seed_from_u64(seed),
            think_time: ThinkTime::default(),
            iterations: None,
        }
    }

    pub fn with_think_time(mut self, think_time: ThinkTime) -> Self {
        self.think_time = think_time;
        self
    }

    /// Stop after this many invocations; unbounded when `None`
    pub fn with_iterations(mut self, iterations: Option<u64>) -> Self {
        self.iterations = iterations;
        self
    }

    /// Run until the iteration budget is used up or a stop signal arrives.
    ///
    /// On `Graceful` the in-flight scenario is allowed to finish; on `Forced`
    /// it is dropped without reporting.
    pub async fn run(mut self, mut shutdown: ShutdownListener) -> UserSummary {
        let mut summary = UserSummary::new(self.id);
        debug!("User {} started", self.id);

        loop {
            if self.iterations.is_some_and(|limit| summary.iterations >= limit) {
                break;
            }
            if shutdown.current().is_some() {
                break;
            }

            let mut stopping = false;
            let definition = self.selector.next(&mut self.rng);

            let result = {
                let execution = self.executor.execute(definition, &mut self.rng);
                tokio::pin!(execution);

                loop {
                    tokio::select! {
                        result = &mut execution => break Some(result),
                        signal = shutdown.recv() => match signal {
                            ShutdownSignal::Graceful => stopping = true,
                            ShutdownSignal::Forced => break None,
                        },
                    }
                }
            };

            let Some(result) = result else {
                debug!(
                    "User {} dropped scenario {} on forced stop",
                    self.id, definition.name
                );
                summary.aborted = true;
                break;
            };

            summary.iterations += 1;
            match result {
                Ok(_) => summary.completed += 1,
                Err(ScenarioError::EmptyDependency { scenario, reason }) => {
                    debug!("User {}: {} skipped: {}", self.id, scenario, reason);
                    summary.empty_dependencies += 1;
                }
                Err(e @ ScenarioError::Transport { .. }) => {
                    warn!("User {}: {}: {}", self.id, definition.name, e);
                    summary.transport_failures += 1;
                }
                Err(e) => warn!("User {}: {}: {}", self.id, definition.name, e),
            }

            if stopping {
                break;
            }

            if !self.think_time.is_zero() {
                let pause = self.think_pause();
                tokio::select! {
                    _ = tokio::time::sleep(pause) => {}
                    _ = shutdown.recv() => break,
                }
            }
        }

        debug!(
            "User {} finished after {} iterations",
            self.id, summary.iterations
        );
        summary
    }

    fn think_pause(&mut self) -> Duration {
        let min = self.think_time.min.as_millis() as u64;
        let max = self.think_time.max.as_millis() as u64;
        if max <= min {
            return self.think_time.min;
        }
        Duration::from_millis(self.rng.random_range(min..=max))
    }
}
