//! Graceful shutdown coordination
//!
//! A stop request is broadcast as `Graceful` first: listeners finish what
//! they are doing and exit. If they are not all gone when the grace period
//! runs out, `Forced` follows and in-flight work is dropped.

use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const RUNNING: u8 = 0;
const GRACEFUL: u8 = 1;
const FORCED: u8 = 2;

/// Shutdown signal types with escalating urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownSignal {
    /// Finish the current unit of work, then stop
    Graceful,
    /// Stop immediately, abandoning in-flight work
    Forced,
}

impl ShutdownSignal {
    fn from_state(state: u8) -> Option<Self> {
        match state {
            GRACEFUL => Some(ShutdownSignal::Graceful),
            FORCED => Some(ShutdownSignal::Forced),
            _ => None,
        }
    }

    fn state(self) -> u8 {
        match self {
            ShutdownSignal::Graceful => GRACEFUL,
            ShutdownSignal::Forced => FORCED,
        }
    }
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Graceful => write!(f, "graceful"),
            ShutdownSignal::Forced => write!(f, "forced"),
        }
    }
}

/// Graceful shutdown coordinator
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<ShutdownSignal>,
    state: Arc<AtomicU8>,
    active_tasks: Arc<AtomicU32>,
    graceful_timeout: Duration,
    forced_timeout: Duration,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator with default timeouts
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_millis(500))
    }

    /// Create a new shutdown coordinator with custom timeouts
    pub fn with_timeouts(graceful_timeout: Duration, forced_timeout: Duration) -> Self {
        let (sender, _) = broadcast::channel(16);

        Self {
            sender,
            state: Arc::new(AtomicU8::new(RUNNING)),
            active_tasks: Arc::new(AtomicU32::new(0)),
            graceful_timeout,
            forced_timeout,
        }
    }

    /// Subscribe to shutdown signals
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
            state: self.state.clone(),
            seen: RUNNING,
        }
    }

    /// Check if shutdown is in progress
    pub fn is_shutting_down(&self) -> bool {
        self.state.load(Ordering::SeqCst) != RUNNING
    }

    /// Register a running task; it counts as active until the guard drops
    pub fn task_started(&self) -> TaskGuard {
        self.active_tasks.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            active_tasks: self.active_tasks.clone(),
        }
    }

    /// Get current active task count
    pub fn active_task_count(&self) -> u32 {
        self.active_tasks.load(Ordering::SeqCst)
    }

    /// Initiate graceful shutdown, escalating to forced after the grace period
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        // Prevent multiple simultaneous shutdowns
        if self
            .state
            .compare_exchange(RUNNING, GRACEFUL, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ShutdownError::AlreadyShuttingDown);
        }

        info!(
            "Starting graceful shutdown ({} active tasks)",
            self.active_task_count()
        );
        self.broadcast(ShutdownSignal::Graceful);

        if self.wait_for_tasks(self.graceful_timeout).await {
            info!("Graceful shutdown completed successfully");
            return Ok(());
        }

        error!("Graceful shutdown timeout, forcing shutdown");
        self.state.store(FORCED, Ordering::SeqCst);
        self.broadcast(ShutdownSignal::Forced);

        if self.wait_for_tasks(self.forced_timeout).await {
            info!("Forced shutdown completed successfully");
            return Ok(());
        }

        let remaining_tasks = self.active_task_count();
        warn!(
            "Forced shutdown completed with {} tasks still active",
            remaining_tasks
        );
        Err(ShutdownError::TasksRemaining(remaining_tasks))
    }

    fn broadcast(&self, signal: ShutdownSignal) {
        // No receivers simply means nothing is left to stop
        if self.sender.send(signal).is_err() {
            debug!("No listeners for {} shutdown signal", signal);
        }
    }

    /// Wait for all tasks to complete within the given timeout
    async fn wait_for_tasks(&self, timeout_duration: Duration) -> bool {
        let start = tokio::time::Instant::now();

        loop {
            let active = self.active_task_count();
            if active == 0 {
                return true;
            }
            if start.elapsed() >= timeout_duration {
                return false;
            }

            // Adaptive sleep based on task count
            let sleep_duration = if active > 10 {
                Duration::from_millis(100)
            } else {
                Duration::from_millis(20)
            };

            tokio::time::sleep(sleep_duration).await;
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a task counted as active while alive
#[derive(Debug)]
pub struct TaskGuard {
    active_tasks: Arc<AtomicU32>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let _ = self
            .active_tasks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}

/// Receiving side of the coordinator.
///
/// Subscribing late is safe: a listener created after a signal was sent
/// still observes it.
#[derive(Debug)]
pub struct ShutdownListener {
    receiver: broadcast::Receiver<ShutdownSignal>,
    state: Arc<AtomicU8>,
    seen: u8,
}

impl ShutdownListener {
    /// Most urgent signal sent so far, if any
    pub fn current(&self) -> Option<ShutdownSignal> {
        ShutdownSignal::from_state(self.state.load(Ordering::SeqCst))
    }

    /// Wait for a signal more urgent than the last one returned
    pub async fn recv(&mut self) -> ShutdownSignal {
        loop {
            let state = self.state.load(Ordering::SeqCst);
            if state > self.seen {
                self.seen = state;
                if let Some(signal) = ShutdownSignal::from_state(state) {
                    return signal;
                }
            }

            match self.receiver.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Shutdown channel closed, treating as forced shutdown");
                    self.seen = ShutdownSignal::Forced.state();
                    return ShutdownSignal::Forced;
                }
            }
        }
    }
}

/// Shutdown error types
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// Shutdown already in progress
    #[error("Shutdown already in progress")]
    AlreadyShuttingDown,

    /// Tasks remaining after forced shutdown
    #[error("Forced shutdown completed with {0} tasks still active")]
    TasksRemaining(u32),
}
