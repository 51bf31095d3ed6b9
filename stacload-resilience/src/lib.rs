//! Resilience patterns for stacload
//!
//! Currently the graceful-then-forced stop used to end a load run.

pub mod shutdown;

// Re-export commonly used types
pub use shutdown::{ShutdownCoordinator, ShutdownError, ShutdownListener, ShutdownSignal, TaskGuard};
