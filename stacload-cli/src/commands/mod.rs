//! CLI command implementations

pub mod config;
pub mod ingest;
pub mod run;
pub mod run_once;
pub mod scenarios;

pub use config::*;
pub use ingest::*;
pub use run::*;
pub use run_once::*;
pub use scenarios::*;
