//! Core scheduling for stacload
//!
//! This crate holds the scenario catalog, the weighted tag-filtered
//! selector, the executors for each STAC API scenario and the runner that
//! drives a population of simulated users, plus the sample data ingestion
//! that prepares a target API.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod fixtures;
pub mod geo;
pub mod ingest;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod selector;
pub mod sortby;
pub mod tags;
pub mod user;

// Re-export commonly used types at the crate root
pub use catalog::ScenarioCatalog;
pub use error::{ScenarioError, ScenarioResult};
pub use executor::{ScenarioExecutor, ScenarioReport};
pub use fixtures::{DirectoryFixtures, EmbeddedFixtures, FixtureLoader, FixtureSet};
pub use geo::{BBox, Point};
pub use ingest::{ingest_sample_data, IngestStatus, IngestSummary};
pub use metrics::{
    is_failure, LabelSummary, LatencyStats, MetricsCollector, MetricsReport, MetricsSink,
    RecordedOutcome,
};
pub use runner::{shared_client, ClientFactory, LoadRunner, RunSummary};
pub use scenario::{ScenarioDefinition, ScenarioKind};
pub use selector::{next_scenario, ScenarioSelector};
pub use sortby::{SortDirection, SortSpec};
pub use tags::TagFilter;
pub use user::{SimulatedUser, UserSummary};
