pub mod config;
pub mod models;
pub mod db;
pub mod pipeline;

pub use config::IngestConfig;
pub use pipeline::ingest::{run_ingest, IngestError, ReconciliationReport};
