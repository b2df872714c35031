//! Reconciliation ingest: imports one CSV source per entity type into the
//! store, resolving legacy identifiers across stages and upserting by
//! natural key so a run can be repeated safely.

pub mod identity;
pub mod orchestrator;
pub mod parse;
pub mod reader;
pub mod report;
pub mod rows;
pub mod upsert;

pub use identity::*;
pub use orchestrator::*;
pub use reader::*;
pub use report::*;
pub use rows::*;
pub use upsert::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Cannot read source {}: {source}", .path.display())]
    SourceAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
