use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "clinical-ingest";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinical_ingest=info"
}

/// Per-user data directory, falling back to the working directory when the
/// platform has none.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join("records.db")
}

/// Inputs for one ingest run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Directory holding one CSV source per entity type.
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
}

impl IngestConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            database_path: default_database_path(),
        }
    }

    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }
}
