use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Natural key: (name, dob). Mutable on re-ingest: gender, contact, insurance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub insurance: Option<String>,
}
