use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub id: String,
    pub visit_id: String,
    pub test_name: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    /// Part of the natural key. `None` only matches other undated results.
    pub test_date: Option<NaiveDateTime>,
}
