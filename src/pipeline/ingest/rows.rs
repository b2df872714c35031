//! Validated per-entity rows.
//!
//! A [`Record`] from the reader becomes one of the typed rows below, or a
//! [`RowRejection`] when a required field is missing or a required date does
//! not parse. Foreign keys stay as legacy ids until [`StageRow::resolve`]
//! translates them.

use chrono::{NaiveDate, NaiveDateTime};

use super::identity::{IdentityResolver, Unresolved};
use super::parse::{optional_text, parse_date, parse_float, parse_int, parse_timestamp};
use super::reader::Record;
use super::upsert::Reconcilable;
use crate::models::*;

/// Why a row was dropped before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingField(&'static str),
    InvalidDate { field: &'static str, value: String },
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRejection::MissingField(field) => write!(f, "missing required field {field}"),
            RowRejection::InvalidDate { field, value } => {
                write!(f, "unparsable date in {field}: {value:?}")
            }
        }
    }
}

/// A typed row for one pipeline stage.
pub trait StageRow: Sized {
    type Target: Reconcilable;

    fn from_record(record: &Record) -> Result<Self, RowRejection>;

    /// Source-supplied id other stages may reference this row by.
    fn legacy_id(&self) -> Option<&str> {
        None
    }

    /// Translate legacy references into store ids.
    fn resolve(self, ids: &IdentityResolver) -> Result<Self::Target, Unresolved>;
}

fn required<'r>(record: &'r Record, field: &'static str) -> Result<&'r str, RowRejection> {
    record.field(field).ok_or(RowRejection::MissingField(field))
}

fn required_date(record: &Record, field: &'static str) -> Result<NaiveDate, RowRejection> {
    let value = required(record, field)?;
    parse_date(value).ok_or_else(|| RowRejection::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn required_timestamp(record: &Record, field: &'static str) -> Result<NaiveDateTime, RowRejection> {
    let value = required(record, field)?;
    parse_timestamp(value).ok_or_else(|| RowRejection::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn optional_timestamp(
    record: &Record,
    field: &'static str,
) -> Result<Option<NaiveDateTime>, RowRejection> {
    match record.field(field) {
        None => Ok(None),
        Some(value) => parse_timestamp(value)
            .map(Some)
            .ok_or_else(|| RowRejection::InvalidDate {
                field,
                value: value.to_string(),
            }),
    }
}

// ═══════════════════════════════════════════
// Independent entities
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow {
    pub legacy_id: Option<String>,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub insurance: Option<String>,
}

impl StageRow for PatientRow {
    type Target = Patient;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        Ok(Self {
            legacy_id: optional_text(record.get("patientId")),
            name: required(record, "name")?.to_string(),
            dob: required_date(record, "dob")?,
            gender: optional_text(record.get("gender")),
            contact: optional_text(record.get("contact")),
            insurance: optional_text(record.get("insurance")),
        })
    }

    fn legacy_id(&self) -> Option<&str> {
        self.legacy_id.as_deref()
    }

    fn resolve(self, _ids: &IdentityResolver) -> Result<Patient, Unresolved> {
        Ok(Patient {
            id: String::new(),
            name: self.name,
            dob: self.dob,
            gender: self.gender,
            contact: self.contact,
            insurance: self.insurance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorRow {
    pub legacy_id: Option<String>,
    pub name: String,
    pub department: String,
}

impl StageRow for DoctorRow {
    type Target = Doctor;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        Ok(Self {
            legacy_id: optional_text(record.get("doctorId")),
            name: required(record, "name")?.to_string(),
            department: required(record, "department")?.to_string(),
        })
    }

    fn legacy_id(&self) -> Option<&str> {
        self.legacy_id.as_deref()
    }

    fn resolve(self, _ids: &IdentityResolver) -> Result<Doctor, Unresolved> {
        Ok(Doctor {
            id: String::new(),
            name: self.name,
            department: self.department,
        })
    }
}

// ═══════════════════════════════════════════
// Visit (patient + doctor)
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct VisitRow {
    pub legacy_id: Option<String>,
    pub patient_ref: String,
    pub doctor_ref: String,
    pub visit_date: NaiveDateTime,
    pub department: Option<String>,
    pub reason: Option<String>,
}

impl StageRow for VisitRow {
    type Target = Visit;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        Ok(Self {
            legacy_id: optional_text(record.get("visitId")),
            patient_ref: record.get("patientId").to_string(),
            doctor_ref: record.get("doctorId").to_string(),
            visit_date: required_timestamp(record, "visitDate")?,
            department: optional_text(record.get("department")),
            reason: optional_text(record.get("reason")),
        })
    }

    fn legacy_id(&self) -> Option<&str> {
        self.legacy_id.as_deref()
    }

    fn resolve(self, ids: &IdentityResolver) -> Result<Visit, Unresolved> {
        Ok(Visit {
            id: String::new(),
            patient_id: ids.require(EntityType::Patient, &self.patient_ref)?,
            doctor_id: ids.require(EntityType::Doctor, &self.doctor_ref)?,
            visit_date: self.visit_date,
            department: self.department,
            reason: self.reason,
        })
    }
}

// ═══════════════════════════════════════════
// Visit children
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisRow {
    pub visit_ref: String,
    pub diagnosis: String,
}

impl StageRow for DiagnosisRow {
    type Target = Diagnosis;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        Ok(Self {
            visit_ref: record.get("visitId").to_string(),
            diagnosis: required(record, "diagnosis")?.to_string(),
        })
    }

    fn resolve(self, ids: &IdentityResolver) -> Result<Diagnosis, Unresolved> {
        Ok(Diagnosis {
            id: String::new(),
            visit_id: ids.require(EntityType::Visit, &self.visit_ref)?,
            diagnosis: self.diagnosis,
        })
    }
}

/// Primary and alternate source columns for the drug name.
pub const DRUG_NAME_COLUMNS: [&str; 2] = ["drugName", "drug"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationRow {
    pub visit_ref: String,
    pub drug_name: String,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
}

impl StageRow for MedicationRow {
    type Target = Medication;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        let drug_name = DRUG_NAME_COLUMNS
            .iter()
            .find_map(|col| record.field(col))
            .ok_or(RowRejection::MissingField(DRUG_NAME_COLUMNS[0]))?;
        Ok(Self {
            visit_ref: record.get("visitId").to_string(),
            drug_name: drug_name.to_string(),
            dosage: optional_text(record.get("dosage")),
            instructions: optional_text(record.get("instructions")),
        })
    }

    fn resolve(self, ids: &IdentityResolver) -> Result<Medication, Unresolved> {
        Ok(Medication {
            id: String::new(),
            visit_id: ids.require(EntityType::Visit, &self.visit_ref)?,
            drug_name: self.drug_name,
            dosage: self.dosage,
            instructions: self.instructions,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabResultRow {
    pub visit_ref: String,
    pub test_name: String,
    pub result_value: Option<f64>,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub test_date: Option<NaiveDateTime>,
}

impl StageRow for LabResultRow {
    type Target = LabResult;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        Ok(Self {
            visit_ref: record.get("visitId").to_string(),
            test_name: required(record, "testName")?.to_string(),
            result_value: parse_float(record.get("resultValue")),
            unit: optional_text(record.get("unit")),
            reference_range: optional_text(record.get("referenceRange")),
            test_date: optional_timestamp(record, "testDate")?,
        })
    }

    fn resolve(self, ids: &IdentityResolver) -> Result<LabResult, Unresolved> {
        Ok(LabResult {
            id: String::new(),
            visit_id: ids.require(EntityType::Visit, &self.visit_ref)?,
            test_name: self.test_name,
            result_value: self.result_value,
            unit: self.unit,
            reference_range: self.reference_range,
            test_date: self.test_date,
        })
    }
}

// ═══════════════════════════════════════════
// Observation (visit + patient + doctor)
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    /// Used verbatim as the store id if the observation is created.
    pub obs_id: Option<String>,
    pub visit_ref: String,
    pub patient_ref: String,
    pub doctor_ref: String,
    pub note_text: String,
    pub vitals: Vitals,
    pub created_at: NaiveDateTime,
}

impl StageRow for ObservationRow {
    type Target = Observation;

    fn from_record(record: &Record) -> Result<Self, RowRejection> {
        Ok(Self {
            obs_id: optional_text(record.get("obsId")),
            visit_ref: record.get("visitId").to_string(),
            patient_ref: record.get("patientId").to_string(),
            doctor_ref: record.get("doctorId").to_string(),
            note_text: record.get("noteText").to_string(),
            vitals: Vitals {
                bp_systolic: parse_int(record.get("bpSystolic")),
                bp_diastolic: parse_int(record.get("bpDiastolic")),
                heart_rate: parse_int(record.get("heartRate")),
                temperature_c: parse_float(record.get("temperatureC")),
                spo2: parse_int(record.get("spo2")),
                bmi: parse_float(record.get("bmi")),
            },
            created_at: required_timestamp(record, "createdAt")?,
        })
    }

    fn resolve(self, ids: &IdentityResolver) -> Result<Observation, Unresolved> {
        Ok(Observation {
            id: self.obs_id.unwrap_or_default(),
            visit_id: ids.require(EntityType::Visit, &self.visit_ref)?,
            patient_id: ids.require(EntityType::Patient, &self.patient_ref)?,
            doctor_id: ids.require(EntityType::Doctor, &self.doctor_ref)?,
            note_text: self.note_text,
            vitals: self.vitals,
            created_at: self.created_at,
        })
    }
}
