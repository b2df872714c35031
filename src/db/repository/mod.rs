//! Repository layer — entity-scoped database operations.
//!
//! Each entity module offers a natural-key lookup (`find_*_id`), an insert,
//! an in-place update of the mutable fields where the entity has any, and
//! read-back helpers.

mod diagnosis;
mod doctor;
mod lab_result;
mod medication;
mod observation;
mod patient;
mod visit;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use super::DatabaseError;
use crate::models::EntityType;

pub use diagnosis::*;
pub use doctor::*;
pub use lab_result::*;
pub use medication::*;
pub use observation::*;
pub use patient::*;
pub use visit::*;

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for timestamps. Fractional seconds are only written when non-zero,
/// so equal instants always produce equal text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_stored_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad stored date {s:?}: {e}")))
}

pub(crate) fn parse_stored_timestamp(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad stored timestamp {s:?}: {e}")))
}

fn table_name(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Patient => "patients",
        EntityType::Doctor => "doctors",
        EntityType::Visit => "visits",
        EntityType::Diagnosis => "diagnoses",
        EntityType::Medication => "medications",
        EntityType::LabResult => "lab_results",
        EntityType::Observation => "observations",
    }
}

/// Number of stored records of one entity type.
pub fn count_entities(conn: &Connection, entity: EntityType) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table_name(entity));
    let count = conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_patient(conn: &Connection) -> Patient {
        let patient = Patient {
            id: "pat-1".into(),
            name: "Ada Lovelace".into(),
            dob: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            gender: Some("Female".into()),
            contact: Some("555-0100".into()),
            insurance: None,
        };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn make_visit(conn: &Connection) -> Visit {
        let patient = make_patient(conn);
        let doctor = Doctor {
            id: "doc-1".into(),
            name: "Dr. Snow".into(),
            department: "Cardiology".into(),
        };
        insert_doctor(conn, &doctor).unwrap();
        let visit = Visit {
            id: "visit-1".into(),
            patient_id: patient.id,
            doctor_id: doctor.id,
            visit_date: ts("2024-03-01 09:30:00"),
            department: Some("Cardiology".into()),
            reason: None,
        };
        insert_visit(conn, &visit).unwrap();
        visit
    }

    #[test]
    fn patient_found_by_exact_name_and_dob() {
        let conn = test_db();
        let patient = make_patient(&conn);

        let found = find_patient_id(&conn, "Ada Lovelace", &patient.dob).unwrap();
        assert_eq!(found.as_deref(), Some("pat-1"));

        let other_dob = NaiveDate::from_ymd_opt(1815, 12, 11).unwrap();
        assert!(find_patient_id(&conn, "Ada Lovelace", &other_dob).unwrap().is_none());
        assert!(find_patient_id(&conn, "ada lovelace", &patient.dob).unwrap().is_none());
    }

    #[test]
    fn patient_update_leaves_natural_key_alone() {
        let conn = test_db();
        let mut patient = make_patient(&conn);
        patient.name = "Renamed".into();
        patient.contact = Some("555-0199".into());
        update_patient(&conn, &patient).unwrap();

        let stored = get_patient(&conn, "pat-1").unwrap().unwrap();
        assert_eq!(stored.name, "Ada Lovelace");
        assert_eq!(stored.contact.as_deref(), Some("555-0199"));
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let conn = test_db();
        let med = Medication {
            id: "nope".into(),
            visit_id: "visit-1".into(),
            drug_name: "Aspirin".into(),
            dosage: None,
            instructions: None,
        };
        let err = update_medication(&conn, &med).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn visit_requires_existing_parents() {
        let conn = test_db();
        let visit = Visit {
            id: "orphan".into(),
            patient_id: "missing".into(),
            doctor_id: "missing".into(),
            visit_date: ts("2024-03-01 09:30:00"),
            department: None,
            reason: None,
        };
        assert!(insert_visit(&conn, &visit).is_err());
        assert_eq!(count_entities(&conn, EntityType::Visit).unwrap(), 0);
    }

    #[test]
    fn visit_round_trips_timestamp() {
        let conn = test_db();
        let visit = make_visit(&conn);
        let found = find_visit_id(&conn, "pat-1", "doc-1", &visit.visit_date).unwrap();
        assert_eq!(found.as_deref(), Some("visit-1"));
        let stored = get_visit(&conn, "visit-1").unwrap().unwrap();
        assert_eq!(stored, visit);
    }

    #[test]
    fn undated_lab_matches_only_undated_lab() {
        let conn = test_db();
        make_visit(&conn);
        let lab = LabResult {
            id: "lab-1".into(),
            visit_id: "visit-1".into(),
            test_name: "HbA1c".into(),
            result_value: Some(6.1),
            unit: Some("%".into()),
            reference_range: None,
            test_date: None,
        };
        insert_lab_result(&conn, &lab).unwrap();

        let undated = find_lab_result_id(&conn, "visit-1", "HbA1c", None).unwrap();
        assert_eq!(undated.as_deref(), Some("lab-1"));
        let dated = ts("2024-03-01 00:00:00");
        assert!(find_lab_result_id(&conn, "visit-1", "HbA1c", Some(&dated))
            .unwrap()
            .is_none());
    }

    #[test]
    fn observation_keeps_null_vitals() {
        let conn = test_db();
        let visit = make_visit(&conn);
        let obs = Observation {
            id: "obs-1".into(),
            visit_id: visit.id.clone(),
            patient_id: visit.patient_id.clone(),
            doctor_id: visit.doctor_id.clone(),
            note_text: "Stable".into(),
            vitals: Vitals {
                bp_systolic: Some(120),
                heart_rate: None,
                ..Vitals::default()
            },
            created_at: ts("2024-03-01 10:00:00"),
        };
        insert_observation(&conn, &obs).unwrap();

        let stored = get_observation(&conn, "obs-1").unwrap().unwrap();
        assert_eq!(stored.vitals.bp_systolic, Some(120));
        assert_eq!(stored.vitals.heart_rate, None);
        let raw: Option<i64> = conn
            .query_row("SELECT heart_rate FROM observations WHERE id = 'obs-1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(raw, None);
    }

    #[test]
    fn diagnoses_listed_per_visit() {
        let conn = test_db();
        make_visit(&conn);
        for (id, text) in [("d-1", "Hypertension"), ("d-2", "Asthma")] {
            insert_diagnosis(&conn, &Diagnosis {
                id: id.into(),
                visit_id: "visit-1".into(),
                diagnosis: text.into(),
            })
            .unwrap();
        }
        let all = get_diagnoses_for_visit(&conn, "visit-1").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].diagnosis, "Asthma");
        assert!(find_diagnosis_id(&conn, "visit-1", "Asthma").unwrap().is_some());
    }

    #[test]
    fn fractional_seconds_survive_storage() {
        use chrono::Timelike;
        let ts = NaiveDateTime::parse_from_str("2024-03-01 10:00:00.250", "%Y-%m-%d %H:%M:%S%.f")
            .unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text, "2024-03-01 10:00:00.250");
        assert_eq!(parse_stored_timestamp(&text).unwrap(), ts);
        assert_eq!(format_timestamp(&ts.with_nanosecond(0).unwrap()), "2024-03-01 10:00:00");
    }
}
