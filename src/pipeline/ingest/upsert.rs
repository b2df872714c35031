//! Natural-key create-or-update.
//!
//! The match-then-write sequence is not atomic against the store. Callers
//! must not run two upserts of the same entity type concurrently or rows
//! sharing a natural key can both miss and both insert.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::*;

/// A record the engine can match by natural key and then create or update.
pub trait Reconcilable {
    const ENTITY: EntityType;

    /// Store id of the record with the same natural key, if any.
    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError>;

    /// Empty until assigned. A non-empty value at create time is kept as is.
    fn id_mut(&mut self) -> &mut String;

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError>;

    /// Write the mutable fields onto the record named by the current id.
    /// Entities with no mutable fields leave the store untouched.
    fn apply_update(&self, _conn: &Connection) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: String,
    pub created: bool,
}

pub struct UpsertEngine<'c> {
    conn: &'c Connection,
}

impl<'c> UpsertEngine<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn upsert<R: Reconcilable>(&self, mut record: R) -> Result<UpsertOutcome, DatabaseError> {
        let outcome = match record.find_match(self.conn)? {
            Some(existing) => {
                *record.id_mut() = existing;
                record.apply_update(self.conn)?;
                UpsertOutcome {
                    id: std::mem::take(record.id_mut()),
                    created: false,
                }
            }
            None => {
                let id = record.id_mut();
                if id.is_empty() {
                    *id = Uuid::new_v4().to_string();
                }
                record.create(self.conn)?;
                UpsertOutcome {
                    id: std::mem::take(record.id_mut()),
                    created: true,
                }
            }
        };
        tracing::debug!(
            entity = R::ENTITY.as_str(),
            id = %outcome.id,
            created = outcome.created,
            "Upserted"
        );
        Ok(outcome)
    }
}

impl Reconcilable for Patient {
    const ENTITY: EntityType = EntityType::Patient;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_patient_id(conn, &self.name, &self.dob)
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::insert_patient(conn, self)
    }

    fn apply_update(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::update_patient(conn, self)
    }
}

impl Reconcilable for Doctor {
    const ENTITY: EntityType = EntityType::Doctor;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_doctor_id(conn, &self.name, &self.department)
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::insert_doctor(conn, self)
    }
}

impl Reconcilable for Visit {
    const ENTITY: EntityType = EntityType::Visit;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_visit_id(conn, &self.patient_id, &self.doctor_id, &self.visit_date)
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::insert_visit(conn, self)
    }

    fn apply_update(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::update_visit(conn, self)
    }
}

impl Reconcilable for Diagnosis {
    const ENTITY: EntityType = EntityType::Diagnosis;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_diagnosis_id(conn, &self.visit_id, &self.diagnosis)
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::insert_diagnosis(conn, self)
    }
}

impl Reconcilable for Medication {
    const ENTITY: EntityType = EntityType::Medication;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_medication_id(conn, &self.visit_id, &self.drug_name)
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::insert_medication(conn, self)
    }

    fn apply_update(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::update_medication(conn, self)
    }
}

impl Reconcilable for LabResult {
    const ENTITY: EntityType = EntityType::LabResult;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_lab_result_id(conn, &self.visit_id, &self.test_name, self.test_date.as_ref())
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::insert_lab_result(conn, self)
    }

    fn apply_update(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::update_lab_result(conn, self)
    }
}

impl Reconcilable for Observation {
    const ENTITY: EntityType = EntityType::Observation;

    fn find_match(&self, conn: &Connection) -> Result<Option<String>, DatabaseError> {
        repository::find_observation_id(conn, &self.visit_id, &self.note_text, &self.created_at)
    }

    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }

    /// A supplied id held by a record with a different natural key is refused.
    fn create(&self, conn: &Connection) -> Result<(), DatabaseError> {
        if repository::observation_id_exists(conn, &self.id)? {
            return Err(DatabaseError::IdConflict {
                entity_type: Self::ENTITY.as_str().into(),
                id: self.id.clone(),
            });
        }
        repository::insert_observation(conn, self)
    }

    fn apply_update(&self, conn: &Connection) -> Result<(), DatabaseError> {
        repository::update_observation_vitals(conn, &self.id, &self.vitals)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn patient(contact: &str) -> Patient {
        Patient {
            id: String::new(),
            name: "A".into(),
            dob: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: None,
            contact: Some(contact.into()),
            insurance: None,
        }
    }

    /// Seed a patient, doctor and visit; returns their ids in that order.
    fn seed_visit(engine: &UpsertEngine<'_>) -> (String, String, String) {
        let p = engine.upsert(patient("x")).unwrap().id;
        let d = engine
            .upsert(Doctor {
                id: String::new(),
                name: "B".into(),
                department: "Cardiology".into(),
            })
            .unwrap()
            .id;
        let v = engine
            .upsert(Visit {
                id: String::new(),
                patient_id: p.clone(),
                doctor_id: d.clone(),
                visit_date: ts("2024-03-01 09:00:00"),
                department: None,
                reason: None,
            })
            .unwrap()
            .id;
        (p, d, v)
    }

    #[test]
    fn second_upsert_matches_and_updates_contact() {
        let conn = open_memory_database().unwrap();
        let engine = UpsertEngine::new(&conn);

        let first = engine.upsert(patient("555-0100")).unwrap();
        assert!(first.created);
        assert!(Uuid::parse_str(&first.id).is_ok());

        let second = engine.upsert(patient("555-0199")).unwrap();
        assert!(!second.created);
        assert_eq!(second.id, first.id);

        let stored = repository::get_patient(&conn, &first.id).unwrap().unwrap();
        assert_eq!(stored.contact.as_deref(), Some("555-0199"));
        assert_eq!(repository::count_entities(&conn, EntityType::Patient).unwrap(), 1);
    }

    #[test]
    fn lab_one_day_apart_is_a_new_record() {
        let conn = open_memory_database().unwrap();
        let engine = UpsertEngine::new(&conn);
        let (_, _, visit_id) = seed_visit(&engine);

        let lab = |date: &str| LabResult {
            id: String::new(),
            visit_id: visit_id.clone(),
            test_name: "Glucose".into(),
            result_value: Some(5.4),
            unit: Some("mmol/L".into()),
            reference_range: None,
            test_date: Some(ts(date)),
        };
        assert!(engine.upsert(lab("2024-03-01 00:00:00")).unwrap().created);
        assert!(engine.upsert(lab("2024-03-02 00:00:00")).unwrap().created);
        assert!(!engine.upsert(lab("2024-03-02 00:00:00")).unwrap().created);
        assert_eq!(repository::count_entities(&conn, EntityType::LabResult).unwrap(), 2);
    }

    #[test]
    fn diagnosis_match_is_left_untouched() {
        let conn = open_memory_database().unwrap();
        let engine = UpsertEngine::new(&conn);
        let (_, _, visit_id) = seed_visit(&engine);

        let diag = || Diagnosis {
            id: String::new(),
            visit_id: visit_id.clone(),
            diagnosis: "Hypertension".into(),
        };
        let first = engine.upsert(diag()).unwrap();
        let second = engine.upsert(diag()).unwrap();
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn observation_keeps_supplied_id_and_updates_vitals() {
        let conn = open_memory_database().unwrap();
        let engine = UpsertEngine::new(&conn);
        let (p, d, v) = seed_visit(&engine);

        let obs = |heart_rate: Option<i64>| Observation {
            id: "obs-42".into(),
            visit_id: v.clone(),
            patient_id: p.clone(),
            doctor_id: d.clone(),
            note_text: "Follow-up".into(),
            vitals: Vitals {
                heart_rate,
                ..Vitals::default()
            },
            created_at: ts("2024-03-01 10:00:00"),
        };

        let created = engine.upsert(obs(None)).unwrap();
        assert_eq!(created, UpsertOutcome { id: "obs-42".into(), created: true });

        let updated = engine.upsert(obs(Some(64))).unwrap();
        assert_eq!(updated, UpsertOutcome { id: "obs-42".into(), created: false });
        let stored = repository::get_observation(&conn, "obs-42").unwrap().unwrap();
        assert_eq!(stored.vitals.heart_rate, Some(64));
    }

    #[test]
    fn supplied_id_is_ignored_when_matched() {
        let conn = open_memory_database().unwrap();
        let engine = UpsertEngine::new(&conn);
        let (p, d, v) = seed_visit(&engine);

        let mut obs = Observation {
            id: String::new(),
            visit_id: v,
            patient_id: p,
            doctor_id: d,
            note_text: "Note".into(),
            vitals: Vitals::default(),
            created_at: ts("2024-03-01 10:00:00"),
        };
        let first = engine.upsert(obs.clone()).unwrap();
        obs.id = "different".into();
        let second = engine.upsert(obs).unwrap();
        assert_eq!(second.id, first.id);
        assert!(!second.created);
    }

    #[test]
    fn observation_id_held_by_other_record_is_refused() {
        let conn = open_memory_database().unwrap();
        let engine = UpsertEngine::new(&conn);
        let (p, d, v) = seed_visit(&engine);

        let obs = |note: &str| Observation {
            id: "obs-7".into(),
            visit_id: v.clone(),
            patient_id: p.clone(),
            doctor_id: d.clone(),
            note_text: note.into(),
            vitals: Vitals::default(),
            created_at: ts("2024-03-01 10:00:00"),
        };
        engine.upsert(obs("First")).unwrap();

        let err = engine.upsert(obs("Second")).unwrap_err();
        assert!(matches!(err, DatabaseError::IdConflict { ref id, .. } if id.as_str() == "obs-7"));
        let stored = repository::get_observation(&conn, "obs-7").unwrap().unwrap();
        assert_eq!(stored.note_text, "First");
        assert_eq!(repository::count_entities(&conn, EntityType::Observation).unwrap(), 1);
    }
}
