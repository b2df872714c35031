use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_stored_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_observation(conn: &Connection, obs: &Observation) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO observations (id, visit_id, patient_id, doctor_id, note_text,
         bp_systolic, bp_diastolic, heart_rate, temperature_c, spo2, bmi, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            obs.id,
            obs.visit_id,
            obs.patient_id,
            obs.doctor_id,
            obs.note_text,
            obs.vitals.bp_systolic,
            obs.vitals.bp_diastolic,
            obs.vitals.heart_rate,
            obs.vitals.temperature_c,
            obs.vitals.spo2,
            obs.vitals.bmi,
            format_timestamp(&obs.created_at),
        ],
    )?;
    Ok(())
}

/// Replace the vital-sign readings. Note text and references stay as created.
pub fn update_observation_vitals(
    conn: &Connection,
    id: &str,
    vitals: &Vitals,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE observations SET bp_systolic = ?2, bp_diastolic = ?3, heart_rate = ?4,
         temperature_c = ?5, spo2 = ?6, bmi = ?7 WHERE id = ?1",
        params![
            id,
            vitals.bp_systolic,
            vitals.bp_diastolic,
            vitals.heart_rate,
            vitals.temperature_c,
            vitals.spo2,
            vitals.bmi,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "observation".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn find_observation_id(
    conn: &Connection,
    visit_id: &str,
    note_text: &str,
    created_at: &NaiveDateTime,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM observations
             WHERE visit_id = ?1 AND note_text = ?2 AND created_at = ?3 LIMIT 1",
            params![visit_id, note_text, format_timestamp(created_at)],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn observation_id_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM observations WHERE id = ?1",
            params![id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn get_observation(conn: &Connection, id: &str) -> Result<Option<Observation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, visit_id, patient_id, doctor_id, note_text, bp_systolic, bp_diastolic,
         heart_rate, temperature_c, spo2, bmi, created_at
         FROM observations WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], |row| {
        Ok((
            Observation {
                id: row.get(0)?,
                visit_id: row.get(1)?,
                patient_id: row.get(2)?,
                doctor_id: row.get(3)?,
                note_text: row.get(4)?,
                vitals: Vitals {
                    bp_systolic: row.get(5)?,
                    bp_diastolic: row.get(6)?,
                    heart_rate: row.get(7)?,
                    temperature_c: row.get(8)?,
                    spo2: row.get(9)?,
                    bmi: row.get(10)?,
                },
                created_at: NaiveDateTime::default(),
            },
            row.get::<_, String>(11)?,
        ))
    })?;

    match rows.next() {
        Some(row) => {
            let (mut obs, created_at) = row?;
            obs.created_at = parse_stored_timestamp(&created_at)?;
            Ok(Some(obs))
        }
        None => Ok(None),
    }
}
