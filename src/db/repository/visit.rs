use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_stored_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO visits (id, patient_id, doctor_id, visit_date, department, reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            visit.id,
            visit.patient_id,
            visit.doctor_id,
            format_timestamp(&visit.visit_date),
            visit.department,
            visit.reason,
        ],
    )?;
    Ok(())
}

pub fn update_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE visits SET department = ?2, reason = ?3 WHERE id = ?1",
        params![visit.id, visit.department, visit.reason],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "visit".into(),
            id: visit.id.clone(),
        });
    }
    Ok(())
}

pub fn find_visit_id(
    conn: &Connection,
    patient_id: &str,
    doctor_id: &str,
    visit_date: &NaiveDateTime,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM visits
             WHERE patient_id = ?1 AND doctor_id = ?2 AND visit_date = ?3 LIMIT 1",
            params![patient_id, doctor_id, format_timestamp(visit_date)],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_visit(conn: &Connection, id: &str) -> Result<Option<Visit>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, doctor_id, visit_date, department, reason
             FROM visits WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, patient_id, doctor_id, visit_date, department, reason)) => Ok(Some(Visit {
            id,
            patient_id,
            doctor_id,
            visit_date: parse_stored_timestamp(&visit_date)?,
            department,
            reason,
        })),
        None => Ok(None),
    }
}
