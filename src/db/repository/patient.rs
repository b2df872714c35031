use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::{parse_stored_date, DATE_FORMAT};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, dob, gender, contact, insurance)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id,
            patient.name,
            patient.dob.format(DATE_FORMAT).to_string(),
            patient.gender,
            patient.contact,
            patient.insurance,
        ],
    )?;
    Ok(())
}

/// Overwrite the mutable demographic fields. Name and dob are never touched.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET gender = ?2, contact = ?3, insurance = ?4 WHERE id = ?1",
        params![patient.id, patient.gender, patient.contact, patient.insurance],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient.id.clone(),
        });
    }
    Ok(())
}

pub fn find_patient_id(
    conn: &Connection,
    name: &str,
    dob: &NaiveDate,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM patients WHERE name = ?1 AND dob = ?2 LIMIT 1",
            params![name, dob.format(DATE_FORMAT).to_string()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, dob, gender, contact, insurance FROM patients WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        },
    );

    match result {
        Ok((id, name, dob, gender, contact, insurance)) => Ok(Some(Patient {
            id,
            name,
            dob: parse_stored_date(&dob)?,
            gender,
            contact,
            insurance,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
