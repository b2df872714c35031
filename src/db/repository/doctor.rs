use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, name, department) VALUES (?1, ?2, ?3)",
        params![doctor.id, doctor.name, doctor.department],
    )?;
    Ok(())
}

pub fn find_doctor_id(
    conn: &Connection,
    name: &str,
    department: &str,
) -> Result<Option<String>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM doctors WHERE name = ?1 AND department = ?2 LIMIT 1",
            params![name, department],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(id)
}

pub fn get_doctor(conn: &Connection, id: &str) -> Result<Option<Doctor>, DatabaseError> {
    let doctor = conn
        .query_row(
            "SELECT id, name, department FROM doctors WHERE id = ?1",
            params![id],
            |row| {
                Ok(Doctor {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    department: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(doctor)
}
