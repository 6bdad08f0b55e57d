//! Attendance records and the outcomes reported to access devices.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One presence interval of a user in a room. Open while `hora_salida` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct AttendanceRecord {
    pub id_registro: i32,
    pub fecha: NaiveDate,
    pub id_usu: i32,
    pub id_aula: i32,
    pub hora_entrada: NaiveTime,
    pub hora_salida: Option<NaiveTime>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.hora_salida.is_none()
    }
}

/// A record joined with its room, as listed in a student's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StudentAttendanceEntry {
    pub id_registro: i32,
    pub fecha: NaiveDate,
    pub id_aula: i32,
    pub nombre_aula: String,
    pub edificio: String,
    pub hora_entrada: NaiveTime,
    pub hora_salida: Option<NaiveTime>,
}

/// Who presented the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Teacher,
    Student,
}

/// What a toggle did to the (user, room, date) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// No open record existed; one was inserted.
    Entered,
    /// The open record was closed.
    Exited,
}

/// Plaintext answer returned to the device. These are business outcomes,
/// not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceOutcome {
    TeacherEntry,
    TeacherExit,
    StudentEntry,
    StudentExit,
    NoTeacherPresent,
    NotFound,
}

impl AttendanceOutcome {
    pub fn from_toggle(actor: ActorKind, toggle: Toggle) -> Self {
        match (actor, toggle) {
            (ActorKind::Teacher, Toggle::Entered) => AttendanceOutcome::TeacherEntry,
            (ActorKind::Teacher, Toggle::Exited) => AttendanceOutcome::TeacherExit,
            (ActorKind::Student, Toggle::Entered) => AttendanceOutcome::StudentEntry,
            (ActorKind::Student, Toggle::Exited) => AttendanceOutcome::StudentExit,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceOutcome::TeacherEntry => "PROFESOR_ENTRADA",
            AttendanceOutcome::TeacherExit => "PROFESOR_SALIDA",
            AttendanceOutcome::StudentEntry => "ALUMNO_ENTRADA",
            AttendanceOutcome::StudentExit => "ALUMNO_SALIDA",
            AttendanceOutcome::NoTeacherPresent => "NO_HAY_PROFESOR",
            AttendanceOutcome::NotFound => "NO_ENCONTRADO",
        }
    }
}

impl fmt::Display for AttendanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string sent by access devices. Both fields are optional here so a
/// missing one can be answered in plaintext instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterQuery {
    pub id: Option<String>,
    pub aula: Option<String>,
}
