//! Identifier resolution for access devices.
//!
//! A device sends one opaque code. It may be a teacher's employee number,
//! a student's roll number or a student's RFID code. Resolvers are tried in
//! [`RESOLUTION_ORDER`]; the first match wins, so a code that exists in more
//! than one namespace always resolves as a teacher.

use classaccess_core::AppError;
use classaccess_db::Store;
use classaccess_models::attendance::ActorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolver {
    TeacherByEmployeeNumber,
    StudentByRollOrRfid,
}

pub const RESOLUTION_ORDER: [Resolver; 2] = [
    Resolver::TeacherByEmployeeNumber,
    Resolver::StudentByRollOrRfid,
];

impl Resolver {
    pub fn actor(self) -> ActorKind {
        match self {
            Resolver::TeacherByEmployeeNumber => ActorKind::Teacher,
            Resolver::StudentByRollOrRfid => ActorKind::Student,
        }
    }

    /// Students can only check in to a room a teacher has visited today.
    pub fn requires_teacher_present(self) -> bool {
        matches!(self, Resolver::StudentByRollOrRfid)
    }

    pub async fn resolve(self, store: &dyn Store, code: &str) -> Result<Option<i32>, AppError> {
        match self {
            Resolver::TeacherByEmployeeNumber => store.find_teacher_by_employee_number(code).await,
            Resolver::StudentByRollOrRfid => store.find_student_by_code(code).await,
        }
    }
}
