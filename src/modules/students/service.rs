use classaccess_core::AppError;
use classaccess_db::Store;
use classaccess_models::users::{StudentDetails, UpdateStudentDto};
use tracing::{info, instrument};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_self_or_staff;

const STUDENT_NOT_FOUND: &str = "Alumno no encontrado";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(store, requester), fields(requester_id = requester.id))]
    pub async fn get(
        store: &dyn Store,
        requester: &AuthUser,
        student_id: i32,
    ) -> Result<StudentDetails, AppError> {
        check_self_or_staff(requester, student_id)?;

        store
            .find_student(student_id)
            .await?
            .ok_or_else(|| AppError::not_found(STUDENT_NOT_FOUND))
    }

    /// Account and profile change together; a duplicate email or code
    /// rejects the whole update.
    #[instrument(skip(store, requester, dto), fields(requester_id = requester.id))]
    pub async fn update(
        store: &dyn Store,
        requester: &AuthUser,
        student_id: i32,
        dto: UpdateStudentDto,
    ) -> Result<StudentDetails, AppError> {
        check_self_or_staff(requester, student_id)?;

        let (fields, profile) = dto.into_parts();
        let student = store
            .update_student(student_id, fields, profile)
            .await?
            .ok_or_else(|| AppError::not_found(STUDENT_NOT_FOUND))?;

        info!(student_id, "Student profile updated");
        Ok(student)
    }
}
