use chrono::NaiveDateTime;
use classaccess_core::AppError;
use classaccess_db::Store;
use classaccess_models::attendance::{AttendanceOutcome, StudentAttendanceEntry};
use tracing::{Span, debug, instrument};

use super::resolver::RESOLUTION_ORDER;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_self_or_staff;

pub struct AttendanceService;

impl AttendanceService {
    /// Toggles presence of whoever `code` identifies in `room_id`.
    ///
    /// The day is `now`'s date: an open record from a previous day is never
    /// closed here. "No teacher" and "unknown code" are outcomes, not errors.
    #[instrument(skip(store), fields(outcome))]
    pub async fn register(
        store: &dyn Store,
        code: &str,
        room_id: i32,
        now: NaiveDateTime,
    ) -> Result<AttendanceOutcome, AppError> {
        let date = now.date();

        for resolver in RESOLUTION_ORDER {
            if resolver.requires_teacher_present() && !store.teacher_present(room_id, date).await? {
                Span::current().record("outcome", AttendanceOutcome::NoTeacherPresent.as_str());
                return Ok(AttendanceOutcome::NoTeacherPresent);
            }

            if let Some(user_id) = resolver.resolve(store, code).await? {
                let toggle = store
                    .toggle_attendance(user_id, room_id, date, now.time())
                    .await?;
                let outcome = AttendanceOutcome::from_toggle(resolver.actor(), toggle);
                Span::current().record("outcome", outcome.as_str());
                debug!(user_id, "Attendance toggled");
                return Ok(outcome);
            }
        }

        Span::current().record("outcome", AttendanceOutcome::NotFound.as_str());
        Ok(AttendanceOutcome::NotFound)
    }

    /// A student may only read their own history; staff may read anyone's.
    #[instrument(skip(store, requester), fields(requester_id = requester.id))]
    pub async fn student_history(
        store: &dyn Store,
        requester: &AuthUser,
        student_id: i32,
    ) -> Result<Vec<StudentAttendanceEntry>, AppError> {
        check_self_or_staff(requester, student_id)?;
        store.student_history(student_id).await
    }
}
