//! Storage contracts.
//!
//! Handlers and services depend on these traits, never on a concrete
//! backend. [`Store`] bundles all of them so application state can hold a
//! single `Arc<dyn Store>`.
//!
//! Refresh tokens use a single slot per user: saving a token replaces any
//! previous one, so a new login ends the prior session's ability to renew.
//! Callers only rely on "the presented token exists and is unexpired, or it
//! doesn't".

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use classaccess_core::AppError;
use classaccess_models::attendance::{AttendanceRecord, StudentAttendanceEntry, Toggle};
use classaccess_models::classrooms::{Classroom, ClassroomDto};
use classaccess_models::devices::Device;
use classaccess_models::users::{NewUser, StudentDetails, StudentProfile, User, UserFields};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>, AppError>;

    /// Stores `token` as the user's only renewable session.
    async fn save_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// True when `token` is stored and not yet expired.
    async fn refresh_token_exists(&self, token: &str) -> Result<bool, AppError>;

    /// Returns whether a stored token was removed.
    async fn delete_refresh_token(&self, token: &str) -> Result<bool, AppError>;

    async fn delete_refresh_tokens_for_user(&self, user_id: i32) -> Result<u64, AppError>;

    async fn purge_expired_refresh_tokens(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// User id of the teacher holding `employee_number`.
    async fn find_teacher_by_employee_number(
        &self,
        employee_number: &str,
    ) -> Result<Option<i32>, AppError>;

    /// User id of the student whose roll number or RFID code equals `code`.
    async fn find_student_by_code(&self, code: &str) -> Result<Option<i32>, AppError>;

    /// True when any teacher has a record, open or closed, in the room on `date`.
    async fn teacher_present(&self, room_id: i32, date: NaiveDate) -> Result<bool, AppError>;

    /// Closes the open record for (user, room, date) or opens a new one.
    /// The check and the write are atomic per key.
    async fn toggle_attendance(
        &self,
        user_id: i32,
        room_id: i32,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Toggle, AppError>;

    async fn records_for(
        &self,
        user_id: i32,
        room_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError>;

    /// Newest first.
    async fn student_history(&self, user_id: i32)
    -> Result<Vec<StudentAttendanceEntry>, AppError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    /// Writes the account and its student profile in one transaction.
    async fn create_student(&self, user: NewUser, profile: StudentProfile)
    -> Result<User, AppError>;

    /// Writes the account and its teacher profile in one transaction.
    async fn create_teacher(&self, user: NewUser, employee_number: &str)
    -> Result<User, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// `None` unless `user_id` is a Student account.
    async fn find_student(&self, user_id: i32) -> Result<Option<StudentDetails>, AppError>;

    /// Rewrites the account fields and the student profile in one
    /// transaction, creating the profile row if the account had none. A
    /// conflict on either row leaves both unchanged. `None` unless `user_id`
    /// is a Student account.
    async fn update_student(
        &self,
        user_id: i32,
        fields: UserFields,
        profile: StudentProfile,
    ) -> Result<Option<StudentDetails>, AppError>;

    /// Deactivating also revokes the user's refresh token. `None` if the user
    /// does not exist.
    async fn set_user_status(&self, user_id: i32, active: bool)
    -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ClassroomStore: Send + Sync {
    async fn list_classrooms(&self) -> Result<Vec<Classroom>, AppError>;

    async fn create_classroom(&self, classroom: ClassroomDto) -> Result<Classroom, AppError>;

    /// `None` if the room does not exist.
    async fn update_classroom(
        &self,
        room_id: i32,
        classroom: ClassroomDto,
    ) -> Result<Option<Classroom>, AppError>;
}

#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<Device>, AppError>;

    async fn create_device(&self, name: &str) -> Result<Device, AppError>;

    /// `None` if the device does not exist.
    async fn set_device_status(
        &self,
        device_id: i32,
        active: bool,
    ) -> Result<Option<Device>, AppError>;
}

pub trait Store:
    CredentialStore + AttendanceStore + UserDirectory + ClassroomStore + DeviceStore
{
}

impl<T> Store for T where
    T: CredentialStore + AttendanceStore + UserDirectory + ClassroomStore + DeviceStore
{
}
