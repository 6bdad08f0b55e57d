//! # ClassAccess CLI
//!
//! Account provisioning and maintenance tasks run by operators against the
//! same storage the API uses. The binary collects input; the functions here
//! do the work so they can be exercised against any [`Store`].

use classaccess_core::{AppError, Role, hash_password_with_cost};
use classaccess_db::Store;
use classaccess_models::users::{NewUser, User};
use validator::ValidateEmail;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// An administrator or teacher account to create.
#[derive(Debug, Clone)]
pub struct StaffAccount {
    pub nombre: String,
    pub ap: String,
    pub am: String,
    pub correo: String,
    pub password: String,
    pub role: Role,
    /// Required for teachers; devices identify them by it.
    pub employee_number: Option<String>,
}

impl StaffAccount {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.nombre.trim().is_empty() || self.ap.trim().is_empty() {
            return Err(AppError::bad_request("Name and paternal surname are required"));
        }
        if !self.correo.validate_email() {
            return Err(AppError::bad_request(format!("Invalid email: {}", self.correo)));
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        match self.role {
            Role::Student => Err(AppError::bad_request(
                "Students register through the API, not the CLI",
            )),
            Role::Teacher if self.employee_number().is_none() => Err(AppError::bad_request(
                "Teachers need an employee number",
            )),
            _ => Ok(()),
        }
    }

    fn employee_number(&self) -> Option<&str> {
        self.employee_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}

/// Creates an active staff account. Teachers get their profile row in the
/// same transaction.
pub async fn create_staff_user(
    store: &dyn Store,
    account: StaffAccount,
    hash_cost: u32,
) -> Result<User, AppError> {
    account.validate()?;

    let employee_number = account.employee_number().map(str::to_string);
    let new_user = NewUser {
        nombre_usu: account.nombre.trim().to_string(),
        ap_usu: account.ap.trim().to_string(),
        am_usu: account.am.trim().to_string(),
        correo_usu: account.correo.trim().to_string(),
        password_hash: hash_password_with_cost(&account.password, hash_cost)?,
        priv_usu: account.role,
        estatus_usu: true,
    };

    match (account.role, employee_number) {
        (Role::Teacher, Some(number)) => store.create_teacher(new_user, &number).await,
        _ => store.create_user(new_user).await,
    }
}

/// Deletes refresh tokens whose expiry has passed. Returns how many.
pub async fn purge_expired_tokens(store: &dyn Store) -> Result<u64, AppError> {
    store.purge_expired_refresh_tokens().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use classaccess_core::verify_password;
    use classaccess_db::{AttendanceStore, MemoryStore, UserDirectory};

    fn account(role: Role, employee_number: Option<&str>) -> StaffAccount {
        StaffAccount {
            nombre: "Marta".into(),
            ap: "Gil".into(),
            am: String::new(),
            correo: "marta@escuela.mx".into(),
            password: "secreto1".into(),
            role,
            employee_number: employee_number.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn creates_admin_with_hashed_password() {
        let store = MemoryStore::new();
        let user = create_staff_user(&store, account(Role::Admin, None), 4)
            .await
            .unwrap();

        assert_eq!(user.priv_usu, Role::Admin);
        assert!(user.estatus_usu);
        assert_ne!(user.password, "secreto1");
        assert!(verify_password("secreto1", &user.password).unwrap());
    }

    #[tokio::test]
    async fn teacher_is_resolvable_by_employee_number() {
        let store = MemoryStore::new();
        let user = create_staff_user(&store, account(Role::Teacher, Some(" E100 ")), 4)
            .await
            .unwrap();

        let found = store.find_teacher_by_employee_number("E100").await.unwrap();
        assert_eq!(found, Some(user.id_usu));
    }

    #[tokio::test]
    async fn rejects_teacher_without_employee_number_and_students() {
        let store = MemoryStore::new();

        let err = create_staff_user(&store, account(Role::Teacher, Some("  ")), 4)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 400);

        let err = create_staff_user(&store, account(Role::Student, None), 4)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        create_staff_user(&store, account(Role::Admin, None), 4)
            .await
            .unwrap();

        let err = create_staff_user(&store, account(Role::Admin, None), 4)
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }
}
