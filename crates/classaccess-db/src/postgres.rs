//! PostgreSQL implementation of the storage contracts.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use classaccess_core::{AppError, Role};
use classaccess_models::attendance::{AttendanceRecord, StudentAttendanceEntry, Toggle};
use classaccess_models::classrooms::{Classroom, ClassroomDto};
use classaccess_models::devices::Device;
use classaccess_models::users::{NewUser, StudentDetails, StudentProfile, User, UserFields};

use crate::store::{AttendanceStore, ClassroomStore, CredentialStore, DeviceStore, UserDirectory};

const USER_COLUMNS: &str =
    "id_usu, nombre_usu, ap_usu, am_usu, correo_usu, password, priv_usu, estatus_usu";

const CLASSROOM_COLUMNS: &str = "id_aula, nombre_aula, edificio, id_dispositivo";

const DEVICE_COLUMNS: &str = "id_dispositivo, nombre_dis, estatus_dis";

const DUPLICATE_USER: &str = "El correo, la matrícula o el código ya están registrados";
const DUPLICATE_CLASSROOM: &str = "El aula ya existe en ese edificio";
const UNKNOWN_DEVICE: &str = "El dispositivo no existe";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unique_or_database(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return AppError::conflict(message);
    }
    AppError::database(err)
}

fn classroom_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_foreign_key_violation()
    {
        return AppError::bad_request(UNKNOWN_DEVICE);
    }
    unique_or_database(err, DUPLICATE_CLASSROOM)
}

async fn select_student<'c, E>(executor: E, user_id: i32) -> Result<Option<StudentDetails>, AppError>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    let student = sqlx::query_as::<_, StudentDetails>(
        r#"SELECT u.id_usu, u.nombre_usu, u.ap_usu, u.am_usu, u.correo_usu, u.priv_usu,
                  u.estatus_usu, a.matricula, a.cod_rfid, a.grupo
           FROM usuarios u
           LEFT JOIN alumnos a ON a.id_usu = u.id_usu
           WHERE u.id_usu = $1 AND u.priv_usu = $2"#,
    )
    .bind(user_id)
    .bind(Role::Student.as_i32())
    .fetch_optional(executor)
    .await?;

    Ok(student)
}

async fn insert_user<'c, E>(executor: E, user: &NewUser) -> Result<User, AppError>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO usuarios (nombre_usu, ap_usu, am_usu, correo_usu, password, priv_usu, estatus_usu)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.nombre_usu)
    .bind(&user.ap_usu)
    .bind(&user.am_usu)
    .bind(&user.correo_usu)
    .bind(&user.password_hash)
    .bind(user.priv_usu.as_i32())
    .bind(user.estatus_usu)
    .fetch_one(executor)
    .await
    .map_err(|e| unique_or_database(e, DUPLICATE_USER))
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios WHERE correo_usu = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios WHERE id_usu = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, token))]
    async fn save_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO refresh_tokens (id_usu, token, expira_en)
               VALUES ($1, $2, $3)
               ON CONFLICT (id_usu)
               DO UPDATE SET token = EXCLUDED.token, expira_en = EXCLUDED.expira_en, created_at = NOW()"#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn refresh_token_exists(&self, token: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM refresh_tokens WHERE token = $1 AND expira_en > NOW())",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id_usu = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn purge_expired_refresh_tokens(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expira_en < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn find_teacher_by_employee_number(
        &self,
        employee_number: &str,
    ) -> Result<Option<i32>, AppError> {
        let user_id =
            sqlx::query_scalar::<_, i32>("SELECT id_usu FROM profesor WHERE no_empleado = $1")
                .bind(employee_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user_id)
    }

    async fn find_student_by_code(&self, code: &str) -> Result<Option<i32>, AppError> {
        let user_id = sqlx::query_scalar::<_, i32>(
            "SELECT id_usu FROM alumnos WHERE matricula = $1 OR cod_rfid = $1 ORDER BY id_alumno LIMIT 1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }

    async fn teacher_present(&self, room_id: i32, date: NaiveDate) -> Result<bool, AppError> {
        let present = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM registros r
                   JOIN profesor p ON p.id_usu = r.id_usu
                   WHERE r.id_aula = $1 AND r.fecha = $2
               )"#,
        )
        .bind(room_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(present)
    }

    #[instrument(skip(self))]
    async fn toggle_attendance(
        &self,
        user_id: i32,
        room_id: i32,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Toggle, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent scans of the same (user, room) until commit.
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(user_id)
            .bind(room_id)
            .execute(&mut *tx)
            .await?;

        let open_record = sqlx::query_scalar::<_, i32>(
            r#"SELECT id_registro FROM registros
               WHERE id_usu = $1 AND id_aula = $2 AND fecha = $3 AND hora_salida IS NULL
               LIMIT 1"#,
        )
        .bind(user_id)
        .bind(room_id)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

        let toggle = match open_record {
            Some(record_id) => {
                sqlx::query("UPDATE registros SET hora_salida = $2 WHERE id_registro = $1")
                    .bind(record_id)
                    .bind(time)
                    .execute(&mut *tx)
                    .await?;
                Toggle::Exited
            }
            None => {
                sqlx::query(
                    "INSERT INTO registros (fecha, id_usu, id_aula, hora_entrada) VALUES ($1, $2, $3, $4)",
                )
                .bind(date)
                .bind(user_id)
                .bind(room_id)
                .bind(time)
                .execute(&mut *tx)
                .await?;
                Toggle::Entered
            }
        };

        tx.commit().await?;
        Ok(toggle)
    }

    async fn records_for(
        &self,
        user_id: i32,
        room_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"SELECT id_registro, fecha, id_usu, id_aula, hora_entrada, hora_salida
               FROM registros
               WHERE id_usu = $1 AND id_aula = $2 AND fecha = $3
               ORDER BY id_registro"#,
        )
        .bind(user_id)
        .bind(room_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn student_history(
        &self,
        user_id: i32,
    ) -> Result<Vec<StudentAttendanceEntry>, AppError> {
        let entries = sqlx::query_as::<_, StudentAttendanceEntry>(
            r#"SELECT r.id_registro, r.fecha, r.id_aula, a.nombre_aula, a.edificio,
                      r.hora_entrada, r.hora_salida
               FROM registros r
               JOIN aula a ON a.id_aula = r.id_aula
               WHERE r.id_usu = $1
               ORDER BY r.fecha DESC, r.hora_entrada DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        insert_user(&self.pool, &user).await
    }

    #[instrument(skip(self, user, profile), fields(correo = %user.correo_usu))]
    async fn create_student(
        &self,
        user: NewUser,
        profile: StudentProfile,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = insert_user(&mut *tx, &user).await?;

        sqlx::query(
            "INSERT INTO alumnos (id_usu, matricula, cod_rfid, grupo) VALUES ($1, $2, $3, $4)",
        )
        .bind(created.id_usu)
        .bind(&profile.matricula)
        .bind(&profile.cod_rfid)
        .bind(&profile.grupo)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or_database(e, DUPLICATE_USER))?;

        tx.commit().await?;
        Ok(created)
    }

    #[instrument(skip(self, user), fields(correo = %user.correo_usu))]
    async fn create_teacher(&self, user: NewUser, employee_number: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = insert_user(&mut *tx, &user).await?;

        sqlx::query("INSERT INTO profesor (id_usu, no_empleado) VALUES ($1, $2)")
            .bind(created.id_usu)
            .bind(employee_number)
            .execute(&mut *tx)
            .await
            .map_err(|e| unique_or_database(e, DUPLICATE_USER))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios ORDER BY priv_usu, ap_usu, nombre_usu"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_student(&self, user_id: i32) -> Result<Option<StudentDetails>, AppError> {
        select_student(&self.pool, user_id).await
    }

    #[instrument(skip(self, fields, profile))]
    async fn update_student(
        &self,
        user_id: i32,
        fields: UserFields,
        profile: StudentProfile,
    ) -> Result<Option<StudentDetails>, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE usuarios
               SET nombre_usu = $2, ap_usu = $3, am_usu = $4, correo_usu = $5
               WHERE id_usu = $1 AND priv_usu = $6"#,
        )
        .bind(user_id)
        .bind(&fields.nombre_usu)
        .bind(&fields.ap_usu)
        .bind(&fields.am_usu)
        .bind(&fields.correo_usu)
        .bind(Role::Student.as_i32())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or_database(e, DUPLICATE_USER))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query(
            r#"INSERT INTO alumnos (id_usu, matricula, cod_rfid, grupo)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (id_usu)
               DO UPDATE SET matricula = EXCLUDED.matricula,
                             cod_rfid = EXCLUDED.cod_rfid,
                             grupo = EXCLUDED.grupo"#,
        )
        .bind(user_id)
        .bind(&profile.matricula)
        .bind(&profile.cod_rfid)
        .bind(&profile.grupo)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or_database(e, DUPLICATE_USER))?;

        let student = select_student(&mut *tx, user_id).await?;
        tx.commit().await?;
        Ok(student)
    }

    #[instrument(skip(self))]
    async fn set_user_status(&self, user_id: i32, active: bool) -> Result<Option<User>, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE usuarios SET estatus_usu = $2 WHERE id_usu = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(active)
        .fetch_optional(&mut *tx)
        .await?;

        if user.is_some() && !active {
            sqlx::query("DELETE FROM refresh_tokens WHERE id_usu = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(user)
    }
}

#[async_trait]
impl ClassroomStore for PgStore {
    async fn list_classrooms(&self) -> Result<Vec<Classroom>, AppError> {
        let rooms = sqlx::query_as::<_, Classroom>(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM aula ORDER BY edificio, nombre_aula"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    async fn create_classroom(&self, classroom: ClassroomDto) -> Result<Classroom, AppError> {
        sqlx::query_as::<_, Classroom>(&format!(
            r#"INSERT INTO aula (nombre_aula, edificio, id_dispositivo)
               VALUES ($1, $2, $3)
               RETURNING {CLASSROOM_COLUMNS}"#
        ))
        .bind(&classroom.nombre_aula)
        .bind(&classroom.edificio)
        .bind(classroom.id_dispositivo)
        .fetch_one(&self.pool)
        .await
        .map_err(classroom_write_error)
    }

    async fn update_classroom(
        &self,
        room_id: i32,
        classroom: ClassroomDto,
    ) -> Result<Option<Classroom>, AppError> {
        sqlx::query_as::<_, Classroom>(&format!(
            r#"UPDATE aula SET nombre_aula = $2, edificio = $3, id_dispositivo = $4
               WHERE id_aula = $1
               RETURNING {CLASSROOM_COLUMNS}"#
        ))
        .bind(room_id)
        .bind(&classroom.nombre_aula)
        .bind(&classroom.edificio)
        .bind(classroom.id_dispositivo)
        .fetch_optional(&self.pool)
        .await
        .map_err(classroom_write_error)
    }
}

#[async_trait]
impl DeviceStore for PgStore {
    async fn list_devices(&self) -> Result<Vec<Device>, AppError> {
        let devices = sqlx::query_as::<_, Device>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM dispositivo ORDER BY id_dispositivo"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(devices)
    }

    async fn create_device(&self, name: &str) -> Result<Device, AppError> {
        let device = sqlx::query_as::<_, Device>(&format!(
            "INSERT INTO dispositivo (nombre_dis, estatus_dis) VALUES ($1, TRUE) RETURNING {DEVICE_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(device)
    }

    async fn set_device_status(
        &self,
        device_id: i32,
        active: bool,
    ) -> Result<Option<Device>, AppError> {
        let device = sqlx::query_as::<_, Device>(&format!(
            "UPDATE dispositivo SET estatus_dis = $2 WHERE id_dispositivo = $1 RETURNING {DEVICE_COLUMNS}"
        ))
        .bind(device_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }
}
