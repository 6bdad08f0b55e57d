//! In-process store with the same observable behavior as [`crate::PgStore`].
//!
//! One mutex guards all tables, so every operation is atomic, including the
//! attendance toggle and the multi-row writes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tokio::sync::Mutex;

use classaccess_core::{AppError, Role};
use classaccess_models::attendance::{AttendanceRecord, StudentAttendanceEntry, Toggle};
use classaccess_models::classrooms::{Classroom, ClassroomDto};
use classaccess_models::devices::Device;
use classaccess_models::users::{NewUser, StudentDetails, StudentProfile, User, UserFields};

use crate::store::{AttendanceStore, ClassroomStore, CredentialStore, DeviceStore, UserDirectory};

const DUPLICATE_USER: &str = "El correo, la matrícula o el código ya están registrados";
const DUPLICATE_CLASSROOM: &str = "El aula ya existe en ese edificio";
const UNKNOWN_DEVICE: &str = "El dispositivo no existe";

#[derive(Debug)]
struct StudentRow {
    id_usu: i32,
    profile: StudentProfile,
}

#[derive(Debug)]
struct RefreshRow {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    students: Vec<StudentRow>,
    /// employee number → user id
    teachers: HashMap<String, i32>,
    classrooms: Vec<Classroom>,
    devices: Vec<Device>,
    records: Vec<AttendanceRecord>,
    /// user id → single refresh slot
    refresh_tokens: HashMap<i32, RefreshRow>,
    next_user_id: i32,
    next_room_id: i32,
    next_device_id: i32,
    next_record_id: i32,
}

impl Tables {
    fn insert_user(&mut self, user: NewUser) -> Result<User, AppError> {
        if self.users.iter().any(|u| u.correo_usu == user.correo_usu) {
            return Err(AppError::conflict(DUPLICATE_USER));
        }

        self.next_user_id += 1;
        let created = User {
            id_usu: self.next_user_id,
            nombre_usu: user.nombre_usu,
            ap_usu: user.ap_usu,
            am_usu: user.am_usu,
            correo_usu: user.correo_usu,
            password: user.password_hash,
            priv_usu: user.priv_usu,
            estatus_usu: user.estatus_usu,
        };
        self.users.push(created.clone());
        Ok(created)
    }

    /// Whether another student already holds one of `profile`'s codes.
    fn student_code_taken(&self, profile: &StudentProfile, owner: Option<i32>) -> bool {
        let taken = |code: &Option<String>| {
            code.as_ref().is_some_and(|code| {
                self.students.iter().any(|s| {
                    Some(s.id_usu) != owner
                        && (s.profile.matricula.as_ref() == Some(code)
                            || s.profile.cod_rfid.as_ref() == Some(code))
                })
            })
        };
        taken(&profile.matricula) || taken(&profile.cod_rfid)
    }

    fn student_details(&self, user_id: i32) -> Option<StudentDetails> {
        let user = self
            .users
            .iter()
            .find(|u| u.id_usu == user_id && u.priv_usu == Role::Student)?;
        let profile = self
            .students
            .iter()
            .find(|s| s.id_usu == user_id)
            .map(|s| s.profile.clone())
            .unwrap_or_default();

        Some(StudentDetails {
            id_usu: user.id_usu,
            nombre_usu: user.nombre_usu.clone(),
            ap_usu: user.ap_usu.clone(),
            am_usu: user.am_usu.clone(),
            correo_usu: user.correo_usu.clone(),
            priv_usu: user.priv_usu,
            estatus_usu: user.estatus_usu,
            matricula: profile.matricula,
            cod_rfid: profile.cod_rfid,
            grupo: profile.grupo,
        })
    }

    fn check_classroom(&self, classroom: &ClassroomDto, room_id: Option<i32>) -> Result<(), AppError> {
        if let Some(device_id) = classroom.id_dispositivo
            && !self.devices.iter().any(|d| d.id_dispositivo == device_id)
        {
            return Err(AppError::bad_request(UNKNOWN_DEVICE));
        }

        if self.classrooms.iter().any(|c| {
            Some(c.id_aula) != room_id
                && c.nombre_aula == classroom.nombre_aula
                && c.edificio == classroom.edificio
        }) {
            return Err(AppError::conflict(DUPLICATE_CLASSROOM));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.correo_usu == email).cloned())
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id_usu == user_id).cloned())
    }

    async fn save_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        tables.refresh_tokens.insert(
            user_id,
            RefreshRow {
                token: token.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn refresh_token_exists(&self, token: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        let now = Utc::now();
        Ok(tables
            .refresh_tokens
            .values()
            .any(|row| row.token == token && row.expires_at > now))
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|_, row| row.token != token);
        Ok(tables.refresh_tokens.len() < before)
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: i32) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(u64::from(tables.refresh_tokens.remove(&user_id).is_some()))
    }

    async fn purge_expired_refresh_tokens(&self) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|_, row| row.expires_at >= now);
        Ok((before - tables.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_teacher_by_employee_number(
        &self,
        employee_number: &str,
    ) -> Result<Option<i32>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.teachers.get(employee_number).copied())
    }

    async fn find_student_by_code(&self, code: &str) -> Result<Option<i32>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .students
            .iter()
            .find(|s| {
                s.profile.matricula.as_deref() == Some(code)
                    || s.profile.cod_rfid.as_deref() == Some(code)
            })
            .map(|s| s.id_usu))
    }

    async fn teacher_present(&self, room_id: i32, date: NaiveDate) -> Result<bool, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.records.iter().any(|r| {
            r.id_aula == room_id
                && r.fecha == date
                && tables.teachers.values().any(|&teacher| teacher == r.id_usu)
        }))
    }

    async fn toggle_attendance(
        &self,
        user_id: i32,
        room_id: i32,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Toggle, AppError> {
        let mut tables = self.tables.lock().await;

        if !tables.classrooms.iter().any(|c| c.id_aula == room_id) {
            return Err(AppError::internal(std::io::Error::other(format!(
                "room {room_id} does not exist"
            ))));
        }

        if let Some(open) = tables
            .records
            .iter_mut()
            .find(|r| r.id_usu == user_id && r.id_aula == room_id && r.fecha == date && r.is_open())
        {
            open.hora_salida = Some(time);
            return Ok(Toggle::Exited);
        }

        tables.next_record_id += 1;
        let record = AttendanceRecord {
            id_registro: tables.next_record_id,
            fecha: date,
            id_usu: user_id,
            id_aula: room_id,
            hora_entrada: time,
            hora_salida: None,
        };
        tables.records.push(record);
        Ok(Toggle::Entered)
    }

    async fn records_for(
        &self,
        user_id: i32,
        room_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .records
            .iter()
            .filter(|r| r.id_usu == user_id && r.id_aula == room_id && r.fecha == date)
            .cloned()
            .collect())
    }

    async fn student_history(
        &self,
        user_id: i32,
    ) -> Result<Vec<StudentAttendanceEntry>, AppError> {
        let tables = self.tables.lock().await;
        let mut entries: Vec<StudentAttendanceEntry> = tables
            .records
            .iter()
            .filter(|r| r.id_usu == user_id)
            .filter_map(|r| {
                let room = tables.classrooms.iter().find(|c| c.id_aula == r.id_aula)?;
                Some(StudentAttendanceEntry {
                    id_registro: r.id_registro,
                    fecha: r.fecha,
                    id_aula: r.id_aula,
                    nombre_aula: room.nombre_aula.clone(),
                    edificio: room.edificio.clone(),
                    hora_entrada: r.hora_entrada,
                    hora_salida: r.hora_salida,
                })
            })
            .collect();
        entries.sort_by(|a, b| (b.fecha, b.hora_entrada).cmp(&(a.fecha, a.hora_entrada)));
        Ok(entries)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        self.tables.lock().await.insert_user(user)
    }

    async fn create_student(
        &self,
        user: NewUser,
        profile: StudentProfile,
    ) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.student_code_taken(&profile, None) {
            return Err(AppError::conflict(DUPLICATE_USER));
        }

        let created = tables.insert_user(user)?;
        tables.students.push(StudentRow {
            id_usu: created.id_usu,
            profile,
        });
        Ok(created)
    }

    async fn create_teacher(&self, user: NewUser, employee_number: &str) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.teachers.contains_key(employee_number) {
            return Err(AppError::conflict(DUPLICATE_USER));
        }

        let created = tables.insert_user(user)?;
        tables
            .teachers
            .insert(employee_number.to_string(), created.id_usu);
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.lock().await;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| {
            (a.priv_usu.as_i32(), &a.ap_usu, &a.nombre_usu).cmp(&(
                b.priv_usu.as_i32(),
                &b.ap_usu,
                &b.nombre_usu,
            ))
        });
        Ok(users)
    }

    async fn find_student(&self, user_id: i32) -> Result<Option<StudentDetails>, AppError> {
        Ok(self.tables.lock().await.student_details(user_id))
    }

    async fn update_student(
        &self,
        user_id: i32,
        fields: UserFields,
        profile: StudentProfile,
    ) -> Result<Option<StudentDetails>, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.student_details(user_id).is_none() {
            return Ok(None);
        }

        // Both rows are checked before either is written.
        let email_taken = tables
            .users
            .iter()
            .any(|u| u.id_usu != user_id && u.correo_usu == fields.correo_usu);
        if email_taken || tables.student_code_taken(&profile, Some(user_id)) {
            return Err(AppError::conflict(DUPLICATE_USER));
        }

        if let Some(user) = tables.users.iter_mut().find(|u| u.id_usu == user_id) {
            user.nombre_usu = fields.nombre_usu;
            user.ap_usu = fields.ap_usu;
            user.am_usu = fields.am_usu;
            user.correo_usu = fields.correo_usu;
        }
        match tables.students.iter().position(|s| s.id_usu == user_id) {
            Some(index) => tables.students[index].profile = profile,
            None => tables.students.push(StudentRow {
                id_usu: user_id,
                profile,
            }),
        }

        Ok(tables.student_details(user_id))
    }

    async fn set_user_status(&self, user_id: i32, active: bool) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id_usu == user_id) else {
            return Ok(None);
        };

        user.estatus_usu = active;
        let updated = user.clone();
        if !active {
            tables.refresh_tokens.remove(&user_id);
        }
        Ok(Some(updated))
    }
}

#[async_trait]
impl ClassroomStore for MemoryStore {
    async fn list_classrooms(&self) -> Result<Vec<Classroom>, AppError> {
        let tables = self.tables.lock().await;
        let mut rooms = tables.classrooms.clone();
        rooms.sort_by(|a, b| (&a.edificio, &a.nombre_aula).cmp(&(&b.edificio, &b.nombre_aula)));
        Ok(rooms)
    }

    async fn create_classroom(&self, classroom: ClassroomDto) -> Result<Classroom, AppError> {
        let mut tables = self.tables.lock().await;
        tables.check_classroom(&classroom, None)?;

        tables.next_room_id += 1;
        let created = Classroom {
            id_aula: tables.next_room_id,
            nombre_aula: classroom.nombre_aula,
            edificio: classroom.edificio,
            id_dispositivo: classroom.id_dispositivo,
        };
        tables.classrooms.push(created.clone());
        Ok(created)
    }

    async fn update_classroom(
        &self,
        room_id: i32,
        classroom: ClassroomDto,
    ) -> Result<Option<Classroom>, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.classrooms.iter().any(|c| c.id_aula == room_id) {
            return Ok(None);
        }
        tables.check_classroom(&classroom, Some(room_id))?;

        let room = tables.classrooms.iter_mut().find(|c| c.id_aula == room_id);
        Ok(room.map(|room| {
            room.nombre_aula = classroom.nombre_aula;
            room.edificio = classroom.edificio;
            room.id_dispositivo = classroom.id_dispositivo;
            room.clone()
        }))
    }
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn list_devices(&self) -> Result<Vec<Device>, AppError> {
        Ok(self.tables.lock().await.devices.clone())
    }

    async fn create_device(&self, name: &str) -> Result<Device, AppError> {
        let mut tables = self.tables.lock().await;
        tables.next_device_id += 1;
        let device = Device {
            id_dispositivo: tables.next_device_id,
            nombre_dis: name.to_string(),
            estatus_dis: true,
        };
        tables.devices.push(device.clone());
        Ok(device)
    }

    async fn set_device_status(
        &self,
        device_id: i32,
        active: bool,
    ) -> Result<Option<Device>, AppError> {
        let mut tables = self.tables.lock().await;
        let device = tables
            .devices
            .iter_mut()
            .find(|d| d.id_dispositivo == device_id);
        Ok(device.map(|device| {
            device.estatus_dis = active;
            device.clone()
        }))
    }
}
