//! # ClassAccess Models
//!
//! Domain entities and request/response DTOs.
//!
//! - [`users`]: accounts, student profiles, registration and administration DTOs
//! - [`auth`]: login, refresh and session payloads
//! - [`attendance`]: attendance records, device query and toggle outcomes
//! - [`classrooms`]: rooms referenced by attendance records
//! - [`devices`]: readers installed in classrooms
//!
//! Field names follow the stored column names (`correo_usu`, `priv_usu`, ...)
//! because clients already consume them in that shape.

pub mod attendance;
pub mod auth;
pub mod classrooms;
pub mod devices;
pub mod users;
