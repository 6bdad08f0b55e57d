pub mod attendance;
pub mod auth;
pub mod classrooms;
pub mod devices;
pub mod students;
pub mod users;
