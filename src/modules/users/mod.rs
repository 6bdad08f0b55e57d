//! Student self-registration and account administration.

pub mod controller;
pub mod router;
pub mod service;
