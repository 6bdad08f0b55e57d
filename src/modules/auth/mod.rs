//! Login, logout, token refresh and the session check.

pub mod controller;
pub mod cookies;
pub mod router;
pub mod service;
