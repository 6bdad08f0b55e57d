//! Student profiles: account fields plus matrícula, RFID and group.

pub mod controller;
pub mod router;
pub mod service;
