//! Entry/exit toggling for classroom devices and per-student history.

pub mod controller;
pub mod resolver;
pub mod router;
pub mod service;
