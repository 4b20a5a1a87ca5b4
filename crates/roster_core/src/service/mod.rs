//! Roster use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations exposed upward.
//! - Keep callers (CLI, future transports) decoupled from SQL.

pub mod priest_service;
pub mod schedule_service;
