#![forbid(unsafe_code)]

//! Core domain model and business logic for the health tracker.
//!
//! This crate provides:
//! - Domain types (readings, appointments, doctors, medications, contacts)
//! - Input validation and reading classification
//! - Persistence (storage port, record stores, water log)
//! - Derived views (schedules, averages, search)
//! - Emergency alarm countdown and mock authentication

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod storage;
pub mod seeds;
pub mod store;
pub mod validate;
pub mod classify;
pub mod views;
pub mod water;
pub mod alarm;
pub mod auth;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use storage::{FileStorage, MemoryStorage, StoragePort};
pub use store::{Collection, RecordStore};
pub use validate::ValidationError;
pub use classify::{classify_bp, classify_heart_rate, Classification, Severity};
pub use water::{WaterLog, WaterTracker};
pub use alarm::{AlarmController, AlarmState};
pub use auth::{AuthError, MockAuth, Session};
