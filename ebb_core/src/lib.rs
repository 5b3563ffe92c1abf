#![forbid(unsafe_code)]

//! Core domain model and business logic for ebb, a menstrual cycle tracker.
//!
//! This crate provides:
//! - Domain types (daily records, preferences, analytics, predictions)
//! - Period start extraction and cycle statistics
//! - Phase classification and phase-based guidance
//! - Multi-month prediction
//! - Persistence through a key-value store (in-memory or JSON file)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod period_log;
pub mod stats;
pub mod phase;
pub mod prediction;
pub mod tracker;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{FileStore, MemoryStore, RecordStore};
pub use tracker::Tracker;
pub use phase::{TipContext, TipSet};
pub use prediction::PredictionContext;
pub use export::export_records_csv;
