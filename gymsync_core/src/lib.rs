#![forbid(unsafe_code)]

//! Core domain model and business logic for GymSync.
//!
//! This crate provides:
//! - Domain types (workout entries, plans, profile, units)
//! - The workout log and plan repository
//! - Derived metrics (streaks, records, achievements, charts)
//! - Unit conversion
//! - The workout session state machine
//! - Persistence (key-value store, CSV export)
//! - An application controller tying it together

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod units;
pub mod workouts;
pub mod plans;
pub mod metrics;
pub mod charts;
pub mod clock;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod export;
pub mod app;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use workouts::WorkoutLog;
pub use plans::{PlanDraft, PlanRepository};
pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{SessionEvent, SessionPhase, SessionRunner, SessionSummary, SessionView};
pub use store::{FileStore, MemoryStore, Store};
pub use export::export_workouts_csv;
pub use app::{App, AppState, Command, Outcome};
