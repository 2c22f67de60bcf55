//! Core domain vocabulary shared by the service and persistence layers.
//!
//! Expected failures (not-found, validation, conflict) travel through
//! [`Outcome`] and [`Maybe`] values rather than panics or ad-hoc errors;
//! unexpected store faults are converted to [`CoreError::Internal`] at each
//! service boundary.

pub mod error;
pub mod outcome;
pub mod records;

pub use error::CoreError;
pub use outcome::{Maybe, Outcome};
pub use records::{EventPatch, LogLevel, LogPatch, NewEvent, NewLog};
