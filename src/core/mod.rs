//! Core types shared by every stage of the action.
//!
//! Currently this is the error taxonomy and the user-facing error report.

pub mod error;

pub use error::{ActionError, ErrorContext, user_friendly_error};
