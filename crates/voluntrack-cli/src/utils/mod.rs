//! Utility functions for string formatting.

pub mod format;

pub use format::{format_datetime, format_hours, format_optional, truncate};
