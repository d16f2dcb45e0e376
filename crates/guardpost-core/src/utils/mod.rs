//! Utility functions for formatting and date parsing.

pub mod dates;
pub mod format;
pub mod lenient;

pub use format::{contains_ignore_case, format_contact, format_date, format_pkr, truncate_string};
pub use lenient::null_as_default;
