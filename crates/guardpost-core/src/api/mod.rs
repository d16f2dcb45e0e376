//! REST API client module for the staffing backend.
//!
//! This module provides the `ApiClient` for listing, creating, updating and
//! deleting guards, clients, duty assignments, salary records and inventory.
//!
//! The backend answers with JSON arrays or objects on success and a JSON body
//! carrying a `detail` message on failure.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
