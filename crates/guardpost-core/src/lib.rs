//! Core library for guardpost.
//!
//! Everything the staffing console needs that is not presentation:
//!
//! - `api`: REST client for the remote guard/client/assignment/salary/inventory API
//! - `models`: wire types for each resource
//! - `store`: the injected key-value store the cache writes to
//! - `cache`: stale-while-revalidate caching and list view state
//! - `salary`: client-side salary preview and payment transitions
//! - `roster`: cross-referencing assignments against guards and clients
//! - `inventory`: issue/return bookkeeping
//! - `validation`: submit-time form checks
//! - `config`: on-disk configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod inventory;
pub mod models;
pub mod roster;
pub mod salary;
pub mod store;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheKey, CacheManager, CachedData, ListView, Revalidator};
pub use config::Config;
pub use store::{FileStore, KeyValueStore, MemoryStore};
