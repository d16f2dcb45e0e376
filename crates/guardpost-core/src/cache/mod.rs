//! Local caching for entity lists.
//!
//! Lists fetched from the API are kept in a `KeyValueStore` keyed by entity
//! type and active search filter. An entry younger than the freshness window
//! (5 minutes by default) is served without touching the network; an older
//! one is served immediately while a background task refreshes it.
//!
//! - `manager`: `CacheKey`, `CachedData` and the `CacheManager` read/write layer
//! - `revalidate`: the stale-while-revalidate policy over a `ListSource`
//! - `view`: `ListView`, the state one list screen keeps between refreshes

pub mod manager;
pub mod revalidate;
pub mod view;

pub use manager::{CacheAge, CacheKey, CacheManager, CachedData, DEFAULT_FRESHNESS_MINUTES};
pub use revalidate::{ListSource, LoadPlan, Origin, RefreshEvent, Revalidator, Snapshot};
pub use view::{ListView, ViewStatus};
