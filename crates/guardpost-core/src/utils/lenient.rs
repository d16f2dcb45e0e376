//! Deserialization helpers for fields the API sometimes sends as `null`.

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field.
///
/// `#[serde(default)]` only covers absence; pair it with this so one record
/// with `"status": null` does not fail a whole list.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
