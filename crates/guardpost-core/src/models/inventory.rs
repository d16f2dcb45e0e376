use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::dates::optional_date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Uniform,
    Baton,
    Radio,
    Flashlight,
    Whistle,
    #[default]
    #[serde(other)]
    Other,
}

impl ItemType {
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Uniform => "Uniform",
            ItemType::Baton => "Baton",
            ItemType::Radio => "Radio/Walkie-Talkie",
            ItemType::Flashlight => "Flashlight",
            ItemType::Whistle => "Whistle",
            ItemType::Other => "Other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Uniform => "uniform",
            ItemType::Baton => "baton",
            ItemType::Radio => "radio",
            ItemType::Flashlight => "flashlight",
            ItemType::Whistle => "whistle",
            ItemType::Other => "other",
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(ItemType::Uniform),
            "baton" => Ok(ItemType::Baton),
            "radio" | "walkie-talkie" => Ok(ItemType::Radio),
            "flashlight" => Ok(ItemType::Flashlight),
            "whistle" => Ok(ItemType::Whistle),
            "other" => Ok(ItemType::Other),
            other => Err(format!("unknown item type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    Damaged,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
            Condition::Damaged => "Damaged",
        }
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(Condition::Excellent),
            "good" => Ok(Condition::Good),
            "fair" => Ok(Condition::Fair),
            "poor" => Ok(Condition::Poor),
            "damaged" => Ok(Condition::Damaged),
            other => Err(format!("unknown condition: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    #[default]
    Issued,
    Returned,
    Damaged,
    Lost,
}

impl InventoryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InventoryStatus::Issued => "Issued",
            InventoryStatus::Returned => "Returned",
            InventoryStatus::Damaged => "Damaged",
            InventoryStatus::Lost => "Lost",
        }
    }
}

impl std::str::FromStr for InventoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ISSUED" => Ok(InventoryStatus::Issued),
            "RETURNED" => Ok(InventoryStatus::Returned),
            "DAMAGED" => Ok(InventoryStatus::Damaged),
            "LOST" => Ok(InventoryStatus::Lost),
            other => Err(format!("unknown inventory status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InventoryRecord {
    pub id: i64,
    pub guard_contact: String,
    #[serde(default)]
    pub guard_name: Option<String>,
    pub item_name: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub item_type: ItemType,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_default")]
    pub quantity: u32,
    #[serde(default, with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub condition_on_issue: Condition,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub cost: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub return_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub status: InventoryStatus,
    #[serde(default)]
    pub condition_on_return: Option<Condition>,
}

fn default_quantity() -> u32 {
    1
}

fn quantity_or_default<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_quantity))
}

/// Body for `POST /inventory/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct InventoryCreate {
    pub guard_contact: String,
    pub item_name: String,
    pub item_type: ItemType,
    pub quantity: u32,
    #[serde(with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub issue_date: Option<NaiveDate>,
    pub condition_on_issue: Condition,
    pub cost: f64,
    pub notes: Option<String>,
    pub status: InventoryStatus,
}

impl From<&InventoryRecord> for InventoryCreate {
    fn from(r: &InventoryRecord) -> Self {
        Self {
            guard_contact: r.guard_contact.clone(),
            item_name: r.item_name.clone(),
            item_type: r.item_type,
            quantity: r.quantity,
            issue_date: r.issue_date,
            condition_on_issue: r.condition_on_issue,
            cost: r.cost,
            notes: r.notes.clone(),
            status: r.status,
        }
    }
}

impl InventoryRecord {
    /// This record with its issue details replaced by `details`. Status and
    /// return fields are left alone; returns go through `ReturnRequest`.
    pub fn with_details(&self, details: &InventoryCreate) -> InventoryRecord {
        let mut updated = self.clone();
        updated.guard_contact = details.guard_contact.clone();
        updated.item_name = details.item_name.clone();
        updated.item_type = details.item_type;
        updated.quantity = details.quantity;
        updated.issue_date = details.issue_date;
        updated.condition_on_issue = details.condition_on_issue;
        updated.cost = details.cost;
        updated.notes = details.notes.clone();
        updated
    }
}
