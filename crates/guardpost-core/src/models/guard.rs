use serde::{Deserialize, Serialize};

/// Guard employment status.
///
/// Two vocabularies are in circulation: `ACTIVE / ON_DUTY / OFF_DUTY / INACTIVE`
/// from the guard roster and `active / on_leave / inactive` from older records.
/// Both parse into this one enum; anything else is kept verbatim in `Other`.
/// Serialization always writes the upper-snake spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GuardStatus {
    #[default]
    Active,
    OnDuty,
    OffDuty,
    OnLeave,
    Inactive,
    Other(String),
}

impl GuardStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "ACTIVE" => GuardStatus::Active,
            "ON_DUTY" => GuardStatus::OnDuty,
            "OFF_DUTY" => GuardStatus::OffDuty,
            "ON_LEAVE" => GuardStatus::OnLeave,
            "INACTIVE" => GuardStatus::Inactive,
            _ => GuardStatus::Other(raw.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            GuardStatus::Active => "ACTIVE",
            GuardStatus::OnDuty => "ON_DUTY",
            GuardStatus::OffDuty => "OFF_DUTY",
            GuardStatus::OnLeave => "ON_LEAVE",
            GuardStatus::Inactive => "INACTIVE",
            GuardStatus::Other(raw) => raw,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            GuardStatus::Active => "Active",
            GuardStatus::OnDuty => "On Duty",
            GuardStatus::OffDuty => "Off Duty",
            GuardStatus::OnLeave => "On Leave",
            GuardStatus::Inactive => "Inactive",
            GuardStatus::Other(raw) => raw,
        }
    }

    /// Still on the payroll.
    pub fn is_employed(&self) -> bool {
        !matches!(self, GuardStatus::Inactive)
    }
}

impl From<String> for GuardStatus {
    fn from(raw: String) -> Self {
        GuardStatus::parse(&raw)
    }
}

impl From<GuardStatus> for String {
    fn from(status: GuardStatus) -> Self {
        status.as_wire().to_string()
    }
}

impl std::fmt::Display for GuardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Guard {
    pub id: i64,
    pub name: String,
    pub contact_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub current_salary: f64,
    #[serde(default)]
    pub uniform_cost: Option<f64>,
    #[serde(default)]
    pub uniform_deducted_amount: Option<f64>,
    #[serde(default)]
    pub monthly_deduction: Option<f64>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: GuardStatus,
}

impl Guard {
    /// Uniform cost still to be recovered through payroll deductions.
    pub fn uniform_outstanding(&self) -> f64 {
        let cost = self.uniform_cost.unwrap_or(0.0);
        let deducted = self.uniform_deducted_amount.unwrap_or(0.0);
        (cost - deducted).max(0.0)
    }

    pub fn matches_search(&self, query: &str) -> bool {
        query.is_empty()
            || crate::utils::contains_ignore_case(&self.name, query)
            || self.contact_number.contains(query)
    }
}

/// Body for `POST /guard/` and `PUT /guard/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GuardCreate {
    pub name: String,
    pub contact_number: String,
    pub address: Option<String>,
    pub property: Option<String>,
    pub current_salary: f64,
    pub uniform_cost: Option<f64>,
    pub monthly_deduction: Option<f64>,
}

impl From<&Guard> for GuardCreate {
    fn from(g: &Guard) -> Self {
        Self {
            name: g.name.clone(),
            contact_number: g.contact_number.clone(),
            address: g.address.clone(),
            property: g.property.clone(),
            current_salary: g.current_salary,
            uniform_cost: g.uniform_cost,
            monthly_deduction: g.monthly_deduction,
        }
    }
}
