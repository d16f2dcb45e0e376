use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::dates::optional_date;

/// Duty status of an assignment. Unknown values are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DutyStatus {
    #[default]
    OnDuty,
    OffDuty,
    Other(String),
}

impl DutyStatus {
    pub fn as_wire(&self) -> &str {
        match self {
            DutyStatus::OnDuty => "ON_DUTY",
            DutyStatus::OffDuty => "OFF_DUTY",
            DutyStatus::Other(raw) => raw,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            DutyStatus::OnDuty => "On Duty",
            DutyStatus::OffDuty => "Off Duty",
            DutyStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for DutyStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "ON_DUTY" => DutyStatus::OnDuty,
            "OFF_DUTY" => DutyStatus::OffDuty,
            _ => DutyStatus::Other(raw),
        }
    }
}

impl From<DutyStatus> for String {
    fn from(status: DutyStatus) -> Self {
        status.as_wire().to_string()
    }
}

impl std::str::FromStr for DutyStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DutyStatus::from(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    #[default]
    Day,
    Night,
}

impl ShiftType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShiftType::Day => "Day",
            ShiftType::Night => "Night",
        }
    }
}

impl std::str::FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ShiftType::Day),
            "night" => Ok(ShiftType::Night),
            other => Err(format!("unknown shift type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DutyAssignment {
    pub id: i64,
    pub guard_contact_number: String,
    pub client_contact_number: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default, with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub start_date: Option<NaiveDate>,
    /// `None` means the assignment is ongoing.
    #[serde(default, with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub duty_status: DutyStatus,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub shift_type: ShiftType,
}

impl DutyAssignment {
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }

    pub fn is_historical(&self) -> bool {
        !self.is_ongoing()
    }

    pub fn matches_search(&self, query: &str) -> bool {
        query.is_empty()
            || self.guard_contact_number.contains(query)
            || self.client_contact_number.contains(query)
            || self
                .company_name
                .as_deref()
                .is_some_and(|c| crate::utils::contains_ignore_case(c, query))
    }
}

/// Body for `POST /dutyassignment/` and `PUT /dutyassignment/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AssignmentCreate {
    pub guard_contact_number: String,
    pub client_contact_number: String,
    pub company_name: Option<String>,
    #[serde(with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "optional_date")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub end_date: Option<NaiveDate>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub duty_status: DutyStatus,
    pub shift_type: ShiftType,
}

impl From<&DutyAssignment> for AssignmentCreate {
    fn from(a: &DutyAssignment) -> Self {
        Self {
            guard_contact_number: a.guard_contact_number.clone(),
            client_contact_number: a.client_contact_number.clone(),
            company_name: a.company_name.clone(),
            start_date: a.start_date,
            end_date: a.end_date,
            duty_status: a.duty_status.clone(),
            shift_type: a.shift_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_with_datetime_and_null_end() {
        let json = r#"{"id": 3, "guard_contact_number": "03001234567",
                       "client_contact_number": "0421234567", "company_name": "Alpha Corp Ltd.",
                       "start_date": "2024-01-15T00:00:00", "end_date": null,
                       "duty_status": "ON_DUTY", "shift_type": "night"}"#;
        let a: DutyAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(a.start_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(a.is_ongoing());
        assert_eq!(a.shift_type, ShiftType::Night);
        assert_eq!(a.duty_status, DutyStatus::OnDuty);
    }

    #[test]
    fn test_null_status_and_shift_take_defaults() {
        let json = r#"{"id": 5, "guard_contact_number": "1", "client_contact_number": "2",
                       "duty_status": null, "shift_type": null}"#;
        let a: DutyAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(a.duty_status, DutyStatus::OnDuty);
        assert_eq!(a.shift_type, ShiftType::default());
    }

    #[test]
    fn test_assignment_with_end_date_is_historical() {
        let json = r#"{"id": 4, "guard_contact_number": "1", "client_contact_number": "2",
                       "start_date": "2024-01-15", "end_date": "2024-03-01",
                       "duty_status": "off_duty", "shift_type": "day"}"#;
        let a: DutyAssignment = serde_json::from_str(json).unwrap();
        assert!(a.is_historical());
        assert_eq!(a.duty_status, DutyStatus::OffDuty);
    }

    #[test]
    fn test_assignment_create_serializes_plain_dates() {
        let body = AssignmentCreate {
            guard_contact_number: "1".into(),
            client_contact_number: "2".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..Default::default()
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["start_date"], "2024-02-01");
        assert!(value["end_date"].is_null());
        assert_eq!(value["duty_status"], "ON_DUTY");
        assert_eq!(value["shift_type"], "day");
    }

    #[test]
    fn test_shift_type_from_str() {
        assert_eq!("Night".parse::<ShiftType>(), Ok(ShiftType::Night));
        assert!("evening".parse::<ShiftType>().is_err());
    }
}
