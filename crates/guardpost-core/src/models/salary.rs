use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::dates::optional_timestamp;

/// A payroll record for one guard and one pay period.
///
/// `uniform_deduction` and `final_salary` are computed by the API and are the
/// authoritative figures; see `crate::salary` for the local estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SalaryRecord {
    pub id: i64,
    pub guard_contact_number: String,
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub deductions: Option<f64>,
    #[serde(default)]
    pub bonus: Option<f64>,
    #[serde(default)]
    pub uniform_deduction: Option<f64>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub final_salary: f64,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub is_paid: bool,
    #[serde(default, with = "optional_timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SalaryRecord {
    pub fn period_display(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Body for `POST /salaryrecord/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SalaryCreate {
    pub guard_contact_number: String,
    pub month: u32,
    pub year: i32,
    pub deductions: Option<f64>,
    pub bonus: Option<f64>,
    pub notes: Option<String>,
}

/// Body for `PUT /salaryrecord/{id}` when toggling payment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PaymentUpdate {
    pub is_paid: bool,
    #[serde(with = "optional_timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub payment_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_salary_record() {
        let json = r#"{"id": 11, "guard_contact_number": "03001234567", "month": 3, "year": 2024,
                       "deductions": 1000, "bonus": null, "uniform_deduction": 500,
                       "final_salary": 23500, "is_paid": true,
                       "payment_date": "2024-04-01T09:00:00", "notes": null}"#;
        let record: SalaryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.final_salary, 23500.0);
        assert_eq!(record.bonus, None);
        assert!(record.payment_date.is_some());
        assert_eq!(record.period_display(), "2024-03");
    }

    #[test]
    fn test_payment_update_serializes_null_date() {
        let body = PaymentUpdate { is_paid: false, payment_date: None };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"is_paid":false,"payment_date":null}"#
        );
    }
}
