//! Equipment issue and return bookkeeping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Condition, InventoryRecord, InventoryStatus};
use crate::utils::contains_ignore_case;

#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("Item {id} is already {status}; only issued items can be returned")]
    NotIssued { id: i64, status: &'static str },

    #[error("A return must end in Returned, Damaged or Lost")]
    InvalidReturnStatus,

    #[error("Return date {return_date} is before issue date {issue_date}")]
    ReturnBeforeIssue {
        issue_date: NaiveDate,
        return_date: NaiveDate,
    },
}

/// Search over guard name, item name and item type, plus an optional status.
pub fn matches(record: &InventoryRecord, search: &str, status: Option<InventoryStatus>) -> bool {
    let search = search.trim();
    let matches_search = search.is_empty()
        || record
            .guard_name
            .as_deref()
            .is_some_and(|name| contains_ignore_case(name, search))
        || contains_ignore_case(&record.item_name, search)
        || contains_ignore_case(record.item_type.as_str(), search);
    let matches_status = status.map_or(true, |s| record.status == s);
    matches_search && matches_status
}

pub fn filter<'a>(
    records: &'a [InventoryRecord],
    search: &str,
    status: Option<InventoryStatus>,
) -> Vec<&'a InventoryRecord> {
    records
        .iter()
        .filter(|r| matches(r, search, status))
        .collect()
}

/// Closing out an issued item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReturnRequest {
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub return_date: NaiveDate,
    pub status: InventoryStatus,
    pub condition_on_return: Condition,
    pub notes: Option<String>,
}

impl ReturnRequest {
    /// A plain return in good condition.
    pub fn returned_on(return_date: NaiveDate) -> Self {
        Self {
            return_date,
            status: InventoryStatus::Returned,
            condition_on_return: Condition::Good,
            notes: None,
        }
    }

    /// Apply this return to `record`, producing the updated record to PUT.
    /// Empty notes keep whatever the record already had.
    pub fn apply(&self, record: &InventoryRecord) -> Result<InventoryRecord, InventoryError> {
        if record.status != InventoryStatus::Issued {
            return Err(InventoryError::NotIssued {
                id: record.id,
                status: record.status.label(),
            });
        }
        if self.status == InventoryStatus::Issued {
            return Err(InventoryError::InvalidReturnStatus);
        }
        if let Some(issue_date) = record.issue_date {
            if self.return_date < issue_date {
                return Err(InventoryError::ReturnBeforeIssue {
                    issue_date,
                    return_date: self.return_date,
                });
            }
        }

        let mut updated = record.clone();
        updated.status = self.status;
        updated.return_date = Some(self.return_date);
        updated.condition_on_return = Some(self.condition_on_return);
        if let Some(notes) = self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            updated.notes = Some(notes.to_string());
        }
        Ok(updated)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InventorySummary {
    pub issued: usize,
    pub returned: usize,
    pub damaged: usize,
    pub lost: usize,
    pub total_cost: f64,
}

impl InventorySummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a InventoryRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            match record.status {
                InventoryStatus::Issued => summary.issued += 1,
                InventoryStatus::Returned => summary.returned += 1,
                InventoryStatus::Damaged => summary.damaged += 1,
                InventoryStatus::Lost => summary.lost += 1,
            }
            if record.cost.is_finite() {
                summary.total_cost += record.cost;
            }
            summary
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;
    use serde_json::json;

    fn records() -> Vec<InventoryRecord> {
        serde_json::from_value(json!([
            {"id": 1, "guard_name": "John Doe", "guard_contact": "1", "item_name": "Security Uniform Set",
             "item_type": "uniform", "issue_date": "2024-01-15", "cost": 5000, "status": "ISSUED"},
            {"id": 2, "guard_name": "Sarah Smith", "guard_contact": "2", "item_name": "Walkie Talkie",
             "item_type": "radio", "issue_date": "2024-01-18", "cost": 8000, "status": "ISSUED"},
            {"id": 3, "guard_name": "Mike Johnson", "guard_contact": "3", "item_name": "Security Baton",
             "item_type": "baton", "issue_date": "2024-01-20", "cost": 1200, "status": "RETURNED"}
        ]))
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_by_search_and_status() {
        let records = records();
        assert_eq!(filter(&records, "sarah", None).len(), 1);
        assert_eq!(filter(&records, "BATON", None).len(), 1);
        assert_eq!(filter(&records, "radio", None)[0].item_type, ItemType::Radio);
        assert_eq!(filter(&records, "", Some(InventoryStatus::Issued)).len(), 2);
        assert!(filter(&records, "mike", Some(InventoryStatus::Issued)).is_empty());
    }

    #[test]
    fn test_return_issued_item() {
        let records = records();
        let request = ReturnRequest {
            return_date: date(2024, 3, 1),
            status: InventoryStatus::Damaged,
            condition_on_return: Condition::Poor,
            notes: Some("Cracked antenna".to_string()),
        };
        let updated = request.apply(&records[1]).unwrap();
        assert_eq!(updated.status, InventoryStatus::Damaged);
        assert_eq!(updated.return_date, Some(date(2024, 3, 1)));
        assert_eq!(updated.condition_on_return, Some(Condition::Poor));
        assert_eq!(updated.notes.as_deref(), Some("Cracked antenna"));
    }

    #[test]
    fn test_return_rejections() {
        let records = records();
        let request = ReturnRequest::returned_on(date(2024, 3, 1));
        assert_eq!(
            request.apply(&records[2]).unwrap_err(),
            InventoryError::NotIssued { id: 3, status: "Returned" }
        );

        let early = ReturnRequest::returned_on(date(2024, 1, 1));
        assert!(matches!(
            early.apply(&records[0]),
            Err(InventoryError::ReturnBeforeIssue { .. })
        ));

        let reissue = ReturnRequest {
            status: InventoryStatus::Issued,
            ..ReturnRequest::returned_on(date(2024, 3, 1))
        };
        assert_eq!(reissue.apply(&records[0]).unwrap_err(), InventoryError::InvalidReturnStatus);
    }

    #[test]
    fn test_summary() {
        let summary = InventorySummary::from_records(&records());
        assert_eq!((summary.issued, summary.returned, summary.damaged), (2, 1, 0));
        assert_eq!(summary.total_cost, 14200.0);
    }
}
