//! Salary calculator and payment bookkeeping.
//!
//! The API computes a record's `final_salary` (including the uniform
//! deduction the client never sees). Before a record exists the console shows
//! a local estimate, `base - deductions + bonus`, clearly labelled as such;
//! once the API has answered, its figure replaces the estimate.

use chrono::{DateTime, Utc};

use crate::models::{Guard, PaymentUpdate, SalaryCreate, SalaryRecord};
use crate::utils::format_pkr;

/// Shown next to every local estimate.
pub const ESTIMATE_DISCLOSURE: &str =
    "Estimate only; excludes the uniform deduction applied when the record is created";

/// Parse a form amount. Blank, unparseable and non-finite input count as zero.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `base - deductions + bonus`, with non-finite inputs treated as zero.
/// The result may be negative when deductions exceed base plus bonus.
pub fn preview(base: f64, deductions: f64, bonus: f64) -> f64 {
    finite_or_zero(base) - finite_or_zero(deductions) + finite_or_zero(bonus)
}

// ============================================================================
// Estimate vs. authoritative figure
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SalaryFigure {
    /// Computed locally; the uniform deduction is not included.
    Estimated(f64),
    /// `final_salary` as returned by the API.
    Authoritative(f64),
}

impl SalaryFigure {
    pub fn amount(&self) -> f64 {
        match self {
            SalaryFigure::Estimated(amount) | SalaryFigure::Authoritative(amount) => *amount,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, SalaryFigure::Estimated(_))
    }

    pub fn disclosure(&self) -> Option<&'static str> {
        self.is_estimate().then_some(ESTIMATE_DISCLOSURE)
    }

    pub fn display(&self) -> String {
        match self {
            SalaryFigure::Estimated(amount) => format!("~{} (estimate)", format_pkr(*amount)),
            SalaryFigure::Authoritative(amount) => format_pkr(*amount),
        }
    }
}

/// A salary form being filled in for one guard and period.
///
/// Inputs are kept as typed so that a half-entered amount does not lose
/// what the user wrote; they are parsed on every preview.
#[derive(Debug, Clone, Default)]
pub struct SalaryDraft {
    pub guard_contact_number: String,
    pub month: u32,
    pub year: i32,
    pub base: f64,
    pub deductions: String,
    pub bonus: String,
    pub notes: String,
    record: Option<SalaryRecord>,
}

impl SalaryDraft {
    pub fn new(guard_contact_number: impl Into<String>, month: u32, year: i32, base: f64) -> Self {
        Self {
            guard_contact_number: guard_contact_number.into(),
            month,
            year,
            base,
            ..Default::default()
        }
    }

    pub fn for_guard(guard: &Guard, month: u32, year: i32) -> Self {
        Self::new(guard.contact_number.as_str(), month, year, guard.current_salary)
    }

    pub fn deductions_amount(&self) -> f64 {
        parse_amount(&self.deductions)
    }

    pub fn bonus_amount(&self) -> f64 {
        parse_amount(&self.bonus)
    }

    /// The figure to show: the API's once a record exists, otherwise the estimate.
    pub fn figure(&self) -> SalaryFigure {
        match &self.record {
            Some(record) => SalaryFigure::Authoritative(record.final_salary),
            None => SalaryFigure::Estimated(preview(
                self.base,
                self.deductions_amount(),
                self.bonus_amount(),
            )),
        }
    }

    /// Record the API's answer to this draft's submission.
    pub fn settle(&mut self, record: SalaryRecord) {
        self.record = Some(record);
    }

    pub fn record(&self) -> Option<&SalaryRecord> {
        self.record.as_ref()
    }

    pub fn to_create(&self) -> SalaryCreate {
        let notes = self.notes.trim();
        SalaryCreate {
            guard_contact_number: self.guard_contact_number.clone(),
            month: self.month,
            year: self.year,
            deductions: Some(self.deductions_amount()),
            bonus: Some(self.bonus_amount()),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

// ============================================================================
// Payment state
// ============================================================================

/// Body that moves a record to `paid`, stamped with `now`.
pub fn mark_paid(now: DateTime<Utc>) -> PaymentUpdate {
    PaymentUpdate {
        is_paid: true,
        payment_date: Some(now),
    }
}

/// Body that moves a record back to unpaid; the payment date is cleared.
pub fn mark_unpaid() -> PaymentUpdate {
    PaymentUpdate {
        is_paid: false,
        payment_date: None,
    }
}

/// Body that flips the current payment state of `record`.
pub fn toggle_payment(record: &SalaryRecord, now: DateTime<Utc>) -> PaymentUpdate {
    if record.is_paid {
        mark_unpaid()
    } else {
        mark_paid(now)
    }
}

/// Apply a payment update locally, e.g. to patch a cached list after the API
/// has accepted it.
pub fn apply_payment(record: &mut SalaryRecord, update: &PaymentUpdate) {
    record.is_paid = update.is_paid;
    record.payment_date = if update.is_paid { update.payment_date } else { None };
}

/// Other records for the same guard contact number as `id`.
///
/// Contact numbers are not unique per record (one guard has a record per
/// month), so anything keyed by contact number could hit several of these.
pub fn records_sharing_contact(records: &[SalaryRecord], id: i64) -> Vec<&SalaryRecord> {
    let Some(target) = records.iter().find(|r| r.id == id) else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| r.id != id && r.guard_contact_number == target.guard_contact_number)
        .collect()
}

// ============================================================================
// Totals
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayrollSummary {
    pub paid_total: f64,
    pub pending_total: f64,
    pub paid_count: usize,
    pub pending_count: usize,
}

impl PayrollSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SalaryRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut summary, record| {
            let amount = finite_or_zero(record.final_salary);
            if record.is_paid {
                summary.paid_total += amount;
                summary.paid_count += 1;
            } else {
                summary.pending_total += amount;
                summary.pending_count += 1;
            }
            summary
        })
    }

    pub fn total(&self) -> f64 {
        self.paid_total + self.pending_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, contact: &str, final_salary: f64, is_paid: bool) -> SalaryRecord {
        SalaryRecord {
            id,
            guard_contact_number: contact.to_string(),
            month: 3,
            year: 2024,
            deductions: None,
            bonus: None,
            uniform_deduction: None,
            final_salary,
            is_paid,
            payment_date: None,
            notes: None,
        }
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview(25000.0, 1000.0, 2000.0), 26000.0);
        assert_eq!(preview(0.0, parse_amount("abc"), 500.0), 500.0);
        assert_eq!(preview(1000.0, 3000.0, 0.0), -2000.0);
        assert_eq!(preview(f64::NAN, 100.0, f64::INFINITY), -100.0);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("  "), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("1,500"), 1500.0);
        assert_eq!(parse_amount(" 250.5 "), 250.5);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }

    #[test]
    fn test_draft_estimate_then_authoritative() {
        let guard: Guard = serde_json::from_str(
            r#"{"id": 1, "name": "John Doe", "contact_number": "03001234567", "current_salary": 25000}"#,
        )
        .unwrap();
        let mut draft = SalaryDraft::for_guard(&guard, 3, 2024);
        draft.deductions = "1000".to_string();
        draft.bonus = "2000".to_string();

        let estimate = draft.figure();
        assert_eq!(estimate, SalaryFigure::Estimated(26000.0));
        assert!(estimate.disclosure().unwrap().contains("uniform deduction"));
        assert_eq!(estimate.display(), "~Rs 26,000 (estimate)");

        // The API also took the uniform deduction
        draft.settle(record(9, "03001234567", 25500.0, false));
        assert_eq!(draft.figure(), SalaryFigure::Authoritative(25500.0));
        assert_eq!(draft.figure().disclosure(), None);
    }

    #[test]
    fn test_draft_to_create() {
        let draft = SalaryDraft {
            guard_contact_number: "1".to_string(),
            month: 12,
            year: 2024,
            deductions: "oops".to_string(),
            notes: "  ".to_string(),
            ..Default::default()
        };
        let body = draft.to_create();
        assert_eq!(body.deductions, Some(0.0));
        assert_eq!(body.notes, None);
    }

    #[test]
    fn test_paid_toggle_stamps_and_clears_date() {
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();
        let mut rec = record(1, "1", 20000.0, false);

        let update = toggle_payment(&rec, now);
        assert_eq!(update, PaymentUpdate { is_paid: true, payment_date: Some(now) });
        apply_payment(&mut rec, &update);
        assert!(rec.is_paid);
        assert_eq!(rec.payment_date, Some(now));

        let update = toggle_payment(&rec, now);
        assert_eq!(update, mark_unpaid());
        apply_payment(&mut rec, &update);
        assert!(!rec.is_paid);
        assert_eq!(rec.payment_date, None);
    }

    #[test]
    fn test_records_sharing_contact() {
        let records = vec![
            record(1, "0300", 1.0, false),
            record(2, "0300", 1.0, true),
            record(3, "0321", 1.0, false),
        ];
        let shared: Vec<i64> = records_sharing_contact(&records, 1).iter().map(|r| r.id).collect();
        assert_eq!(shared, vec![2]);
        assert!(records_sharing_contact(&records, 3).is_empty());
        assert!(records_sharing_contact(&records, 99).is_empty());
    }

    #[test]
    fn test_payroll_summary() {
        let records = vec![
            record(1, "a", 20000.0, true),
            record(2, "b", 15000.0, false),
            record(3, "c", 5000.0, false),
        ];
        let summary = PayrollSummary::from_records(&records);
        assert_eq!(summary.paid_total, 20000.0);
        assert_eq!(summary.pending_total, 20000.0);
        assert_eq!((summary.paid_count, summary.pending_count), (1, 2));
        assert_eq!(summary.total(), 40000.0);
        assert_eq!(PayrollSummary::from_records(&[]), PayrollSummary::default());
    }
}
