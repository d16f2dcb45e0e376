//! Submit-time checks for the create/update forms.
//!
//! These run before any request is sent, so a form the API would reject
//! with a 400 never leaves the console.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{AssignmentCreate, ClientCreate, GuardCreate, InventoryCreate, SalaryCreate};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Year {0} is out of range")]
    InvalidYear(i32),

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,
}

/// A form body that can be checked before submission.
pub trait Validate {
    /// Every problem with the form, in field order.
    fn errors(&self) -> Vec<ValidationError>;

    /// The first problem, if any.
    fn validate(&self) -> Result<(), ValidationError> {
        match self.errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn required(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Required { field });
    }
}

fn amount(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::NotANumber { field });
    } else if value < 0.0 {
        errors.push(ValidationError::Negative { field });
    }
}

fn optional_amount(errors: &mut Vec<ValidationError>, field: &'static str, value: Option<f64>) {
    if let Some(value) = value {
        amount(errors, field, value);
    }
}

impl Validate for GuardCreate {
    fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        required(&mut errors, "Name", &self.name);
        required(&mut errors, "Contact number", &self.contact_number);
        amount(&mut errors, "Salary", self.current_salary);
        optional_amount(&mut errors, "Uniform cost", self.uniform_cost);
        optional_amount(&mut errors, "Monthly deduction", self.monthly_deduction);
        errors
    }
}

impl Validate for ClientCreate {
    fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        required(&mut errors, "Name", &self.name);
        required(&mut errors, "Contact number", &self.contact_number);
        amount(&mut errors, "Contract rate", self.contract_rate);
        errors
    }
}

impl Validate for AssignmentCreate {
    fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        required(&mut errors, "Guard", &self.guard_contact_number);
        required(&mut errors, "Client", &self.client_contact_number);
        match (self.start_date, self.end_date) {
            (None, _) => errors.push(ValidationError::Required { field: "Start date" }),
            (Some(start), Some(end)) if end < start => {
                errors.push(ValidationError::EndBeforeStart { start, end })
            }
            _ => {}
        }
        errors
    }
}

impl Validate for SalaryCreate {
    fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        required(&mut errors, "Guard", &self.guard_contact_number);
        if !(1..=12).contains(&self.month) {
            errors.push(ValidationError::InvalidMonth(self.month));
        }
        if !(2000..=2100).contains(&self.year) {
            errors.push(ValidationError::InvalidYear(self.year));
        }
        optional_amount(&mut errors, "Deductions", self.deductions);
        optional_amount(&mut errors, "Bonus", self.bonus);
        errors
    }
}

impl Validate for InventoryCreate {
    fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        required(&mut errors, "Guard", &self.guard_contact);
        required(&mut errors, "Item name", &self.item_name);
        if self.quantity < 1 {
            errors.push(ValidationError::InvalidQuantity);
        }
        amount(&mut errors, "Cost", self.cost);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, InventoryStatus, ItemType};

    #[test]
    fn test_guard_form() {
        let mut form = GuardCreate {
            name: "John Doe".to_string(),
            contact_number: "03001234567".to_string(),
            current_salary: 25000.0,
            ..Default::default()
        };
        assert_eq!(form.validate(), Ok(()));

        form.name = "  ".to_string();
        form.current_salary = f64::NAN;
        form.uniform_cost = Some(-5.0);
        assert_eq!(
            form.errors(),
            vec![
                ValidationError::Required { field: "Name" },
                ValidationError::NotANumber { field: "Salary" },
                ValidationError::Negative { field: "Uniform cost" },
            ]
        );
        assert_eq!(form.validate().unwrap_err().to_string(), "Name is required");
    }

    #[test]
    fn test_assignment_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut form = AssignmentCreate {
            guard_contact_number: "1".into(),
            client_contact_number: "2".into(),
            start_date: start,
            end_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(ValidationError::EndBeforeStart { .. })));

        form.end_date = start;
        assert_eq!(form.validate(), Ok(()));

        form.start_date = None;
        assert_eq!(
            form.validate(),
            Err(ValidationError::Required { field: "Start date" })
        );
    }

    #[test]
    fn test_salary_form() {
        let form = SalaryCreate {
            guard_contact_number: "1".into(),
            month: 13,
            year: 2024,
            deductions: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            form.errors(),
            vec![
                ValidationError::InvalidMonth(13),
                ValidationError::Negative { field: "Deductions" },
            ]
        );
    }

    #[test]
    fn test_inventory_quantity() {
        let form = InventoryCreate {
            guard_contact: "1".into(),
            item_name: "Radio".into(),
            item_type: ItemType::Radio,
            quantity: 0,
            issue_date: None,
            condition_on_issue: Condition::Good,
            cost: 0.0,
            notes: None,
            status: InventoryStatus::Issued,
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidQuantity));
    }

    #[test]
    fn test_client_form() {
        let form = ClientCreate {
            name: "Alpha".into(),
            contact_number: "".into(),
            contract_rate: 150000.0,
            ..Default::default()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::Required { field: "Contact number" })
        );
    }
}
