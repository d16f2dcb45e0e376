//! Data models for the staffing API.
//!
//! - `Guard`, `GuardStatus`: guard profiles and employment economics
//! - `Client`: client organizations and contract rates
//! - `DutyAssignment`: which guard is posted to which client, on what shift
//! - `SalaryRecord`, `SalaryCreate`, `PaymentUpdate`: payroll
//! - `InventoryRecord`: equipment issued to guards
//!
//! Each list-able model implements `Resource`, which ties it to its API path
//! and cache namespace.

use serde::{de::DeserializeOwned, Serialize};

pub mod assignment;
pub mod client;
pub mod guard;
pub mod inventory;
pub mod salary;

pub use assignment::{AssignmentCreate, DutyAssignment, DutyStatus, ShiftType};
pub use client::{Client, ClientCreate};
pub use guard::{Guard, GuardCreate, GuardStatus};
pub use inventory::{Condition, InventoryCreate, InventoryRecord, InventoryStatus, ItemType};
pub use salary::{PaymentUpdate, SalaryCreate, SalaryRecord};

/// A remote collection the console lists, caches and mutates.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Path segment under the API base URL, e.g. `guard`.
    const PATH: &'static str;
    /// Cache namespace for list snapshots, e.g. `guards`.
    const NAMESPACE: &'static str;

    fn id(&self) -> i64;
}

impl Resource for Guard {
    const PATH: &'static str = "guard";
    const NAMESPACE: &'static str = "guards";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for Client {
    const PATH: &'static str = "client";
    const NAMESPACE: &'static str = "clients";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for DutyAssignment {
    const PATH: &'static str = "dutyassignment";
    const NAMESPACE: &'static str = "duty_assignments";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for SalaryRecord {
    const PATH: &'static str = "salaryrecord";
    const NAMESPACE: &'static str = "salary_records";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for InventoryRecord {
    const PATH: &'static str = "inventory";
    const NAMESPACE: &'static str = "inventory";

    fn id(&self) -> i64 {
        self.id
    }
}
