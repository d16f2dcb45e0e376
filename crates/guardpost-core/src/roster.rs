//! Cross-referencing between resources.
//!
//! The API links records by contact number rather than id: an assignment
//! names its guard and client by `contact_number`, a salary record names its
//! guard the same way. Everything here resolves those references against the
//! guard and client lists the console already has cached.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::models::{
    Client, DutyAssignment, DutyStatus, Guard, InventoryRecord, InventoryStatus, SalaryRecord,
    ShiftType,
};
use crate::utils::contains_ignore_case;

/// Guards and clients indexed by contact number.
#[derive(Debug, Default)]
pub struct Directory<'a> {
    guards: HashMap<&'a str, &'a Guard>,
    clients: HashMap<&'a str, &'a Client>,
}

impl<'a> Directory<'a> {
    pub fn new(guards: &'a [Guard], clients: &'a [Client]) -> Self {
        Self {
            guards: guards.iter().map(|g| (g.contact_number.as_str(), g)).collect(),
            clients: clients.iter().map(|c| (c.contact_number.as_str(), c)).collect(),
        }
    }

    pub fn guard(&self, contact: &str) -> Option<&'a Guard> {
        self.guards.get(contact).copied()
    }

    pub fn client(&self, contact: &str) -> Option<&'a Client> {
        self.clients.get(contact).copied()
    }

    /// Guard name, or the raw contact number when the guard is unknown.
    pub fn guard_name(&self, contact: &'a str) -> &'a str {
        self.guard(contact).map(|g| g.name.as_str()).unwrap_or(contact)
    }

    /// Client display name, or the raw contact number when the client is unknown.
    pub fn client_name(&self, contact: &'a str) -> &'a str {
        self.client(contact).map(|c| c.display_name()).unwrap_or(contact)
    }

    pub fn resolve(&self, assignment: &'a DutyAssignment) -> AssignmentRow<'a> {
        AssignmentRow {
            assignment,
            guard_name: self.guard_name(&assignment.guard_contact_number),
            client_name: assignment
                .company_name
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| self.client_name(&assignment.client_contact_number)),
        }
    }

    /// Salary search: the referenced guard's name or contact number contains
    /// `query`. Records for unknown guards match on their own contact number.
    pub fn salary_matches(&self, record: &SalaryRecord, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        match self.guard(&record.guard_contact_number) {
            Some(guard) => {
                contains_ignore_case(&guard.name, query) || guard.contact_number.contains(query)
            }
            None => record.guard_contact_number.contains(query),
        }
    }

    pub fn filter_salaries<'r>(&self, records: &'r [SalaryRecord], query: &str) -> Vec<&'r SalaryRecord> {
        records
            .iter()
            .filter(|r| self.salary_matches(r, query))
            .collect()
    }
}

/// An assignment with its guard and client resolved to names.
#[derive(Debug, Clone)]
pub struct AssignmentRow<'a> {
    pub assignment: &'a DutyAssignment,
    pub guard_name: &'a str,
    pub client_name: &'a str,
}

impl AssignmentRow<'_> {
    /// Search over the resolved names as well as the raw assignment fields.
    pub fn matches_search(&self, query: &str) -> bool {
        self.assignment.matches_search(query)
            || contains_ignore_case(self.guard_name, query)
            || contains_ignore_case(self.client_name, query)
    }
}

/// Count of ongoing assignments for `client`.
pub fn guards_assigned(client: &Client, assignments: &[DutyAssignment]) -> u32 {
    assignments
        .iter()
        .filter(|a| a.is_ongoing() && a.client_contact_number == client.contact_number)
        .count() as u32
}

/// Fill in `guards_assigned` on clients the API left it blank for.
pub fn fill_guards_assigned(clients: &mut [Client], assignments: &[DutyAssignment]) {
    for client in clients.iter_mut().filter(|c| c.guards_assigned.is_none()) {
        client.guards_assigned = Some(guards_assigned(client, assignments));
    }
}

// ============================================================================
// Client rosters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostedGuard {
    pub contact_number: String,
    pub name: String,
    pub shift_type: ShiftType,
    pub duty_status: DutyStatus,
}

/// The guards currently posted at one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRoster {
    pub client_contact_number: String,
    pub client_name: String,
    pub guards: Vec<PostedGuard>,
}

impl ClientRoster {
    pub fn on_duty(&self) -> usize {
        self.count(&DutyStatus::OnDuty)
    }

    pub fn off_duty(&self) -> usize {
        self.count(&DutyStatus::OffDuty)
    }

    fn count(&self, status: &DutyStatus) -> usize {
        self.guards.iter().filter(|g| &g.duty_status == status).count()
    }
}

/// One roster per client with at least one ongoing assignment, ordered by
/// client name. Assignments for clients not in the directory still get a
/// roster under their contact number.
pub fn client_rosters(directory: &Directory<'_>, assignments: &[DutyAssignment]) -> Vec<ClientRoster> {
    let mut by_client: BTreeMap<&str, Vec<&DutyAssignment>> = BTreeMap::new();
    for assignment in assignments.iter().filter(|a| a.is_ongoing()) {
        by_client
            .entry(assignment.client_contact_number.as_str())
            .or_default()
            .push(assignment);
    }

    let mut rosters: Vec<ClientRoster> = by_client
        .into_iter()
        .map(|(contact, posted)| {
            let row = directory.resolve(posted[0]);
            ClientRoster {
                client_contact_number: contact.to_string(),
                client_name: row.client_name.to_string(),
                guards: posted
                    .iter()
                    .map(|a| PostedGuard {
                        contact_number: a.guard_contact_number.clone(),
                        name: directory.guard_name(&a.guard_contact_number).to_string(),
                        shift_type: a.shift_type,
                        duty_status: a.duty_status.clone(),
                    })
                    .collect(),
            }
        })
        .collect();
    rosters.sort_by(|a, b| a.client_name.to_lowercase().cmp(&b.client_name.to_lowercase()));
    rosters
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_guards: usize,
    pub total_clients: usize,
    pub guards_on_duty: usize,
    /// Sum of current salaries of guards still on the payroll.
    pub monthly_payroll: f64,
    pub inventory_issued: usize,
    pub pending_returns: usize,
}

impl DashboardStats {
    pub fn compute(
        guards: &[Guard],
        clients: &[Client],
        assignments: &[DutyAssignment],
        inventory: &[InventoryRecord],
    ) -> Self {
        // A guard is on duty through an ongoing on-duty posting or their own status
        let mut on_duty: HashSet<&str> = assignments
            .iter()
            .filter(|a| a.is_ongoing() && a.duty_status == DutyStatus::OnDuty)
            .map(|a| a.guard_contact_number.as_str())
            .collect();
        on_duty.extend(
            guards
                .iter()
                .filter(|g| g.status == crate::models::GuardStatus::OnDuty)
                .map(|g| g.contact_number.as_str()),
        );

        Self {
            total_guards: guards.len(),
            total_clients: clients.len(),
            guards_on_duty: on_duty.len(),
            monthly_payroll: guards
                .iter()
                .filter(|g| g.status.is_employed() && g.current_salary.is_finite())
                .map(|g| g.current_salary)
                .sum(),
            inventory_issued: inventory.len(),
            pending_returns: inventory
                .iter()
                .filter(|r| r.status == InventoryStatus::Issued)
                .count(),
        }
    }

    /// Share of guards on duty, as a whole percentage.
    pub fn deployment_rate(&self) -> u32 {
        if self.total_guards == 0 {
            return 0;
        }
        ((self.guards_on_duty as f64 / self.total_guards as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guard(contact: &str, name: &str, salary: f64, status: &str) -> Guard {
        serde_json::from_value(json!({
            "id": 1, "name": name, "contact_number": contact,
            "current_salary": salary, "status": status
        }))
        .unwrap()
    }

    fn client(contact: &str, company: &str) -> Client {
        serde_json::from_value(json!({
            "id": 1, "name": company, "company_name": company, "contact_number": contact
        }))
        .unwrap()
    }

    fn assignment(guard: &str, client: &str, end: Option<&str>, status: &str) -> DutyAssignment {
        serde_json::from_value(json!({
            "id": 1, "guard_contact_number": guard, "client_contact_number": client,
            "start_date": "2024-01-01", "end_date": end,
            "duty_status": status, "shift_type": "night"
        }))
        .unwrap()
    }

    fn salary(contact: &str) -> SalaryRecord {
        serde_json::from_value(json!({
            "id": 1, "guard_contact_number": contact, "month": 1, "year": 2024, "final_salary": 100
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_falls_back_to_contact() {
        let guards = vec![guard("0300", "John Doe", 25000.0, "ACTIVE")];
        let clients = vec![client("042", "Alpha Corp")];
        let dir = Directory::new(&guards, &clients);

        let known = assignment("0300", "042", None, "ON_DUTY");
        let row = dir.resolve(&known);
        assert_eq!((row.guard_name, row.client_name), ("John Doe", "Alpha Corp"));
        assert!(row.matches_search("john"));

        let unknown = assignment("0399", "051", None, "ON_DUTY");
        let row = dir.resolve(&unknown);
        assert_eq!((row.guard_name, row.client_name), ("0399", "051"));
    }

    #[test]
    fn test_guards_assigned_counts_ongoing_only() {
        let mut clients = vec![client("042", "Alpha Corp"), client("051", "Beta")];
        clients[1].guards_assigned = Some(7);
        let assignments = vec![
            assignment("1", "042", None, "ON_DUTY"),
            assignment("2", "042", None, "OFF_DUTY"),
            assignment("3", "042", Some("2024-02-01"), "OFF_DUTY"),
        ];
        assert_eq!(guards_assigned(&clients[0], &assignments), 2);

        fill_guards_assigned(&mut clients, &assignments);
        assert_eq!(clients[0].guards_assigned, Some(2));
        // Values from the API are left alone
        assert_eq!(clients[1].guards_assigned, Some(7));
    }

    #[test]
    fn test_client_rosters() {
        let guards = vec![
            guard("1", "Imran", 0.0, "ON_DUTY"),
            guard("2", "Bilal", 0.0, "OFF_DUTY"),
        ];
        let clients = vec![client("042", "Zeta Mills"), client("051", "Alpha Corp")];
        let dir = Directory::new(&guards, &clients);
        let assignments = vec![
            assignment("1", "042", None, "ON_DUTY"),
            assignment("2", "042", None, "OFF_DUTY"),
            assignment("2", "051", None, "ON_DUTY"),
            assignment("1", "051", Some("2024-01-10"), "ON_DUTY"),
        ];

        let rosters = client_rosters(&dir, &assignments);
        assert_eq!(rosters.len(), 2);
        assert_eq!(rosters[0].client_name, "Alpha Corp");
        assert_eq!(rosters[0].guards.len(), 1);
        assert_eq!(rosters[1].client_name, "Zeta Mills");
        assert_eq!((rosters[1].on_duty(), rosters[1].off_duty()), (1, 1));
        assert_eq!(rosters[1].guards[0].shift_type, ShiftType::Night);
    }

    #[test]
    fn test_salary_search() {
        let guards = vec![guard("03001234567", "John Doe", 0.0, "ACTIVE")];
        let dir = Directory::new(&guards, &[]);
        let records = vec![salary("03001234567"), salary("03219999999")];

        assert_eq!(dir.filter_salaries(&records, "JOHN").len(), 1);
        assert_eq!(dir.filter_salaries(&records, "1234").len(), 1);
        assert_eq!(dir.filter_salaries(&records, "9999").len(), 1);
        assert_eq!(dir.filter_salaries(&records, "").len(), 2);
        assert!(dir.filter_salaries(&records, "sarah").is_empty());
    }

    #[test]
    fn test_dashboard_stats() {
        let guards = vec![
            guard("1", "A", 25000.0, "ACTIVE"),
            guard("2", "B", 30000.0, "ON_DUTY"),
            guard("3", "C", 20000.0, "INACTIVE"),
            guard("4", "D", 22000.0, "on_leave"),
        ];
        let clients = vec![client("042", "Alpha")];
        let assignments = vec![
            assignment("1", "042", None, "ON_DUTY"),
            assignment("2", "042", None, "ON_DUTY"),
            assignment("3", "042", Some("2024-01-01"), "ON_DUTY"),
        ];
        let inventory: Vec<InventoryRecord> = serde_json::from_value(json!([
            {"id": 1, "guard_contact": "1", "item_name": "Radio", "status": "ISSUED"},
            {"id": 2, "guard_contact": "2", "item_name": "Baton", "status": "RETURNED"}
        ]))
        .unwrap();

        let stats = DashboardStats::compute(&guards, &clients, &assignments, &inventory);
        assert_eq!(stats.total_guards, 4);
        assert_eq!(stats.total_clients, 1);
        assert_eq!(stats.guards_on_duty, 2);
        assert_eq!(stats.monthly_payroll, 77000.0);
        assert_eq!((stats.inventory_issued, stats.pending_returns), (2, 1));
        assert_eq!(stats.deployment_rate(), 50);
        assert_eq!(DashboardStats::default().deployment_rate(), 0);
    }
}
