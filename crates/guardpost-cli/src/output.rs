//! Plain-text rendering for list and summary output.

use guardpost_core::cache::{CacheAge, ViewStatus};
use guardpost_core::inventory::InventorySummary;
use guardpost_core::models::{Client, DutyAssignment, Guard, InventoryRecord, SalaryRecord};
use guardpost_core::roster::{self, AssignmentRow, ClientRoster, DashboardStats, Directory};
use guardpost_core::salary::PayrollSummary;
use guardpost_core::utils::{format_contact, format_date, format_pkr, truncate_string};

/// Widest any single cell may render before it is truncated.
const MAX_CELL_WIDTH: usize = 32;

/// Column-aligned text table.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        let cells = cells
            .into_iter()
            .map(|c| truncate_string(&c, MAX_CELL_WIDTH))
            .collect();
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        push_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        if self.rows.is_empty() {
            out.push_str("(none)\n");
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn amount(value: Option<f64>) -> String {
    value.map(format_pkr).unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// Lists
// ============================================================================

pub fn guards(guards: &[&Guard]) -> String {
    let mut table = Table::new(vec!["ID", "Name", "Contact", "Property", "Salary", "Uniform due", "Status"]);
    for g in guards {
        table.row(vec![
            g.id.to_string(),
            g.name.clone(),
            format_contact(&g.contact_number),
            g.property.clone().unwrap_or_default(),
            format_pkr(g.current_salary),
            format_pkr(g.uniform_outstanding()),
            g.status.display_name().to_string(),
        ]);
    }
    table.render()
}

pub fn clients(clients: &[&Client]) -> String {
    let mut table = Table::new(vec!["ID", "Company", "Contact person", "Contact", "Rate", "Guards"]);
    for c in clients {
        table.row(vec![
            c.id.to_string(),
            c.display_name().to_string(),
            c.contact_person.clone(),
            format_contact(&c.contact_number),
            format_pkr(c.contract_rate),
            c.guards_assigned.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.render()
}

pub fn assignments(rows: &[AssignmentRow<'_>]) -> String {
    let mut table = Table::new(vec!["ID", "Guard", "Client", "Start", "End", "Shift", "Status"]);
    for row in rows {
        let a = row.assignment;
        table.row(vec![
            a.id.to_string(),
            row.guard_name.to_string(),
            row.client_name.to_string(),
            format_date(a.start_date, "-"),
            format_date(a.end_date, "ongoing"),
            a.shift_type.display_name().to_string(),
            a.duty_status.display_name().to_string(),
        ]);
    }
    table.render()
}

pub fn salaries(records: &[&SalaryRecord], directory: &Directory<'_>) -> String {
    let mut table = Table::new(vec![
        "ID", "Guard", "Period", "Deductions", "Bonus", "Uniform", "Final", "Paid", "Paid on",
    ]);
    for r in records {
        table.row(vec![
            r.id.to_string(),
            directory.guard_name(&r.guard_contact_number).to_string(),
            r.period_display(),
            amount(r.deductions),
            amount(r.bonus),
            amount(r.uniform_deduction),
            format_pkr(r.final_salary),
            if r.is_paid { "yes" } else { "no" }.to_string(),
            r.payment_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.render()
}

pub fn payroll(summary: &PayrollSummary) -> String {
    format!(
        "Paid: {} ({} records)   Pending: {} ({} records)\n",
        format_pkr(summary.paid_total),
        summary.paid_count,
        format_pkr(summary.pending_total),
        summary.pending_count
    )
}

pub fn inventory(records: &[&InventoryRecord]) -> String {
    let mut table = Table::new(vec![
        "ID", "Guard", "Item", "Type", "Qty", "Issued", "Cost", "Status", "Returned",
    ]);
    for r in records {
        table.row(vec![
            r.id.to_string(),
            r.guard_name.clone().unwrap_or_else(|| r.guard_contact.clone()),
            r.item_name.clone(),
            r.item_type.label().to_string(),
            r.quantity.to_string(),
            format_date(r.issue_date, "-"),
            format_pkr(r.cost),
            r.status.label().to_string(),
            format_date(r.return_date, "-"),
        ]);
    }
    table.render()
}

pub fn inventory_summary(summary: &InventorySummary) -> String {
    format!(
        "Issued: {}   Returned: {}   Damaged: {}   Lost: {}   Total cost: {}\n",
        summary.issued,
        summary.returned,
        summary.damaged,
        summary.lost,
        format_pkr(summary.total_cost)
    )
}

// ============================================================================
// Lists with their lookups
// ============================================================================

/// Clients with `guards_assigned` filled from `assignments` where the API left it out.
pub fn clients_with_counts(clients: &[&Client], assignments: &[DutyAssignment]) -> String {
    let mut clients: Vec<Client> = clients.iter().map(|c| (*c).clone()).collect();
    roster::fill_guards_assigned(&mut clients, assignments);
    self::clients(&clients.iter().collect::<Vec<_>>())
}

/// Assignments with guard and client names resolved through `directory`.
pub fn assignment_table(items: &[&DutyAssignment], directory: &Directory<'_>) -> String {
    let rows: Vec<_> = items.iter().map(|a| directory.resolve(a)).collect();
    assignments(&rows)
}

pub fn salaries_with_totals(records: &[&SalaryRecord], directory: &Directory<'_>) -> String {
    let summary = PayrollSummary::from_records(records.iter().copied());
    format!("{}{}", salaries(records, directory), payroll(&summary))
}

pub fn inventory_with_summary(records: &[&InventoryRecord]) -> String {
    let summary = InventorySummary::from_records(records.iter().copied());
    format!("{}{}", inventory(records), inventory_summary(&summary))
}

pub fn rosters(rosters: &[ClientRoster]) -> String {
    let mut out = String::new();
    for roster in rosters {
        out.push_str(&format!(
            "{} ({})  on duty: {}  off duty: {}\n",
            roster.client_name,
            format_contact(&roster.client_contact_number),
            roster.on_duty(),
            roster.off_duty()
        ));
        for guard in &roster.guards {
            out.push_str(&format!(
                "  {:<24} {:<14} {:<6} {}\n",
                truncate_string(&guard.name, 24),
                format_contact(&guard.contact_number),
                guard.shift_type.display_name(),
                guard.duty_status.display_name()
            ));
        }
    }
    if out.is_empty() {
        out.push_str("No guards currently posted.\n");
    }
    out
}

pub fn dashboard(stats: &DashboardStats) -> String {
    format!(
        "Guards:          {}\n\
         Clients:         {}\n\
         On duty:         {} ({}% deployment rate)\n\
         Monthly payroll: {}\n\
         Inventory:       {} issued, {} pending returns\n",
        stats.total_guards,
        stats.total_clients,
        stats.guards_on_duty,
        stats.deployment_rate(),
        format_pkr(stats.monthly_payroll),
        stats.inventory_issued,
        stats.pending_returns
    )
}

pub fn cache_ages(ages: &[CacheAge]) -> String {
    let mut table = Table::new(vec!["List", "Cached"]);
    for age in ages {
        table.row(vec![age.key.clone(), age.display.clone()]);
    }
    table.render()
}

/// One-line freshness note for a list, e.g. `cached 12m ago, updating…`.
pub fn status_line(status: &ViewStatus, age: Option<&str>) -> Option<String> {
    match (status, age) {
        (ViewStatus::Updating, Some(age)) => Some(format!("cached {}, updating…", age)),
        (ViewStatus::Updating, None) => Some("updating…".to_string()),
        (ViewStatus::UpdateFailed(error), Some(age)) => {
            Some(format!("update failed ({}); showing data from {}", error, age))
        }
        (ViewStatus::UpdateFailed(error), None) => Some(format!("update failed: {}", error)),
        (ViewStatus::Loading, _) => Some(status.label().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let mut table = Table::new(vec!["ID", "Name"]);
        table.row(vec!["1".to_string(), "John Doe".to_string()]);
        table.row(vec!["12".to_string(), "Al".to_string()]);
        assert_eq!(
            table.render(),
            "ID  Name\n--  --------\n1   John Doe\n12  Al\n"
        );
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(vec!["ID"]);
        assert!(table.render().ends_with("(none)\n"));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(&ViewStatus::Updating, Some("12m ago")).as_deref(),
            Some("cached 12m ago, updating…")
        );
        assert_eq!(status_line(&ViewStatus::Ready, Some("just now")), None);
        assert!(status_line(&ViewStatus::UpdateFailed("Server error: boom".into()), Some("1h ago"))
            .unwrap()
            .contains("showing data from 1h ago"));
    }

    #[test]
    fn test_lookups_resolve_names_and_counts() {
        let guards: Vec<Guard> = serde_json::from_str(
            r#"[{"id": 1, "name": "John Doe", "contact_number": "0300"}]"#,
        )
        .unwrap();
        let clients: Vec<Client> = serde_json::from_str(
            r#"[{"id": 2, "name": "Alpha", "company_name": "Alpha Corp", "contact_number": "042"}]"#,
        )
        .unwrap();
        let assignments: Vec<DutyAssignment> = serde_json::from_str(
            r#"[{"id": 3, "guard_contact_number": "0300", "client_contact_number": "042",
                 "end_date": null, "duty_status": "ON_DUTY", "shift_type": "day"}]"#,
        )
        .unwrap();
        let directory = Directory::new(&guards, &clients);

        let text = assignment_table(&assignments.iter().collect::<Vec<_>>(), &directory);
        assert!(text.contains("John Doe"));
        assert!(text.contains("Alpha Corp"));

        // Without lookups the raw contact numbers still render
        let text = assignment_table(&assignments.iter().collect::<Vec<_>>(), &Directory::default());
        assert!(text.contains("0300"));

        let text = clients_with_counts(&clients.iter().collect::<Vec<_>>(), &assignments);
        let row = text.lines().find(|l| l.contains("Alpha Corp")).unwrap();
        assert!(row.trim_end().ends_with('1'));
    }

    #[test]
    fn test_dashboard_text() {
        let stats = DashboardStats {
            total_guards: 4,
            guards_on_duty: 3,
            monthly_payroll: 100000.0,
            ..Default::default()
        };
        let text = dashboard(&stats);
        assert!(text.contains("75% deployment rate"));
        assert!(text.contains("Rs 100,000"));
    }
}
