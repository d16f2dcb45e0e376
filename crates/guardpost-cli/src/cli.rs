use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use guardpost_core::models::{
    AssignmentCreate, ClientCreate, Condition, DutyStatus, GuardCreate, InventoryCreate,
    InventoryStatus, ItemType, ShiftType,
};
use guardpost_core::utils::dates::parse_date;

#[derive(Parser, Debug)]
#[command(name = "guardpost")]
#[command(version, about = "Staffing console for guards, clients, duty assignments, salaries and inventory")]
pub struct Cli {
    /// Keep the cache in memory for this run only
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List guards
    Guards(ListArgs),
    /// Guard operations
    #[command(subcommand)]
    Guard(GuardCommands),
    /// List clients
    Clients(ListArgs),
    /// Client operations
    #[command(subcommand)]
    Client(ClientCommands),
    /// List duty assignments
    Assignments(AssignmentListArgs),
    /// Post a guard at a client
    Assign(AssignArgs),
    /// Assignment operations
    #[command(subcommand)]
    Assignment(AssignmentCommands),
    /// Guards currently posted at each client
    Roster(RefreshArgs),
    /// List salary records with paid and pending totals
    Salaries(ListArgs),
    /// Salary operations
    #[command(subcommand)]
    Salary(SalaryCommands),
    /// List issued equipment
    Inventory(InventoryArgs),
    /// Headline numbers across every resource
    Dashboard(RefreshArgs),
    /// Keep a list on screen, refreshing it in the background
    Watch(WatchArgs),
    /// Inspect or clear the local cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Ignore cached data and fetch from the API
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Search filter
    #[arg(long, short, default_value = "")]
    pub search: String,

    #[command(flatten)]
    pub refresh: RefreshArgs,
}

// --- Guards ---

#[derive(Subcommand, Debug)]
pub enum GuardCommands {
    Add(GuardAddArgs),
    /// Change the given fields of a guard
    Update(GuardUpdateArgs),
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct GuardAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub contact: String,
    #[arg(long)]
    pub salary: f64,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub property: Option<String>,
    #[arg(long)]
    pub uniform_cost: Option<f64>,
    #[arg(long)]
    pub monthly_deduction: Option<f64>,
}

#[derive(Args, Debug)]
pub struct GuardUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub salary: Option<f64>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub property: Option<String>,
    #[arg(long)]
    pub uniform_cost: Option<f64>,
    #[arg(long)]
    pub monthly_deduction: Option<f64>,
}

impl GuardUpdateArgs {
    pub fn apply(&self, form: &mut GuardCreate) {
        overlay(&mut form.name, &self.name);
        overlay(&mut form.contact_number, &self.contact);
        overlay(&mut form.current_salary, &self.salary);
        overlay_some(&mut form.address, &self.address);
        overlay_some(&mut form.property, &self.property);
        overlay_some(&mut form.uniform_cost, &self.uniform_cost);
        overlay_some(&mut form.monthly_deduction, &self.monthly_deduction);
    }
}

// --- Clients ---

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    Add(ClientAddArgs),
    /// Change the given fields of a client
    Update(ClientUpdateArgs),
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct ClientAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub contact_person: Option<String>,
    #[arg(long)]
    pub contact: String,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, default_value_t = 0.0)]
    pub rate: f64,
}

#[derive(Args, Debug)]
pub struct ClientUpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub contact_person: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub rate: Option<f64>,
}

impl ClientUpdateArgs {
    pub fn apply(&self, form: &mut ClientCreate) {
        overlay(&mut form.name, &self.name);
        overlay(&mut form.company_name, &self.company);
        overlay(&mut form.contact_person, &self.contact_person);
        overlay(&mut form.contact_number, &self.contact);
        overlay_some(&mut form.address, &self.address);
        overlay(&mut form.contract_rate, &self.rate);
    }
}

// --- Assignments ---

#[derive(Args, Debug)]
pub struct AssignmentListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Only assignments without an end date
    #[arg(long, conflicts_with = "history")]
    pub ongoing: bool,

    /// Only assignments that have ended
    #[arg(long)]
    pub history: bool,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Guard contact number
    #[arg(long)]
    pub guard: String,
    /// Client contact number
    #[arg(long)]
    pub client: String,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long, value_parser = date_arg)]
    pub start: NaiveDate,
    #[arg(long, value_parser = date_arg)]
    pub end: Option<NaiveDate>,
    #[arg(long, default_value = "day")]
    pub shift: ShiftType,
    #[arg(long, default_value = "ON_DUTY")]
    pub status: DutyStatus,
}

#[derive(Subcommand, Debug)]
pub enum AssignmentCommands {
    /// Close an ongoing assignment
    End {
        id: i64,
        #[arg(long, value_parser = date_arg)]
        date: NaiveDate,
    },
    /// Change the given fields of an assignment
    Update(AssignmentUpdateArgs),
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct AssignmentUpdateArgs {
    pub id: i64,
    /// Guard contact number
    #[arg(long)]
    pub guard: Option<String>,
    /// Client contact number
    #[arg(long)]
    pub client: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long, value_parser = date_arg)]
    pub start: Option<NaiveDate>,
    #[arg(long, value_parser = date_arg, conflicts_with = "reopen")]
    pub end: Option<NaiveDate>,
    /// Clear the end date, making the assignment ongoing again
    #[arg(long)]
    pub reopen: bool,
    #[arg(long)]
    pub shift: Option<ShiftType>,
    #[arg(long)]
    pub status: Option<DutyStatus>,
}

impl AssignmentUpdateArgs {
    pub fn apply(&self, form: &mut AssignmentCreate) {
        overlay(&mut form.guard_contact_number, &self.guard);
        overlay(&mut form.client_contact_number, &self.client);
        overlay_some(&mut form.company_name, &self.company);
        overlay_some(&mut form.start_date, &self.start);
        if self.reopen {
            form.end_date = None;
        } else {
            overlay_some(&mut form.end_date, &self.end);
        }
        overlay(&mut form.shift_type, &self.shift);
        overlay(&mut form.duty_status, &self.status);
    }
}

// --- Salaries ---

#[derive(Subcommand, Debug)]
pub enum SalaryCommands {
    /// Estimate a final salary before creating the record
    Preview(SalaryPreviewArgs),
    Create(SalaryCreateArgs),
    /// Mark a record paid, stamped with the current time
    Pay { id: i64 },
    /// Mark a record unpaid, clearing its payment date
    Unpay { id: i64 },
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct SalaryPreviewArgs {
    /// Take the base salary from this guard's record
    #[arg(long, required_unless_present = "base", conflicts_with = "base")]
    pub guard: Option<String>,
    #[arg(long)]
    pub base: Option<f64>,
    #[arg(long, default_value = "")]
    pub deductions: String,
    #[arg(long, default_value = "")]
    pub bonus: String,
}

#[derive(Args, Debug)]
pub struct SalaryCreateArgs {
    /// Guard contact number
    #[arg(long)]
    pub guard: String,
    #[arg(long)]
    pub month: u32,
    #[arg(long)]
    pub year: i32,
    #[arg(long, default_value = "")]
    pub deductions: String,
    #[arg(long, default_value = "")]
    pub bonus: String,
    #[arg(long, default_value = "")]
    pub notes: String,
}

// --- Inventory ---

#[derive(Args, Debug)]
pub struct InventoryArgs {
    #[command(subcommand)]
    pub command: Option<InventoryCommands>,

    #[arg(long, short, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub status: Option<InventoryStatus>,

    #[arg(long)]
    pub refresh: bool,
}

#[derive(Subcommand, Debug)]
pub enum InventoryCommands {
    /// Issue equipment to a guard
    Issue(IssueArgs),
    /// Close out an issued item
    Return(ReturnArgs),
    /// Change the issue details of a record
    Update(InventoryUpdateArgs),
}

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Guard contact number
    #[arg(long)]
    pub guard: String,
    #[arg(long)]
    pub item: String,
    #[arg(long = "type", default_value = "other")]
    pub item_type: ItemType,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
    #[arg(long, default_value_t = 0.0)]
    pub cost: f64,
    #[arg(long, default_value = "good")]
    pub condition: Condition,
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReturnArgs {
    pub id: i64,
    #[arg(long, default_value = "RETURNED")]
    pub status: InventoryStatus,
    #[arg(long, default_value = "good")]
    pub condition: Condition,
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct InventoryUpdateArgs {
    pub id: i64,
    /// Guard contact number
    #[arg(long)]
    pub guard: Option<String>,
    #[arg(long)]
    pub item: Option<String>,
    #[arg(long = "type")]
    pub item_type: Option<ItemType>,
    #[arg(long)]
    pub quantity: Option<u32>,
    #[arg(long)]
    pub cost: Option<f64>,
    #[arg(long)]
    pub condition: Option<Condition>,
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl InventoryUpdateArgs {
    pub fn apply(&self, form: &mut InventoryCreate) {
        overlay(&mut form.guard_contact, &self.guard);
        overlay(&mut form.item_name, &self.item);
        overlay(&mut form.item_type, &self.item_type);
        overlay(&mut form.quantity, &self.quantity);
        overlay(&mut form.cost, &self.cost);
        overlay(&mut form.condition_on_issue, &self.condition);
        overlay_some(&mut form.issue_date, &self.date);
        overlay_some(&mut form.notes, &self.notes);
    }
}

// --- Watch / cache ---

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum WatchResource {
    Guards,
    Clients,
    Assignments,
    Salaries,
    Inventory,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    pub resource: WatchResource,
    #[arg(long, short, default_value = "")]
    pub search: String,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Age of every cached list
    Ages,
    /// Drop every cached list
    Clear,
}

/// Replace `field` when a new value was passed.
fn overlay<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

fn overlay_some<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if let Some(value) = value {
        *field = Some(value.clone());
    }
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assign() {
        let cli = Cli::try_parse_from([
            "guardpost", "assign", "--guard", "0300", "--client", "042",
            "--start", "2024-01-15", "--shift", "night",
        ])
        .unwrap();
        match cli.command {
            Commands::Assign(args) => {
                assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
                assert_eq!(args.shift, ShiftType::Night);
                assert_eq!(args.status, DutyStatus::OnDuty);
                assert_eq!(args.end, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_salary_preview_needs_guard_or_base() {
        assert!(Cli::try_parse_from(["guardpost", "salary", "preview"]).is_err());
        let cli = Cli::try_parse_from([
            "guardpost", "--no-cache", "salary", "preview", "--base", "25000", "--bonus", "abc",
        ])
        .unwrap();
        assert!(cli.no_cache);
        match cli.command {
            Commands::Salary(SalaryCommands::Preview(args)) => {
                assert_eq!(args.base, Some(25000.0));
                assert_eq!(args.bonus, "abc");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_guard_update_changes_only_given_fields() {
        let cli = Cli::try_parse_from([
            "guardpost", "guard", "update", "7", "--salary", "27000", "--property", "Gate 2",
        ])
        .unwrap();
        let Commands::Guard(GuardCommands::Update(args)) = cli.command else {
            panic!("expected guard update");
        };
        assert_eq!(args.id, 7);

        let mut form = GuardCreate {
            name: "John Doe".to_string(),
            contact_number: "03001234567".to_string(),
            current_salary: 25000.0,
            uniform_cost: Some(3000.0),
            ..Default::default()
        };
        args.apply(&mut form);
        assert_eq!(form.current_salary, 27000.0);
        assert_eq!(form.property.as_deref(), Some("Gate 2"));
        assert_eq!(form.name, "John Doe");
        assert_eq!(form.uniform_cost, Some(3000.0));
    }

    #[test]
    fn test_assignment_update_reopen_clears_end() {
        let cli = Cli::try_parse_from([
            "guardpost", "assignment", "update", "3", "--reopen", "--shift", "night",
        ])
        .unwrap();
        let Commands::Assignment(AssignmentCommands::Update(args)) = cli.command else {
            panic!("expected assignment update");
        };
        let mut form = AssignmentCreate {
            guard_contact_number: "1".to_string(),
            client_contact_number: "2".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        args.apply(&mut form);
        assert_eq!(form.end_date, None);
        assert_eq!(form.shift_type, ShiftType::Night);
        assert_eq!(form.guard_contact_number, "1");

        assert!(Cli::try_parse_from([
            "guardpost", "assignment", "update", "3", "--reopen", "--end", "2024-04-01",
        ])
        .is_err());
    }

    #[test]
    fn test_client_and_inventory_update_parse() {
        let cli = Cli::try_parse_from(["guardpost", "client", "update", "2", "--rate", "210000"]).unwrap();
        let Commands::Client(ClientCommands::Update(args)) = cli.command else {
            panic!("expected client update");
        };
        let mut form = ClientCreate {
            name: "Beta".to_string(),
            contract_rate: 200000.0,
            ..Default::default()
        };
        args.apply(&mut form);
        assert_eq!(form.contract_rate, 210000.0);
        assert_eq!(form.name, "Beta");

        let cli = Cli::try_parse_from([
            "guardpost", "inventory", "update", "5", "--quantity", "2", "--type", "radio",
        ])
        .unwrap();
        match cli.command {
            Commands::Inventory(InventoryArgs {
                command: Some(InventoryCommands::Update(args)),
                ..
            }) => {
                assert_eq!(args.quantity, Some(2));
                assert_eq!(args.item_type, Some(ItemType::Radio));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Cli::try_parse_from([
            "guardpost", "assignment", "end", "3", "--date", "yesterday",
        ])
        .is_err());
    }
}
