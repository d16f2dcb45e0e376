//! Command handlers.
//!
//! Every list command goes through a `ListView`, so it follows the cache's
//! load policy: fresh lists print with no network call, stale ones print
//! immediately and are reprinted when the background refresh lands, and
//! missing ones block behind a "Loading…" note. Mutations go straight to the
//! API and then invalidate the namespaces they touch.

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{Datelike, Local, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use guardpost_core::cache::{CacheManager, ListView, LoadPlan, ViewStatus};
use guardpost_core::inventory::{self, ReturnRequest};
use guardpost_core::models::{
    AssignmentCreate, Client, ClientCreate, DutyAssignment, Guard, GuardCreate, InventoryCreate,
    InventoryRecord, InventoryStatus, Resource, SalaryRecord,
};
use guardpost_core::roster::{self, DashboardStats, Directory};
use guardpost_core::salary::{self, SalaryDraft};
use guardpost_core::utils::format_pkr;
use guardpost_core::validation::Validate;
use guardpost_core::{ApiClient, Config, FileStore, KeyValueStore, MemoryStore};

use crate::cli::*;
use crate::output;

/// What woke the watch loop.
enum WatchStep {
    Tick,
    Updated,
    Stop,
}

pub struct App {
    config: Config,
    api: ApiClient,
    cache: CacheManager,
    json: bool,
}

impl App {
    pub fn new(config: Config, no_cache: bool, json: bool) -> Result<Self> {
        let api = ApiClient::with_timeout(&config.api_base_url(), config.request_timeout())?;
        let store: Arc<dyn KeyValueStore> = if no_cache {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::new(config.cache_dir()?)?)
        };
        info!(api = %api.base_url(), no_cache = no_cache, "Console starting");

        Ok(Self {
            config,
            api,
            cache: CacheManager::new(store),
            json,
        })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Guards(args) => self.guards(&args).await,
            Commands::Guard(cmd) => self.guard(cmd).await,
            Commands::Clients(args) => self.clients(&args).await,
            Commands::Client(cmd) => self.client(cmd).await,
            Commands::Assignments(args) => self.assignments(&args).await,
            Commands::Assign(args) => self.assign(args).await,
            Commands::Assignment(cmd) => self.assignment(cmd).await,
            Commands::Roster(args) => self.roster(args.refresh).await,
            Commands::Salaries(args) => self.salaries(&args).await,
            Commands::Salary(cmd) => self.salary(cmd).await,
            Commands::Inventory(args) => self.inventory(args).await,
            Commands::Dashboard(args) => self.dashboard(args.refresh).await,
            Commands::Watch(args) => self.watch(&args).await,
            Commands::Cache(cmd) => self.cache_command(cmd),
        }
    }

    // ========================================================================
    // List plumbing
    // ========================================================================

    fn view<R: Resource>(&self) -> ListView<R> {
        ListView::for_resource(
            self.cache.clone(),
            Arc::new(self.api.clone()),
            self.config.freshness(),
        )
    }

    /// Mount a view on `search`, noting on stderr when it has to block.
    async fn open<R: Resource>(&self, search: &str, refresh: bool) -> ListView<R> {
        let mut view = self.view::<R>();
        let plan = view.set_filter(search.trim()).await;

        if refresh {
            note(&format!("Loading {}…", R::NAMESPACE.replace('_', " ")));
            view.mount_refreshed().await;
        } else {
            if plan == LoadPlan::BlockingFetch {
                note(&format!("Loading {}…", R::NAMESPACE.replace('_', " ")));
            }
            view.mount().await;
        }
        view
    }

    /// Wait for an in-flight background refresh, up to the request timeout.
    /// Returns true when one landed.
    async fn settle<R: Resource>(&self, view: &mut ListView<R>) -> bool {
        if view.status() != &ViewStatus::Updating {
            return false;
        }
        match tokio::time::timeout(self.config.request_timeout(), view.next_update()).await {
            Ok(applied) => applied,
            Err(_) => {
                warn!(list = %view.key(), "Background refresh did not finish in time");
                false
            }
        }
    }

    /// Open several supporting lists and wait for any stale ones to refresh.
    async fn open_settled<R: Resource>(&self, refresh: bool) -> Result<ListView<R>> {
        let mut view = self.open::<R>("", refresh).await;
        self.settle(&mut view).await;
        ensure_loaded(&view)?;
        Ok(view)
    }

    /// Open a list that only supplies names or counts to another one. A
    /// failed load leaves it empty so the main list still prints with raw
    /// contact numbers.
    async fn open_lookup<R: Resource>(&self, refresh: bool) -> ListView<R> {
        let mut view = self.open::<R>("", refresh).await;
        self.settle(&mut view).await;
        if let Err(e) = ensure_loaded(&view) {
            let list = R::NAMESPACE.replace('_', " ");
            warn!(list = %view.key(), error = %e, "Lookup list unavailable");
            note(&format!("{} unavailable ({}); showing contact numbers", list, e));
        }
        view
    }

    fn print<R: Resource>(
        &self,
        view: &ListView<R>,
        keep: &impl Fn(&R) -> bool,
        render: &impl Fn(&[&R]) -> String,
    ) -> Result<()> {
        let items: Vec<&R> = view.items().iter().filter(|&item| keep(item)).collect();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else {
            print!("{}", render(&items));
        }
        if let Some(line) = output::status_line(view.status(), view.age_display().as_deref()) {
            note(&line);
        }
        Ok(())
    }

    /// Print a list, then reprint it if a background refresh lands.
    async fn show<R: Resource>(
        &self,
        search: &str,
        refresh: bool,
        keep: impl Fn(&R) -> bool,
        render: impl Fn(&[&R]) -> String,
    ) -> Result<()> {
        let mut view = self.open::<R>(search, refresh).await;
        ensure_loaded(&view)?;

        if self.json {
            // One document on stdout, so wait for the refresh first
            self.settle(&mut view).await;
            self.print(&view, &keep, &render)?;
        } else {
            self.print(&view, &keep, &render)?;
            if self.settle(&mut view).await {
                note("Updated:");
                self.print(&view, &keep, &render)?;
            }
        }
        view.unmount();
        Ok(())
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn invalidate(&self, namespaces: &[&str]) {
        for namespace in namespaces {
            if let Err(e) = self.cache.invalidate(namespace) {
                warn!(namespace = namespace, error = %e, "Failed to invalidate cache");
            }
        }
    }

    // ========================================================================
    // Guards and clients
    // ========================================================================

    async fn guards(&self, args: &ListArgs) -> Result<()> {
        self.show::<Guard>(&args.search, args.refresh.refresh, |_| true, output::guards)
            .await
    }

    async fn guard(&self, cmd: GuardCommands) -> Result<()> {
        match cmd {
            GuardCommands::Add(args) => {
                let form = GuardCreate {
                    name: args.name.trim().to_string(),
                    contact_number: args.contact.trim().to_string(),
                    address: args.address,
                    property: args.property,
                    current_salary: args.salary,
                    uniform_cost: args.uniform_cost,
                    monthly_deduction: args.monthly_deduction,
                };
                form.validate()?;
                let guard: Guard = self.api.create(&form).await?;
                self.invalidate(&[Guard::NAMESPACE]);
                self.emit(&guard, || format!("Added guard {} ({})", guard.name, guard.id))
            }
            GuardCommands::Update(args) => {
                let current: Guard = self.api.get(args.id).await?;
                let mut form = GuardCreate::from(&current);
                args.apply(&mut form);
                form.validate()?;
                let guard: Guard = self.api.update(args.id, &form).await?;
                self.invalidate(&[Guard::NAMESPACE]);
                self.emit(&guard, || format!("Updated guard {} ({})", guard.name, guard.id))
            }
            GuardCommands::Delete { id } => {
                self.api.delete::<Guard>(id).await?;
                self.invalidate(&[Guard::NAMESPACE]);
                println!("Deleted guard {}", id);
                Ok(())
            }
        }
    }

    async fn clients(&self, args: &ListArgs) -> Result<()> {
        let assignments = self.open_lookup::<DutyAssignment>(args.refresh.refresh).await;
        let assignments = assignments.items();
        self.show::<Client>(&args.search, args.refresh.refresh, |_| true, |clients| {
            output::clients_with_counts(clients, assignments)
        })
        .await
    }

    async fn client(&self, cmd: ClientCommands) -> Result<()> {
        match cmd {
            ClientCommands::Add(args) => {
                let form = ClientCreate {
                    company_name: args.company.unwrap_or_else(|| args.name.clone()),
                    name: args.name,
                    contact_person: args.contact_person.unwrap_or_default(),
                    contact_number: args.contact,
                    address: args.address,
                    contract_rate: args.rate,
                };
                form.validate()?;
                let client: Client = self.api.create(&form).await?;
                self.invalidate(&[Client::NAMESPACE]);
                self.emit(&client, || format!("Added client {} ({})", client.display_name(), client.id))
            }
            ClientCommands::Update(args) => {
                let current: Client = self.api.get(args.id).await?;
                let mut form = ClientCreate::from(&current);
                args.apply(&mut form);
                form.validate()?;
                let client: Client = self.api.update(args.id, &form).await?;
                self.invalidate(&[Client::NAMESPACE]);
                self.emit(&client, || format!("Updated client {} ({})", client.display_name(), client.id))
            }
            ClientCommands::Delete { id } => {
                self.api.delete::<Client>(id).await?;
                self.invalidate(&[Client::NAMESPACE]);
                println!("Deleted client {}", id);
                Ok(())
            }
        }
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    async fn assignments(&self, args: &AssignmentListArgs) -> Result<()> {
        let refresh = args.list.refresh.refresh;
        let (guards, clients) = futures::join!(
            self.open_lookup::<Guard>(refresh),
            self.open_lookup::<Client>(refresh)
        );
        let directory = Directory::new(guards.items(), clients.items());

        let keep = |a: &DutyAssignment| {
            (!args.ongoing || a.is_ongoing()) && (!args.history || a.is_historical())
        };
        self.show::<DutyAssignment>(&args.list.search, refresh, keep, |items| {
            output::assignment_table(items, &directory)
        })
        .await
    }

    async fn assign(&self, args: AssignArgs) -> Result<()> {
        let form = AssignmentCreate {
            guard_contact_number: args.guard,
            client_contact_number: args.client,
            company_name: args.company,
            start_date: Some(args.start),
            end_date: args.end,
            duty_status: args.status,
            shift_type: args.shift,
        };
        form.validate()?;
        let assignment: DutyAssignment = self.api.create(&form).await?;
        self.invalidate(&[DutyAssignment::NAMESPACE, Client::NAMESPACE]);
        self.emit(&assignment, || {
            format!(
                "Posted {} at {} ({} shift) as assignment {}",
                assignment.guard_contact_number,
                assignment.client_contact_number,
                assignment.shift_type.display_name(),
                assignment.id
            )
        })
    }

    async fn assignment(&self, cmd: AssignmentCommands) -> Result<()> {
        match cmd {
            AssignmentCommands::End { id, date } => {
                let current: DutyAssignment = self.api.get(id).await?;
                if current.is_historical() {
                    bail!("Assignment {} already ended", id);
                }
                let mut form = AssignmentCreate::from(&current);
                form.end_date = Some(date);
                form.validate()?;

                let updated: DutyAssignment = self.api.update(id, &form).await?;
                self.invalidate(&[DutyAssignment::NAMESPACE, Client::NAMESPACE]);
                self.emit(&updated, || format!("Assignment {} ended on {}", id, date))
            }
            AssignmentCommands::Update(args) => {
                let current: DutyAssignment = self.api.get(args.id).await?;
                let mut form = AssignmentCreate::from(&current);
                args.apply(&mut form);
                form.validate()?;

                let updated: DutyAssignment = self.api.update(args.id, &form).await?;
                self.invalidate(&[DutyAssignment::NAMESPACE, Client::NAMESPACE]);
                self.emit(&updated, || format!("Updated assignment {}", updated.id))
            }
            AssignmentCommands::Delete { id } => {
                self.api.delete::<DutyAssignment>(id).await?;
                self.invalidate(&[DutyAssignment::NAMESPACE, Client::NAMESPACE]);
                println!("Deleted assignment {}", id);
                Ok(())
            }
        }
    }

    async fn roster(&self, refresh: bool) -> Result<()> {
        let (guards, clients, assignments) = futures::join!(
            self.open_lookup::<Guard>(refresh),
            self.open_lookup::<Client>(refresh),
            self.open_settled::<DutyAssignment>(refresh)
        );
        let assignments = assignments?;
        let directory = Directory::new(guards.items(), clients.items());
        let rosters = roster::client_rosters(&directory, assignments.items());
        self.emit(&rosters, || output::rosters(&rosters))
    }

    // ========================================================================
    // Salaries
    // ========================================================================

    async fn salaries(&self, args: &ListArgs) -> Result<()> {
        let refresh = args.refresh.refresh;
        let guards = self.open_lookup::<Guard>(refresh).await;
        let directory = Directory::new(guards.items(), &[]);

        // Searched locally by guard name, so the whole list is one cache entry
        let keep = |r: &SalaryRecord| directory.salary_matches(r, &args.search);
        self.show::<SalaryRecord>("", refresh, keep, |records| {
            output::salaries_with_totals(records, &directory)
        })
        .await
    }

    async fn salary(&self, cmd: SalaryCommands) -> Result<()> {
        match cmd {
            SalaryCommands::Preview(args) => self.salary_preview(args).await,
            SalaryCommands::Create(args) => self.salary_create(args).await,
            SalaryCommands::Pay { id } => self.set_paid(id, true).await,
            SalaryCommands::Unpay { id } => self.set_paid(id, false).await,
            SalaryCommands::Delete { id } => {
                self.api.delete::<SalaryRecord>(id).await?;
                self.invalidate(&[SalaryRecord::NAMESPACE]);
                println!("Deleted salary record {}", id);
                Ok(())
            }
        }
    }

    async fn find_guard(&self, contact: &str) -> Result<Option<Guard>> {
        let guards = self.open_settled::<Guard>(false).await?;
        Ok(guards
            .items()
            .iter()
            .find(|g| g.contact_number == contact.trim())
            .cloned())
    }

    async fn salary_preview(&self, args: SalaryPreviewArgs) -> Result<()> {
        let today = Local::now().date_naive();
        let mut draft = match (&args.guard, args.base) {
            (Some(contact), _) => match self.find_guard(contact).await? {
                Some(guard) => SalaryDraft::for_guard(&guard, today.month(), today.year()),
                None => bail!("No guard with contact number {}", contact),
            },
            (None, Some(base)) => SalaryDraft::new("", today.month(), today.year(), base),
            (None, None) => bail!("Pass --guard or --base"),
        };
        draft.deductions = args.deductions;
        draft.bonus = args.bonus;

        let figure = draft.figure();
        println!("Base:       {}", format_pkr(draft.base));
        println!("Deductions: {}", format_pkr(draft.deductions_amount()));
        println!("Bonus:      {}", format_pkr(draft.bonus_amount()));
        println!("Final:      {}", figure.display());
        if let Some(disclosure) = figure.disclosure() {
            note(disclosure);
        }
        Ok(())
    }

    async fn salary_create(&self, args: SalaryCreateArgs) -> Result<()> {
        let base = match self.find_guard(&args.guard).await {
            Ok(Some(guard)) => guard.current_salary,
            Ok(None) => {
                warn!(guard = %args.guard, "Guard not in cached list");
                0.0
            }
            Err(e) => {
                debug!(error = %e, "Guard list unavailable for estimate");
                0.0
            }
        };

        let mut draft = SalaryDraft::new(args.guard.trim(), args.month, args.year, base);
        draft.deductions = args.deductions;
        draft.bonus = args.bonus;
        draft.notes = args.notes;

        let form = draft.to_create();
        form.validate()?;
        if !self.json && base > 0.0 {
            note(&format!("Estimate: {}", draft.figure().display()));
        }

        let record: SalaryRecord = self.api.create(&form).await?;
        self.invalidate(&[SalaryRecord::NAMESPACE]);
        draft.settle(record);

        let Some(record) = draft.record() else {
            bail!("Salary record missing after create");
        };
        self.emit(record, || {
            format!(
                "Created salary record {} for {}: final salary {}",
                record.id,
                record.period_display(),
                draft.figure().display()
            )
        })
    }

    async fn set_paid(&self, id: i64, paid: bool) -> Result<()> {
        // Payment is addressed by record id; warn when the guard has others
        let records = self.open_settled::<SalaryRecord>(false).await;
        if let Ok(records) = &records {
            let siblings = salary::records_sharing_contact(records.items(), id);
            if !siblings.is_empty() {
                note(&format!(
                    "{} other record(s) share this guard's contact number; only record {} changes",
                    siblings.len(),
                    id
                ));
            }
        }

        let update = if paid {
            salary::mark_paid(Utc::now())
        } else {
            salary::mark_unpaid()
        };
        let record = self.api.set_salary_payment(id, &update).await?;
        self.invalidate(&[SalaryRecord::NAMESPACE]);

        self.emit(&record, || match record.payment_date {
            Some(date) if record.is_paid => {
                format!("Record {} marked paid on {}", id, date.format("%Y-%m-%d %H:%M"))
            }
            _ if record.is_paid => format!("Record {} marked paid", id),
            _ => format!("Record {} marked unpaid", id),
        })
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    async fn inventory(&self, args: InventoryArgs) -> Result<()> {
        match args.command {
            Some(InventoryCommands::Issue(issue)) => self.issue(issue).await,
            Some(InventoryCommands::Return(ret)) => self.return_item(ret).await,
            Some(InventoryCommands::Update(update)) => self.update_item(update).await,
            None => {
                let keep = |r: &InventoryRecord| inventory::matches(r, &args.search, args.status);
                self.show::<InventoryRecord>("", args.refresh, keep, output::inventory_with_summary)
                    .await
            }
        }
    }

    async fn issue(&self, args: IssueArgs) -> Result<()> {
        let form = InventoryCreate {
            guard_contact: args.guard,
            item_name: args.item,
            item_type: args.item_type,
            quantity: args.quantity,
            issue_date: Some(args.date.unwrap_or_else(|| Local::now().date_naive())),
            condition_on_issue: args.condition,
            cost: args.cost,
            notes: args.notes,
            status: InventoryStatus::Issued,
        };
        form.validate()?;
        let record: InventoryRecord = self.api.create(&form).await?;
        self.invalidate(&[InventoryRecord::NAMESPACE]);
        self.emit(&record, || {
            format!("Issued {} x{} to {} (record {})", record.item_name, record.quantity, record.guard_contact, record.id)
        })
    }

    async fn return_item(&self, args: ReturnArgs) -> Result<()> {
        let current: InventoryRecord = self.api.get(args.id).await?;
        let request = ReturnRequest {
            return_date: args.date.unwrap_or_else(|| Local::now().date_naive()),
            status: args.status,
            condition_on_return: args.condition,
            notes: args.notes,
        };
        let body = request.apply(&current)?;

        let updated: InventoryRecord = self.api.update(args.id, &body).await?;
        self.invalidate(&[InventoryRecord::NAMESPACE]);
        self.emit(&updated, || {
            format!("{} marked {}", updated.item_name, updated.status.label().to_lowercase())
        })
    }

    async fn update_item(&self, args: InventoryUpdateArgs) -> Result<()> {
        let current: InventoryRecord = self.api.get(args.id).await?;
        let mut form = InventoryCreate::from(&current);
        args.apply(&mut form);
        form.validate()?;

        let body = current.with_details(&form);
        let updated: InventoryRecord = self.api.update(args.id, &body).await?;
        self.invalidate(&[InventoryRecord::NAMESPACE]);
        self.emit(&updated, || {
            format!("Updated inventory record {} ({})", updated.id, updated.item_name)
        })
    }

    // ========================================================================
    // Dashboard, watch, cache
    // ========================================================================

    async fn dashboard(&self, refresh: bool) -> Result<()> {
        let (guards, clients, assignments, inventory) = futures::try_join!(
            self.open_settled::<Guard>(refresh),
            self.open_settled::<Client>(refresh),
            self.open_settled::<DutyAssignment>(refresh),
            self.open_settled::<InventoryRecord>(refresh)
        )?;
        let stats = DashboardStats::compute(
            guards.items(),
            clients.items(),
            assignments.items(),
            inventory.items(),
        );
        self.emit(&stats, || output::dashboard(&stats))
    }

    async fn watch(&self, args: &WatchArgs) -> Result<()> {
        let search = args.search.as_str();
        match args.resource {
            WatchResource::Guards => {
                self.watch_list::<Guard>(search, |_| true, output::guards).await
            }
            WatchResource::Clients => {
                // Lookups are settled once; only the watched list keeps refreshing
                let assignments = self.open_lookup::<DutyAssignment>(false).await;
                let assignments = assignments.items();
                self.watch_list::<Client>(search, |_| true, |clients| {
                    output::clients_with_counts(clients, assignments)
                })
                .await
            }
            WatchResource::Assignments => {
                let (guards, clients) = futures::join!(
                    self.open_lookup::<Guard>(false),
                    self.open_lookup::<Client>(false)
                );
                let directory = Directory::new(guards.items(), clients.items());
                self.watch_list::<DutyAssignment>(search, |_| true, |items| {
                    output::assignment_table(items, &directory)
                })
                .await
            }
            WatchResource::Salaries => {
                let guards = self.open_lookup::<Guard>(false).await;
                let directory = Directory::new(guards.items(), &[]);
                let keep = |r: &SalaryRecord| directory.salary_matches(r, search);
                self.watch_list::<SalaryRecord>("", keep, |records| {
                    output::salaries_with_totals(records, &directory)
                })
                .await
            }
            WatchResource::Inventory => {
                let keep = |r: &InventoryRecord| inventory::matches(r, search, None);
                self.watch_list::<InventoryRecord>("", keep, output::inventory_with_summary)
                    .await
            }
        }
    }

    /// Print a list, then keep it current: refresh in the background every
    /// refresh interval and reprint whenever a refresh lands, until Ctrl+C.
    async fn watch_list<R: Resource>(
        &self,
        search: &str,
        keep: impl Fn(&R) -> bool,
        render: impl Fn(&[&R]) -> String,
    ) -> Result<()> {
        let mut view = self.open::<R>(search, false).await;
        self.print(&view, &keep, &render)?;

        let mut interval = tokio::time::interval(self.config.refresh_interval());
        interval.tick().await; // The first tick completes immediately
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            let step = tokio::select! {
                _ = interval.tick() => WatchStep::Tick,
                updated = view.next_update() => {
                    if updated { WatchStep::Updated } else { WatchStep::Stop }
                }
                _ = &mut ctrl_c => WatchStep::Stop,
            };

            match step {
                WatchStep::Tick => {
                    debug!(list = %view.key(), "Periodic refresh");
                    view.refresh(false).await;
                }
                WatchStep::Updated => {
                    println!("\n[{}]", Local::now().format("%H:%M:%S"));
                    self.print(&view, &keep, &render)?;
                }
                WatchStep::Stop => break,
            }
        }

        view.unmount();
        Ok(())
    }

    fn cache_command(&self, cmd: CacheCommands) -> Result<()> {
        match cmd {
            CacheCommands::Ages => {
                let ages = self.cache.ages();
                if self.json {
                    let rows: Vec<_> = ages
                        .iter()
                        .map(|a| serde_json::json!({"key": a.key, "cached_at": a.cached_at}))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else {
                    print!("{}", output::cache_ages(&ages));
                }
                Ok(())
            }
            CacheCommands::Clear => {
                let removed = self.cache.clear()?;
                println!("Cleared {} cached list(s)", removed);
                Ok(())
            }
        }
    }
}

/// Status notes go to stderr so stdout stays clean for tables and JSON.
fn note(message: &str) {
    eprintln!("{}", message);
}

/// A list with nothing to show and a failed fetch is an error, not an empty table.
fn ensure_loaded<R>(view: &ListView<R>) -> Result<()>
where
    R: Resource,
{
    match view.status() {
        ViewStatus::UpdateFailed(error) if view.items().is_empty() && view.fetched_at().is_none() => {
            bail!("{}", error)
        }
        _ => Ok(()),
    }
}
