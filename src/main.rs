use std::error::Error;

use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use taskboard::config::{CONFIG_VERSION, TaskboardConfig};
use taskboard::core::board::{DueUrgency, SortKey, StatusFilter};
use taskboard::core::contact::{self, Contact};
use taskboard::core::due::parse_date;
use taskboard::core::guideline::{self, Guideline};
use taskboard::core::links;
use taskboard::core::projection::ProjectedTask;
use taskboard::core::recurrence::Frequency;
use taskboard::core::report;
use taskboard::core::search::{self, SearchCorpus};
use taskboard::core::task::{self, ParentTask, Priority, Task, TaskStatus};
use taskboard::core::template::{self, ProjectTemplate, TemplateTask};
use taskboard::core::user::{self, Session, User};
use taskboard::core::workflow::{self, TaskAction};
use taskboard::dashboard::{self, Dashboard, DashboardView};
use taskboard::error::StoreError;
use taskboard::maintenance;
use taskboard::records;
use taskboard::store::{self, MemoryStore, collections, load_all};

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Tasks, contacts and project templates kept in a snapshot file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Day to act on, today unless given.
#[derive(Args, Debug)]
struct Day {
    /// Act as if today were this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

impl Day {
    fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    SortKey::parse(s).ok_or_else(|| format!("expected `due` or `title`, got {:?}", s))
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a user's tasks grouped by status
    Dashboard {
        /// Email of the viewing user
        email: String,
        /// Only show one status: pending, in_progress, overdue or completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long, value_parser = parse_sort, default_value = "due")]
        sort: SortKey,
        #[command(flatten)]
        day: Day,
    },
    /// Change the status of a task on a user's dashboard
    Status {
        email: String,
        task_id: String,
        status: String,
        #[command(flatten)]
        day: Day,
    },
    /// Log minutes spent on a task for the day
    Log {
        email: String,
        task_id: String,
        minutes: f64,
        #[command(flatten)]
        day: Day,
    },
    /// Minutes logged per user
    Report,
    /// Search contacts, guidelines, tasks, users and templates
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Create tasks for templates falling due within the activation window
    Templates {
        #[command(flatten)]
        day: Day,
    },
    /// Delete completed tasks left untouched past the retention window
    Purge,
    /// Create tasks from a template, due after the configured lead time
    UseTemplate {
        template_id: String,
        /// Prefix for the created task titles
        #[arg(long)]
        parent: Option<String>,
        #[command(flatten)]
        day: Day,
    },
    /// List contacts visible to a user
    Contacts {
        email: String,
        #[arg(long)]
        category: Option<String>,
        /// Match name, email, phone or company
        #[arg(long)]
        query: Option<String>,
    },
    /// Create, edit or delete tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Create, edit or delete contacts
    #[command(subcommand)]
    Contact(ContactCommand),
    /// Create, edit or delete guidelines
    #[command(subcommand)]
    Guideline(GuidelineCommand),
    /// Create, edit or delete users (admins only)
    #[command(subcommand)]
    User(UserCommand),
    /// Create, edit or delete project templates (admins only)
    #[command(subcommand)]
    Template(TemplateCommand),
    /// Write the active configuration to the config file
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Create a task, or edit the one given by --id
    Save {
        /// Email of the acting user
        viewer: String,
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    Delete { viewer: String, id: String },
}

#[derive(Args, Debug)]
struct TaskFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM
    #[arg(long)]
    due: Option<String>,
    /// Assigned user id; repeat for several
    #[arg(long = "assignee")]
    assignees: Vec<String>,
    /// none, daily, weekly, monthly or date-wise
    #[arg(long)]
    frequency: Option<String>,
    /// First day of a date-wise repetition
    #[arg(long)]
    repeat_date: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    guideline: Option<String>,
    #[arg(long)]
    parent: Option<String>,
    /// low, medium or high
    #[arg(long)]
    priority: Option<String>,
    #[arg(long)]
    link: Option<String>,
    #[arg(long)]
    private: Option<bool>,
}

impl TaskFields {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(due) = self.due {
            task.due_date = due;
        }
        if !self.assignees.is_empty() {
            task.assignees = self.assignees;
        }
        if let Some(frequency) = self.frequency {
            task.frequency = Frequency::parse(&frequency);
        }
        if self.repeat_date.is_some() {
            task.repeat_date = self.repeat_date;
        }
        if self.contact.is_some() {
            task.reference_contact_id = self.contact;
        }
        if self.guideline.is_some() {
            task.guideline_id = self.guideline;
        }
        if self.parent.is_some() {
            task.parent_task_id = self.parent;
        }
        if let Some(priority) = self.priority {
            task.priority = Priority::from_str_opt(&priority);
        }
        if self.link.is_some() {
            task.links = self.link;
        }
        if let Some(private) = self.private {
            task.is_private = private;
        }
    }
}

#[derive(Subcommand, Debug)]
enum ContactCommand {
    /// Create a contact, or edit the one given by --id
    Save {
        viewer: String,
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: ContactFields,
    },
    Delete { viewer: String, id: String },
}

#[derive(Args, Debug)]
struct ContactFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// 10-digit mobile number
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    birthday: Option<String>,
    #[arg(long)]
    anniversary: Option<String>,
    /// Repeat for several categories
    #[arg(long = "category")]
    categories: Vec<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl ContactFields {
    fn apply(self, contact: &mut Contact) {
        let fields = [
            (self.name, &mut contact.name),
            (self.email, &mut contact.email),
            (self.phone, &mut contact.phone),
            (self.address, &mut contact.address),
            (self.company, &mut contact.company_name),
            (self.birthday, &mut contact.date_of_birth),
            (self.anniversary, &mut contact.date_of_anniversary),
            (self.notes, &mut contact.notes),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        if !self.categories.is_empty() {
            contact.categories = self.categories;
        }
    }
}

#[derive(Subcommand, Debug)]
enum GuidelineCommand {
    /// Create a guideline, or edit the one given by --id
    Save {
        viewer: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { viewer: String, id: String },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, or edit the one given by --id
    Save {
        viewer: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    Delete { viewer: String, id: String },
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// Create a template, or edit the one given by --id
    Save {
        viewer: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Date the template's tasks fall due (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Task title; repeat for several, replaces the existing tasks
        #[arg(long = "task")]
        tasks: Vec<String>,
    },
    Delete { viewer: String, id: String },
}

fn init_logging(config: &TaskboardConfig) {
    // Journal wrapper: taskboard targets at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("taskboard") {
                let max = if taskboard::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }

        fn flush(&self) {
            self.inner.flush();
        }
    }

    taskboard::set_debug_logging(config.debug_logging);

    match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => {
            let journal = journal.with_syslog_identifier("taskboard".to_string());
            if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
        Err(e) => eprintln!("journal logging unavailable: {}", e),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = TaskboardConfig::default_path();
    let (config, config_error) = match TaskboardConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err((error, fallback)) => (fallback, Some(error)),
    };
    init_logging(&config);
    if let Some(error) = config_error {
        log::warn!("{}, using defaults", error);
        eprintln!("warning: {}, using defaults", error);
    }
    if config.version != CONFIG_VERSION {
        log::warn!(
            "Config version {} differs from {}, unknown fields ignored",
            config.version,
            CONFIG_VERSION
        );
    }

    if let Commands::InitConfig = cli.command {
        config.save(&config_path)?;
        println!("wrote {}", config_path.display());
        return Ok(());
    }

    let mut store = MemoryStore::load(&config.snapshot_path)?;
    log::debug!("Loaded snapshot {}", config.snapshot_path.display());

    if run(cli.command, &config, &mut store)? {
        store.save(&config.snapshot_path)?;
        log::debug!("Saved snapshot {}", config.snapshot_path.display());
    }
    Ok(())
}

/// Execute one command; returns whether the snapshot changed.
fn run(
    command: Commands,
    config: &TaskboardConfig,
    store: &mut MemoryStore,
) -> Result<bool, Box<dyn Error>> {
    match command {
        Commands::Dashboard {
            email,
            status,
            sort,
            day,
        } => {
            let filter = status.as_deref().map(StatusFilter::parse).unwrap_or_default();
            show_dashboard(store, config, &email, day.today(), DashboardView { filter, sort })?;
            Ok(false)
        }
        Commands::Status {
            email,
            task_id,
            status,
            day,
        } => {
            let (session, entry) = dashboard_entry(store, config, &email, &task_id, day.today())?;
            let write = workflow::change_status(&entry, &status, &session, Utc::now())?;
            let task = store::write_task(store, &write)?;
            println!("{} is now {}", task.title, task.status);
            Ok(true)
        }
        Commands::Log {
            email,
            task_id,
            minutes,
            day,
        } => {
            let today = day.today();
            let (session, entry) = dashboard_entry(store, config, &email, &task_id, today)?;
            let write = workflow::log_time(&entry, &session, minutes, today)?;
            let task = store::write_task(store, &write)?;
            println!("logged {} min on {}", minutes, task.title);
            Ok(true)
        }
        Commands::Report => {
            show_report(store)?;
            Ok(false)
        }
        Commands::Search { query } => {
            show_search(store, &query.join(" "))?;
            Ok(false)
        }
        Commands::Templates { day } => {
            let activation =
                maintenance::activate_templates(store, day.today(), Utc::now(), config)?;
            println!("created {} task(s) from templates", activation.created.len());
            for id in &activation.skipped_templates {
                println!("! template {} has an unreadable due date", id);
            }
            Ok(!activation.created.is_empty())
        }
        Commands::Purge => {
            let purged = maintenance::purge_completed(store, Utc::now(), config)?;
            println!("purged {} completed task(s)", purged.len());
            Ok(!purged.is_empty())
        }
        Commands::UseTemplate {
            template_id,
            parent,
            day,
        } => {
            let tpl: ProjectTemplate = records::fetch(store, collections::TEMPLATES, &template_id)?;
            template::validate(&tpl)?;
            let tasks = template::use_template(
                &tpl,
                parent.as_deref(),
                day.today(),
                config.template_lead_days,
                Utc::now(),
            )?;
            for task in &tasks {
                let id = store::insert_record(store, collections::TASKS, task)?;
                println!("created {} ({}) due {}", task.title, id, task.due_date);
            }
            Ok(!tasks.is_empty())
        }
        Commands::Contacts {
            email,
            category,
            query,
        } => {
            show_contacts(store, config, &email, category.as_deref(), query.as_deref())?;
            Ok(false)
        }
        Commands::Task(command) => run_task(command, config, store),
        Commands::Contact(command) => run_contact(command, config, store),
        Commands::Guideline(command) => run_guideline(command, config, store),
        Commands::User(command) => run_user(command, config, store),
        Commands::Template(command) => run_template(command, config, store),
        Commands::InitConfig => Ok(false),
    }
}

fn run_task(
    command: TaskCommand,
    config: &TaskboardConfig,
    store: &mut MemoryStore,
) -> Result<bool, Box<dyn Error>> {
    match command {
        TaskCommand::Save { viewer, id, fields } => {
            let session = dashboard::login(store, &viewer, config)?;
            let mut task = match id {
                Some(id) => records::fetch(store, collections::TASKS, task::original_id(&id))?,
                None => Task::new("", ""),
            };
            fields.apply(&mut task);
            let task = records::save_task(store, task, &session, Utc::now())?;
            println!("saved task {} ({})", task.title, task.id);
        }
        TaskCommand::Delete { viewer, id } => {
            let session = dashboard::login(store, &viewer, config)?;
            records::delete_task(store, &id, &session)?;
            println!("deleted task {}", task::original_id(&id));
        }
    }
    Ok(true)
}

fn run_contact(
    command: ContactCommand,
    config: &TaskboardConfig,
    store: &mut MemoryStore,
) -> Result<bool, Box<dyn Error>> {
    match command {
        ContactCommand::Save { viewer, id, fields } => {
            let session = dashboard::login(store, &viewer, config)?;
            let mut contact = match id {
                Some(id) => records::fetch(store, collections::CONTACTS, &id)?,
                None => Contact::default(),
            };
            fields.apply(&mut contact);
            let contact = records::save_contact(store, contact, &session)?;
            println!("saved contact {} ({})", contact.display_name(), contact.id);
        }
        ContactCommand::Delete { viewer, id } => {
            let session = dashboard::login(store, &viewer, config)?;
            records::delete_contact(store, &id, &session)?;
            println!("deleted contact {}", id);
        }
    }
    Ok(true)
}

fn run_guideline(
    command: GuidelineCommand,
    config: &TaskboardConfig,
    store: &mut MemoryStore,
) -> Result<bool, Box<dyn Error>> {
    match command {
        GuidelineCommand::Save {
            viewer,
            id,
            title,
            description,
        } => {
            let session = dashboard::login(store, &viewer, config)?;
            let mut guideline = match id {
                Some(id) => records::fetch(store, collections::GUIDELINES, &id)?,
                None => Guideline::default(),
            };
            if let Some(title) = title {
                guideline.title = title;
            }
            if let Some(description) = description {
                guideline.description = description;
            }
            let guideline = records::save_guideline(store, guideline, &session, Utc::now())?;
            println!("saved guideline {} ({})", guideline.title, guideline.id);
        }
        GuidelineCommand::Delete { viewer, id } => {
            let session = dashboard::login(store, &viewer, config)?;
            records::delete_guideline(store, &id, &session)?;
            println!("deleted guideline {}", id);
        }
    }
    Ok(true)
}

fn run_user(
    command: UserCommand,
    config: &TaskboardConfig,
    store: &mut MemoryStore,
) -> Result<bool, Box<dyn Error>> {
    match command {
        UserCommand::Save {
            viewer,
            id,
            name,
            email,
            phone,
            role,
        } => {
            let session = dashboard::login(store, &viewer, config)?;
            let mut user: User = match id {
                Some(id) => records::fetch(store, collections::USERS, &id)?,
                None => User {
                    id: String::new(),
                    name: String::new(),
                    email: String::new(),
                    phone: String::new(),
                    role: String::new(),
                },
            };
            for (value, field) in [
                (name, &mut user.name),
                (email, &mut user.email),
                (phone, &mut user.phone),
                (role, &mut user.role),
            ] {
                if let Some(value) = value {
                    *field = value;
                }
            }
            let user = records::save_user(store, user, &session)?;
            println!("saved user {} ({})", user.email, user.id);
        }
        UserCommand::Delete { viewer, id } => {
            let session = dashboard::login(store, &viewer, config)?;
            records::delete_user(store, &id, &session)?;
            println!("deleted user {}", id);
        }
    }
    Ok(true)
}

fn run_template(
    command: TemplateCommand,
    config: &TaskboardConfig,
    store: &mut MemoryStore,
) -> Result<bool, Box<dyn Error>> {
    match command {
        TemplateCommand::Save {
            viewer,
            id,
            name,
            description,
            due,
            tasks,
        } => {
            let session = dashboard::login(store, &viewer, config)?;
            let mut tpl: ProjectTemplate = match id {
                Some(id) => records::fetch(store, collections::TEMPLATES, &id)?,
                None => ProjectTemplate::default(),
            };
            if let Some(name) = name {
                tpl.name = name;
            }
            if let Some(description) = description {
                tpl.description = description;
            }
            if let Some(due) = due {
                tpl.template_due_date = due;
            }
            if !tasks.is_empty() {
                tpl.tasks = tasks
                    .into_iter()
                    .map(|title| TemplateTask {
                        title,
                        ..Default::default()
                    })
                    .collect();
            }
            let tpl = records::save_template(store, tpl, &session)?;
            println!("saved template {} ({})", tpl.name, tpl.id);
        }
        TemplateCommand::Delete { viewer, id } => {
            let session = dashboard::login(store, &viewer, config)?;
            records::delete_template(store, &id, &session)?;
            println!("deleted template {}", id);
        }
    }
    Ok(true)
}

fn show_dashboard(
    store: &MemoryStore,
    config: &TaskboardConfig,
    email: &str,
    today: NaiveDate,
    view: DashboardView,
) -> Result<(), Box<dyn Error>> {
    let session = dashboard::login(store, email, config)?;
    let dash = Dashboard::load(store, &session, today, config, view)?;

    let users: Vec<User> = load_all(store, collections::USERS)?;
    let guidelines: Vec<Guideline> = load_all(store, collections::GUIDELINES)?;
    let parents: Vec<ParentTask> = load_all(store, collections::PARENT_TASKS)?;
    let lookups = Lookups {
        users: &users,
        guidelines: &guidelines,
        parents: &parents,
    };

    println!("{} ({}), {}", session.user.name, session.user.role, today);
    for status in TaskStatus::ALL {
        let bucket = dash.board.bucket(status);
        if bucket.is_empty() {
            continue;
        }
        println!("\n{} ({})", status, bucket.len());
        for entry in bucket {
            print_entry(entry, &session, today, config, &lookups);
        }
    }

    for issue in &dash.issues {
        println!("! task {}: unreadable {} ({})", issue.task_id, issue.field, issue.error);
    }
    Ok(())
}

/// Collections a dashboard card refers into.
struct Lookups<'a> {
    users: &'a [User],
    guidelines: &'a [Guideline],
    parents: &'a [ParentTask],
}

fn print_entry(
    entry: &ProjectedTask,
    session: &Session,
    today: NaiveDate,
    config: &TaskboardConfig,
    lookups: &Lookups<'_>,
) {
    let task = &entry.task;
    let (urgency, when) = match task.due() {
        Ok(due) => {
            let urgency = match DueUrgency::of(due.date(), today, config.soon_window_days) {
                DueUrgency::Overdue => "overdue",
                DueUrgency::Today => "today",
                DueUrgency::Soon => "soon",
                DueUrgency::Later => "later",
            };
            let when = if due.has_time() {
                format!("{} {}", due.date(), due.time_of_day())
            } else {
                format!("{} all day", due.date())
            };
            (urgency, when)
        }
        Err(_) => ("no date", task.due_date.clone()),
    };
    println!("  [{}] {}  {}  ({})", urgency, when, task.title, task.id);
    if let Some(priority) = task.priority {
        println!("      priority: {}", priority.label());
    }
    println!("      assigned: {}", user::assignee_names(task, lookups.users));
    if task.frequency.is_recurring() {
        let label = task
            .frequency_subdivision
            .as_ref()
            .and_then(|s| s.label(task.frequency))
            .unwrap_or(task.frequency.as_str());
        println!("      repeats: {}", label);
    }
    if let Some(id) = &task.guideline_id {
        println!("      guideline: {}", guideline::title_of(lookups.guidelines, id));
    }
    if let Some(id) = &task.parent_task_id {
        println!("      parent: {}", task::parent_title(lookups.parents, id));
    }
    if let Some(link) = &task.links {
        println!("      link: {}", links::normalize_link(link));
    }
    for phone in user::assignee_phones(task, lookups.users) {
        println!(
            "      contact: {}  {}",
            links::tel_link(phone),
            links::whatsapp_link(phone, &links::task_message(&task.title))
        );
    }

    let actions: Vec<&str> = workflow::available_actions(entry, session, today)
        .into_iter()
        .map(|a| match a {
            TaskAction::Start => "start",
            TaskAction::LogTime => "log time",
            TaskAction::Complete => "complete",
        })
        .collect();
    if !actions.is_empty() {
        println!("      actions: {}", actions.join(", "));
    }
}

/// Find a task on the viewer's dashboard by its displayed id.
fn dashboard_entry(
    store: &MemoryStore,
    config: &TaskboardConfig,
    email: &str,
    id: &str,
    today: NaiveDate,
) -> Result<(Session, ProjectedTask), Box<dyn Error>> {
    let session = dashboard::login(store, email, config)?;
    let dash = Dashboard::load(store, &session, today, config, DashboardView::default())?;
    let entry = dash.find(id).cloned().ok_or_else(|| StoreError::NotFound {
        collection: "dashboard".to_string(),
        id: id.to_string(),
    })?;
    Ok((session, entry))
}

fn show_report(store: &MemoryStore) -> Result<(), Box<dyn Error>> {
    let tasks: Vec<Task> = load_all(store, collections::TASKS)?;
    let users: Vec<User> = load_all(store, collections::USERS)?;
    println!("{:<24} {:>10} {:>6} {:>10}", "name", "minutes", "tasks", "avg");
    for row in report::efficiency(&tasks, &users) {
        println!(
            "{:<24} {:>10.2} {:>6} {:>10.2}",
            row.name, row.total_minutes, row.task_count, row.avg_minutes_per_task
        );
    }
    Ok(())
}

fn show_search(store: &MemoryStore, query: &str) -> Result<(), Box<dyn Error>> {
    let contacts: Vec<Contact> = load_all(store, collections::CONTACTS)?;
    let guidelines: Vec<Guideline> = load_all(store, collections::GUIDELINES)?;
    let tasks: Vec<Task> = load_all(store, collections::TASKS)?;
    let users: Vec<User> = load_all(store, collections::USERS)?;
    let templates: Vec<ProjectTemplate> = load_all(store, collections::TEMPLATES)?;
    let corpus = SearchCorpus {
        contacts: &contacts,
        guidelines: &guidelines,
        tasks: &tasks,
        users: &users,
        templates: &templates,
    };

    let hits = search::search(&corpus, query);
    if hits.is_empty() {
        println!("no results for {:?}", query);
    }
    for hit in hits {
        println!("{:<17} {}  {}#{}", hit.collection.as_str(), hit.title, hit.route(), hit.id);
    }
    Ok(())
}

fn show_contacts(
    store: &MemoryStore,
    config: &TaskboardConfig,
    email: &str,
    category: Option<&str>,
    query: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let session = dashboard::login(store, email, config)?;
    let contacts: Vec<Contact> = load_all(store, collections::CONTACTS)?;
    let visible = contact::visible_to(&contacts, &session);

    let shown = contact::filter(&visible, category, query.unwrap_or(""));
    for c in &shown {
        println!("{}  {}  {}", c.display_name(), c.phone, c.categories.join(", "));
        if !c.phone.is_empty() {
            println!("    {}", links::tel_link(&c.phone));
        }
    }
    let categories = contact::categories(&contacts);
    if !categories.is_empty() {
        println!("\ncategories: {}", categories.join(", "));
    }
    Ok(())
}
