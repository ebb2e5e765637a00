//! # Carehouse
//!
//! Terminal record keeping for a group of residential care houses: houses and
//! their residents, staff assignments, work orders, appointments, inventory,
//! and recurring maintenance. A CLI covers every record type; a TUI covers the
//! two interactive workflows (maintenance check-off and the assignment board).
//!
//! ## Usage
//!
//! ```bash
//! # Launch the TUI (default)
//! carehouse
//!
//! # Load demo data and look around
//! carehouse seed
//! carehouse dashboard
//! carehouse maintenance list
//! carehouse maintenance summary
//!
//! # Maintenance
//! carehouse maintenance add "Smoke Detector Test" --house house-1 --frequency monthly --last-completed 2024-09-01
//! carehouse maintenance complete mt-1
//! carehouse maintenance revert mt-1
//!
//! # Assignments
//! carehouse board
//! carehouse assign member-7 house-2
//! carehouse assign member-7          # unassign
//! ```
//!
//! ## Data Storage
//!
//! Records live in one JSON file, by default in the local data directory
//! (`~/.local/share/carehouse/carehouse.json` on Linux). Override it with
//! `--db PATH` or the `CAREHOUSE_DB` environment variable. Diagnostics go to
//! stderr; `-v` or `CAREHOUSE_LOG=debug` turns them up.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::error;
use carehouse::commands::*;
use carehouse::clock::SystemClock;
use carehouse::config::Config;
use carehouse::error::Result;
use carehouse::facility::Facility;
use carehouse::logging;
use carehouse::storage::JsonFileStore;
use carehouse::tui::run_tui;

#[derive(Parser)]
#[command(name = "carehouse", version)]
#[command(about = "Residential care house manager", long_about = None)]
struct Cli {
    /// Path to the data file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage houses
    House {
        #[command(subcommand)]
        command: HouseCommands,
    },
    /// Manage members (residents and staff)
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Move a member to a house; omit the house to unassign
    Assign {
        member: String,
        house: Option<String>,
    },
    /// Show the assignment board
    Board {
        #[command(flatten)]
        query: MemberQuery,
    },
    /// Manage work orders
    #[command(name = "work-order", alias = "wo")]
    WorkOrder {
        #[command(subcommand)]
        command: WorkOrderCommands,
    },
    /// Manage appointments
    #[command(alias = "appt")]
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommands,
    },
    /// Manage recurring maintenance tasks
    #[command(alias = "mt")]
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommands,
    },
    /// Manage house inventory
    #[command(alias = "inv")]
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Show a month of appointments
    Calendar {
        /// Month to show, YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show headline numbers and alerts
    Dashboard,
    /// Load demo data
    Seed {
        /// Replace existing data
        #[arg(short, long)]
        force: bool,
    },
    /// Reset the database (delete all records)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

impl Commands {
    /// Commands that replace every record and so never need to read the
    /// existing file (which may be unreadable).
    fn overwrites_store(&self) -> bool {
        matches!(self, Commands::Reset { .. } | Commands::Seed { force: true })
    }
}

#[derive(Subcommand)]
enum HouseCommands {
    /// Add a new house
    Add {
        name: String,
        /// Number of residents the house holds
        #[arg(short, long)]
        capacity: u32,
        #[command(flatten)]
        fields: HouseFields,
    },
    /// List houses
    List {
        /// active, archived or all (defaults to active)
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Edit a house
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        capacity: Option<u32>,
        #[command(flatten)]
        fields: HouseFields,
    },
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Add a new member
    Add {
        name: String,
        #[command(flatten)]
        fields: MemberFields,
    },
    /// List members
    List {
        #[command(flatten)]
        query: MemberQuery,
    },
    /// Edit a member
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        fields: MemberFields,
    },
    /// Archive a member and unassign them
    Archive {
        id: String,
    },
}

#[derive(Subcommand)]
enum WorkOrderCommands {
    /// Add a new work order
    Add {
        title: String,
        #[arg(long)]
        house: String,
        /// Person reporting the issue
        #[arg(long = "by")]
        created_by: String,
        #[command(flatten)]
        fields: WorkOrderFields,
    },
    /// List work orders
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        house: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Edit a work order
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long)]
        house: Option<String>,
        #[command(flatten)]
        fields: WorkOrderFields,
    },
}

#[derive(Subcommand)]
enum AppointmentCommands {
    /// Add a new appointment
    Add {
        title: String,
        #[arg(short, long)]
        member: String,
        /// Start, YYYY-MM-DD HH:MM (UTC) or RFC 3339
        #[arg(long)]
        start: String,
        /// End, YYYY-MM-DD HH:MM (UTC) or RFC 3339
        #[arg(long)]
        end: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List appointments
    List {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Edit an appointment
    Edit {
        id: String,
        #[command(flatten)]
        edit: AppointmentEdit,
    },
}

#[derive(Subcommand)]
enum MaintenanceCommands {
    /// Schedule a recurring task
    Add {
        name: String,
        #[arg(long)]
        house: String,
        /// weekly, monthly, quarterly, semi-annually or annually
        #[arg(short, long)]
        frequency: String,
        /// Date last completed, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        last_completed: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List tasks with their current status
    List {
        #[arg(long)]
        house: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Edit a task; the due date is recomputed
    Edit {
        id: String,
        #[command(flatten)]
        edit: MaintenanceEdit,
    },
    /// Mark a task as done now
    Complete {
        id: String,
    },
    /// Undo a completion
    Revert {
        id: String,
    },
    /// Per-house task counts and what needs attention
    Summary,
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// Add an item
    Add {
        name: String,
        #[arg(long)]
        house: String,
        #[arg(short, long, default_value_t = 0)]
        quantity: u32,
        /// in_stock, low_stock or out_of_stock
        #[arg(long)]
        status: Option<String>,
    },
    /// List items
    List {
        #[arg(long)]
        house: Option<String>,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Edit an item
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        house: Option<String>,
        #[arg(short, long)]
        quantity: Option<u32>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Per-house item counts and stock alerts
    Summary,
}

fn run(command: Commands, f: &mut Facility<JsonFileStore>) -> Result<()> {
    match command {
        Commands::House { command } => match command {
            HouseCommands::Add { name, capacity, fields } => cmd_house_add(f, name, capacity, &fields),
            HouseCommands::List { status, search } => cmd_house_list(f, status.as_deref(), &search),
            HouseCommands::Edit { id, name, capacity, fields } => cmd_house_edit(f, &id, name, capacity, &fields),
        },
        Commands::Member { command } => match command {
            MemberCommands::Add { name, fields } => cmd_member_add(f, name, &fields),
            MemberCommands::List { query } => cmd_member_list(f, &query),
            MemberCommands::Edit { id, name, fields } => cmd_member_edit(f, &id, name, &fields),
            MemberCommands::Archive { id } => cmd_member_archive(f, &id),
        },
        Commands::Assign { member, house } => cmd_assign(f, &member, house.as_deref()),
        Commands::Board { query } => cmd_board(f, &query),
        Commands::WorkOrder { command } => match command {
            WorkOrderCommands::Add { title, house, created_by, fields } => cmd_work_order_add(f, title, house, created_by, &fields),
            WorkOrderCommands::List { status, priority, house, search } => cmd_work_order_list(f, status.as_deref(), priority.as_deref(), house, &search),
            WorkOrderCommands::Edit { id, title, house, fields } => cmd_work_order_edit(f, &id, title, house, &fields),
        },
        Commands::Appointment { command } => match command {
            AppointmentCommands::Add { title, member, start, end, description } => cmd_appointment_add(f, title, member, &start, &end, description),
            AppointmentCommands::List { search } => cmd_appointment_list(f, &search),
            AppointmentCommands::Edit { id, edit } => cmd_appointment_edit(f, &id, &edit),
        },
        Commands::Maintenance { command } => match command {
            MaintenanceCommands::Add { name, house, frequency, last_completed, description } => cmd_maintenance_add(f, name, house, &frequency, last_completed.as_deref(), description),
            MaintenanceCommands::List { house, search } => cmd_maintenance_list(f, house, &search),
            MaintenanceCommands::Summary => cmd_maintenance_summary(f),
            MaintenanceCommands::Edit { id, edit } => cmd_maintenance_edit(f, &id, &edit),
            MaintenanceCommands::Complete { id } => cmd_maintenance_complete(f, &id),
            MaintenanceCommands::Revert { id } => cmd_maintenance_revert(f, &id),
        },
        Commands::Inventory { command } => match command {
            InventoryCommands::Add { name, house, quantity, status } => cmd_inventory_add(f, name, house, quantity, status.as_deref()),
            InventoryCommands::List { house, search } => cmd_inventory_list(f, house, &search),
            InventoryCommands::Summary => cmd_inventory_summary(f),
            InventoryCommands::Edit { id, name, house, quantity, status } => cmd_inventory_edit(f, &id, name, house, quantity, status.as_deref()),
        },
        Commands::Calendar { month, search } => cmd_calendar(f, month.as_deref(), &search),
        Commands::Dashboard => cmd_dashboard(f),
        Commands::Seed { force } => cmd_seed(f, force),
        Commands::Reset { force } => cmd_reset(f, force),
        Commands::Completions { .. } | Commands::Ui => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::resolve(cli.db, cli.verbose);
    logging::init(&config.log_filter);

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "carehouse", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let store = JsonFileStore::new(config.db_path.clone());
    let opened = match &cli.command {
        Some(command) if command.overwrites_store() => Ok(Facility::detached(store, SystemClock)),
        _ => Facility::open(store),
    };
    let mut facility = match opened {
        Ok(f) => f,
        Err(e) => {
            error!(path = %config.db_path.display(), "failed to open data file");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(facility) {
                eprintln!("Error running TUI: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Some(command) => match run(command, &mut facility) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
