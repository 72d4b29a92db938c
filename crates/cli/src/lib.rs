pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::customers::{AddArgs, EditArgs};

#[derive(Debug, Parser)]
#[command(
    name = "trackline",
    about = "Trackline operator CLI",
    long_about = "Manage customer tracking records held by the hosted data service: list, create, edit, delete, and keyword search, plus config inspection and readiness checks.",
    after_help = "Examples:\n  trackline list --status active\n  trackline add --name \"Acme Co\" --unique-id ACME-001 --tracking TRK-1001\n  trackline search acme\n  trackline doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List customers, newest first, with an optional status filter")]
    List {
        #[arg(long, help = "Only show customers with this status (active|pending|completed|cancelled)")]
        status: Option<String>,
    },
    #[command(about = "Create a customer record")]
    Add {
        #[arg(long, help = "Customer display name")]
        name: String,
        #[arg(long = "unique-id", help = "External identifier")]
        unique_id: String,
        #[arg(long, help = "Tracking number")]
        tracking: String,
        #[arg(long, help = "Initial status (defaults to active)")]
        status: Option<String>,
        #[arg(long, help = "Free-text notes")]
        notes: Option<String>,
    },
    #[command(about = "Update fields of an existing customer record")]
    Edit {
        #[arg(help = "Customer id")]
        id: String,
        #[arg(long, help = "Customer display name")]
        name: Option<String>,
        #[arg(long = "unique-id", help = "External identifier")]
        unique_id: Option<String>,
        #[arg(long, help = "Tracking number")]
        tracking: Option<String>,
        #[arg(long, help = "Status (active|pending|completed|cancelled)")]
        status: Option<String>,
        #[arg(long, help = "Free-text notes")]
        notes: Option<String>,
    },
    #[command(about = "Delete a customer record")]
    Remove {
        #[arg(help = "Customer id")]
        id: String,
    },
    #[command(about = "Keyword search over name, external id, and tracking number")]
    Search {
        #[arg(help = "Search term (case-insensitive substring)")]
        term: String,
    },
    #[command(about = "Verify the configured operator credentials against the auth service")]
    Login,
    #[command(about = "Sign in and revoke the session, verifying the sign-out path")]
    Logout,
    #[command(about = "Show the authenticated principal for the configured credentials")]
    Whoami,
    #[command(about = "Insert deterministic demo customers through the store")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, credential presence, and remote reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("TRACKLINE_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Diagnostics go to stderr; stdout is reserved for command payloads.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::List { status } => commands::customers::list(status),
        Command::Add { name, unique_id, tracking, status, notes } => {
            commands::customers::add(AddArgs { name, unique_id, tracking, status, notes })
        }
        Command::Edit { id, name, unique_id, tracking, status, notes } => {
            commands::customers::edit(EditArgs { id, name, unique_id, tracking, status, notes })
        }
        Command::Remove { id } => commands::customers::remove(id),
        Command::Search { term } => commands::customers::search(term),
        Command::Login => commands::auth::login(),
        Command::Logout => commands::auth::logout(),
        Command::Whoami => commands::auth::whoami(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
