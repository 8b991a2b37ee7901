//! PawMilya CLI - maintenance tools for the clinic site.
//!
//! # Usage
//!
//! ```bash
//! # Create a local account (admin role for staff)
//! pawmilya users create -e vet@pawmilya.example -n "Clinic Vet" -p "s3cret-pass" --admin
//!
//! # List local accounts
//! pawmilya users list
//!
//! # Review and export visitor feedback
//! pawmilya feedback list --status new
//! pawmilya feedback export -o feedback.json
//!
//! # Bookings saved while the hosted backend was unreachable
//! pawmilya appointments list-local
//!
//! # Verify the hosted backend credentials
//! pawmilya remote check
//! ```
//!
//! All commands read the same environment as the site (`PAWMILYA_DATA_DIR`,
//! `REMOTE_URL`, `REMOTE_ANON_KEY`, ...), including a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pawmilya")]
#[command(author, version, about = "PawMilya clinic site tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage local fallback accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Review visitor feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
    /// Inspect locally stored appointments
    Appointments {
        #[command(subcommand)]
        action: AppointmentsAction,
    },
    /// Hosted backend tools
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create a local account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Give the account the admin role
        #[arg(long)]
        admin: bool,
    },
    /// List local accounts
    List,
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// List feedback, newest first
    List {
        /// Only show entries with this status (`new`, `reviewed`, `in_progress`, `resolved`)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Write every feedback entry to a JSON file
    Export {
        /// Destination file
        #[arg(short, long)]
        output: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum AppointmentsAction {
    /// List bookings held in the local store
    ListLocal,
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Check that the hosted backend answers with the configured key
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = commands::load_config()?;
    let store = pawmilya_site::store::LocalStore::new(config.data_dir.clone());

    match cli.command {
        Commands::Users { action } => match action {
            UsersAction::Create {
                email,
                name,
                password,
                admin,
            } => {
                commands::users::create(&store, &email, &name, &password, admin).await?;
            }
            UsersAction::List => commands::users::list(&store).await?,
        },
        Commands::Feedback { action } => match action {
            FeedbackAction::List { status } => {
                commands::feedback::list(&store, status.as_deref()).await?;
            }
            FeedbackAction::Export { output } => {
                commands::feedback::export(&store, &output).await?;
            }
        },
        Commands::Appointments { action } => match action {
            AppointmentsAction::ListLocal => commands::appointments::list_local(&store).await?,
        },
        Commands::Remote { action } => match action {
            RemoteAction::Check => commands::remote::check(&config).await?,
        },
    }
    Ok(())
}
