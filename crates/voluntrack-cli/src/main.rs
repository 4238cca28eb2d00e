//! Voluntrack - command line client for the community volunteer service.
//!
//! Talks to the volunteer API for browsing activities, signing up and
//! tracking hours, and starts the backend and frontend dev servers with
//! `voluntrack start`.

mod commands;
mod launcher;
mod utils;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use voluntrack_core::models::{ActivityQuery, ActivityStatus, ProfileUpdate, RegistrationStatus};
use voluntrack_core::{ApiError, AppState, Config};

use commands::{ConsoleNotifier, CreateActivityArgs, SignupArgs};
use launcher::LaunchConfig;

#[derive(Parser)]
#[command(name = "voluntrack")]
#[command(version)]
#[command(about = "Community volunteer service client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the backend and frontend development servers
    Start {
        /// Directory containing the backend's run.py
        #[arg(long, default_value = "backend")]
        backend_dir: PathBuf,
        /// Directory containing the frontend's package.json
        #[arg(long, default_value = "frontend")]
        frontend_dir: PathBuf,
    },

    #[command(flatten)]
    Client(ClientCommand),
}

/// Commands that talk to the volunteer API.
#[derive(Subcommand)]
enum ClientCommand {
    /// Log in and save the access token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Create a new account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long = "real-name")]
        real_name: String,
        #[arg(long)]
        phone: Option<String>,
        /// Register as an activity organizer
        #[arg(long)]
        organizer: bool,
    },

    /// Forget the saved access token
    Logout,

    /// Show your profile, or update it when any field is given
    Profile {
        #[arg(long = "real-name")]
        real_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Show your volunteering statistics
    Stats,

    /// List activities
    Activities {
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(long = "per-page")]
        per_page: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = commands::parse_activity_status)]
        status: Option<ActivityStatus>,
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one activity
    Activity {
        #[arg(value_name = "ACTIVITY_ID")]
        id: i64,
    },

    /// Publish a new activity
    CreateActivity {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: String,
        /// Start time, YYYY-MM-DD HH:MM
        #[arg(long)]
        start: String,
        /// End time, YYYY-MM-DD HH:MM
        #[arg(long)]
        end: String,
        #[arg(long = "max-participants")]
        max_participants: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        /// Volunteer hours credited on completion
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        requirements: Option<String>,
        #[arg(long = "contact-person")]
        contact_person: Option<String>,
        #[arg(long = "contact-phone")]
        contact_phone: Option<String>,
        #[arg(long = "image-url")]
        image_url: Option<String>,
    },

    /// Activities you created
    MyActivities {
        #[arg(short, long)]
        page: Option<u32>,
    },

    /// Your registrations
    Registrations {
        #[arg(long, value_parser = commands::parse_registration_status)]
        status: Option<RegistrationStatus>,
        #[arg(short, long)]
        page: Option<u32>,
    },

    /// Sign up for an activity
    Register {
        #[arg(value_name = "ACTIVITY_ID")]
        id: i64,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Cancel your registration for an activity
    Unregister {
        #[arg(value_name = "ACTIVITY_ID")]
        id: i64,
    },

    /// Check in to a registered activity
    CheckIn {
        #[arg(value_name = "REGISTRATION_ID")]
        id: i64,
    },

    /// Mark a checked-in activity as completed
    Complete {
        #[arg(value_name = "REGISTRATION_ID")]
        id: i64,
        /// Rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
        #[arg(long)]
        feedback: Option<String>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(default_level: &str) {
    // RUST_LOG overrides the default level (e.g., RUST_LOG=voluntrack_core=debug)
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let level = match cli.command {
        Commands::Start { .. } => "info",
        _ => "warn",
    };
    init_tracing(level);

    if let Err(e) = run(cli.command).await {
        // Request failures were already reported by the notifier
        if e.downcast_ref::<ApiError>().is_none() {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Start {
            backend_dir,
            frontend_dir,
        } => {
            launcher::run(LaunchConfig {
                backend_dir,
                frontend_dir,
            })
            .await
        }
        Commands::Client(command) => run_client(command).await,
    }
}

async fn run_client(command: ClientCommand) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;
    let state = AppState::from_config(&config, Arc::new(ConsoleNotifier))
        .context("Failed to initialize client")?;
    info!(command = command_name(&command), "Running command");

    // Validate a saved token before anything looks at the login state
    if !matches!(command, ClientCommand::Logout) {
        state.auth.check_auth().await;
    }

    match command {
        ClientCommand::Login { username } => commands::login(&state, &mut config, username).await,
        ClientCommand::Signup {
            username,
            email,
            real_name,
            phone,
            organizer,
        } => {
            commands::signup(
                &state,
                SignupArgs {
                    username,
                    email,
                    real_name,
                    phone,
                    organizer,
                },
            )
            .await
        }
        ClientCommand::Logout => {
            commands::logout(&state);
            Ok(())
        }
        ClientCommand::Profile {
            real_name,
            phone,
            avatar,
        } => {
            commands::profile(
                &state,
                ProfileUpdate {
                    real_name,
                    phone,
                    avatar,
                },
            )
            .await
        }
        ClientCommand::Stats => commands::statistics(&state).await,
        ClientCommand::Activities {
            page,
            per_page,
            category,
            status,
            search,
        } => {
            let query = ActivityQuery {
                page,
                per_page,
                category,
                status,
                search,
            };
            commands::list_activities(&state, query).await
        }
        ClientCommand::Activity { id } => commands::show_activity(&state, id).await,
        ClientCommand::CreateActivity {
            title,
            description,
            location,
            start,
            end,
            max_participants,
            category,
            hours,
            requirements,
            contact_person,
            contact_phone,
            image_url,
        } => {
            let args = CreateActivityArgs {
                title,
                description,
                location,
                start,
                end,
                max_participants,
                category,
                hours,
                requirements,
                contact_person,
                contact_phone,
                image_url,
            };
            commands::create_activity(&state, args).await
        }
        ClientCommand::MyActivities { page } => commands::my_activities(&state, page).await,
        ClientCommand::Registrations { status, page } => {
            commands::my_registrations(&state, status, page).await
        }
        ClientCommand::Register { id, notes } => commands::register(&state, id, notes).await,
        ClientCommand::Unregister { id } => commands::unregister(&state, id).await,
        ClientCommand::CheckIn { id } => commands::check_in(&state, id).await,
        ClientCommand::Complete {
            id,
            rating,
            feedback,
        } => commands::complete(&state, id, rating, feedback).await,
    }
}

fn command_name(command: &ClientCommand) -> &'static str {
    match command {
        ClientCommand::Login { .. } => "login",
        ClientCommand::Signup { .. } => "signup",
        ClientCommand::Logout => "logout",
        ClientCommand::Profile { .. } => "profile",
        ClientCommand::Stats => "stats",
        ClientCommand::Activities { .. } => "activities",
        ClientCommand::Activity { .. } => "activity",
        ClientCommand::CreateActivity { .. } => "create-activity",
        ClientCommand::MyActivities { .. } => "my-activities",
        ClientCommand::Registrations { .. } => "registrations",
        ClientCommand::Register { .. } => "register",
        ClientCommand::Unregister { .. } => "unregister",
        ClientCommand::CheckIn { .. } => "check-in",
        ClientCommand::Complete { .. } => "complete",
    }
}
