// ABOUTME: FormCoach CLI - command-line front end for accounts, exercises, workouts and sessions
// ABOUTME: Analyzes recorded pose frames and prints stored session metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Create a client account
//! formcoach-cli user create-client --user-name ana --name Ana --family-name Lopez \
//!     --email ana@gym.example.com --password secret1
//!
//! # Import an exercise specification and a workout
//! formcoach-cli exercise import squat.json
//! formcoach-cli workout import legs.json
//!
//! # Analyze a folder of recorded pose frames and store the session
//! formcoach-cli session analyze --client 1 --workout 1 --exercise 1 --frames ./frames
//!
//! # Inspect the stored session
//! formcoach-cli session metrics 1 --serie 1
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use formcoach::config::{AppConfig, DatabaseUrl};
use formcoach::database::Database;
use formcoach::errors::AppResult;
use tracing::{error, info};

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "formcoach-cli",
    about = "FormCoach training management CLI",
    long_about = "Manage users, exercise specifications and workouts, and analyze recorded pose frames."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// User account commands
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Exercise specification commands
    Exercise {
        #[command(subcommand)]
        action: ExerciseCommand,
    },

    /// Workout commands
    Workout {
        #[command(subcommand)]
        action: WorkoutCommand,
    },

    /// Training session commands
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },
}

/// Fields shared by every account type
#[derive(Args)]
struct AccountArgs {
    /// Login name
    #[arg(long)]
    user_name: String,

    /// First name
    #[arg(long)]
    name: String,

    /// Family name
    #[arg(long)]
    family_name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Password (at least 6 characters)
    #[arg(long)]
    password: String,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum UserCommand {
    /// Create a client account
    CreateClient {
        #[command(flatten)]
        account: AccountArgs,

        /// Training plan
        #[arg(long, default_value = "")]
        plan: String,

        /// Fitness level
        #[arg(long, default_value = "")]
        level: String,
    },

    /// Create a trainer account
    CreateTrainer {
        #[command(flatten)]
        account: AccountArgs,

        /// Qualification
        #[arg(long, default_value = "")]
        qualification: String,

        /// Specialty
        #[arg(long, default_value = "")]
        specialty: String,

        /// Years of experience
        #[arg(long, default_value = "0")]
        experience_years: u32,
    },

    /// Create an admin account
    CreateAdmin {
        #[command(flatten)]
        account: AccountArgs,

        /// Role description
        #[arg(long, default_value = "")]
        role_description: String,
    },

    /// List users
    List {
        /// Only this type (admin, client, trainer)
        #[arg(long)]
        user_type: Option<String>,
    },

    /// Check credentials
    Login {
        /// User name or email
        user: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Change a password
    ChangePassword {
        /// User id
        #[arg(long)]
        id: i64,

        /// Current password
        #[arg(long)]
        old_password: String,

        /// New password
        #[arg(long)]
        new_password: String,
    },

    /// Delete a user
    Delete {
        /// User id
        id: i64,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum ExerciseCommand {
    /// Import an exercise specification from JSON
    Import {
        /// Specification file
        file: PathBuf,
    },

    /// Print an exercise specification as JSON
    Show {
        /// Exercise id
        id: i64,
    },

    /// List exercise specifications
    List,

    /// Delete an exercise specification
    Delete {
        /// Exercise id
        id: i64,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum WorkoutCommand {
    /// Import a workout from JSON
    Import {
        /// Workout file
        file: PathBuf,
    },

    /// Print a workout as JSON
    Show {
        /// Workout id
        id: i64,
    },

    /// List workouts
    List,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum SessionCommand {
    /// Analyze a folder of recorded pose frames and store the session
    Analyze {
        /// Client id
        #[arg(long)]
        client: i64,

        /// Workout id
        #[arg(long)]
        workout: i64,

        /// Exercise id
        #[arg(long)]
        exercise: i64,

        /// Folder with primary view frames
        #[arg(long)]
        frames: PathBuf,

        /// Folder with secondary view frames (enables dual mode)
        #[arg(long)]
        frames2: Option<PathBuf>,

        /// Keypoint names and connections JSON
        #[arg(long)]
        keypoints: Option<PathBuf>,

        /// Pose configuration JSON (defaults to FORMCOACH_* variables)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print a stored session
    Show {
        /// Session id
        id: i64,
    },

    /// Print metrics of a stored session
    Metrics {
        /// Session id
        id: i64,

        /// Restrict to one serie
        #[arg(long)]
        serie: Option<i64>,
    },

    /// List a client's sessions of one workout exercise
    List {
        /// Client id
        #[arg(long)]
        client: i64,

        /// Workout id
        #[arg(long)]
        workout: i64,

        /// Exercise id
        #[arg(long)]
        exercise: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code, error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.code.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if cli.verbose {
        config.logging = config.logging.with_level("debug");
    }
    config.logging.init()?;

    info!("FormCoach CLI");

    if let Some(url) = &cli.database_url {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    info!(database = %config.database.url, "Connecting to database");
    let database = Database::from_config(&config.database).await?;

    let outcome = run(cli.command, &database, config).await;
    database.close().await;
    outcome
}

async fn run(command: Command, database: &Database, config: AppConfig) -> Result<()> {
    match command {
        Command::User { action } => match action {
            UserCommand::CreateClient {
                account,
                plan,
                level,
            } => commands::user::create_client(database, &account, plan, level).await,
            UserCommand::CreateTrainer {
                account,
                qualification,
                specialty,
                experience_years,
            } => {
                commands::user::create_trainer(
                    database,
                    &account,
                    qualification,
                    specialty,
                    experience_years,
                )
                .await
            }
            UserCommand::CreateAdmin {
                account,
                role_description,
            } => commands::user::create_admin(database, &account, role_description).await,
            UserCommand::List { user_type } => {
                commands::user::list(database, user_type.as_deref()).await
            }
            UserCommand::Login { user, password } => {
                commands::user::login(database, &user, &password).await
            }
            UserCommand::ChangePassword {
                id,
                old_password,
                new_password,
            } => commands::user::change_password(database, id, &old_password, &new_password).await,
            UserCommand::Delete { id } => commands::user::delete(database, id).await,
        },
        Command::Exercise { action } => match action {
            ExerciseCommand::Import { file } => commands::exercise::import(database, &file).await,
            ExerciseCommand::Show { id } => commands::exercise::show(database, id).await,
            ExerciseCommand::List => commands::exercise::list(database).await,
            ExerciseCommand::Delete { id } => commands::exercise::delete(database, id).await,
        },
        Command::Workout { action } => match action {
            WorkoutCommand::Import { file } => commands::workout::import(database, &file).await,
            WorkoutCommand::Show { id } => commands::workout::show(database, id).await,
            WorkoutCommand::List => commands::workout::list(database).await,
        },
        Command::Session { action } => match action {
            SessionCommand::Analyze {
                client,
                workout,
                exercise,
                frames,
                frames2,
                keypoints,
                config: pose_config,
            } => {
                let request = commands::session::AnalyzeRequest {
                    client,
                    workout,
                    exercise,
                    frames,
                    frames2,
                    keypoints,
                    pose_config,
                };
                commands::session::analyze(database, config.capture, request).await
            }
            SessionCommand::Show { id } => commands::session::show(database, id).await,
            SessionCommand::Metrics { id, serie } => {
                commands::session::metrics(database, id, serie).await
            }
            SessionCommand::List {
                client,
                workout,
                exercise,
            } => commands::session::list(database, client, workout, exercise).await,
        },
    }
}
