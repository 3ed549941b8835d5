//! `userdeskctl`: log in, manage users and reset passwords from a terminal.

mod commands;
mod context;
mod output;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};
use userdesk_client::{
    ApiError, AuthError, ErrorClass, ResetError, UserAdminError,
};
use userdesk_model::UserId;

use crate::context::GlobalOptions;

#[derive(Parser)]
#[command(
    name = "userdeskctl",
    version,
    about = "User-management console for the userdesk API"
)]
struct Cli {
    /// Config file (default: <config dir>/userdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Env file read before the process environment
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// API base URL, overrides config and environment
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the saved session
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// More logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and save the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Re-fetch the user from the server and refresh the saved role
        #[arg(long)]
        refresh: bool,
    },
    /// Check a capability (create_user, list_users, view_user)
    Can { capability: String },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Reset a password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List users
    List {
        /// Keep users whose id, name or email contains this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one user
    Show {
        id: UserId,
        #[arg(long)]
        json: bool,
    },
    /// Create a user (administrators only)
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        password_stdin: bool,
    },
    /// Change fields of a user
    Update {
        id: UserId,
        #[command(flatten)]
        fields: UpdateFields,
    },
    /// Delete a user
    Delete {
        id: UserId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct UpdateFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub admin: Option<bool>,
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Forgotten password: get a reset token, then set a new password
    Forgot {
        #[arg(long)]
        email: Option<String>,
        /// Use a reset token you already have instead of requesting one
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        password_stdin: bool,
    },
    /// Set a password using the current session
    Reset {
        /// Account to change (default: the logged-in user)
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password_stdin: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = GlobalOptions {
        config: cli.config,
        env_file: Some(cli.env_file),
        api_url: cli.api_url,
        state_dir: cli.state_dir,
    };

    match commands::run(&options, cli.command).await {
        Ok(code) => code,
        Err(err) => report(&err),
    }
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Print the operator-facing message and map the error class to an exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    let classified = if let Some(e) = err.downcast_ref::<AuthError>() {
        Some((e.class(), e.user_message()))
    } else if let Some(e) = err.downcast_ref::<ResetError>() {
        Some((e.class(), e.user_message()))
    } else if let Some(e) = err.downcast_ref::<UserAdminError>() {
        Some((e.class(), e.user_message()))
    } else {
        err.downcast_ref::<ApiError>()
            .map(|e| (e.class(), e.user_message()))
    };

    match classified {
        Some((class, message)) => {
            eprintln!("error: {message}");
            tracing::debug!("{err:#}");
            ExitCode::from(exit_code(class))
        }
        None => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn exit_code(class: ErrorClass) -> u8 {
    match class {
        ErrorClass::Transient => 1,
        ErrorClass::Validation => 2,
        ErrorClass::AuthenticationRejected => 3,
        ErrorClass::AuthorizationDenied => 4,
        ErrorClass::NotFound => 5,
    }
}
