use std::process::ExitCode;

use anyhow::Result;
use userdesk_client::{
    AuthError, ForgotPasswordFlow, NewUser, PermissionChecker,
    auth::flow::DEFAULT_SUCCESS_MESSAGE, users::filter_users,
};
use userdesk_model::UpdateUserRequest;

use crate::context::{Console, GlobalOptions};
use crate::prompt::{self, SecretSource};
use crate::{Command, PasswordAction, UpdateFields, UsersAction, output};

fn source(from_stdin: bool) -> SecretSource {
    if from_stdin {
        SecretSource::Stdin
    } else {
        SecretSource::Prompt
    }
}

pub(crate) async fn run(
    options: &GlobalOptions,
    command: Command,
) -> Result<ExitCode> {
    let console = Console::open(options)?;

    match command {
        Command::Login {
            email,
            password_stdin,
        } => {
            let email = prompt::text("Email", email)?;
            let password = prompt::secret("Password", source(password_stdin))?;
            let session = console.gateway.login(&email, &password).await?;
            println!("Logged in as {}", output::session_line(&session));
        }
        Command::Logout => {
            console.gateway.logout();
            println!("Logged out.");
        }
        Command::Whoami { refresh } => {
            let session = if refresh {
                console.gateway.validate_session().await?
            } else {
                console.session.current().ok_or(AuthError::NotAuthenticated)?
            };
            println!(
                "{} on {}",
                output::session_line(&session),
                console.config.api.base_url
            );
        }
        Command::Can { capability } => {
            let current = console.session.current();
            let allowed = PermissionChecker::new(current.as_ref())
                .has_capability(&capability);
            let verdict = if allowed { "allowed" } else { "denied" };
            println!("{capability}: {verdict}");
            if !allowed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Users { action } => users(&console, action).await?,
        Command::Password { action } => password(&console, action).await?,
    }
    Ok(ExitCode::SUCCESS)
}

async fn users(console: &Console, action: UsersAction) -> Result<()> {
    match action {
        UsersAction::List { search, json } => {
            let all = console.users.list_users().await?;
            let term = search.as_deref().unwrap_or_default();
            let shown = filter_users(&all, term);
            if json {
                output::json(&shown)?;
            } else {
                output::user_table(&shown);
            }
        }
        UsersAction::Show { id, json } => {
            let user = console.users.get_user(id).await?;
            if json {
                output::json(&user)?;
            } else {
                output::user_detail(&user);
            }
        }
        UsersAction::Create {
            name,
            email,
            admin,
            password_stdin,
        } => {
            let name = prompt::text("Name", name)?;
            let email = prompt::text("Email", email)?;
            let (password, confirmation) =
                prompt::new_secret("Password", source(password_stdin))?;
            let created = console
                .users
                .create_user(&NewUser {
                    name,
                    email,
                    password,
                    confirm_password: Some(confirmation),
                    is_administrator: admin,
                })
                .await?;
            println!("Created user {} ({})", created.id, created.email);
        }
        UsersAction::Update { id, fields } => {
            let UpdateFields {
                name,
                email,
                active,
                admin,
            } = fields;
            let updated = console
                .users
                .update_user(
                    id,
                    UpdateUserRequest {
                        name,
                        email,
                        is_active: active,
                        is_administrator: admin,
                    },
                )
                .await?;
            output::user_detail(&updated);
        }
        UsersAction::Delete { id, yes } => {
            if !yes && !prompt::confirm(&format!("Delete user {id}?"))? {
                println!("Aborted.");
                return Ok(());
            }
            console.users.delete_user(id).await?;
            println!("Deleted user {id}.");
        }
    }
    Ok(())
}

async fn password(console: &Console, action: PasswordAction) -> Result<()> {
    match action {
        PasswordAction::Forgot {
            email,
            token,
            password_stdin,
        } => {
            let mut flow = match token {
                Some(token) => ForgotPasswordFlow::with_token(token),
                None => {
                    let email = prompt::text("Email", email)?;
                    let mut flow = ForgotPasswordFlow::new();
                    flow.request_token(&console.gateway, &email).await?;
                    eprintln!("Reset token issued.");
                    flow
                }
            };
            let (password, confirmation) =
                prompt::new_secret("New password", source(password_stdin))?;
            let message = flow
                .submit(&console.gateway, &password, Some(&confirmation))
                .await?;
            println!("{message}");
        }
        PasswordAction::Reset {
            email,
            password_stdin,
        } => {
            let default_email = console
                .session
                .with_session(|s| s.map(|s| s.user.user.email.clone()));
            let email = match email.or(default_email) {
                Some(email) => email,
                None => prompt::text("Email", None)?,
            };
            let (password, confirmation) =
                prompt::new_secret("New password", source(password_stdin))?;
            let outcome = console
                .gateway
                .reset_authenticated(&email, &password, Some(&confirmation))
                .await?;
            println!(
                "{}",
                outcome
                    .message
                    .as_deref()
                    .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
            );
        }
    }
    Ok(())
}
