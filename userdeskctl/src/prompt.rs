use std::io::BufRead;

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input, Password, console::Term};

/// Where secrets come from for this invocation.
#[derive(Debug, Clone, Copy)]
pub enum SecretSource {
    Prompt,
    /// One line per secret on stdin, for scripts.
    Stdin,
}

pub fn text(prompt: &str, given: Option<String>) -> Result<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text_on(&Term::stderr())
        .context("failed to read input")
}

pub fn secret(prompt: &str, source: SecretSource) -> Result<String> {
    match source {
        SecretSource::Prompt => Password::new()
            .with_prompt(prompt)
            .interact_on(&Term::stderr())
            .context("failed to read password"),
        SecretSource::Stdin => read_stdin_line(),
    }
}

/// New password plus its confirmation. Mismatches are left for the client
/// validation to report.
pub fn new_secret(
    prompt: &str,
    source: SecretSource,
) -> Result<(String, String)> {
    match source {
        SecretSource::Prompt => {
            let password = secret(prompt, source)?;
            let confirmation = Password::new()
                .with_prompt("Confirm password")
                .interact_on(&Term::stderr())
                .context("failed to read password")?;
            Ok((password, confirmation))
        }
        SecretSource::Stdin => {
            let password = read_stdin_line()?;
            Ok((password.clone(), password))
        }
    }
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact_on(&Term::stderr())
        .context("failed to read confirmation")
}

fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    if read == 0 {
        bail!("expected a password on stdin");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
