use crate::auth::server::{self, DEFAULT_TIMEOUT_SECS};
use crate::commands::sso::{self, FlowOptions, Invocation, SsoError, SsoMessage};
use crate::globals::Globals;
use crate::CmdOutput;
use clap::Parser;
use std::time::Duration;
use thiserror::Error;

/// Re-authenticate an existing profile through your browser
#[derive(Parser, Debug)]
#[command(name = "update")]
pub struct UpdateArgs {
    /// Name of the profile to update
    pub name: String,

    /// Make the profile the default
    #[arg(long)]
    pub default: bool,

    /// Seconds to wait for the browser sign-in to complete
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("The profile '{0}' does not exist. Use `edge profile create {0}` to create it.")]
    NotFound(String),
    #[error(transparent)]
    Sso(#[from] SsoError),
}

impl CmdOutput for UpdateError {
    fn code(&self) -> String {
        match self {
            UpdateError::NotFound(_) => "profile/not-found".to_string(),
            UpdateError::Sso(e) => e.code(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            UpdateError::NotFound(_) => crate::errors::NOUSER,
            UpdateError::Sso(e) => e.exitcode(),
        }
    }
}

pub async fn run(args: UpdateArgs, globals: &Globals) -> Result<SsoMessage, UpdateError> {
    if !globals.config.profiles.contains_key(&args.name) {
        return Err(UpdateError::NotFound(args.name));
    }

    let message = sso::authenticate(
        globals,
        Invocation::ProfileUpdate {
            name: args.name,
            make_default: args.default,
        },
        FlowOptions {
            browser: &server::system_browser,
            timeout: Duration::from_secs(args.timeout),
            prompt: false,
        },
    )
    .await?;
    Ok(message)
}
