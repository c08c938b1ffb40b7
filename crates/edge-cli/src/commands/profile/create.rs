use crate::auth::server::{self, DEFAULT_TIMEOUT_SECS};
use crate::commands::sso::{self, FlowOptions, Invocation, SsoError, SsoMessage};
use crate::globals::Globals;
use crate::CmdOutput;
use clap::Parser;
use std::time::Duration;
use thiserror::Error;

/// Create a new profile and authenticate it through your browser
#[derive(Parser, Debug)]
#[command(name = "create")]
pub struct CreateArgs {
    /// Name of the profile to create
    pub name: String,

    /// Make the new profile the default
    #[arg(long)]
    pub default: bool,

    /// Seconds to wait for the browser sign-in to complete
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Error, Debug)]
pub enum CreateError {
    #[error("The profile '{0}' already exists. Use `edge profile update {0}` to re-authenticate it.")]
    AlreadyExists(String),
    #[error(transparent)]
    Sso(#[from] SsoError),
}

impl CmdOutput for CreateError {
    fn code(&self) -> String {
        match self {
            CreateError::AlreadyExists(_) => "profile/already-exists".to_string(),
            CreateError::Sso(e) => e.code(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            CreateError::AlreadyExists(_) => crate::errors::DATAERR,
            CreateError::Sso(e) => e.exitcode(),
        }
    }
}

pub fn check_available(name: &str, globals: &Globals) -> Result<(), CreateError> {
    if globals.config.profiles.contains_key(name) {
        return Err(CreateError::AlreadyExists(name.to_string()));
    }
    Ok(())
}

pub async fn run(args: CreateArgs, globals: &Globals) -> Result<SsoMessage, CreateError> {
    check_available(&args.name, globals)?;

    let message = sso::authenticate(
        globals,
        Invocation::ProfileCreate {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    #[tokio::test]
    async fn test_existing_profile_is_rejected() {
        let mut globals = crate::test_utils::globals(false, false);
        globals
            .config
            .profiles
            .insert("work".into(), Profile::default());

        let args = CreateArgs {
            name: "work".into(),
            default: false,
            timeout: 1,
        };
        let err = run(args, &globals).await.unwrap_err();
        assert!(matches!(err, CreateError::AlreadyExists(ref name) if name == "work"));
        assert_eq!(err.exitcode(), crate::errors::DATAERR);
        assert!(check_available("home", &globals).is_ok());
    }
}
