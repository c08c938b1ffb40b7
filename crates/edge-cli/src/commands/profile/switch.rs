use crate::config::{profile, ConfigError};
use crate::globals::Globals;
use crate::CmdOutput;
use clap::Parser;
use thiserror::Error;

/// Make a profile the default
#[derive(Parser, Debug)]
#[command(name = "switch")]
pub struct SwitchArgs {
    /// Name of the profile to make the default
    pub name: String,
}

#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("The profile '{0}' does not exist. Run `edge profile list` to see your profiles.")]
    NotFound(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CmdOutput for SwitchError {
    fn code(&self) -> String {
        match self {
            SwitchError::NotFound(_) => "profile/not-found".to_string(),
            SwitchError::Config(e) => e.code(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            SwitchError::NotFound(_) => crate::errors::NOUSER,
            SwitchError::Config(e) => e.exitcode(),
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum SwitchMessage {
    #[strum(to_string = "Profile '{0}' is now the default")]
    Switched(String),
}

impl CmdOutput for SwitchMessage {
    fn code(&self) -> String {
        "profile/switched".to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }
}

pub fn run(args: SwitchArgs, globals: &Globals) -> Result<SwitchMessage, SwitchError> {
    let mut config = globals.config.clone();
    if !profile::set_default(&args.name, &mut config.profiles) {
        return Err(SwitchError::NotFound(args.name));
    }
    config.write(&globals.config_path)?;
    Ok(SwitchMessage::Switched(args.name))
}
