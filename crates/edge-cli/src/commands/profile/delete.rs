use crate::commands::interact;
use crate::config::{profile, ConfigError};
use crate::globals::Globals;
use crate::CmdOutput;
use clap::Parser;
use thiserror::Error;

/// Remove a profile from your local configuration
#[derive(Parser, Debug)]
#[command(name = "delete")]
pub struct DeleteArgs {
    /// Name of the profile to delete
    pub name: String,
}

#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("The profile '{0}' does not exist. Run `edge profile list` to see your profiles.")]
    NotFound(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

impl CmdOutput for DeleteError {
    fn code(&self) -> String {
        match self {
            DeleteError::NotFound(_) => "profile/not-found".to_string(),
            DeleteError::Config(e) => e.code(),
            DeleteError::Prompt(_) => "profile/prompt-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            DeleteError::NotFound(_) => crate::errors::NOUSER,
            DeleteError::Config(e) => e.exitcode(),
            DeleteError::Prompt(_) => crate::errors::IOERR,
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum DeleteMessage {
    #[strum(to_string = "Deleted profile '{name}'")]
    Deleted {
        name: String,
        new_default: Option<String>,
    },
    #[strum(to_string = "Profile '{0}' was not deleted")]
    Cancelled(String),
}

impl CmdOutput for DeleteMessage {
    fn code(&self) -> String {
        match self {
            DeleteMessage::Deleted { .. } => "profile/deleted",
            DeleteMessage::Cancelled(_) => "profile/delete-cancelled",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            DeleteMessage::Deleted { name, new_default } => Some(serde_json::json!({
                "deleted": name,
                "default": new_default,
            })),
            DeleteMessage::Cancelled(_) => None,
        }
    }
}

pub fn run(args: DeleteArgs, globals: &Globals) -> Result<DeleteMessage, DeleteError> {
    let mut config = globals.config.clone();
    if !config.profiles.contains_key(&args.name) {
        return Err(DeleteError::NotFound(args.name));
    }

    if !globals.skip_prompts() {
        let prompt = format!("Delete the '{}' profile?", args.name);
        if !interact::confirm(prompt, false).map_err(DeleteError::Prompt)? {
            return Ok(DeleteMessage::Cancelled(args.name));
        }
    }

    profile::delete(&args.name, &mut config.profiles);
    config.write(&globals.config_path)?;

    let new_default = profile::default_profile(&config.profiles).map(|(name, _)| name.to_string());
    if let Some(name) = &new_default {
        log::info!("Profile '{name}' is the default");
    }
    Ok(DeleteMessage::Deleted {
        name: args.name,
        new_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Profile};

    #[test]
    fn test_deleting_default_promotes_first_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let mut globals = crate::test_utils::globals(false, true);
        globals.flags.auto_yes = true;
        globals.config_path = dir.path().join("config.toml");
        for (name, default) in [("alpha", false), ("beta", true), ("gamma", false)] {
            globals.config.profiles.insert(
                name.into(),
                Profile {
                    default,
                    ..Default::default()
                },
            );
        }

        let message = run(DeleteArgs { name: "beta".into() }, &globals).unwrap();
        assert_eq!(message.to_string(), "Deleted profile 'beta'");
        assert_eq!(
            message.data(),
            Some(serde_json::json!({ "deleted": "beta", "default": "alpha" }))
        );

        let saved = Config::load(&globals.config_path).unwrap();
        assert!(!saved.profiles.contains_key("beta"));
        assert!(saved.profiles["alpha"].default);
        assert!(!saved.profiles["gamma"].default);
    }

    #[test]
    fn test_unknown_profile() {
        let mut globals = crate::test_utils::globals(false, false);
        globals.flags.auto_yes = true;
        let err = run(DeleteArgs { name: "ghost".into() }, &globals).unwrap_err();
        assert!(matches!(err, DeleteError::NotFound(_)));
    }
}
