use crate::config::{self, Config, ConfigError};
use crate::manifest::{self, Manifest, ManifestError};
use crate::CmdOutput;
use clap::Args;
use common::api::accounts::{DEFAULT_ACCOUNT_ENDPOINT, DEFAULT_CLIENT_ID};
use common::api::client::DEFAULT_API_ENDPOINT;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_API_TOKEN: &str = "EDGE_API_TOKEN";
pub const ENV_API_ENDPOINT: &str = "EDGE_API_ENDPOINT";
pub const ENV_ACCOUNT_ENDPOINT: &str = "EDGE_ACCOUNT_ENDPOINT";
pub const ENV_SERVICE_ID: &str = "EDGE_SERVICE_ID";

/// Flags accepted by every subcommand.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalFlags {
    /// Toggle verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Toggle JSON output for stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// API token to use instead of the profile's session token
    #[arg(short, long, global = true)]
    pub token: Option<String>,

    /// Profile to use for this command
    #[arg(short = 'o', long, global = true)]
    pub profile: Option<String>,

    /// Management API endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Answer yes automatically to every confirmation prompt
    #[arg(short = 'y', long = "auto-yes", global = true)]
    pub auto_yes: bool,

    /// Do not prompt for input, use defaults instead
    #[arg(short = 'i', long = "non-interactive", global = true)]
    pub non_interactive: bool,
}

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("invalid flag combination, --verbose and --json")]
    VerboseJson,
}

impl CmdOutput for FlagError {
    fn code(&self) -> String {
        match self {
            FlagError::VerboseJson => "flags/verbose-json",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::USAGE
    }
}

impl GlobalFlags {
    pub fn validate(&self) -> Result<(), FlagError> {
        if self.verbose && self.json {
            return Err(FlagError::VerboseJson);
        }
        Ok(())
    }
}

/// Environment variables the CLI reads, captured once at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Environment {
    pub api_token: Option<String>,
    pub api_endpoint: Option<String>,
    pub account_endpoint: Option<String>,
    pub service_id: Option<String>,
    pub config_path: Option<String>,
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl Environment {
    pub fn from_env() -> Self {
        Self {
            api_token: non_empty_var(ENV_API_TOKEN),
            api_endpoint: non_empty_var(ENV_API_ENDPOINT),
            account_endpoint: non_empty_var(ENV_ACCOUNT_ENDPOINT),
            service_id: non_empty_var(ENV_SERVICE_ID),
            config_path: non_empty_var(config::CONFIG_ENV),
        }
    }
}

#[derive(Debug, Error)]
pub enum GlobalsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

impl CmdOutput for GlobalsError {
    fn code(&self) -> String {
        match self {
            GlobalsError::Config(e) => e.code(),
            GlobalsError::Manifest(_) => "manifest/read-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            GlobalsError::Config(e) => e.exitcode(),
            GlobalsError::Manifest(_) => crate::errors::CONFIG,
        }
    }
}

/// Everything a command needs to know about how the CLI was invoked.
#[derive(Clone, Debug, Default)]
pub struct Globals {
    pub flags: GlobalFlags,
    pub env: Environment,
    pub config: Config,
    pub config_path: PathBuf,
    pub manifest: Manifest,
}

impl Globals {
    pub fn load(flags: GlobalFlags) -> Result<Self, GlobalsError> {
        let env = Environment::from_env();
        let config_path = config::config_path(env.config_path.clone())?;
        let config = Config::load(&config_path)?;
        let manifest = manifest::get_manifest_from_pwd()?;
        log::debug!("Using config file {}", config_path.display());

        Ok(Self {
            flags,
            env,
            config,
            config_path,
            manifest,
        })
    }

    pub fn verbose(&self) -> bool {
        self.flags.verbose
    }

    pub fn json(&self) -> bool {
        self.flags.json
    }

    /// `--endpoint` > `EDGE_API_ENDPOINT` > config > built-in default.
    pub fn api_endpoint(&self) -> String {
        self.flags
            .endpoint
            .clone()
            .or_else(|| self.env.api_endpoint.clone())
            .or_else(|| self.config.api.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string())
    }

    pub fn account_endpoint(&self) -> String {
        self.env
            .account_endpoint
            .clone()
            .or_else(|| self.config.auth.account_endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ACCOUNT_ENDPOINT.to_string())
    }

    pub fn client_id(&self) -> String {
        self.config
            .auth
            .client_id
            .clone()
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string())
    }

    /// Profile named by `--profile`, falling back to the manifest.
    pub fn profile_override(&self) -> Option<&str> {
        self.flags
            .profile
            .as_deref()
            .or(self.manifest.profile.as_deref())
    }

    /// Whether confirmation prompts should be skipped.
    pub fn skip_prompts(&self) -> bool {
        self.flags.auto_yes || self.flags.non_interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_and_json_are_rejected_together() {
        let flags = GlobalFlags {
            verbose: true,
            json: true,
            ..Default::default()
        };
        let err = flags.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid flag combination, --verbose and --json");
        assert_eq!(crate::CmdOutput::exitcode(&err), crate::errors::USAGE);
    }

    #[test]
    fn test_endpoint_precedence() {
        let mut globals = Globals::default();
        assert_eq!(globals.api_endpoint(), DEFAULT_API_ENDPOINT);

        globals.config.api.endpoint = Some("https://config.example".into());
        assert_eq!(globals.api_endpoint(), "https://config.example");

        globals.env.api_endpoint = Some("https://env.example".into());
        assert_eq!(globals.api_endpoint(), "https://env.example");

        globals.flags.endpoint = Some("https://flag.example".into());
        assert_eq!(globals.api_endpoint(), "https://flag.example");
    }

    #[test]
    fn test_profile_flag_wins_over_manifest() {
        let mut globals = Globals::default();
        globals.manifest.profile = Some("from-manifest".into());
        assert_eq!(globals.profile_override(), Some("from-manifest"));

        globals.flags.profile = Some("from-flag".into());
        assert_eq!(globals.profile_override(), Some("from-flag"));
    }

    #[test]
    #[serial_test::serial]
    fn test_environment_ignores_empty_values() {
        std::env::set_var(ENV_SERVICE_ID, "abc123");
        std::env::set_var(ENV_API_TOKEN, "");
        let env = Environment::from_env();
        std::env::remove_var(ENV_SERVICE_ID);
        std::env::remove_var(ENV_API_TOKEN);

        assert_eq!(env.service_id.as_deref(), Some("abc123"));
        assert_eq!(env.api_token, None);
    }
}
