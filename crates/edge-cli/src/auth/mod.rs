pub mod pkce;
pub mod server;

use crate::api::EdgeClient;
use crate::config::profile;
use crate::globals::Globals;
use crate::CmdOutput;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No API token found. Run `edge sso` to sign in, or pass an API token with --token or EDGE_API_TOKEN.")]
    NoToken,
    #[error("The profile '{0}' does not exist. Run `edge profile list` to see your profiles.")]
    ProfileNotFound(String),
    #[error("Invalid API endpoint '{0}': {1}")]
    InvalidEndpoint(String, url::ParseError),
}

impl CmdOutput for ClientError {
    fn code(&self) -> String {
        match self {
            ClientError::NoToken => "auth/no-token",
            ClientError::ProfileNotFound(_) => "auth/profile-not-found",
            ClientError::InvalidEndpoint(..) => "config/invalid-endpoint",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ClientError::NoToken | ClientError::ProfileNotFound(_) => crate::errors::NOUSER,
            ClientError::InvalidEndpoint(..) => crate::errors::CONFIG,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenSource {
    Flag,
    Environment,
    Profile(String),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Flag => write!(f, "--token flag"),
            TokenSource::Environment => write!(f, "{} environment variable", crate::globals::ENV_API_TOKEN),
            TokenSource::Profile(name) => write!(f, "profile '{name}'"),
        }
    }
}

/// `--token` > `EDGE_API_TOKEN` > the selected profile's session token.
pub fn resolve_token(globals: &Globals, now: i64) -> Result<(String, TokenSource), ClientError> {
    if let Some(token) = globals.flags.token.clone().filter(|t| !t.is_empty()) {
        return Ok((token, TokenSource::Flag));
    }
    if let Some(token) = globals.env.api_token.clone() {
        return Ok((token, TokenSource::Environment));
    }

    let profiles = &globals.config.profiles;
    let (name, selected) = match globals.profile_override() {
        Some(name) => match profile::get(name, profiles) {
            Some(p) => (name, p),
            None => return Err(ClientError::ProfileNotFound(name.to_string())),
        },
        None => profile::default_profile(profiles).ok_or(ClientError::NoToken)?,
    };

    if selected.token.is_empty() {
        return Err(ClientError::NoToken);
    }
    if selected.access_token_expired(now) {
        log::warn!("The access token for profile '{name}' has expired. Run `edge sso` to refresh it.");
    }

    Ok((selected.token.clone(), TokenSource::Profile(name.to_string())))
}

pub fn api_client(globals: &Globals) -> Result<EdgeClient, ClientError> {
    let (token, source) = resolve_token(globals, chrono::Utc::now().timestamp())?;
    log::debug!("Using API token from {source}");

    let endpoint = globals.api_endpoint();
    EdgeClient::new(&endpoint, token).map_err(|e| ClientError::InvalidEndpoint(endpoint, e))
}
