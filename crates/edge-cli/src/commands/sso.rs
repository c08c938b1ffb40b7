use crate::auth::server::{self, AuthError, AuthServer, Authorization, BrowserOpener};
use crate::commands::interact;
use crate::config::{profile, ConfigError, Profile, Profiles};
use crate::globals::Globals;
use crate::CmdOutput;
use clap::Parser;
use common::api::accounts::AccountsClient;
use common::CliError;
use std::time::Duration;
use thiserror::Error;

/// Authenticate with the platform through your browser
#[derive(Parser, Debug)]
#[command(name = "sso")]
pub struct SsoArgs {
    /// Profile to authenticate. Defaults to the default profile
    #[arg(id = "profile_name", value_name = "PROFILE")]
    pub profile: Option<String>,

    /// Seconds to wait for the browser sign-in to complete
    #[arg(long, default_value_t = server::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Debug, Error)]
pub enum SsoError {
    #[error("{0}\n\nRun `edge sso` to try again, adding --verbose for more detail.")]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

impl CmdOutput for SsoError {
    fn code(&self) -> String {
        match self {
            SsoError::Auth(e) => match e {
                AuthError::Bind(_) | AuthError::Serve(_) => "sso/server-error",
                AuthError::Browser { .. } => "sso/browser-error",
                AuthError::Denied(_) => "sso/denied",
                AuthError::StateMismatch | AuthError::MissingCode => "sso/invalid-callback",
                AuthError::TokenExchange(_) => "sso/token-exchange-error",
                AuthError::SessionExchange(_) => "sso/session-exchange-error",
                AuthError::MissingSessionToken => "sso/missing-session-token",
                AuthError::AuthorizationUrl { .. } => "sso/authorization-url-error",
                AuthError::Timeout(_) | AuthError::ChannelClosed => "sso/timeout",
            }
            .to_string(),
            SsoError::Config(e) => e.code(),
            SsoError::Prompt(_) => "sso/prompt-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            SsoError::Auth(e) => match e {
                AuthError::Bind(_) | AuthError::Serve(_) => crate::errors::OSERR,
                AuthError::Browser { .. } => crate::errors::UNAVAILABLE,
                AuthError::Denied(_)
                | AuthError::StateMismatch
                | AuthError::MissingCode
                | AuthError::MissingSessionToken => crate::errors::PROTOCOL,
                AuthError::AuthorizationUrl { .. } => crate::errors::CONFIG,
                AuthError::TokenExchange(e) | AuthError::SessionExchange(e) => e.exitcode(),
                AuthError::Timeout(_) | AuthError::ChannelClosed => crate::errors::TEMPFAIL,
            },
            SsoError::Config(e) => e.exitcode(),
            SsoError::Prompt(_) => crate::errors::IOERR,
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum SsoMessage {
    #[strum(to_string = "Session token (persisted to your local configuration): {token}")]
    Authenticated {
        profile: String,
        email: String,
        token: String,
    },
    #[strum(to_string = "Authentication cancelled, no changes were made")]
    Cancelled,
}

impl CmdOutput for SsoMessage {
    fn code(&self) -> String {
        match self {
            SsoMessage::Authenticated { .. } => "sso/authenticated",
            SsoMessage::Cancelled => "sso/cancelled",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            SsoMessage::Authenticated {
                profile,
                email,
                token,
            } => Some(serde_json::json!({
                "profile": profile,
                "email": email,
                "token": token,
            })),
            SsoMessage::Cancelled => None,
        }
    }
}

/// How the flow was started. `profile create` and `profile update` name
/// their target explicitly.
#[derive(Clone, Debug, PartialEq)]
pub enum Invocation {
    Sso(Option<String>),
    ProfileCreate { name: String, make_default: bool },
    ProfileUpdate { name: String, make_default: bool },
}

/// The profile a completed sign-in is written to.
#[derive(Clone, Debug, PartialEq)]
pub enum ProfileTarget {
    Create { name: String, make_default: bool },
    Update { name: String, make_default: bool },
}

impl ProfileTarget {
    pub fn name(&self) -> &str {
        match self {
            ProfileTarget::Create { name, .. } | ProfileTarget::Update { name, .. } => name,
        }
    }

    fn make_default(&self) -> bool {
        match self {
            ProfileTarget::Create { make_default, .. }
            | ProfileTarget::Update { make_default, .. } => *make_default,
        }
    }
}

fn existing_or_new(name: &str, profiles: &Profiles) -> ProfileTarget {
    if profiles.contains_key(name) {
        ProfileTarget::Update {
            name: name.to_string(),
            make_default: false,
        }
    } else {
        ProfileTarget::Create {
            name: name.to_string(),
            make_default: false,
        }
    }
}

/// Picks the profile to authenticate. In order: the `--profile` override, the
/// positional profile, the name given to `profile create`/`profile update`,
/// the current default, the first profile by name (which becomes the default),
/// and finally a new default profile named `default`.
pub fn select_target(
    invocation: &Invocation,
    profile_override: Option<&str>,
    profiles: &Profiles,
) -> ProfileTarget {
    if let Some(name) = profile_override {
        return existing_or_new(name, profiles);
    }

    match invocation {
        Invocation::Sso(Some(name)) => return existing_or_new(name, profiles),
        Invocation::ProfileCreate { name, make_default } => {
            return ProfileTarget::Create {
                name: name.clone(),
                make_default: *make_default,
            }
        }
        Invocation::ProfileUpdate { name, make_default } => {
            return ProfileTarget::Update {
                name: name.clone(),
                make_default: *make_default,
            }
        }
        Invocation::Sso(None) => {}
    }

    if let Some((name, _)) = profile::default_profile(profiles) {
        return ProfileTarget::Update {
            name: name.to_string(),
            make_default: false,
        };
    }
    if let Some(name) = profiles.keys().next() {
        return ProfileTarget::Update {
            name: name.clone(),
            make_default: true,
        };
    }
    ProfileTarget::Create {
        name: "default".to_string(),
        make_default: true,
    }
}

fn fill_tokens(profile: &mut Profile, auth: &Authorization, now: i64) {
    profile.access_token = auth.jwt.access_token.clone();
    profile.access_token_created = now;
    profile.access_token_ttl = auth.jwt.expires_in;
    profile.refresh_token = auth.jwt.refresh_token.clone();
    profile.refresh_token_created = now;
    profile.refresh_token_ttl = auth.jwt.refresh_expires_in;
    profile.email = auth.email.clone();
    profile.token = auth.session_token.clone();
}

/// Writes the sign-in result into `profiles`. A created profile becomes the
/// default when it is the only one or when asked to; an updated profile keeps
/// its default flag unless asked to become the default.
pub fn apply_authorization(
    profiles: &mut Profiles,
    target: &ProfileTarget,
    auth: &Authorization,
    now: i64,
) -> String {
    let name = target.name().to_string();
    fill_tokens(profiles.entry(name.clone()).or_default(), auth, now);

    let created = matches!(target, ProfileTarget::Create { .. });
    if target.make_default() || (created && profiles.len() == 1) {
        profile::set_default(&name, profiles);
    }
    name
}

pub struct FlowOptions<'a> {
    pub browser: &'a BrowserOpener,
    pub timeout: Duration,
    pub prompt: bool,
}

/// Runs the browser sign-in and persists the result to the config file.
pub async fn authenticate(
    globals: &Globals,
    invocation: Invocation,
    opts: FlowOptions<'_>,
) -> Result<SsoMessage, SsoError> {
    let target = select_target(
        &invocation,
        globals.profile_override(),
        &globals.config.profiles,
    );
    log::debug!("Authenticating profile {target:?}");

    if opts.prompt {
        let prompt = format!(
            "We're going to authenticate the '{}' profile. We need to open your browser to do this. Continue?",
            target.name()
        );
        if !interact::confirm(prompt, true).map_err(SsoError::Prompt)? {
            return Ok(SsoMessage::Cancelled);
        }
    }

    let accounts = AccountsClient::new(globals.account_endpoint(), globals.api_endpoint());
    let auth_server = AuthServer::bind(accounts, globals.client_id())?;

    let spinner = interact::start_spinner(
        "Waiting for the sign-in to complete in your browser...",
        !globals.json(),
    );
    let result = auth_server.authorize(opts.browser, opts.timeout).await;
    spinner.finish_and_clear();
    let authorization = result?;

    let mut config = globals.config.clone();
    let name = apply_authorization(
        &mut config.profiles,
        &target,
        &authorization,
        chrono::Utc::now().timestamp(),
    );
    config.write(&globals.config_path)?;
    log::debug!("Stored session for {} in profile '{name}'", authorization.email);

    Ok(SsoMessage::Authenticated {
        profile: name,
        email: authorization.email,
        token: authorization.session_token,
    })
}

pub async fn run(args: SsoArgs, globals: &Globals) -> Result<SsoMessage, SsoError> {
    authenticate(
        globals,
        Invocation::Sso(args.profile),
        FlowOptions {
            browser: &server::system_browser,
            timeout: Duration::from_secs(args.timeout),
            prompt: !globals.skip_prompts(),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_utils::approving_browser;
    use common::api::accounts::Jwt;
    use httpmock::prelude::*;

    fn profiles(entries: &[(&str, bool)]) -> Profiles {
        entries
            .iter()
            .map(|(name, default)| {
                (
                    name.to_string(),
                    Profile {
                        default: *default,
                        token: format!("{name}-token"),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    fn authorization() -> Authorization {
        Authorization {
            session_token: "session".into(),
            email: "dev@example.com".into(),
            jwt: Jwt {
                access_token: "access".into(),
                expires_in: 600,
                refresh_token: "refresh".into(),
                refresh_expires_in: 3600,
                ..Default::default()
            },
        }
    }

    fn update(name: &str, make_default: bool) -> ProfileTarget {
        ProfileTarget::Update {
            name: name.into(),
            make_default,
        }
    }

    fn create(name: &str, make_default: bool) -> ProfileTarget {
        ProfileTarget::Create {
            name: name.into(),
            make_default,
        }
    }

    #[test]
    fn test_override_wins_over_positional_profile() {
        let p = profiles(&[("work", false)]);
        let target = select_target(&Invocation::Sso(Some("other".into())), Some("work"), &p);
        assert_eq!(target, update("work", false));

        let target = select_target(&Invocation::Sso(Some("work".into())), Some("new"), &p);
        assert_eq!(target, create("new", false));
    }

    #[test]
    fn test_positional_profile_updates_or_creates() {
        let p = profiles(&[("work", true)]);
        assert_eq!(
            select_target(&Invocation::Sso(Some("work".into())), None, &p),
            update("work", false)
        );
        assert_eq!(
            select_target(&Invocation::Sso(Some("home".into())), None, &p),
            create("home", false)
        );
    }

    #[test]
    fn test_profile_commands_name_their_target() {
        let p = profiles(&[("work", true)]);
        let invocation = Invocation::ProfileCreate {
            name: "home".into(),
            make_default: true,
        };
        assert_eq!(select_target(&invocation, None, &p), create("home", true));

        let invocation = Invocation::ProfileUpdate {
            name: "work".into(),
            make_default: false,
        };
        assert_eq!(select_target(&invocation, None, &p), update("work", false));
    }

    #[test]
    fn test_falls_back_to_default_then_first_then_new() {
        let p = profiles(&[("alpha", false), ("beta", true)]);
        assert_eq!(select_target(&Invocation::Sso(None), None, &p), update("beta", false));

        let p = profiles(&[("zeta", false), ("alpha", false)]);
        assert_eq!(select_target(&Invocation::Sso(None), None, &p), update("alpha", true));

        assert_eq!(
            select_target(&Invocation::Sso(None), None, &Profiles::new()),
            create("default", true)
        );
    }

    #[test]
    fn test_first_created_profile_becomes_default() {
        let mut p = Profiles::new();
        let name = apply_authorization(&mut p, &create("work", false), &authorization(), 1_000);
        assert_eq!(name, "work");

        let work = &p["work"];
        assert!(work.default);
        assert_eq!(work.token, "session");
        assert_eq!(work.email, "dev@example.com");
        assert_eq!(work.access_token, "access");
        assert_eq!(work.access_token_created, 1_000);
        assert_eq!(work.access_token_ttl, 600);
        assert_eq!(work.refresh_token, "refresh");
        assert_eq!(work.refresh_token_ttl, 3600);
    }

    #[test]
    fn test_additional_profile_only_default_when_asked() {
        let mut p = profiles(&[("work", true)]);
        apply_authorization(&mut p, &create("home", false), &authorization(), 0);
        assert!(p["work"].default);
        assert!(!p["home"].default);

        apply_authorization(&mut p, &create("other", true), &authorization(), 0);
        assert!(p["other"].default);
        assert!(!p["work"].default);
        assert!(!p["home"].default);
    }

    #[test]
    fn test_update_keeps_default_flag_unless_asked() {
        let mut p = profiles(&[("home", false), ("work", true)]);
        apply_authorization(&mut p, &update("home", false), &authorization(), 0);
        assert!(!p["home"].default);
        assert!(p["work"].default);
        assert_eq!(p["home"].token, "session");
        assert_eq!(p["work"].token, "work-token");

        apply_authorization(&mut p, &update("home", true), &authorization(), 0);
        assert!(p["home"].default);
        assert!(!p["work"].default);
    }

    async fn mock_identity(server: &MockServer) {
        mock_identity_with(server, 200, serde_json::json!({
            "access_token": "session-token",
            "email": "dev@example.com"
        }))
        .await;
    }

    async fn mock_identity_with(server: &MockServer, status: u16, session: serde_json::Value) {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/realms/edge/protocol/openid-connect/token")
                    .body_includes("code=sso-code");
                then.status(200).json_body(serde_json::json!({
                    "access_token": "access",
                    "expires_in": 600,
                    "refresh_token": "refresh",
                    "refresh_expires_in": 3600
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login-enhanced");
                then.status(status).json_body(session.clone());
            })
            .await;
    }

    fn globals_for(server: &MockServer, config_path: std::path::PathBuf) -> Globals {
        let mut globals = crate::test_utils::globals(false, true);
        globals.config.auth.account_endpoint = Some(server.url("/realms/edge"));
        globals.config.api.endpoint = Some(server.base_url());
        globals.config_path = config_path;
        globals
    }

    #[tokio::test]
    async fn test_sign_in_persists_new_default_profile() {
        let server = MockServer::start_async().await;
        mock_identity(&server).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let globals = globals_for(&server, path.clone());
        let browser = approving_browser("sso-code");

        let message = authenticate(
            &globals,
            Invocation::Sso(None),
            FlowOptions {
                browser: browser.as_ref(),
                timeout: Duration::from_secs(10),
                prompt: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(
            message.to_string(),
            "Session token (persisted to your local configuration): session-token"
        );
        assert_eq!(
            message.data().unwrap()["profile"],
            serde_json::json!("default")
        );

        let saved = Config::load(&path).unwrap();
        let profile = &saved.profiles["default"];
        assert!(profile.default);
        assert_eq!(profile.token, "session-token");
        assert_eq!(profile.email, "dev@example.com");
        assert_eq!(saved.api.endpoint, Some(server.base_url()));
    }

    #[tokio::test]
    async fn test_unwritable_config_reports_cantcreat() {
        let server = MockServer::start_async().await;
        mock_identity(&server).await;
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be replaced by the config file.
        let path = dir.path().join("config.toml");
        std::fs::create_dir(&path).unwrap();
        let globals = globals_for(&server, path);
        let browser = approving_browser("sso-code");

        let err = authenticate(
            &globals,
            Invocation::Sso(Some("work".into())),
            FlowOptions {
                browser: browser.as_ref(),
                timeout: Duration::from_secs(10),
                prompt: false,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SsoError::Config(ConfigError::Write { .. })));
        assert_eq!(err.exitcode(), crate::errors::CANTCREAT);
    }

    #[tokio::test]
    async fn test_browser_failure_leaves_config_untouched() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let globals = globals_for(&server, path.clone());
        let browser: Box<BrowserOpener> = Box::new(|_: &str| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
        });

        let err = authenticate(
            &globals,
            Invocation::Sso(None),
            FlowOptions {
                browser: browser.as_ref(),
                timeout: Duration::from_secs(1),
                prompt: false,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.exitcode(), crate::errors::UNAVAILABLE);
        assert!(err.to_string().contains("Run `edge sso` to try again"));
        assert!(!path.exists());
    }

    async fn sign_in_error(globals: &Globals) -> SsoError {
        let browser = approving_browser("sso-code");
        authenticate(
            globals,
            Invocation::Sso(None),
            FlowOptions {
                browser: browser.as_ref(),
                timeout: Duration::from_secs(10),
                prompt: false,
            },
        )
        .await
        .unwrap_err()
    }

    #[tokio::test]
    async fn test_empty_session_token_is_rejected() {
        let server = MockServer::start_async().await;
        mock_identity_with(
            &server,
            200,
            serde_json::json!({ "access_token": "", "email": "dev@example.com" }),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let globals = globals_for(&server, path.clone());

        let err = sign_in_error(&globals).await;

        assert!(matches!(err, SsoError::Auth(AuthError::MissingSessionToken)));
        assert_eq!(err.code(), "sso/missing-session-token");
        assert_eq!(err.exitcode(), crate::errors::PROTOCOL);
        assert!(err.to_string().contains("Run `edge sso` to try again"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_rejected_session_exchange_leaves_config_untouched() {
        let server = MockServer::start_async().await;
        mock_identity_with(
            &server,
            401,
            serde_json::json!({ "msg": "Unauthorized", "detail": "invalid access token" }),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let globals = globals_for(&server, path.clone());

        let err = sign_in_error(&globals).await;

        assert!(matches!(err, SsoError::Auth(AuthError::SessionExchange(_))));
        assert_eq!(err.exitcode(), crate::errors::NOUSER);
        assert!(err.to_string().contains("Run `edge sso` to try again"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_rejected_code_exchange_leaves_config_untouched() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/realms/edge/protocol/openid-connect/token");
                then.status(400)
                    .json_body(serde_json::json!({ "error": "invalid_grant" }));
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let globals = globals_for(&server, path.clone());

        let err = sign_in_error(&globals).await;

        assert!(matches!(err, SsoError::Auth(AuthError::TokenExchange(_))));
        assert_eq!(err.exitcode(), crate::errors::DATAERR);
        assert!(err.to_string().contains("Run `edge sso` to try again"));
        assert!(!path.exists());
    }
}
