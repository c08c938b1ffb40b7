use super::pkce::{self, Pkce};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Router, Server};
use common::api::accounts::{AccountsClient, Jwt};
use common::api::client::ApiError;
use serde::Deserialize;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

pub const CALLBACK_PATH: &str = "/callback";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Hands the authorization URL to a browser.
pub type BrowserOpener = dyn Fn(&str) -> std::io::Result<()> + Send + Sync;

pub fn system_browser(url: &str) -> std::io::Result<()> {
    open::that(url)
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to start the local callback server: {0}")]
    Bind(#[source] std::io::Error),
    #[error("The local callback server failed: {0}")]
    Serve(String),
    #[error("Failed to open a web browser at {url}: {source}")]
    Browser {
        url: String,
        source: std::io::Error,
    },
    #[error("The authorization request was denied: {0}")]
    Denied(String),
    #[error("The authorization callback carried an unexpected state value")]
    StateMismatch,
    #[error("The authorization callback did not include a code")]
    MissingCode,
    #[error("Failed to exchange the authorization code for an access token: {0}")]
    TokenExchange(#[source] ApiError),
    #[error("Failed to exchange the access token for a session token: {0}")]
    SessionExchange(#[source] ApiError),
    #[error("The session token exchange returned no session token")]
    MissingSessionToken,
    #[error("Failed to generate an authorization URL from {base}: {source}")]
    AuthorizationUrl {
        base: String,
        source: url::ParseError,
    },
    #[error("Timed out after {0:?} waiting for the browser sign-in to complete")]
    Timeout(Duration),
    #[error("The callback server stopped before the sign-in completed")]
    ChannelClosed,
}

/// Result of a successful browser sign-in.
#[derive(Clone, Debug, PartialEq)]
pub struct Authorization {
    pub session_token: String,
    pub email: String,
    pub jwt: Jwt,
}

#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

struct CallbackContext {
    accounts: AccountsClient,
    client_id: String,
    redirect_uri: String,
    expected_state: String,
    code_verifier: String,
    results: mpsc::Sender<Result<Authorization, AuthError>>,
}

/// Loopback listener that receives the identity provider's redirect.
pub struct AuthServer {
    listener: TcpListener,
    port: u16,
    pkce: Pkce,
    state: String,
    accounts: AccountsClient,
    client_id: String,
}

impl AuthServer {
    pub fn bind(accounts: AccountsClient, client_id: String) -> Result<Self, AuthError> {
        let listener = TcpListener::bind("127.0.0.1:0").map_err(AuthError::Bind)?;
        listener.set_nonblocking(true).map_err(AuthError::Bind)?;
        let port = listener.local_addr().map_err(AuthError::Bind)?.port();

        Ok(Self {
            listener,
            port,
            pkce: Pkce::generate(),
            state: pkce::generate_state(),
            accounts,
            client_id,
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, CALLBACK_PATH)
    }

    pub fn authorization_url(&self) -> Result<String, AuthError> {
        let redirect_uri = self.redirect_uri();
        let params = [
            ("client_id", self.client_id.as_str()),
            ("code_challenge", self.pkce.challenge.as_str()),
            ("code_challenge_method", self.pkce.method()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid"),
            ("state", self.state.as_str()),
        ];
        let base = self.accounts.authorization_url();
        url::Url::parse_with_params(&base, &params)
            .map(|url| url.to_string())
            .map_err(|source| AuthError::AuthorizationUrl { base, source })
    }

    /// Opens the browser and waits for exactly one callback result, then shuts
    /// the listener down.
    pub async fn authorize(
        self,
        open_browser: &BrowserOpener,
        timeout: Duration,
    ) -> Result<Authorization, AuthError> {
        let url = self.authorization_url()?;
        let redirect_uri = self.redirect_uri();
        let (results_tx, mut results_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let context = Arc::new(CallbackContext {
            accounts: self.accounts,
            client_id: self.client_id,
            redirect_uri,
            expected_state: self.state,
            code_verifier: self.pkce.verifier,
            results: results_tx,
        });
        let router = Router::new().route(
            CALLBACK_PATH,
            get({
                let context = context.clone();
                move |params| callback_handler(params, context)
            }),
        );

        let server = Server::from_tcp(self.listener)
            .map_err(|e| AuthError::Serve(e.to_string()))?
            .serve(router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            });
        let server_handle = tokio::spawn(server);
        log::debug!("Listening for the sign-in callback on port {}", self.port);

        log::info!("Opening your browser to sign in. If it does not open, visit:\n\n{url}\n");
        let outcome = match open_browser(&url) {
            Ok(()) => match tokio::time::timeout(timeout, results_rx.recv()).await {
                Ok(Some(result)) => result,
                Ok(None) => Err(AuthError::ChannelClosed),
                Err(_) => Err(AuthError::Timeout(timeout)),
            },
            Err(source) => Err(AuthError::Browser { url, source }),
        };

        shutdown_tx.send(()).ok();
        match tokio::time::timeout(SHUTDOWN_GRACE, server_handle).await {
            Ok(Ok(Err(e))) => log::debug!("Callback server exited with an error: {e}"),
            Err(_) => log::debug!("Callback server did not shut down in time"),
            _ => {}
        }

        outcome
    }
}

async fn callback_handler(
    Query(params): Query<CallbackParams>,
    context: Arc<CallbackContext>,
) -> (StatusCode, Html<String>) {
    let result = complete_authorization(params, &context).await;
    let response = match &result {
        Ok(auth) => (
            StatusCode::OK,
            page(
                "Sign-in complete",
                &format!("Signed in as {}. You can close this window and return to your terminal.", auth.email),
            ),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            page("Sign-in failed", &format!("{e}. Return to your terminal for details.")),
        ),
    };

    if context.results.try_send(result).is_err() {
        log::debug!("Ignoring repeated sign-in callback");
    }
    response
}

async fn complete_authorization(
    params: CallbackParams,
    context: &CallbackContext,
) -> Result<Authorization, AuthError> {
    if let Some(error) = params.error {
        let reason = match params.error_description {
            Some(description) => format!("{error}: {description}"),
            None => error,
        };
        return Err(AuthError::Denied(reason));
    }
    if params.state.as_deref() != Some(context.expected_state.as_str()) {
        return Err(AuthError::StateMismatch);
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let jwt = context
        .accounts
        .exchange_authorization_code(
            &code,
            &context.code_verifier,
            &context.redirect_uri,
            &context.client_id,
        )
        .await
        .map_err(AuthError::TokenExchange)?;
    let session = context
        .accounts
        .exchange_session_token(&jwt.access_token)
        .await
        .map_err(AuthError::SessionExchange)?;
    if session.access_token.is_empty() {
        return Err(AuthError::MissingSessionToken);
    }

    Ok(Authorization {
        session_token: session.access_token,
        email: session.email,
        jwt,
    })
}

fn page(title: &str, message: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{message}</p></body></html>"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{query_value, redirecting_browser};
    use httpmock::prelude::*;

    fn accounts_for(server: &MockServer) -> AccountsClient {
        AccountsClient::new(server.url("/realms/edge"), server.base_url())
    }

    #[tokio::test]
    async fn test_authorization_url_carries_pkce_and_redirect() {
        let server = MockServer::start_async().await;
        let auth_server = AuthServer::bind(accounts_for(&server), "edge-cli".into()).unwrap();
        let url = auth_server.authorization_url().unwrap();

        assert!(url.starts_with(&server.url("/realms/edge/protocol/openid-connect/auth")));
        assert_eq!(query_value(&url, "client_id").as_deref(), Some("edge-cli"));
        assert_eq!(query_value(&url, "code_challenge_method").as_deref(), Some("S256"));
        assert_eq!(query_value(&url, "response_type").as_deref(), Some("code"));
        assert_eq!(
            query_value(&url, "redirect_uri"),
            Some(auth_server.redirect_uri())
        );
        assert_eq!(
            query_value(&url, "code_challenge"),
            Some(auth_server.pkce.challenge.clone())
        );
    }

    #[tokio::test]
    async fn test_successful_callback_returns_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/realms/edge/protocol/openid-connect/token")
                    .body_includes("code=the-code");
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
                then.status(200).json_body(serde_json::json!({
                    "access_token": "session-token",
                    "email": "dev@example.com"
                }));
            })
            .await;

        let auth_server = AuthServer::bind(accounts_for(&server), "edge-cli".into()).unwrap();
        let browser = redirecting_browser(|url| {
            format!(
                "code=the-code&state={}",
                query_value(url, "state").unwrap_or_default()
            )
        });

        let auth = auth_server
            .authorize(browser.as_ref(), Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(auth.session_token, "session-token");
        assert_eq!(auth.email, "dev@example.com");
        assert_eq!(auth.jwt.expires_in, 600);
        assert_eq!(auth.jwt.refresh_token, "refresh");
    }

    #[tokio::test]
    async fn test_mismatched_state_is_rejected() {
        let server = MockServer::start_async().await;
        let auth_server = AuthServer::bind(accounts_for(&server), "edge-cli".into()).unwrap();
        let browser = redirecting_browser(|_| "code=the-code&state=forged".to_string());

        let err = auth_server
            .authorize(browser.as_ref(), Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let server = MockServer::start_async().await;
        let auth_server = AuthServer::bind(accounts_for(&server), "edge-cli".into()).unwrap();
        let browser = redirecting_browser(|_| {
            "error=access_denied&error_description=user+cancelled".to_string()
        });

        let err = auth_server
            .authorize(browser.as_ref(), Duration::from_secs(10))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The authorization request was denied: access_denied: user cancelled"
        );
    }

    #[tokio::test]
    async fn test_no_callback_times_out() {
        let server = MockServer::start_async().await;
        let auth_server = AuthServer::bind(accounts_for(&server), "edge-cli".into()).unwrap();
        let browser: Box<BrowserOpener> = Box::new(|_: &str| Ok(()));

        let err = auth_server
            .authorize(browser.as_ref(), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Timeout(_)));
        assert_eq!(
            err.to_string(),
            "Timed out after 200ms waiting for the browser sign-in to complete"
        );
    }

    #[tokio::test]
    async fn test_browser_failure_is_reported() {
        let server = MockServer::start_async().await;
        let auth_server = AuthServer::bind(accounts_for(&server), "edge-cli".into()).unwrap();
        let browser: Box<BrowserOpener> = Box::new(|_: &str| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
        });

        let err = auth_server
            .authorize(browser.as_ref(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Browser { .. }));
    }

    #[tokio::test]
    async fn test_unparsable_account_endpoint_fails_before_browser() {
        let accounts = AccountsClient::new("not a url", "http://127.0.0.1:1");
        let auth_server = AuthServer::bind(accounts, "edge-cli".into()).unwrap();
        let browser: Box<BrowserOpener> = Box::new(|_: &str| panic!("browser must not open"));

        let err = auth_server
            .authorize(browser.as_ref(), Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AuthorizationUrl { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to generate an authorization URL from not a url/protocol/openid-connect/auth"));
    }
}
