use super::AuthMode;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use reqwest::{Error, Result as ReqwestResult};
use serde::de::DeserializeOwned;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.edge.example";

fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Shared transport for every API host the CLI talks to. The base URL is
/// resolved once by the caller (flag, env, config) and never re-derived.
#[derive(Clone)]
pub struct GenericApiClient {
    client: Client,
    auth: AuthMode,
    endpoint: String,
}

impl GenericApiClient {
    pub fn new(endpoint: impl Into<String>, auth: AuthMode) -> Self {
        Self {
            client: build_http_client(),
            auth,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for GenericApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_ENDPOINT, AuthMode::NoAuth)
    }
}

impl ApiClient for GenericApiClient {
    fn auth(&self) -> &AuthMode {
        &self.auth
    }

    fn update_auth(&mut self, auth: AuthMode) -> Result<(), ApiClientError> {
        self.auth = auth;
        Ok(())
    }

    fn client(&self) -> &Client {
        &self.client
    }

    fn base_url(&self) -> String {
        self.endpoint.clone()
    }
}

#[derive(Debug)]
pub enum ApiClientError {
    AuthModeNotSupported,
}

pub trait ApiClient {
    fn auth(&self) -> &AuthMode;
    fn update_auth(&mut self, auth: AuthMode) -> Result<(), ApiClientError>;
    fn client(&self) -> &Client;
    fn base_url(&self) -> String;

    fn user_agent(&self) -> String {
        format!("edge-cli/{}", env!("CARGO_PKG_VERSION"))
    }

    fn accept(&self) -> String {
        "application/json".to_string()
    }

    fn is_authorised(&self) -> bool {
        !matches!(self.auth(), AuthMode::NoAuth)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.prepare(self.client().get(url))
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.prepare(self.client().post(url))
    }

    fn put(&self, url: &str) -> RequestBuilder {
        self.prepare(self.client().put(url))
    }

    fn delete(&self, url: &str) -> RequestBuilder {
        self.prepare(self.client().delete(url))
    }

    fn patch(&self, url: &str) -> RequestBuilder {
        self.prepare(self.client().patch(url))
    }

    fn prepare(&self, mut request_builder: RequestBuilder) -> RequestBuilder {
        request_builder = request_builder
            .header(reqwest::header::USER_AGENT, self.user_agent())
            .header(reqwest::header::ACCEPT, self.accept());

        match &self.auth() {
            AuthMode::NoAuth => request_builder,
            AuthMode::ApiToken(token) => request_builder.header(super::TOKEN_HEADER, token),
            AuthMode::BearerAuth(token) => request_builder.bearer_auth(token),
        }
    }
}

#[async_trait]
pub trait HandleResponse {
    async fn handle_json_response<T: DeserializeOwned>(self) -> ApiResult<T>;
    async fn handle_no_op_response(self) -> ApiResult<()>;
}

#[async_trait]
impl HandleResponse for ReqwestResult<Response> {
    async fn handle_json_response<T: DeserializeOwned>(self) -> ApiResult<T> {
        match self {
            Ok(res) if res.status().is_success() => res
                .json()
                .await
                .map_err(|e| ApiError::new(ApiErrorKind::ParsingError(e.to_string()))),
            Ok(res) => Err(ApiError::get_error_details_from_res(res).await),
            Err(e) => Err(e.into()),
        }
    }

    async fn handle_no_op_response(self) -> ApiResult<()> {
        match self {
            Ok(res) if res.status().is_success() => Ok(()),
            Ok(res) => Err(ApiError::get_error_details_from_res(res).await),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    TooManyRequests,
    Internal,
    Unknown(Option<Error>),
    ParsingError(String),
}

pub struct ApiError {
    pub kind: ApiErrorKind,
    pub details: Option<ApiErrorDetails>,
}

pub type ApiResult<T> = core::result::Result<T, ApiError>;

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_msg())
    }
}

impl crate::CliError for ApiError {
    fn exitcode(&self) -> exitcode::ExitCode {
        exitcode::ExitCode::from(&self.kind)
    }
}

impl ApiErrorKind {
    pub fn to_msg(&self) -> String {
        match self {
            Self::BadRequest => "400: Bad Request".to_owned(),
            Self::Unauthorized => "401: Unauthorized".to_owned(),
            Self::Forbidden => "403: Forbidden".to_owned(),
            Self::NotFound => "404: Not Found".to_owned(),
            Self::Conflict => "409: Conflict".to_owned(),
            Self::UnprocessableEntity => "422: Unprocessable Entity".to_owned(),
            Self::TooManyRequests => "429: Too Many Requests".to_owned(),
            Self::Internal => "500: Internal Server Error".to_owned(),
            Self::Unknown(Some(e)) => format!("An unexpected error occurred: {e}"),
            Self::Unknown(None) => "An unexpected error occurred".to_owned(),
            Self::ParsingError(e) => {
                format!("An error occurred while parsing the server's response: {e}")
            }
        }
    }
}

impl From<&ApiErrorKind> for exitcode::ExitCode {
    fn from(value: &ApiErrorKind) -> Self {
        match value {
            ApiErrorKind::BadRequest
            | ApiErrorKind::NotFound
            | ApiErrorKind::Conflict
            | ApiErrorKind::UnprocessableEntity => exitcode::DATAERR,
            ApiErrorKind::Unauthorized => exitcode::NOUSER,
            ApiErrorKind::Forbidden => exitcode::NOPERM,
            ApiErrorKind::TooManyRequests => exitcode::TEMPFAIL,
            ApiErrorKind::Internal | ApiErrorKind::ParsingError(_) => exitcode::SOFTWARE,
            ApiErrorKind::Unknown(_) => exitcode::UNAVAILABLE,
        }
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        Self::new(Self::get_error_from_status(status.as_u16()))
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::new(ApiErrorKind::Unknown(Some(e)))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => match &details.detail {
                Some(detail) if !detail.is_empty() => write!(f, "{} ({})", details.title, detail),
                _ => write!(f, "{}", details.title),
            },
            None => self.kind.fmt(f),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

impl std::error::Error for ApiError {}

/// Error body returned by the management API. Older endpoints use `msg`
/// rather than `title`.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiErrorDetails {
    #[serde(alias = "msg")]
    pub title: String,
    pub detail: Option<String>,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind) -> Self {
        Self {
            kind,
            details: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ApiErrorKind::NotFound)
    }

    pub fn get_error_from_status(code: u16) -> ApiErrorKind {
        match code {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            422 => ApiErrorKind::UnprocessableEntity,
            429 => ApiErrorKind::TooManyRequests,
            500 => ApiErrorKind::Internal,
            _ => ApiErrorKind::Unknown(None),
        }
    }

    pub async fn get_error_details_from_res(res: Response) -> ApiError {
        let mut api_error: ApiError = res.status().into();
        api_error.details = res.json::<ApiErrorDetails>().await.ok();

        api_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;
    use httpmock::prelude::*;

    #[test]
    fn test_status_codes_map_to_error_kinds() {
        assert!(matches!(
            ApiError::get_error_from_status(401),
            ApiErrorKind::Unauthorized
        ));
        assert!(matches!(
            ApiError::get_error_from_status(422),
            ApiErrorKind::UnprocessableEntity
        ));
        assert!(matches!(
            ApiError::get_error_from_status(418),
            ApiErrorKind::Unknown(None)
        ));
    }

    #[test]
    fn test_error_kinds_map_to_exit_codes() {
        assert_eq!(
            ApiError::new(ApiErrorKind::Unauthorized).exitcode(),
            exitcode::NOUSER
        );
        assert_eq!(
            ApiError::new(ApiErrorKind::NotFound).exitcode(),
            exitcode::DATAERR
        );
        assert_eq!(
            ApiError::new(ApiErrorKind::TooManyRequests).exitcode(),
            exitcode::TEMPFAIL
        );
    }

    #[tokio::test]
    async fn test_requests_carry_token_header_and_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/service")
                    .header("edge-key", "secret-token")
                    .header_exists("user-agent");
                then.status(200).body("[]");
            })
            .await;

        let client = GenericApiClient::new(
            server.base_url(),
            AuthMode::ApiToken("secret-token".into()),
        );
        let url = format!("{}/service", client.base_url());
        let body: Vec<serde_json::Value> = client
            .get(&url)
            .send()
            .await
            .handle_json_response()
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_error_body_details_are_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/service/abc/details");
                then.status(404).json_body(serde_json::json!({
                    "msg": "Record not found",
                    "detail": "Cannot find service 'abc'"
                }));
            })
            .await;

        let client = GenericApiClient::new(server.base_url(), AuthMode::NoAuth);
        let url = format!("{}/service/abc/details", client.base_url());
        let err = client
            .get(&url)
            .send()
            .await
            .handle_json_response::<serde_json::Value>()
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Record not found (Cannot find service 'abc')"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed_from_endpoint() {
        let client = GenericApiClient::new("https://api.edge.example/", AuthMode::NoAuth);
        assert_eq!(client.base_url(), "https://api.edge.example");
    }
}
