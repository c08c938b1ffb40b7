use super::{
    client::{ApiClient, ApiClientError, ApiResult, GenericApiClient, HandleResponse},
    AuthMode,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCOUNT_ENDPOINT: &str = "https://accounts.edge.example/realms/edge";
pub const DEFAULT_CLIENT_ID: &str = "edge-cli";

/// Token set issued by the identity provider.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Jwt {
    pub access_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds until `refresh_token` expires.
    #[serde(default)]
    pub refresh_expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// CLI session issued by the management API in exchange for an access token.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Session {
    /// The session token, sent as the `Edge-Key` header on later requests.
    pub access_token: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
struct AuthorizationCodeGrant<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    code: &'a str,
    code_verifier: &'a str,
    redirect_uri: &'a str,
}

/// Client for the identity provider's OpenID Connect endpoints, plus the one
/// management API call that turns an access token into a CLI session token.
pub struct AccountsClient {
    inner: GenericApiClient,
    api_endpoint: String,
}

impl ApiClient for AccountsClient {
    fn client(&self) -> &reqwest::Client {
        self.inner.client()
    }

    fn base_url(&self) -> String {
        self.inner.base_url()
    }

    fn auth(&self) -> &AuthMode {
        self.inner.auth()
    }

    fn update_auth(&mut self, _: AuthMode) -> Result<(), ApiClientError> {
        Err(ApiClientError::AuthModeNotSupported)
    }
}

impl AccountsClient {
    pub fn new(account_endpoint: impl Into<String>, api_endpoint: impl Into<String>) -> Self {
        Self {
            inner: GenericApiClient::new(account_endpoint, AuthMode::NoAuth),
            api_endpoint: api_endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn authorization_url(&self) -> String {
        format!("{}/protocol/openid-connect/auth", self.base_url())
    }

    pub fn token_url(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.base_url())
    }

    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        client_id: &str,
    ) -> ApiResult<Jwt> {
        self.post(&self.token_url())
            .form(&AuthorizationCodeGrant {
                grant_type: "authorization_code",
                client_id,
                code,
                code_verifier,
                redirect_uri,
            })
            .send()
            .await
            .handle_json_response()
            .await
    }

    pub async fn exchange_session_token(&self, access_token: &str) -> ApiResult<Session> {
        let api = GenericApiClient::new(
            self.api_endpoint.clone(),
            AuthMode::BearerAuth(access_token.to_string()),
        );
        let login_url = format!("{}/login-enhanced", api.base_url());
        api.post(&login_url)
            .send()
            .await
            .handle_json_response()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_exchange_authorization_code_posts_pkce_grant() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/realms/edge/protocol/openid-connect/token")
                    .body_includes("grant_type=authorization_code")
                    .body_includes("code=abc123")
                    .body_includes("code_verifier=verifier");
                then.status(200).json_body(serde_json::json!({
                    "access_token": "access",
                    "expires_in": 300,
                    "refresh_token": "refresh",
                    "refresh_expires_in": 1800,
                    "token_type": "Bearer"
                }));
            })
            .await;

        let client = AccountsClient::new(server.url("/realms/edge"), server.base_url());
        let jwt = client
            .exchange_authorization_code(
                "abc123",
                "verifier",
                "http://127.0.0.1:1234/callback",
                DEFAULT_CLIENT_ID,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(jwt.access_token, "access");
        assert_eq!(jwt.expires_in, 300);
        assert_eq!(jwt.refresh_token, "refresh");
        assert_eq!(jwt.refresh_expires_in, 1800);
    }

    #[tokio::test]
    async fn test_exchange_session_token_uses_bearer_auth() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/login-enhanced")
                    .header("authorization", "Bearer access");
                then.status(200).json_body(serde_json::json!({
                    "access_token": "session",
                    "email": "dev@example.com"
                }));
            })
            .await;

        let client = AccountsClient::new(server.url("/realms/edge"), server.base_url());
        let session = client.exchange_session_token("access").await.unwrap();

        mock.assert_async().await;
        assert_eq!(session.access_token, "session");
        assert_eq!(session.email, "dev@example.com");
    }

    #[tokio::test]
    async fn test_rejected_code_is_an_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/realms/edge/protocol/openid-connect/token");
                then.status(400)
                    .json_body(serde_json::json!({ "title": "invalid_grant" }));
            })
            .await;

        let client = AccountsClient::new(server.url("/realms/edge"), server.base_url());
        let err = client
            .exchange_authorization_code("bad", "verifier", "http://localhost", "edge-cli")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid_grant");
    }
}
