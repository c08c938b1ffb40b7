pub mod accounts;
pub mod client;
pub use reqwest::Client;

/// Header carrying the CLI session token on management API requests.
pub const TOKEN_HEADER: &str = "Edge-Key";

#[derive(Clone)]
pub enum AuthMode {
    NoAuth,
    ApiToken(String),
    BearerAuth(String),
}
