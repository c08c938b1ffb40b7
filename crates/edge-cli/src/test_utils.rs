use crate::api::service::Version;
use crate::api::MockEdgeApi;
use crate::commands::service_details::{
    ServiceArgs, ServiceVersionArgs, VersionArgs, VersionSpec,
};
use crate::auth::server::BrowserOpener;
use crate::globals::Globals;
use common::api::client::{ApiError, ApiErrorKind};

pub fn api_error(kind: ApiErrorKind) -> ApiError {
    ApiError::new(kind)
}

pub fn version(number: u32, active: bool, locked: bool) -> Version {
    Version {
        number,
        service_id: "123".into(),
        active,
        locked,
        ..Default::default()
    }
}

/// Globals for a command invoked with `--service-id 123`-style flags and no
/// config on disk.
pub fn globals(verbose: bool, json: bool) -> Globals {
    let mut globals = Globals::default();
    globals.flags.verbose = verbose;
    globals.flags.json = json;
    globals
}

pub fn query_value(url: &str, key: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Simulates the browser by requesting the callback the identity provider
/// would redirect to, with the query built from the authorization URL.
pub fn redirecting_browser(
    query: impl Fn(&str) -> String + Send + Sync + 'static,
) -> Box<BrowserOpener> {
    Box::new(move |url: &str| {
        let redirect = query_value(url, "redirect_uri").unwrap_or_default();
        let callback = format!("{redirect}?{}", query(url));
        tokio::spawn(async move {
            reqwest::get(&callback).await.ok();
        });
        Ok(())
    })
}

/// A browser that completes sign-in with `code` and the expected state.
pub fn approving_browser(code: &'static str) -> Box<BrowserOpener> {
    redirecting_browser(move |url| {
        format!(
            "code={code}&state={}",
            query_value(url, "state").unwrap_or_default()
        )
    })
}

pub fn expect_versions(api: &mut MockEdgeApi, versions: Vec<Version>) {
    api.expect_list_versions()
        .returning(move |_| Box::pin(std::future::ready(Ok(versions.clone()))));
}

/// Selects service `123` at the given version.
pub fn target(spec: VersionSpec) -> ServiceVersionArgs {
    ServiceVersionArgs {
        service: ServiceArgs {
            service_id: Some("123".into()),
            service_name: None,
        },
        version: VersionArgs { version: spec },
    }
}
