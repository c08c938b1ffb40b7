use crate::api::service::Version;
use crate::api::EdgeApi;
use crate::globals::{Environment, Globals, ENV_SERVICE_ID};
use crate::manifest::Manifest;
use crate::CmdOutput;
use clap::Args;
use common::{api::client::ApiError, CliError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selects the service a command operates on.
#[derive(Args, Clone, Debug, Default)]
pub struct ServiceArgs {
    /// Service ID (falls back to edge.toml, then EDGE_SERVICE_ID)
    #[arg(short = 's', long = "service-id")]
    pub service_id: Option<String>,

    /// The name of the service
    #[arg(long = "service-name")]
    pub service_name: Option<String>,
}

/// Selects the service version a command operates on.
#[derive(Args, Clone, Debug)]
pub struct VersionArgs {
    /// 'latest', 'active', or the number of a specific version
    #[arg(long = "version")]
    pub version: VersionSpec,
}

/// Service and version selection shared by version-scoped commands.
#[derive(Args, Clone, Debug)]
pub struct ServiceVersionArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub version: VersionArgs,
}

impl ServiceVersionArgs {
    /// Resolves a version for reading. Active and locked versions are allowed.
    pub async fn readable<A: EdgeApi + Sync>(
        &self,
        api: &A,
        globals: &Globals,
    ) -> Result<(String, Version), ServiceDetailsError> {
        service_details(api, self.opts(globals, false, true)).await
    }

    /// Resolves a version that can be modified, cloning it when `autoclone`
    /// is set and the selected version is active or locked.
    pub async fn editable<A: EdgeApi + Sync>(
        &self,
        api: &A,
        globals: &Globals,
        autoclone: &AutoCloneArgs,
    ) -> Result<(String, Version), ServiceDetailsError> {
        service_details(api, self.opts(globals, autoclone.autoclone, false)).await
    }

    fn opts<'a>(
        &'a self,
        globals: &'a Globals,
        autoclone: bool,
        allow_active_locked: bool,
    ) -> ServiceDetailsOpts<'a> {
        ServiceDetailsOpts {
            service: &self.service,
            manifest: &globals.manifest,
            env: &globals.env,
            version: self.version.version,
            autoclone,
            allow_active_locked,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct AutoCloneArgs {
    /// If the selected service version is not editable, clone it and use the clone
    #[arg(long)]
    pub autoclone: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionSpec {
    Latest,
    Active,
    Number(u32),
}

impl FromStr for VersionSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(VersionSpec::Latest),
            "active" => Ok(VersionSpec::Active),
            other => other
                .parse()
                .map(VersionSpec::Number)
                .map_err(|_| format!("expected 'latest', 'active' or a version number, got '{s}'")),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => write!(f, "latest"),
            VersionSpec::Active => write!(f, "active"),
            VersionSpec::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceIdSource {
    Name,
    Flag,
    Manifest,
    Environment,
}

impl fmt::Display for ServiceIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceIdSource::Name => write!(f, "--service-name"),
            ServiceIdSource::Flag => write!(f, "--service-id"),
            ServiceIdSource::Manifest => write!(f, "edge.toml"),
            ServiceIdSource::Environment => write!(f, "{ENV_SERVICE_ID}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceDetailsError {
    #[error(
        "error reading service: no service ID found\n\n\
        Provide one with --service-id or --service-name, set service_id in edge.toml, \
        or set the EDGE_SERVICE_ID environment variable."
    )]
    NoServiceId,
    #[error("error matching service name '{0}' with a service ID: {1}")]
    ServiceName(String, #[source] ApiError),
    #[error("no versions available for service {0}")]
    NoVersions(String),
    #[error("no active version found for service {0}")]
    NoActiveVersion(String),
    #[error("specified service version not found: {0}")]
    VersionNotFound(u32),
    #[error(
        "service version {0} is {1}\n\n\
        Pass --autoclone to clone it automatically, or use --version to select an editable version."
    )]
    NotEditable(u32, &'static str),
    #[error("error cloning service version {0}: {1}")]
    CloneVersion(u32, #[source] ApiError),
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for ServiceDetailsError {
    fn code(&self) -> String {
        match self {
            ServiceDetailsError::NoServiceId => "service/no-service-id",
            ServiceDetailsError::ServiceName(..) => "service/name-not-found",
            ServiceDetailsError::NoVersions(_) => "service/no-versions",
            ServiceDetailsError::NoActiveVersion(_) => "service/no-active-version",
            ServiceDetailsError::VersionNotFound(_) => "service/version-not-found",
            ServiceDetailsError::NotEditable(..) => "service/version-not-editable",
            ServiceDetailsError::CloneVersion(..) => "service/clone-error",
            ServiceDetailsError::ApiError(_) => "generic/api-error",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ServiceDetailsError::NoServiceId => crate::errors::USAGE,
            ServiceDetailsError::ServiceName(_, e)
            | ServiceDetailsError::CloneVersion(_, e)
            | ServiceDetailsError::ApiError(e) => e.exitcode(),
            _ => crate::errors::DATAERR,
        }
    }
}

/// Inputs to [`service_details`]: where to look for the service and how the
/// version will be used.
pub struct ServiceDetailsOpts<'a> {
    pub service: &'a ServiceArgs,
    pub manifest: &'a Manifest,
    pub env: &'a Environment,
    pub version: VersionSpec,
    pub autoclone: bool,
    /// Read-only commands may operate on active and locked versions.
    pub allow_active_locked: bool,
}

/// `--service-name` > `--service-id` > edge.toml > `EDGE_SERVICE_ID`.
pub async fn resolve_service_id<A: EdgeApi + Sync>(
    api: &A,
    service: &ServiceArgs,
    manifest: &Manifest,
    env: &Environment,
) -> Result<String, ServiceDetailsError> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    let (service_id, source) = if let Some(name) = non_empty(&service.service_name) {
        let found = api
            .search_service(&name)
            .await
            .map_err(|e| ServiceDetailsError::ServiceName(name, e))?;
        (found.id, ServiceIdSource::Name)
    } else if let Some(id) = non_empty(&service.service_id) {
        (id, ServiceIdSource::Flag)
    } else if let Some(id) = non_empty(&manifest.service_id) {
        (id, ServiceIdSource::Manifest)
    } else if let Some(id) = non_empty(&env.service_id) {
        (id, ServiceIdSource::Environment)
    } else {
        return Err(ServiceDetailsError::NoServiceId);
    };

    log::debug!("Service ID (via {source}): {service_id}");
    Ok(service_id)
}

fn select_version(
    service_id: &str,
    versions: Vec<Version>,
    spec: VersionSpec,
) -> Result<Version, ServiceDetailsError> {
    if versions.is_empty() {
        return Err(ServiceDetailsError::NoVersions(service_id.to_string()));
    }
    let found = match spec {
        VersionSpec::Latest => versions.into_iter().max_by_key(|v| v.number),
        VersionSpec::Active => {
            return versions
                .into_iter()
                .find(|v| v.active)
                .ok_or_else(|| ServiceDetailsError::NoActiveVersion(service_id.to_string()))
        }
        VersionSpec::Number(n) => versions.into_iter().find(|v| v.number == n),
    };
    match (found, spec) {
        (Some(version), _) => Ok(version),
        (None, VersionSpec::Number(n)) => Err(ServiceDetailsError::VersionNotFound(n)),
        (None, _) => Err(ServiceDetailsError::NoVersions(service_id.to_string())),
    }
}

/// Resolves the service ID and version once for a command, cloning the
/// version when it is not editable and `--autoclone` was given.
pub async fn service_details<A: EdgeApi + Sync>(
    api: &A,
    opts: ServiceDetailsOpts<'_>,
) -> Result<(String, Version), ServiceDetailsError> {
    let service_id = resolve_service_id(api, opts.service, opts.manifest, opts.env).await?;
    let versions = api.list_versions(&service_id).await?;
    let version = select_version(&service_id, versions, opts.version)?;
    log::debug!("Service version ({}): {}", opts.version, version.number);

    if opts.allow_active_locked || version.is_editable() {
        return Ok((service_id, version));
    }

    let state = if version.active { "active" } else { "locked" };
    if !opts.autoclone {
        return Err(ServiceDetailsError::NotEditable(version.number, state));
    }

    let cloned = api
        .clone_version(&service_id, version.number)
        .await
        .map_err(|e| ServiceDetailsError::CloneVersion(version.number, e))?;
    log::info!(
        "Service version {} is {state}, so it was cloned because --autoclone is enabled. Now operating on version {}.",
        version.number,
        cloned.number
    );
    Ok((service_id, cloned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::service::Service;
    use crate::api::MockEdgeApi;
    use crate::test_utils::{api_error, version};
    use common::api::client::ApiErrorKind;

    fn opts<'a>(
        service: &'a ServiceArgs,
        manifest: &'a Manifest,
        env: &'a Environment,
        spec: VersionSpec,
    ) -> ServiceDetailsOpts<'a> {
        ServiceDetailsOpts {
            service,
            manifest,
            env,
            version: spec,
            autoclone: false,
            allow_active_locked: false,
        }
    }

    fn mock_versions(api: &mut MockEdgeApi, versions: Vec<Version>) {
        api.expect_list_versions()
            .returning(move |_| Box::pin(std::future::ready(Ok(versions.clone()))));
    }

    #[test]
    fn test_version_spec_parsing() {
        assert_eq!("latest".parse::<VersionSpec>().unwrap(), VersionSpec::Latest);
        assert_eq!("Active".parse::<VersionSpec>().unwrap(), VersionSpec::Active);
        assert_eq!("12".parse::<VersionSpec>().unwrap(), VersionSpec::Number(12));
        assert!("newest".parse::<VersionSpec>().is_err());
        assert!("-1".parse::<VersionSpec>().is_err());
    }

    #[tokio::test]
    async fn test_service_id_precedence() {
        let mut api = MockEdgeApi::new();
        api.expect_search_service().returning(|_| {
            Box::pin(std::future::ready(Ok(Service {
                id: "from-name".into(),
                ..Default::default()
            })))
        });

        let manifest = Manifest {
            service_id: Some("from-manifest".into()),
            ..Default::default()
        };
        let env = Environment {
            service_id: Some("from-env".into()),
            ..Default::default()
        };

        let mut service = ServiceArgs {
            service_id: Some("from-flag".into()),
            service_name: Some("my-service".into()),
        };
        let id = resolve_service_id(&api, &service, &manifest, &env).await.unwrap();
        assert_eq!(id, "from-name");

        service.service_name = None;
        let id = resolve_service_id(&api, &service, &manifest, &env).await.unwrap();
        assert_eq!(id, "from-flag");

        service.service_id = None;
        let id = resolve_service_id(&api, &service, &manifest, &env).await.unwrap();
        assert_eq!(id, "from-manifest");

        let id = resolve_service_id(&api, &service, &Manifest::default(), &env)
            .await
            .unwrap();
        assert_eq!(id, "from-env");
    }

    #[tokio::test]
    async fn test_missing_service_id() {
        let api = MockEdgeApi::new();
        let err = resolve_service_id(
            &api,
            &ServiceArgs::default(),
            &Manifest::default(),
            &Environment::default(),
        )
        .await
        .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("error reading service: no service ID found"));
        assert_eq!(err.exitcode(), crate::errors::USAGE);
    }

    #[tokio::test]
    async fn test_unknown_service_name() {
        let mut api = MockEdgeApi::new();
        api.expect_search_service().returning(|_| {
            Box::pin(std::future::ready(Err(api_error(ApiErrorKind::NotFound))))
        });
        let service = ServiceArgs {
            service_name: Some("nope".into()),
            ..Default::default()
        };

        let err = resolve_service_id(&api, &service, &Manifest::default(), &Environment::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceDetailsError::ServiceName(ref name, _) if name == "nope"));
        assert_eq!(err.exitcode(), crate::errors::DATAERR);
    }

    #[tokio::test]
    async fn test_latest_active_and_numbered_versions() {
        let service = ServiceArgs {
            service_id: Some("123".into()),
            ..Default::default()
        };
        let (manifest, env) = (Manifest::default(), Environment::default());

        for (spec, expected) in [
            (VersionSpec::Latest, 3),
            (VersionSpec::Active, 2),
            (VersionSpec::Number(1), 1),
        ] {
            let mut api = MockEdgeApi::new();
            mock_versions(
                &mut api,
                vec![version(1, false, false), version(2, true, true), version(3, false, false)],
            );
            let mut o = opts(&service, &manifest, &env, spec);
            o.allow_active_locked = true;

            let (id, v) = service_details(&api, o).await.unwrap();
            assert_eq!(id, "123");
            assert_eq!(v.number, expected);
        }
    }

    #[tokio::test]
    async fn test_missing_version_number() {
        let service = ServiceArgs {
            service_id: Some("123".into()),
            ..Default::default()
        };
        let (manifest, env) = (Manifest::default(), Environment::default());
        let mut api = MockEdgeApi::new();
        mock_versions(&mut api, vec![version(1, false, false)]);

        let err = service_details(&api, opts(&service, &manifest, &env, VersionSpec::Number(9)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "specified service version not found: 9");
    }

    #[tokio::test]
    async fn test_active_version_requires_autoclone() {
        let service = ServiceArgs {
            service_id: Some("123".into()),
            ..Default::default()
        };
        let (manifest, env) = (Manifest::default(), Environment::default());
        let mut api = MockEdgeApi::new();
        mock_versions(&mut api, vec![version(1, true, false)]);
        api.expect_clone_version().never();

        let err = service_details(&api, opts(&service, &manifest, &env, VersionSpec::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceDetailsError::NotEditable(1, "active")));
        assert!(err.to_string().contains("--autoclone"));
    }

    #[tokio::test]
    async fn test_locked_version_is_cloned_with_autoclone() {
        let service = ServiceArgs {
            service_id: Some("123".into()),
            ..Default::default()
        };
        let (manifest, env) = (Manifest::default(), Environment::default());
        let mut api = MockEdgeApi::new();
        mock_versions(&mut api, vec![version(4, false, true)]);
        api.expect_clone_version()
            .withf(|id, number| id.to_string() == "123" && *number == 4)
            .times(1)
            .returning(|_, _| Box::pin(std::future::ready(Ok(version(5, false, false)))));

        let mut o = opts(&service, &manifest, &env, VersionSpec::Latest);
        o.autoclone = true;
        let (_, v) = service_details(&api, o).await.unwrap();
        assert_eq!(v.number, 5);
    }

    #[tokio::test]
    async fn test_editable_version_is_not_cloned() {
        let service = ServiceArgs {
            service_id: Some("123".into()),
            ..Default::default()
        };
        let (manifest, env) = (Manifest::default(), Environment::default());
        let mut api = MockEdgeApi::new();
        mock_versions(&mut api, vec![version(2, false, false)]);
        api.expect_clone_version().never();

        let mut o = opts(&service, &manifest, &env, VersionSpec::Latest);
        o.autoclone = true;
        let (_, v) = service_details(&api, o).await.unwrap();
        assert_eq!(v.number, 2);
    }
}
