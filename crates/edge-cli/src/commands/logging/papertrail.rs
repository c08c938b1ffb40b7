use super::{DeleteArgs, DescribeArgs, Endpoint, ListArgs, LoggingError, LoggingResult};
use crate::api::logging::{CreatePapertrailInput, Papertrail, UpdatePapertrailInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::Block;
use clap::{Args, Parser};

/// Manipulate Papertrail logging endpoints
#[derive(Parser, Debug)]
#[command(name = "papertrail")]
pub struct PapertrailArgs {
    #[command(subcommand)]
    pub action: PapertrailCommand,
}

#[derive(Parser, Debug)]
#[command(name = "papertrail")]
pub enum PapertrailCommand {
    /// Create a Papertrail logging endpoint on a service version
    Create(CreateArgs),
    /// Show detailed information about a Papertrail logging endpoint
    Describe(DescribeArgs),
    /// List Papertrail endpoints on a service version
    List(ListArgs),
    /// Update a Papertrail logging endpoint
    Update(UpdateArgs),
    /// Delete a Papertrail logging endpoint
    Delete(DeleteArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct PapertrailSettings {
    /// A hostname or IPv4 address
    #[arg(long)]
    pub address: Option<String>,

    /// The port number
    #[arg(long)]
    pub port: Option<u16>,

    /// Apache style log formatting
    #[arg(long)]
    pub format: Option<String>,

    /// The version of the custom logging format used for the configured endpoint. Can be either 2 (default) or 1
    #[arg(long)]
    pub format_version: Option<u8>,

    /// The name of an existing condition in the configured endpoint, or leave blank to always execute
    #[arg(long)]
    pub response_condition: Option<String>,

    /// Where in the generated VCL the logging call should be placed
    #[arg(long)]
    pub placement: Option<String>,
}

impl PapertrailSettings {
    pub fn validate(&self, creating: bool) -> Result<(), LoggingError> {
        if creating && self.address.is_none() {
            return Err(LoggingError::InvalidArgs(
                "the --address flag is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The name of the Papertrail logging object. Used as a primary key for API access
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: PapertrailSettings,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// The name of the Papertrail logging object
    #[arg(short = 'n', long)]
    pub name: String,

    /// New name of the Papertrail logging object
    #[arg(long)]
    pub new_name: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: PapertrailSettings,
}

pub fn create_input(
    service_id: String,
    version: u32,
    name: String,
    s: PapertrailSettings,
) -> CreatePapertrailInput {
    CreatePapertrailInput {
        service_id,
        service_version: version,
        name: Some(name),
        address: s.address,
        port: s.port,
        format: s.format,
        format_version: s.format_version,
        response_condition: s.response_condition,
        placement: s.placement,
    }
}

pub fn update_input(
    service_id: String,
    version: u32,
    name: String,
    new_name: Option<String>,
    s: PapertrailSettings,
) -> UpdatePapertrailInput {
    UpdatePapertrailInput {
        service_id,
        service_version: version,
        name,
        new_name,
        address: s.address,
        port: s.port,
        format: s.format,
        format_version: s.format_version,
        response_condition: s.response_condition,
        placement: s.placement,
    }
}

impl Endpoint for Papertrail {
    const KIND: &'static str = "Papertrail";

    fn service_id(&self) -> &str {
        &self.service_id
    }

    fn service_version(&self) -> u32 {
        self.service_version
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self, block: &mut Block, indent: usize) {
        block
            .field(indent, "Address", &self.address)
            .field(indent, "Port", self.port)
            .field(indent, "Format", &self.format)
            .field(indent, "Format version", self.format_version)
            .field(indent, "Response condition", &self.response_condition)
            .field(indent, "Placement", &self.placement);
    }
}

pub async fn run<A: EdgeApi + Sync>(
    args: PapertrailArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    match args.action {
        PapertrailCommand::Create(args) => create(args, api, globals).await,
        PapertrailCommand::Describe(args) => describe(args, api, globals).await,
        PapertrailCommand::List(args) => list(args, api, globals).await,
        PapertrailCommand::Update(args) => update(args, api, globals).await,
        PapertrailCommand::Delete(args) => delete(args, api, globals).await,
    }
}

async fn create<A: EdgeApi + Sync>(args: CreateArgs, api: &A, globals: &Globals) -> LoggingResult {
    args.settings.validate(true)?;
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = create_input(service_id, version.number, args.name, args.settings);
    let endpoint = api.create_papertrail(input).await?;
    Ok(super::created(&endpoint))
}

async fn describe<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoint = api
        .get_papertrail(&service_id, version.number, &args.name)
        .await?;
    Ok(super::describe(&endpoint, globals.verbose()))
}

async fn list<A: EdgeApi + Sync>(args: ListArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoints = api.list_papertrails(&service_id, version.number).await?;
    Ok(super::list(version.number, &endpoints, globals.verbose()))
}

async fn update<A: EdgeApi + Sync>(args: UpdateArgs, api: &A, globals: &Globals) -> LoggingResult {
    args.settings.validate(false)?;
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = update_input(
        service_id,
        version.number,
        args.name,
        args.new_name,
        args.settings,
    );
    let endpoint = api.update_papertrail(input).await?;
    Ok(super::updated(&endpoint))
}

async fn delete<A: EdgeApi + Sync>(args: DeleteArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_papertrail(&service_id, version.number, &args.name)
        .await?;
    Ok(super::deleted::<Papertrail>(
        args.name,
        service_id,
        version.number,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockEdgeApi;
    use crate::commands::service_details::VersionSpec;
    use crate::test_utils::{api_error, expect_versions, globals, target, version};
    use crate::CmdOutput;
    use common::api::client::ApiErrorKind;

    #[test]
    fn test_create_input() {
        let settings = PapertrailSettings {
            address: Some("example.com:123".into()),
            port: Some(22),
            format: Some(r#"%h %l %u %t "%r" %>s %b"#.into()),
            format_version: Some(2),
            response_condition: Some("Prevent default logging".into()),
            placement: Some("none".into()),
        };
        assert!(settings.validate(true).is_ok());

        let input = create_input("123".into(), 4, "log".into(), settings);
        assert_eq!(input.port, Some(22));
        assert_eq!(input.address.as_deref(), Some("example.com:123"));
        assert_eq!(input.service_version, 4);
    }

    #[test]
    fn test_address_required_on_create_only() {
        assert!(PapertrailSettings::default().validate(true).is_err());
        assert!(PapertrailSettings::default().validate(false).is_ok());
    }

    #[tokio::test]
    async fn test_list_table_and_json() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(1, true, true)]);
        api.expect_list_papertrails().returning(|_, _| {
            Box::pin(std::future::ready(Ok(vec![
                Papertrail {
                    service_id: "123".into(),
                    service_version: 1,
                    name: "logs".into(),
                    address: "example.com:123".into(),
                    port: 514,
                    ..Default::default()
                },
                Papertrail {
                    service_id: "123".into(),
                    service_version: 1,
                    name: "analytics".into(),
                    ..Default::default()
                },
            ])))
        });

        let args = ListArgs {
            target: target(VersionSpec::Active),
        };
        let message = list(args, &api, &globals(false, false)).await.unwrap();
        let text = message.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].split_whitespace().collect::<Vec<_>>(), ["SERVICE", "VERSION", "NAME"]);
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), ["123", "1", "logs"]);
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["123", "1", "analytics"]);

        let data = message.data().unwrap();
        assert_eq!(data.as_array().map(Vec::len), Some(2));
        assert_eq!(data[0]["port"], 514);
    }

    #[tokio::test]
    async fn test_api_error_is_propagated() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(1, false, false)]);
        api.expect_delete_papertrail().returning(|_, _, _| {
            Box::pin(std::future::ready(Err(api_error(ApiErrorKind::NotFound))))
        });

        let args = DeleteArgs {
            target: target(VersionSpec::Number(1)),
            autoclone: AutoCloneArgs::default(),
            name: "missing".into(),
        };
        let err = delete(args, &api, &globals(false, false)).await.unwrap_err();
        assert!(matches!(err, LoggingError::ApiError(ref e) if e.is_not_found()));
        assert_eq!(err.code(), "logging/api-error");
    }
}
