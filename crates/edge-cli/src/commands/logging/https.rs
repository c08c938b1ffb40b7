use super::{DeleteArgs, DescribeArgs, Endpoint, ListArgs, LoggingError, LoggingResult};
use crate::api::logging::{CreateHttpsInput, Https, UpdateHttpsInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::Block;
use clap::{Args, Parser};

/// Manipulate HTTPS logging endpoints
#[derive(Parser, Debug)]
#[command(name = "https")]
pub struct HttpsArgs {
    #[command(subcommand)]
    pub action: HttpsCommand,
}

#[derive(Parser, Debug)]
#[command(name = "https")]
pub enum HttpsCommand {
    /// Create an HTTPS logging endpoint on a service version
    Create(CreateArgs),
    /// Show detailed information about an HTTPS logging endpoint
    Describe(DescribeArgs),
    /// List HTTPS endpoints on a service version
    List(ListArgs),
    /// Update an HTTPS logging endpoint
    Update(UpdateArgs),
    /// Delete an HTTPS logging endpoint
    Delete(DeleteArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct HttpsSettings {
    /// URL that log data will be sent to. Must use the https protocol
    #[arg(long)]
    pub url: Option<String>,

    /// The maximum number of logs sent in one request
    #[arg(long)]
    pub request_max_entries: Option<u32>,

    /// The maximum number of bytes sent in one request
    #[arg(long)]
    pub request_max_bytes: Option<u32>,

    /// Content type of the header sent with the request
    #[arg(long)]
    pub content_type: Option<String>,

    /// Name of the custom header sent with the request
    #[arg(long)]
    pub header_name: Option<String>,

    /// Value of the custom header sent with the request
    #[arg(long)]
    pub header_value: Option<String>,

    /// HTTP method used for request
    #[arg(long, value_parser = ["POST", "PUT"])]
    pub method: Option<String>,

    /// Enforces valid JSON formatting for log entries. 0 (none), 1 (array of JSON) or 2 (newline delimited JSON)
    #[arg(long, value_parser = ["0", "1", "2"])]
    pub json_format: Option<String>,

    /// Where in the generated VCL the logging call should be placed
    #[arg(long)]
    pub placement: Option<String>,

    /// A secure certificate to authenticate the server with. Must be in PEM format
    #[arg(long)]
    pub tls_ca_cert: Option<String>,

    /// The client certificate used to make authenticated requests. Must be in PEM format
    #[arg(long)]
    pub tls_client_cert: Option<String>,

    /// The client private key used to make authenticated requests. Must be in PEM format
    #[arg(long)]
    pub tls_client_key: Option<String>,

    /// The hostname used to verify the server's certificate
    #[arg(long)]
    pub tls_hostname: Option<String>,

    /// How the message should be formatted. One of: classic (default), loggly, logplex or blank
    #[arg(long)]
    pub message_type: Option<String>,

    /// Apache style log formatting. Your log must produce valid JSON that HTTPS can ingest
    #[arg(long)]
    pub format: Option<String>,

    /// The version of the custom logging format used for the configured endpoint. Can be either 2 (default) or 1
    #[arg(long)]
    pub format_version: Option<u8>,

    /// The name of an existing condition in the configured endpoint, or leave blank to always execute
    #[arg(long)]
    pub response_condition: Option<String>,
}

impl HttpsSettings {
    pub fn validate(&self, creating: bool) -> Result<(), LoggingError> {
        if creating && self.url.is_none() {
            return Err(LoggingError::InvalidArgs(
                "the --url flag is required".to_string(),
            ));
        }
        if self.header_name.is_some() != self.header_value.is_some() {
            return Err(LoggingError::InvalidArgs(
                "the --header-name and --header-value flags must be provided together".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The name of the HTTPS logging object. Used as a primary key for API access
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: HttpsSettings,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// The name of the HTTPS logging object
    #[arg(short = 'n', long)]
    pub name: String,

    /// New name of the HTTPS logging object
    #[arg(long)]
    pub new_name: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: HttpsSettings,
}

pub fn create_input(
    service_id: String,
    version: u32,
    name: String,
    s: HttpsSettings,
) -> CreateHttpsInput {
    CreateHttpsInput {
        service_id,
        service_version: version,
        name: Some(name),
        url: s.url,
        request_max_entries: s.request_max_entries,
        request_max_bytes: s.request_max_bytes,
        content_type: s.content_type,
        header_name: s.header_name,
        header_value: s.header_value,
        method: s.method,
        json_format: s.json_format,
        placement: s.placement,
        tls_ca_cert: s.tls_ca_cert,
        tls_client_cert: s.tls_client_cert,
        tls_client_key: s.tls_client_key,
        tls_hostname: s.tls_hostname,
        message_type: s.message_type,
        format: s.format,
        format_version: s.format_version,
        response_condition: s.response_condition,
    }
}

pub fn update_input(
    service_id: String,
    version: u32,
    name: String,
    new_name: Option<String>,
    s: HttpsSettings,
) -> UpdateHttpsInput {
    UpdateHttpsInput {
        service_id,
        service_version: version,
        name,
        new_name,
        url: s.url,
        request_max_entries: s.request_max_entries,
        request_max_bytes: s.request_max_bytes,
        content_type: s.content_type,
        header_name: s.header_name,
        header_value: s.header_value,
        method: s.method,
        json_format: s.json_format,
        placement: s.placement,
        tls_ca_cert: s.tls_ca_cert,
        tls_client_cert: s.tls_client_cert,
        tls_client_key: s.tls_client_key,
        tls_hostname: s.tls_hostname,
        message_type: s.message_type,
        format: s.format,
        format_version: s.format_version,
        response_condition: s.response_condition,
    }
}

impl Endpoint for Https {
    const KIND: &'static str = "HTTPS";

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
            .field(indent, "URL", &self.url)
            .field(indent, "Content type", &self.content_type)
            .field(indent, "Header name", &self.header_name)
            .field(indent, "Header value", &self.header_value)
            .field(indent, "Method", &self.method)
            .field(indent, "JSON format", &self.json_format)
            .field(indent, "TLS CA certificate", &self.tls_ca_cert)
            .field(indent, "TLS client certificate", &self.tls_client_cert)
            .field(indent, "TLS client key", &self.tls_client_key)
            .field(indent, "TLS hostname", &self.tls_hostname)
            .field(indent, "Request max entries", self.request_max_entries)
            .field(indent, "Request max bytes", self.request_max_bytes)
            .field(indent, "Message type", &self.message_type)
            .field(indent, "Format", &self.format)
            .field(indent, "Format version", self.format_version)
            .field(indent, "Response condition", &self.response_condition)
            .field(indent, "Placement", &self.placement);
    }
}

pub async fn run<A: EdgeApi + Sync>(args: HttpsArgs, api: &A, globals: &Globals) -> LoggingResult {
    match args.action {
        HttpsCommand::Create(args) => create(args, api, globals).await,
        HttpsCommand::Describe(args) => describe(args, api, globals).await,
        HttpsCommand::List(args) => list(args, api, globals).await,
        HttpsCommand::Update(args) => update(args, api, globals).await,
        HttpsCommand::Delete(args) => delete(args, api, globals).await,
    }
}

async fn create<A: EdgeApi + Sync>(args: CreateArgs, api: &A, globals: &Globals) -> LoggingResult {
    args.settings.validate(true)?;
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = create_input(service_id, version.number, args.name, args.settings);
    let endpoint = api.create_https(input).await?;
    Ok(super::created(&endpoint))
}

async fn describe<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoint = api.get_https(&service_id, version.number, &args.name).await?;
    Ok(super::describe(&endpoint, globals.verbose()))
}

async fn list<A: EdgeApi + Sync>(args: ListArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoints = api.list_httpss(&service_id, version.number).await?;
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
    let endpoint = api.update_https(input).await?;
    Ok(super::updated(&endpoint))
}

async fn delete<A: EdgeApi + Sync>(args: DeleteArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_https(&service_id, version.number, &args.name).await?;
    Ok(super::deleted::<Https>(args.name, service_id, version.number))
}
