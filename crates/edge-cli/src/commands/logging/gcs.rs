use super::{DeleteArgs, DescribeArgs, Endpoint, ListArgs, LoggingError, LoggingResult};
use crate::api::logging::{CreateGcsInput, Gcs, UpdateGcsInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::Block;
use clap::{Args, Parser};

/// Manipulate Google Cloud Storage logging endpoints
#[derive(Parser, Debug)]
#[command(name = "gcs")]
pub struct GcsArgs {
    #[command(subcommand)]
    pub action: GcsCommand,
}

#[derive(Parser, Debug)]
#[command(name = "gcs")]
pub enum GcsCommand {
    /// Create a GCS logging endpoint on a service version
    Create(CreateArgs),
    /// Show detailed information about a GCS logging endpoint
    Describe(DescribeArgs),
    /// List GCS endpoints on a service version
    List(ListArgs),
    /// Update a GCS logging endpoint
    Update(UpdateArgs),
    /// Delete a GCS logging endpoint
    Delete(DeleteArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct GcsSettings {
    /// The bucket of the GCS bucket
    #[arg(long = "bucket")]
    pub bucket_name: Option<String>,

    /// Your GCS service account email address. The client_email field in your service account authentication JSON
    #[arg(long)]
    pub user: Option<String>,

    /// The name of the Google Cloud Platform service account associated with the target log collection service
    #[arg(long)]
    pub account_name: Option<String>,

    /// Your GCS account secret key. The private_key field in your service account authentication JSON
    #[arg(long)]
    pub secret_key: Option<String>,

    /// The path to upload logs to (default '/')
    #[arg(long)]
    pub path: Option<String>,

    /// How frequently log files are finalized so they can be available for reading (in seconds, default 3600)
    #[arg(long)]
    pub period: Option<u32>,

    /// What level of GZIP encoding to have when dumping logs (default 0, no compression)
    #[arg(long)]
    pub gzip_level: Option<u8>,

    /// Apache style log formatting
    #[arg(long)]
    pub format: Option<String>,

    /// The version of the custom logging format used for the configured endpoint. Can be either 2 (default) or 1
    #[arg(long)]
    pub format_version: Option<u8>,

    /// How the message should be formatted. One of: classic (default), loggly, logplex or blank
    #[arg(long)]
    pub message_type: Option<String>,

    /// The name of an existing condition in the configured endpoint, or leave blank to always execute
    #[arg(long)]
    pub response_condition: Option<String>,

    /// strftime specified timestamp formatting (default "%Y-%m-%dT%H:%M:%S.000")
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Where in the generated VCL the logging call should be placed
    #[arg(long)]
    pub placement: Option<String>,

    /// The codec used for compressing your logs. Valid values are zstd, snappy, and gzip
    #[arg(long)]
    pub compression_codec: Option<String>,
}

impl GcsSettings {
    pub fn validate(&self, creating: bool) -> Result<(), LoggingError> {
        let has_user = self.user.is_some() || self.secret_key.is_some();
        if has_user && self.account_name.is_some() {
            return Err(LoggingError::InvalidArgs(
                "the --user and --secret-key flags are mutually exclusive with the --account-name flag"
                    .to_string(),
            ));
        }

        if creating {
            if self.bucket_name.is_none() {
                return Err(LoggingError::InvalidArgs(
                    "the --bucket flag is required".to_string(),
                ));
            }
            let has_credentials = self.user.is_some() && self.secret_key.is_some();
            if !has_credentials && self.account_name.is_none() {
                return Err(LoggingError::InvalidArgs(
                    "no authentication method provided, set --user and --secret-key, or --account-name"
                        .to_string(),
                ));
            }
            super::check_compression(&self.compression_codec, &self.gzip_level)?;
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The name of the GCS logging object. Used as a primary key for API access
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: GcsSettings,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// The name of the GCS logging object
    #[arg(short = 'n', long)]
    pub name: String,

    /// New name of the GCS logging object
    #[arg(long)]
    pub new_name: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: GcsSettings,
}

pub fn create_input(
    service_id: String,
    version: u32,
    name: String,
    s: GcsSettings,
) -> CreateGcsInput {
    CreateGcsInput {
        service_id,
        service_version: version,
        name: Some(name),
        bucket_name: s.bucket_name,
        user: s.user,
        account_name: s.account_name,
        secret_key: s.secret_key,
        path: s.path,
        period: s.period,
        gzip_level: s.gzip_level,
        format: s.format,
        format_version: s.format_version,
        message_type: s.message_type,
        response_condition: s.response_condition,
        timestamp_format: s.timestamp_format,
        placement: s.placement,
        compression_codec: s.compression_codec,
    }
}

pub fn update_input(
    service_id: String,
    version: u32,
    name: String,
    new_name: Option<String>,
    s: GcsSettings,
) -> UpdateGcsInput {
    UpdateGcsInput {
        service_id,
        service_version: version,
        name,
        new_name,
        bucket_name: s.bucket_name,
        user: s.user,
        account_name: s.account_name,
        secret_key: s.secret_key,
        path: s.path,
        period: s.period,
        gzip_level: s.gzip_level,
        format: s.format,
        format_version: s.format_version,
        message_type: s.message_type,
        response_condition: s.response_condition,
        timestamp_format: s.timestamp_format,
        placement: s.placement,
        compression_codec: s.compression_codec,
    }
}

impl Endpoint for Gcs {
    const KIND: &'static str = "GCS";

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
            .field(indent, "Bucket", &self.bucket_name)
            .field(indent, "User", &self.user)
            .field(indent, "Account name", &self.account_name)
            .field(indent, "Secret key", &self.secret_key)
            .field(indent, "Path", &self.path)
            .field(indent, "Period", self.period)
            .field(indent, "GZip level", self.gzip_level)
            .field(indent, "Format", &self.format)
            .field(indent, "Format version", self.format_version)
            .field(indent, "Response condition", &self.response_condition)
            .field(indent, "Message type", &self.message_type)
            .field(indent, "Timestamp format", &self.timestamp_format)
            .field(indent, "Placement", &self.placement)
            .field(indent, "Compression codec", &self.compression_codec);
    }
}

pub async fn run<A: EdgeApi + Sync>(args: GcsArgs, api: &A, globals: &Globals) -> LoggingResult {
    match args.action {
        GcsCommand::Create(args) => create(args, api, globals).await,
        GcsCommand::Describe(args) => describe(args, api, globals).await,
        GcsCommand::List(args) => list(args, api, globals).await,
        GcsCommand::Update(args) => update(args, api, globals).await,
        GcsCommand::Delete(args) => delete(args, api, globals).await,
    }
}

async fn create<A: EdgeApi + Sync>(args: CreateArgs, api: &A, globals: &Globals) -> LoggingResult {
    args.settings.validate(true)?;
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = create_input(service_id, version.number, args.name, args.settings);
    let endpoint = api.create_gcs(input).await?;
    Ok(super::created(&endpoint))
}

async fn describe<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoint = api.get_gcs(&service_id, version.number, &args.name).await?;
    Ok(super::describe(&endpoint, globals.verbose()))
}

async fn list<A: EdgeApi + Sync>(args: ListArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoints = api.list_gcss(&service_id, version.number).await?;
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
    let endpoint = api.update_gcs(input).await?;
    Ok(super::updated(&endpoint))
}

async fn delete<A: EdgeApi + Sync>(args: DeleteArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_gcs(&service_id, version.number, &args.name).await?;
    Ok(super::deleted::<Gcs>(args.name, service_id, version.number))
}
