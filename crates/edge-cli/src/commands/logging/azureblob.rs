use super::{DeleteArgs, DescribeArgs, Endpoint, ListArgs, LoggingError, LoggingResult};
use crate::api::logging::{BlobStorage, CreateBlobStorageInput, UpdateBlobStorageInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::Block;
use clap::{Args, Parser};

/// Smallest file size the Azure Blob Storage endpoint accepts.
pub const MIN_FILE_MAX_BYTES: u64 = 1_048_576;

/// Manipulate Azure Blob Storage logging endpoints
#[derive(Parser, Debug)]
#[command(name = "azureblob")]
pub struct AzureBlobArgs {
    #[command(subcommand)]
    pub action: AzureBlobCommand,
}

#[derive(Parser, Debug)]
#[command(name = "azureblob")]
pub enum AzureBlobCommand {
    /// Create an Azure Blob Storage logging endpoint on a service version
    Create(CreateArgs),
    /// Show detailed information about an Azure Blob Storage logging endpoint
    Describe(DescribeArgs),
    /// List Azure Blob Storage logging endpoints on a service version
    List(ListArgs),
    /// Update an Azure Blob Storage logging endpoint
    Update(UpdateArgs),
    /// Delete an Azure Blob Storage logging endpoint
    Delete(DeleteArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct AzureBlobSettings {
    /// The name of the Azure Blob Storage container in which to store logs
    #[arg(long)]
    pub container: Option<String>,

    /// The unique Azure Blob Storage namespace in which your data objects are stored
    #[arg(long)]
    pub account_name: Option<String>,

    /// The Azure shared access signature providing write access to the blob service objects
    #[arg(long)]
    pub sas_token: Option<String>,

    /// The path to upload logs to
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

    /// A PGP public key used to encrypt log files before they are written
    #[arg(long)]
    pub public_key: Option<String>,

    /// The maximum size of a log file in bytes, at least 1048576
    #[arg(long)]
    pub file_max_bytes: Option<u64>,

    /// The codec used for compressing your logs. Valid values are zstd, snappy, and gzip
    #[arg(long)]
    pub compression_codec: Option<String>,
}

impl AzureBlobSettings {
    pub fn validate(&self, creating: bool) -> Result<(), LoggingError> {
        if let Some(bytes) = self.file_max_bytes {
            if bytes < MIN_FILE_MAX_BYTES {
                return Err(LoggingError::InvalidArgs(format!(
                    "--file-max-bytes must be at least {MIN_FILE_MAX_BYTES} (1MB), got {bytes}"
                )));
            }
        }

        if creating {
            let missing: Vec<&str> = [
                ("--container", self.container.is_none()),
                ("--account-name", self.account_name.is_none()),
                ("--sas-token", self.sas_token.is_none()),
            ]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(flag, _)| flag)
            .collect();
            if !missing.is_empty() {
                return Err(LoggingError::InvalidArgs(format!(
                    "required flags not provided: {}",
                    missing.join(", ")
                )));
            }
            super::check_compression(&self.compression_codec, &self.gzip_level)?;
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The name of the Azure Blob Storage logging object. Used as a primary key for API access
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: AzureBlobSettings,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// The name of the Azure Blob Storage logging object
    #[arg(short = 'n', long)]
    pub name: String,

    /// New name of the Azure Blob Storage logging object
    #[arg(long)]
    pub new_name: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: AzureBlobSettings,
}

pub fn create_input(
    service_id: String,
    version: u32,
    name: String,
    s: AzureBlobSettings,
) -> CreateBlobStorageInput {
    CreateBlobStorageInput {
        service_id,
        service_version: version,
        name: Some(name),
        container: s.container,
        account_name: s.account_name,
        sas_token: s.sas_token,
        path: s.path,
        period: s.period,
        gzip_level: s.gzip_level,
        format: s.format,
        format_version: s.format_version,
        message_type: s.message_type,
        response_condition: s.response_condition,
        timestamp_format: s.timestamp_format,
        placement: s.placement,
        public_key: s.public_key,
        file_max_bytes: s.file_max_bytes,
        compression_codec: s.compression_codec,
    }
}

pub fn update_input(
    service_id: String,
    version: u32,
    name: String,
    new_name: Option<String>,
    s: AzureBlobSettings,
) -> UpdateBlobStorageInput {
    UpdateBlobStorageInput {
        service_id,
        service_version: version,
        name,
        new_name,
        container: s.container,
        account_name: s.account_name,
        sas_token: s.sas_token,
        path: s.path,
        period: s.period,
        gzip_level: s.gzip_level,
        format: s.format,
        format_version: s.format_version,
        message_type: s.message_type,
        response_condition: s.response_condition,
        timestamp_format: s.timestamp_format,
        placement: s.placement,
        public_key: s.public_key,
        file_max_bytes: s.file_max_bytes,
        compression_codec: s.compression_codec,
    }
}

impl Endpoint for BlobStorage {
    const KIND: &'static str = "BlobStorage";

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
            .field(indent, "Container", &self.container)
            .field(indent, "Account name", &self.account_name)
            .field(indent, "SAS token", &self.sas_token)
            .field(indent, "Path", &self.path)
            .field(indent, "Period", self.period)
            .field(indent, "GZip level", self.gzip_level)
            .field(indent, "Format", &self.format)
            .field(indent, "Format version", self.format_version)
            .field(indent, "Response condition", &self.response_condition)
            .field(indent, "Message type", &self.message_type)
            .field(indent, "Timestamp format", &self.timestamp_format)
            .field(indent, "Placement", &self.placement)
            .field(indent, "Public key", &self.public_key)
            .field(indent, "File max bytes", self.file_max_bytes)
            .field(indent, "Compression codec", &self.compression_codec);
    }
}

pub async fn run<A: EdgeApi + Sync>(
    args: AzureBlobArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    match args.action {
        AzureBlobCommand::Create(args) => create(args, api, globals).await,
        AzureBlobCommand::Describe(args) => describe(args, api, globals).await,
        AzureBlobCommand::List(args) => list(args, api, globals).await,
        AzureBlobCommand::Update(args) => update(args, api, globals).await,
        AzureBlobCommand::Delete(args) => delete(args, api, globals).await,
    }
}

async fn create<A: EdgeApi + Sync>(args: CreateArgs, api: &A, globals: &Globals) -> LoggingResult {
    args.settings.validate(true)?;
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = create_input(service_id, version.number, args.name, args.settings);
    let endpoint = api.create_blob_storage(input).await?;
    Ok(super::created(&endpoint))
}

async fn describe<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoint = api
        .get_blob_storage(&service_id, version.number, &args.name)
        .await?;
    Ok(super::describe(&endpoint, globals.verbose()))
}

async fn list<A: EdgeApi + Sync>(args: ListArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoints = api.list_blob_storages(&service_id, version.number).await?;
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
    let endpoint = api.update_blob_storage(input).await?;
    Ok(super::updated(&endpoint))
}

async fn delete<A: EdgeApi + Sync>(args: DeleteArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_blob_storage(&service_id, version.number, &args.name)
        .await?;
    Ok(super::deleted::<BlobStorage>(
        args.name,
        service_id,
        version.number,
    ))
}
