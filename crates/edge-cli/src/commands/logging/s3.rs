use super::{DeleteArgs, DescribeArgs, Endpoint, ListArgs, LoggingError, LoggingResult};
use crate::api::logging::{
    CreateS3Input, S3Redundancy, S3ServerSideEncryption, UpdateS3Input, S3,
};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::Block;
use clap::{Args, Parser};

/// Manipulate Amazon S3 logging endpoints
#[derive(Parser, Debug)]
#[command(name = "s3")]
pub struct S3Args {
    #[command(subcommand)]
    pub action: S3Command,
}

#[derive(Parser, Debug)]
#[command(name = "s3")]
pub enum S3Command {
    /// Create an Amazon S3 logging endpoint on a service version
    Create(CreateArgs),
    /// Show detailed information about an S3 logging endpoint
    Describe(DescribeArgs),
    /// List S3 endpoints on a service version
    List(ListArgs),
    /// Update an S3 logging endpoint
    Update(UpdateArgs),
    /// Delete an S3 logging endpoint
    Delete(DeleteArgs),
}

pub fn parse_redundancy(value: &str) -> Result<S3Redundancy, String> {
    value
        .parse()
        .map_err(|_| format!("unknown redundancy: {value}"))
}

pub fn parse_server_side_encryption(value: &str) -> Result<S3ServerSideEncryption, String> {
    value
        .parse()
        .map_err(|_| format!("unknown server-side encryption: {value}"))
}

/// Endpoint attributes accepted by both create and update.
#[derive(Args, Clone, Debug, Default)]
pub struct S3Settings {
    /// Your S3 bucket name
    #[arg(long = "bucket")]
    pub bucket_name: Option<String>,

    /// Your S3 account access key
    #[arg(long)]
    pub access_key: Option<String>,

    /// Your S3 account secret key
    #[arg(long)]
    pub secret_key: Option<String>,

    /// The IAM role ARN for logging
    #[arg(long)]
    pub iam_role: Option<String>,

    /// The domain of the S3 endpoint
    #[arg(long)]
    pub domain: Option<String>,

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

    /// The S3 storage class (redundancy level)
    #[arg(long, value_parser = parse_redundancy)]
    pub redundancy: Option<S3Redundancy>,

    /// Set to enable S3 server-side encryption. Can be either AES256 or aws:kms
    #[arg(long, value_parser = parse_server_side_encryption)]
    pub server_side_encryption: Option<S3ServerSideEncryption>,

    /// Server-side KMS key ID. Must be set if server-side-encryption is set to aws:kms
    #[arg(long = "server-side-encryption-kms-key-id")]
    pub server_side_encryption_kms_key_id: Option<String>,

    /// A PGP public key used to encrypt log files before they are written
    #[arg(long)]
    pub public_key: Option<String>,

    /// The maximum size of a log file in bytes
    #[arg(long)]
    pub file_max_bytes: Option<u64>,

    /// The codec used for compressing your logs. Valid values are zstd, snappy, and gzip
    #[arg(long)]
    pub compression_codec: Option<String>,
}

fn invalid(message: &str) -> LoggingError {
    LoggingError::InvalidArgs(message.to_string())
}

impl S3Settings {
    /// Checks the flag combinations. Creating additionally requires a bucket
    /// and one authentication method.
    pub fn validate(&self, creating: bool) -> Result<(), LoggingError> {
        let has_keys = self.access_key.is_some() || self.secret_key.is_some();
        let has_role = self.iam_role.as_deref().map_or(false, |r| !r.is_empty());

        if has_keys && has_role {
            return Err(invalid(
                "the --access-key and --secret-key flags are mutually exclusive with the --iam-role flag",
            ));
        }
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(invalid(
                "the --access-key and --secret-key flags must be provided together",
            ));
        }
        if self.server_side_encryption == Some(S3ServerSideEncryption::Kms)
            && self.server_side_encryption_kms_key_id.is_none()
        {
            return Err(invalid(
                "the --server-side-encryption-kms-key-id flag is required when --server-side-encryption is aws:kms",
            ));
        }

        if creating {
            if self.bucket_name.is_none() {
                return Err(invalid("the --bucket flag is required"));
            }
            if !has_keys && !has_role {
                return Err(invalid(
                    "no authentication method provided, set --access-key and --secret-key, or --iam-role",
                ));
            }
            super::check_compression(&self.compression_codec, &self.gzip_level)?;
        }
        Ok(())
    }
}

/// Create an Amazon S3 logging endpoint on a service version
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The name of the S3 logging object. Used as a primary key for API access
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: S3Settings,
}

/// Update an S3 logging endpoint
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// The name of the S3 logging object
    #[arg(short = 'n', long)]
    pub name: String,

    /// New name of the S3 logging object
    #[arg(long)]
    pub new_name: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    #[command(flatten)]
    pub settings: S3Settings,
}

pub fn create_input(service_id: String, version: u32, name: String, s: S3Settings) -> CreateS3Input {
    CreateS3Input {
        service_id,
        service_version: version,
        name: Some(name),
        bucket_name: s.bucket_name,
        domain: s.domain,
        access_key: s.access_key,
        secret_key: s.secret_key,
        iam_role: s.iam_role,
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
        redundancy: s.redundancy,
        server_side_encryption: s.server_side_encryption,
        server_side_encryption_kms_key_id: s.server_side_encryption_kms_key_id,
        file_max_bytes: s.file_max_bytes,
        compression_codec: s.compression_codec,
    }
}

pub fn update_input(
    service_id: String,
    version: u32,
    name: String,
    new_name: Option<String>,
    s: S3Settings,
) -> UpdateS3Input {
    UpdateS3Input {
        service_id,
        service_version: version,
        name,
        new_name,
        bucket_name: s.bucket_name,
        domain: s.domain,
        access_key: s.access_key,
        secret_key: s.secret_key,
        iam_role: s.iam_role,
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
        redundancy: s.redundancy,
        server_side_encryption: s.server_side_encryption,
        server_side_encryption_kms_key_id: s.server_side_encryption_kms_key_id,
        file_max_bytes: s.file_max_bytes,
        compression_codec: s.compression_codec,
    }
}

impl Endpoint for S3 {
    const KIND: &'static str = "S3";

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
        block.field(indent, "Bucket", &self.bucket_name);
        if !self.access_key.is_empty() || !self.secret_key.is_empty() {
            block
                .field(indent, "Access key", &self.access_key)
                .field(indent, "Secret key", &self.secret_key);
        }
        if !self.iam_role.is_empty() {
            block.field(indent, "IAM role", &self.iam_role);
        }
        block
            .field(indent, "Domain", &self.domain)
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
            .field(indent, "Redundancy", super::optional(&self.redundancy))
            .field(
                indent,
                "Server-side encryption",
                super::optional(&self.server_side_encryption),
            )
            .field(
                indent,
                "Server-side encryption KMS key ID",
                &self.server_side_encryption_kms_key_id,
            )
            .field(indent, "File max bytes", self.file_max_bytes)
            .field(indent, "Compression codec", &self.compression_codec);
    }
}

pub async fn run<A: EdgeApi + Sync>(args: S3Args, api: &A, globals: &Globals) -> LoggingResult {
    match args.action {
        S3Command::Create(args) => create(args, api, globals).await,
        S3Command::Describe(args) => describe(args, api, globals).await,
        S3Command::List(args) => list(args, api, globals).await,
        S3Command::Update(args) => update(args, api, globals).await,
        S3Command::Delete(args) => delete(args, api, globals).await,
    }
}

async fn create<A: EdgeApi + Sync>(args: CreateArgs, api: &A, globals: &Globals) -> LoggingResult {
    args.settings.validate(true)?;
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = create_input(service_id, version.number, args.name, args.settings);
    let endpoint = api.create_s3(input).await?;
    Ok(super::created(&endpoint))
}

async fn describe<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoint = api.get_s3(&service_id, version.number, &args.name).await?;
    Ok(super::describe(&endpoint, globals.verbose()))
}

async fn list<A: EdgeApi + Sync>(args: ListArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let endpoints = api.list_s3s(&service_id, version.number).await?;
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
    let endpoint = api.update_s3(input).await?;
    Ok(super::updated(&endpoint))
}

async fn delete<A: EdgeApi + Sync>(args: DeleteArgs, api: &A, globals: &Globals) -> LoggingResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_s3(&service_id, version.number, &args.name).await?;
    Ok(super::deleted::<S3>(args.name, service_id, version.number))
}
