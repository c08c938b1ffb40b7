//! Commands for the logging endpoints attached to a service version.
//!
//! Every provider exposes the same five actions. The shared pieces live here:
//! the error and message types, and the text rendering driven by
//! [`Endpoint`].

use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceDetailsError, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::Block;
use crate::{run_cmd, CmdOutput};
use clap::{Args, Parser};
use common::{api::client::ApiError, CliError};
use prettytable::row;
use serde::Serialize;
use thiserror::Error;

pub mod azureblob;
pub mod gcs;
pub mod https;
pub mod papertrail;
pub mod s3;

/// Manage logging endpoints on a service version
#[derive(Parser, Debug)]
#[command(name = "logging")]
pub struct LoggingArgs {
    #[command(subcommand)]
    pub provider: LoggingProvider,
}

#[derive(Parser, Debug)]
#[command(name = "logging")]
pub enum LoggingProvider {
    S3(s3::S3Args),
    Gcs(gcs::GcsArgs),
    Azureblob(azureblob::AzureBlobArgs),
    Https(https::HttpsArgs),
    Papertrail(papertrail::PapertrailArgs),
}

pub async fn run<A: EdgeApi + Sync>(
    args: LoggingArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    let result = match args.provider {
        LoggingProvider::S3(args) => s3::run(args, api, globals).await,
        LoggingProvider::Gcs(args) => gcs::run(args, api, globals).await,
        LoggingProvider::Azureblob(args) => azureblob::run(args, api, globals).await,
        LoggingProvider::Https(args) => https::run(args, api, globals).await,
        LoggingProvider::Papertrail(args) => papertrail::run(args, api, globals).await,
    };
    run_cmd(result, globals.json())
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub target: ServiceVersionArgs,

    /// The name of the logging endpoint
    #[arg(short = 'n', long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub target: ServiceVersionArgs,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,

    /// The name of the logging endpoint to delete
    #[arg(short = 'n', long)]
    pub name: String,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(transparent)]
    ServiceDetails(#[from] ServiceDetailsError),
    #[error("error parsing arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for LoggingError {
    fn code(&self) -> String {
        match self {
            LoggingError::ServiceDetails(e) => e.code(),
            LoggingError::InvalidArgs(_) => "logging/invalid-args".to_string(),
            LoggingError::ApiError(_) => "logging/api-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            LoggingError::ServiceDetails(e) => e.exitcode(),
            LoggingError::InvalidArgs(_) => crate::errors::USAGE,
            LoggingError::ApiError(e) => e.exitcode(),
        }
    }
}

pub type LoggingResult = Result<LoggingMessage, LoggingError>;

#[derive(strum_macros::Display, Debug)]
pub enum LoggingMessage {
    #[strum(to_string = "Created {kind} logging endpoint {name} (service {service_id} version {version})")]
    Created {
        kind: &'static str,
        name: String,
        service_id: String,
        version: u32,
        data: Option<serde_json::Value>,
    },
    #[strum(to_string = "Updated {kind} logging endpoint {name} (service {service_id} version {version})")]
    Updated {
        kind: &'static str,
        name: String,
        service_id: String,
        version: u32,
        data: Option<serde_json::Value>,
    },
    #[strum(to_string = "Deleted {kind} logging endpoint {name} (service {service_id} version {version})")]
    Deleted {
        kind: &'static str,
        name: String,
        service_id: String,
        version: u32,
    },
    #[strum(to_string = "{text}")]
    Rendered {
        text: String,
        data: Option<serde_json::Value>,
    },
}

impl CmdOutput for LoggingMessage {
    fn code(&self) -> String {
        match self {
            LoggingMessage::Created { .. } => "logging/created",
            LoggingMessage::Updated { .. } => "logging/updated",
            LoggingMessage::Deleted { .. } => "logging/deleted",
            LoggingMessage::Rendered { .. } => "logging/rendered",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            LoggingMessage::Created { data, .. }
            | LoggingMessage::Updated { data, .. }
            | LoggingMessage::Rendered { data, .. } => data.clone(),
            LoggingMessage::Deleted {
                kind,
                name,
                service_id,
                version,
            } => Some(serde_json::json!({
                "kind": kind,
                "name": name,
                "service_id": service_id,
                "version": version,
                "deleted": true,
            })),
        }
    }
}

/// A logging endpoint as returned by the API.
pub trait Endpoint: Serialize {
    /// Display name of the provider, e.g. `S3`.
    const KIND: &'static str;

    fn service_id(&self) -> &str;
    fn service_version(&self) -> u32;
    fn name(&self) -> &str;

    /// Appends the provider specific fields.
    fn fields(&self, block: &mut Block, indent: usize);
}

pub fn created<T: Endpoint>(endpoint: &T) -> LoggingMessage {
    LoggingMessage::Created {
        kind: T::KIND,
        name: endpoint.name().to_string(),
        service_id: endpoint.service_id().to_string(),
        version: endpoint.service_version(),
        data: crate::output::to_json(endpoint),
    }
}

pub fn updated<T: Endpoint>(endpoint: &T) -> LoggingMessage {
    LoggingMessage::Updated {
        kind: T::KIND,
        name: endpoint.name().to_string(),
        service_id: endpoint.service_id().to_string(),
        version: endpoint.service_version(),
        data: crate::output::to_json(endpoint),
    }
}

pub fn deleted<T: Endpoint>(name: String, service_id: String, version: u32) -> LoggingMessage {
    LoggingMessage::Deleted {
        kind: T::KIND,
        name,
        service_id,
        version,
    }
}

pub fn describe<T: Endpoint>(endpoint: &T, verbose: bool) -> LoggingMessage {
    let mut block = Block::new();
    if !verbose {
        block.field(0, "Service ID", endpoint.service_id());
    }
    block
        .field(0, "Version", endpoint.service_version())
        .field(0, "Name", endpoint.name());
    endpoint.fields(&mut block, 0);

    LoggingMessage::Rendered {
        text: block.render(),
        data: crate::output::to_json(endpoint),
    }
}

pub fn list<T: Endpoint>(version: u32, endpoints: &[T], verbose: bool) -> LoggingMessage {
    let data = crate::output::to_json(&endpoints);
    if !verbose {
        let rows = endpoints
            .iter()
            .map(|e| row![e.service_id(), e.service_version(), e.name()])
            .collect();
        return LoggingMessage::Rendered {
            text: crate::output::table(row!["SERVICE", "VERSION", "NAME"], rows),
            data,
        };
    }

    let mut block = Block::new();
    block.field(0, "Version", version);
    for (i, endpoint) in endpoints.iter().enumerate() {
        block
            .line(1, format!("{} {}/{}", T::KIND, i + 1, endpoints.len()))
            .field(2, "Service ID", endpoint.service_id())
            .field(2, "Version", endpoint.service_version())
            .field(2, "Name", endpoint.name());
        endpoint.fields(&mut block, 2);
    }
    block.blank();

    LoggingMessage::Rendered {
        text: block.render(),
        data,
    }
}

/// Rejects `--compression-codec` combined with `--gzip-level`.
pub fn check_compression(
    compression_codec: &Option<String>,
    gzip_level: &Option<u8>,
) -> Result<(), LoggingError> {
    if compression_codec.is_some() && gzip_level.is_some() {
        return Err(LoggingError::InvalidArgs(
            "the --compression-codec flag is mutually exclusive with the --gzip-level flag"
                .to_string(),
        ));
    }
    Ok(())
}

pub fn optional<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
