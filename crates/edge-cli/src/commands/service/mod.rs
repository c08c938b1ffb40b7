use crate::api::EdgeApi;
use crate::commands::service_details::ServiceDetailsError;
use crate::globals::Globals;
use crate::{run_cmd, CmdOutput};
use clap::Parser;
use common::{api::client::ApiError, CliError};
use thiserror::Error;

pub mod describe;
pub mod list;

/// Inspect the services on your account
#[derive(Parser, Debug)]
#[command(name = "service")]
pub struct ServiceCmdArgs {
    #[command(subcommand)]
    pub action: ServiceCommand,
}

#[derive(Parser, Debug)]
#[command(name = "service")]
pub enum ServiceCommand {
    /// Show detailed information about a service
    #[command(alias = "get")]
    Describe(describe::DescribeArgs),
    /// List services
    List(list::ListArgs),
}

pub async fn run<A: EdgeApi + Sync>(
    args: ServiceCmdArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    let json = globals.json();
    match args.action {
        ServiceCommand::Describe(args) => run_cmd(describe::run(args, api, globals).await, json),
        ServiceCommand::List(args) => run_cmd(list::run(args, api, globals).await, json),
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    ServiceDetails(#[from] ServiceDetailsError),
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for ServiceError {
    fn code(&self) -> String {
        match self {
            ServiceError::ServiceDetails(e) => e.code(),
            ServiceError::ApiError(_) => "service/api-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ServiceError::ServiceDetails(e) => e.exitcode(),
            ServiceError::ApiError(e) => e.exitcode(),
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum ServiceMessage {
    #[strum(to_string = "{text}")]
    Rendered {
        text: String,
        data: Option<serde_json::Value>,
    },
}

impl CmdOutput for ServiceMessage {
    fn code(&self) -> String {
        "service/rendered".to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            ServiceMessage::Rendered { data, .. } => data.clone(),
        }
    }
}
