use crate::api::condition::{Condition, ConditionType};
use crate::api::EdgeApi;
use crate::commands::service_details::ServiceDetailsError;
use crate::globals::Globals;
use crate::{run_cmd, CmdOutput};
use clap::Parser;
use common::{api::client::ApiError, CliError};
use thiserror::Error;

pub mod create;
pub mod delete;
pub mod describe;
pub mod list;
pub mod update;

/// Manipulate conditions on a service version
#[derive(Parser, Debug)]
#[command(name = "condition")]
pub struct ConditionArgs {
    #[command(subcommand)]
    pub action: ConditionCommand,
}

#[derive(Parser, Debug)]
#[command(name = "condition")]
pub enum ConditionCommand {
    /// Create a condition on a service version
    Create(create::CreateArgs),
    /// Show detailed information about a condition on a service version
    Describe(describe::DescribeArgs),
    /// List conditions on a service version
    List(list::ListArgs),
    /// Update a condition on a service version
    Update(update::UpdateArgs),
    /// Delete a condition on a service version
    Delete(delete::DeleteArgs),
}

pub async fn run<A: EdgeApi + Sync>(
    args: ConditionArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    let result = match args.action {
        ConditionCommand::Create(args) => create::run(args, api, globals).await,
        ConditionCommand::Describe(args) => describe::run(args, api, globals).await,
        ConditionCommand::List(args) => list::run(args, api, globals).await,
        ConditionCommand::Update(args) => update::run(args, api, globals).await,
        ConditionCommand::Delete(args) => delete::run(args, api, globals).await,
    };
    run_cmd(result, globals.json())
}

pub fn parse_condition_type(value: &str) -> Result<ConditionType, String> {
    value.parse().map_err(|_| {
        format!("unknown condition type '{value}', expected one of REQUEST, RESPONSE, CACHE, PREFETCH")
    })
}

pub fn condition_type(condition: &Condition) -> String {
    condition
        .condition_type
        .map(|t| t.to_string())
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ConditionError {
    #[error(transparent)]
    ServiceDetails(#[from] ServiceDetailsError),
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for ConditionError {
    fn code(&self) -> String {
        match self {
            ConditionError::ServiceDetails(e) => e.code(),
            ConditionError::ApiError(_) => "condition/api-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ConditionError::ServiceDetails(e) => e.exitcode(),
            ConditionError::ApiError(e) => e.exitcode(),
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum ConditionMessage {
    #[strum(to_string = "Created condition {name} (service {service_id} version {version})")]
    Created {
        name: String,
        service_id: String,
        version: u32,
        data: Option<serde_json::Value>,
    },
    #[strum(to_string = "Updated condition {name} (service {service_id} version {version})")]
    Updated {
        name: String,
        service_id: String,
        version: u32,
        data: Option<serde_json::Value>,
    },
    #[strum(to_string = "Deleted condition {name} (service {service_id} version {version})")]
    Deleted {
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

impl ConditionMessage {
    pub fn created(condition: &Condition) -> Self {
        ConditionMessage::Created {
            name: condition.name.clone(),
            service_id: condition.service_id.clone(),
            version: condition.service_version,
            data: crate::output::to_json(condition),
        }
    }

    pub fn updated(condition: &Condition) -> Self {
        ConditionMessage::Updated {
            name: condition.name.clone(),
            service_id: condition.service_id.clone(),
            version: condition.service_version,
            data: crate::output::to_json(condition),
        }
    }
}

impl CmdOutput for ConditionMessage {
    fn code(&self) -> String {
        match self {
            ConditionMessage::Created { .. } => "condition/created",
            ConditionMessage::Updated { .. } => "condition/updated",
            ConditionMessage::Deleted { .. } => "condition/deleted",
            ConditionMessage::Rendered { .. } => "condition/rendered",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            ConditionMessage::Created { data, .. }
            | ConditionMessage::Updated { data, .. }
            | ConditionMessage::Rendered { data, .. } => data.clone(),
            ConditionMessage::Deleted {
                name,
                service_id,
                version,
            } => Some(serde_json::json!({
                "name": name,
                "service_id": service_id,
                "version": version,
                "deleted": true,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_type_flag() {
        assert_eq!(parse_condition_type("request"), Ok(ConditionType::Request));
        assert_eq!(parse_condition_type("PREFETCH"), Ok(ConditionType::Prefetch));
        assert!(parse_condition_type("deliver")
            .unwrap_err()
            .starts_with("unknown condition type 'deliver'"));
    }
}
