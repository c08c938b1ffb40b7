use super::{ConditionError, ConditionMessage};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use clap::Parser;

/// Delete a condition on a service version
#[derive(Parser, Debug)]
#[command(name = "delete")]
pub struct DeleteArgs {
    /// Name of the condition to delete
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,
}

pub async fn run<A: EdgeApi + Sync>(
    args: DeleteArgs,
    api: &A,
    globals: &Globals,
) -> Result<ConditionMessage, ConditionError> {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_condition(&service_id, version.number, &args.name)
        .await?;

    Ok(ConditionMessage::Deleted {
        name: args.name,
        service_id,
        version: version.number,
    })
}
