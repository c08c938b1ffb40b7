use super::{condition_type, ConditionError, ConditionMessage};
use crate::api::condition::Condition;
use crate::api::EdgeApi;
use crate::commands::service_details::ServiceVersionArgs;
use crate::globals::Globals;
use crate::output::{self, Block};
use clap::Parser;

/// Show detailed information about a condition on a service version
#[derive(Parser, Debug)]
#[command(name = "describe")]
pub struct DescribeArgs {
    /// Name of the condition
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,
}

pub fn render(condition: &Condition, verbose: bool) -> String {
    let mut block = Block::new();
    if !verbose {
        block.field(0, "Service ID", &condition.service_id);
    }
    block
        .field(0, "Version", condition.service_version)
        .field(0, "Name", &condition.name)
        .field(0, "Statement", &condition.statement)
        .field(0, "Type", condition_type(condition))
        .field(0, "Priority", condition.priority);
    block.render()
}

pub async fn run<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> Result<ConditionMessage, ConditionError> {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let condition = api
        .get_condition(&service_id, version.number, &args.name)
        .await?;

    Ok(ConditionMessage::Rendered {
        text: render(&condition, globals.verbose()),
        data: output::to_json(&condition),
    })
}
