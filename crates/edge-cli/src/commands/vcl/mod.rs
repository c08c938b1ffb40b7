use crate::api::EdgeApi;
use crate::globals::Globals;
use clap::Parser;

pub mod condition;

/// Manipulate the VCL configuration of a service version
#[derive(Parser, Debug)]
#[command(name = "vcl")]
pub struct VclArgs {
    #[command(subcommand)]
    pub action: VclCommand,
}

#[derive(Parser, Debug)]
#[command(name = "vcl")]
pub enum VclCommand {
    Condition(condition::ConditionArgs),
}

pub async fn run<A: EdgeApi + Sync>(
    args: VclArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    match args.action {
        VclCommand::Condition(args) => condition::run(args, api, globals).await,
    }
}
