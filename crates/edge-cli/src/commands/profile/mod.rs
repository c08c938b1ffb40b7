use crate::globals::Globals;
use crate::run_cmd;
use clap::Parser;

pub mod create;
pub mod delete;
pub mod list;
pub mod switch;
pub mod update;

/// Manage the authentication profiles stored in your local configuration
#[derive(Parser, Debug)]
#[command(name = "profile")]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileCommand,
}

#[derive(Parser, Debug)]
#[command(name = "profile")]
pub enum ProfileCommand {
    Create(create::CreateArgs),
    Update(update::UpdateArgs),
    List(list::ListArgs),
    Switch(switch::SwitchArgs),
    Delete(delete::DeleteArgs),
}

pub async fn run(args: ProfileArgs, globals: &Globals) -> crate::errors::ExitCode {
    let json = globals.json();
    match args.action {
        ProfileCommand::Create(create_args) => run_cmd(create::run(create_args, globals).await, json),
        ProfileCommand::Update(update_args) => run_cmd(update::run(update_args, globals).await, json),
        ProfileCommand::List(list_args) => run_cmd(list::run(list_args, globals), json),
        ProfileCommand::Switch(switch_args) => run_cmd(switch::run(switch_args, globals), json),
        ProfileCommand::Delete(delete_args) => run_cmd(delete::run(delete_args, globals), json),
    }
}
