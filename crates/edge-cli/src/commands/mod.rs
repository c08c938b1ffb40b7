use crate::globals::Globals;
use crate::{report_error, run_cmd};
use clap::{Parser, Subcommand};

use self::{
    logging::LoggingArgs, pops::PopsArgs, profile::ProfileArgs, resource_link::ResourceLinkArgs,
    service::ServiceCmdArgs, sso::SsoArgs, tls::TlsCustomArgs, vcl::VclArgs,
};

pub mod interact;
pub mod logging;
pub mod pops;
pub mod profile;
pub mod resource_link;
pub mod service;
pub mod service_details;
pub mod sso;
pub mod tls;
pub mod vcl;

#[derive(Parser, Debug)]
pub enum Command {
    /// Authenticate the CLI through your browser and store a session token
    Sso(SsoArgs),
    /// Manage the credential profiles stored in the local configuration
    Profile(ProfileArgs),
    #[command(flatten)]
    Api(ApiCommand),
}

/// Commands that call the management API and so need a token.
#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    Service(ServiceCmdArgs),
    Logging(LoggingArgs),
    Vcl(VclArgs),
    #[command(name = "resource-link")]
    ResourceLink(ResourceLinkArgs),
    #[command(name = "tls-custom")]
    TlsCustom(TlsCustomArgs),
    Pops(PopsArgs),
}

pub async fn run_command(command: Command, globals: Globals) -> crate::errors::ExitCode {
    let json = globals.json();
    let command = match command {
        Command::Sso(args) => return run_cmd(sso::run(args, &globals).await, json),
        Command::Profile(args) => return profile::run(args, &globals).await,
        Command::Api(command) => command,
    };

    let api = match crate::auth::api_client(&globals) {
        Ok(api) => api,
        Err(e) => return report_error(e, json),
    };

    match command {
        ApiCommand::Service(args) => service::run(args, &api, &globals).await,
        ApiCommand::Logging(args) => logging::run(args, &api, &globals).await,
        ApiCommand::Vcl(args) => vcl::run(args, &api, &globals).await,
        ApiCommand::ResourceLink(args) => resource_link::run(args, &api, &globals).await,
        ApiCommand::TlsCustom(args) => tls::run(args, &api, &globals).await,
        ApiCommand::Pops(args) => run_cmd(pops::run(args, &api, globals.verbose()).await, json),
    }
}
