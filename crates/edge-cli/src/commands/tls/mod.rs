use crate::api::EdgeApi;
use crate::globals::Globals;
use clap::Parser;

pub mod activation;

/// Manage custom TLS certificates and their activations
#[derive(Parser, Debug)]
#[command(name = "tls-custom")]
pub struct TlsCustomArgs {
    #[command(subcommand)]
    pub action: TlsCustomCommand,
}

#[derive(Parser, Debug)]
#[command(name = "tls-custom")]
pub enum TlsCustomCommand {
    Activation(activation::ActivationArgs),
}

pub async fn run<A: EdgeApi + Sync>(
    args: TlsCustomArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    match args.action {
        TlsCustomCommand::Activation(args) => activation::run(args, api, globals).await,
    }
}
