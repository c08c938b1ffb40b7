use crate::api::tls::{ActivationInclude, GetTlsActivationInput, ListTlsActivationsInput, TlsActivation};
use crate::api::EdgeApi;
use crate::globals::Globals;
use crate::output::{self, Block};
use crate::{run_cmd, CmdOutput};
use clap::{Args, Parser};
use common::{api::client::ApiError, CliError};
use prettytable::row;
use thiserror::Error;

/// Inspect TLS activations, which enable a certificate for a domain
#[derive(Parser, Debug)]
#[command(name = "activation")]
pub struct ActivationArgs {
    #[command(subcommand)]
    pub action: ActivationCommand,
}

#[derive(Parser, Debug)]
#[command(name = "activation")]
pub enum ActivationCommand {
    /// Show a TLS activation
    Describe(DescribeArgs),
    /// List TLS activations
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Alphanumeric string identifying a TLS activation
    #[arg(long)]
    pub id: String,

    /// Include a related object in the response
    #[arg(long, value_enum)]
    pub include: Option<ActivationInclude>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Limit the returned activations to those using this certificate ID
    #[arg(long)]
    pub filter_cert: Option<String>,

    /// Limit the returned activations to this domain
    #[arg(long)]
    pub filter_domain: Option<String>,

    /// Include a related object in the response
    #[arg(long, value_enum)]
    pub include: Option<ActivationInclude>,

    /// Page number of the results
    #[arg(long)]
    pub page: Option<u32>,

    /// Number of records per page
    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for ActivationError {
    fn code(&self) -> String {
        "tls-activation/api-error".to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ActivationError::ApiError(e) => e.exitcode(),
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum ActivationMessage {
    #[strum(to_string = "{text}")]
    Rendered {
        text: String,
        data: Option<serde_json::Value>,
    },
}

impl CmdOutput for ActivationMessage {
    fn code(&self) -> String {
        "tls-activation/rendered".to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            ActivationMessage::Rendered { data, .. } => data.clone(),
        }
    }
}

pub async fn run<A: EdgeApi + Sync>(
    args: ActivationArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    let result = match args.action {
        ActivationCommand::Describe(args) => describe(args, api).await,
        ActivationCommand::List(args) => list(args, api, globals).await,
    };
    run_cmd(result, globals.json())
}

fn render_one(activation: &TlsActivation) -> String {
    let mut block = Block::new();
    block
        .field(0, "ID", &activation.id)
        .time(0, "Created at", &activation.created_at);
    block.render()
}

fn render_list(activations: &[TlsActivation], verbose: bool) -> String {
    if !verbose {
        let rows = activations
            .iter()
            .map(|a| row![a.id, output::optional_time(&a.created_at)])
            .collect();
        return output::table(row!["ID", "CREATED AT"], rows);
    }

    let mut block = Block::new();
    for (i, activation) in activations.iter().enumerate() {
        block
            .line(0, format!("Activation {}/{}", i + 1, activations.len()))
            .field(1, "ID", &activation.id)
            .time(1, "Created at", &activation.created_at);
        if let Some(cert) = &activation.tls_certificate {
            block.field(1, "Certificate ID", &cert.id);
        }
        if let Some(config) = &activation.tls_configuration {
            block.field(1, "Configuration ID", &config.id);
        }
        if let Some(domain) = &activation.tls_domain {
            block.field(1, "Domain ID", &domain.id);
        }
        block.blank();
    }
    block.render()
}

async fn describe<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
) -> Result<ActivationMessage, ActivationError> {
    let input = GetTlsActivationInput {
        id: args.id,
        include: args.include,
    };
    let activation = api.get_tls_activation(input).await?;

    Ok(ActivationMessage::Rendered {
        text: render_one(&activation),
        data: output::to_json(&activation),
    })
}

async fn list<A: EdgeApi + Sync>(
    args: ListArgs,
    api: &A,
    globals: &Globals,
) -> Result<ActivationMessage, ActivationError> {
    let input = ListTlsActivationsInput {
        filter_tls_certificate_id: args.filter_cert,
        filter_tls_domain_id: args.filter_domain,
        include: args.include,
        page_number: args.page,
        page_size: args.per_page,
    };
    let activations = api.list_tls_activations(input).await?;

    Ok(ActivationMessage::Rendered {
        text: render_list(&activations, globals.verbose()),
        data: output::to_json(&activations),
    })
}
