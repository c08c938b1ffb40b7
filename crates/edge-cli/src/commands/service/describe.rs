use super::{ServiceError, ServiceMessage};
use crate::api::service::ServiceDetail;
use crate::api::EdgeApi;
use crate::commands::service_details::{resolve_service_id, ServiceArgs};
use crate::globals::Globals;
use crate::output::{self, Block};
use clap::Parser;

/// Show detailed information about a service
#[derive(Parser, Debug)]
#[command(name = "describe")]
pub struct DescribeArgs {
    #[command(flatten)]
    pub service: ServiceArgs,
}

pub fn render(detail: &ServiceDetail) -> String {
    let mut block = Block::new();
    block
        .field(0, "ID", &detail.id)
        .field(0, "Name", &detail.name)
        .field(0, "Type", &detail.service_type);
    if !detail.comment.is_empty() {
        block.field(0, "Comment", &detail.comment);
    }
    block
        .field(0, "Customer ID", &detail.customer_id)
        .time(0, "Created (UTC)", &detail.created_at)
        .time(0, "Last edited (UTC)", &detail.updated_at)
        .time(0, "Deleted (UTC)", &detail.deleted_at);

    match detail.active_version.as_ref().filter(|v| v.active) {
        Some(active) => {
            block.line(0, "Active version:").version(1, active);
        }
        None => {
            block.field(0, "Active version", "none");
        }
    }

    let total = detail.versions.len();
    block.field(0, "Versions", total);
    for (i, version) in detail.versions.iter().enumerate() {
        block
            .line(1, format!("Version {}/{}", i + 1, total))
            .version(2, version);
    }
    block.render()
}

pub async fn run<A: EdgeApi + Sync>(
    args: DescribeArgs,
    api: &A,
    globals: &Globals,
) -> Result<ServiceMessage, ServiceError> {
    let service_id =
        resolve_service_id(api, &args.service, &globals.manifest, &globals.env).await?;
    let detail = api.get_service_details(&service_id).await?;

    Ok(ServiceMessage::Rendered {
        text: render(&detail),
        data: output::to_json(&detail),
    })
}
