//! Links between a service version and platform resources.

use crate::api::resource::{CreateResourceInput, Resource, UpdateResourceInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceDetailsError, ServiceVersionArgs};
use crate::globals::Globals;
use crate::output::{self, Block};
use crate::{run_cmd, CmdOutput};
use clap::{Args, Parser};
use common::{api::client::ApiError, CliError};
use prettytable::row;
use thiserror::Error;

/// Manipulate resource links on a service version
#[derive(Parser, Debug)]
#[command(name = "resource-link")]
pub struct ResourceLinkArgs {
    #[command(subcommand)]
    pub action: ResourceLinkCommand,
}

#[derive(Parser, Debug)]
#[command(name = "resource-link")]
pub enum ResourceLinkCommand {
    /// Link a resource to a service version
    Create(CreateArgs),
    /// Show detailed information about a resource link
    Describe(IdArgs),
    /// List resource links on a service version
    List(ListArgs),
    /// Rename a resource link
    Update(UpdateArgs),
    /// Remove a resource link from a service version
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// ID of the resource to link, such as a key-value store ID
    #[arg(short = 'r', long)]
    pub resource_id: String,

    /// Name for the link. Defaults to the name of the resource
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// ID of the resource link
    #[arg(long)]
    pub id: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub target: ServiceVersionArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// ID of the resource link
    #[arg(long)]
    pub id: String,

    /// New name for the link
    #[arg(short = 'n', long)]
    pub name: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// ID of the resource link
    #[arg(long)]
    pub id: String,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,
}

#[derive(Debug, Error)]
pub enum ResourceLinkError {
    #[error(transparent)]
    ServiceDetails(#[from] ServiceDetailsError),
    #[error(transparent)]
    ApiError(#[from] ApiError),
}

impl CmdOutput for ResourceLinkError {
    fn code(&self) -> String {
        match self {
            ResourceLinkError::ServiceDetails(e) => e.code(),
            ResourceLinkError::ApiError(_) => "resource-link/api-error".to_string(),
        }
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ResourceLinkError::ServiceDetails(e) => e.exitcode(),
            ResourceLinkError::ApiError(e) => e.exitcode(),
        }
    }
}

#[derive(strum_macros::Display, Debug)]
pub enum ResourceLinkMessage {
    #[strum(
        to_string = "Created service resource link {name} ({id}) on service {service_id} version {version}"
    )]
    Created {
        id: String,
        name: String,
        service_id: String,
        version: u32,
        data: Option<serde_json::Value>,
    },
    #[strum(to_string = "Updated service resource link {id} on service {service_id} version {version}")]
    Updated {
        id: String,
        service_id: String,
        version: u32,
        data: Option<serde_json::Value>,
    },
    #[strum(to_string = "Deleted service resource link {id} from service {service_id} version {version}")]
    Deleted {
        id: String,
        service_id: String,
        version: u32,
    },
    #[strum(to_string = "{text}")]
    Rendered {
        text: String,
        data: Option<serde_json::Value>,
    },
}

impl CmdOutput for ResourceLinkMessage {
    fn code(&self) -> String {
        match self {
            ResourceLinkMessage::Created { .. } => "resource-link/created",
            ResourceLinkMessage::Updated { .. } => "resource-link/updated",
            ResourceLinkMessage::Deleted { .. } => "resource-link/deleted",
            ResourceLinkMessage::Rendered { .. } => "resource-link/rendered",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        crate::errors::OK
    }

    fn data(&self) -> Option<serde_json::Value> {
        match self {
            ResourceLinkMessage::Created { data, .. }
            | ResourceLinkMessage::Updated { data, .. }
            | ResourceLinkMessage::Rendered { data, .. } => data.clone(),
            ResourceLinkMessage::Deleted {
                id,
                service_id,
                version,
            } => Some(serde_json::json!({
                "id": id,
                "service_id": service_id,
                "version": version,
                "deleted": true,
            })),
        }
    }
}

type ResourceLinkResult = Result<ResourceLinkMessage, ResourceLinkError>;

pub async fn run<A: EdgeApi + Sync>(
    args: ResourceLinkArgs,
    api: &A,
    globals: &Globals,
) -> crate::errors::ExitCode {
    let result = match args.action {
        ResourceLinkCommand::Create(args) => create(args, api, globals).await,
        ResourceLinkCommand::Describe(args) => describe(args, api, globals).await,
        ResourceLinkCommand::List(args) => list(args, api, globals).await,
        ResourceLinkCommand::Update(args) => update(args, api, globals).await,
        ResourceLinkCommand::Delete(args) => delete(args, api, globals).await,
    };
    run_cmd(result, globals.json())
}

fn fields(block: &mut Block, indent: usize, resource: &Resource) {
    block
        .field(indent, "ID", &resource.id)
        .field(indent, "Name", &resource.name)
        .field(indent, "Resource ID", &resource.resource_id)
        .field(indent, "Resource type", &resource.resource_type)
        .time(indent, "Created (UTC)", &resource.created_at)
        .time(indent, "Last edited (UTC)", &resource.updated_at)
        .time(indent, "Deleted (UTC)", &resource.deleted_at);
}

pub fn render_one(resource: &Resource, verbose: bool) -> String {
    let mut block = Block::new();
    if !verbose {
        block.field(0, "Service ID", &resource.service_id);
    }
    block.field(0, "Version", resource.service_version);
    fields(&mut block, 0, resource);
    block.render()
}

pub fn render_list(version: u32, resources: &[Resource], verbose: bool) -> String {
    if !verbose {
        let rows = resources
            .iter()
            .map(|r| row![r.service_id, r.service_version, r.id, r.name, r.resource_id])
            .collect();
        return output::table(
            row!["SERVICE", "VERSION", "ID", "NAME", "RESOURCE ID"],
            rows,
        );
    }

    let mut block = Block::new();
    block.field(0, "Version", version);
    for (i, resource) in resources.iter().enumerate() {
        block.line(1, format!("Resource link {}/{}", i + 1, resources.len()));
        fields(&mut block, 2, resource);
    }
    block.blank();
    block.render()
}

async fn create<A: EdgeApi + Sync>(
    args: CreateArgs,
    api: &A,
    globals: &Globals,
) -> ResourceLinkResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    let input = CreateResourceInput {
        service_id,
        service_version: version.number,
        resource_id: args.resource_id,
        name: args.name,
    };
    let resource = api.create_resource(input).await?;

    Ok(ResourceLinkMessage::Created {
        data: output::to_json(&resource),
        id: resource.id,
        name: resource.name,
        service_id: resource.service_id,
        version: resource.service_version,
    })
}

async fn describe<A: EdgeApi + Sync>(
    args: IdArgs,
    api: &A,
    globals: &Globals,
) -> ResourceLinkResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let resource = api
        .get_resource(&service_id, version.number, &args.id)
        .await?;

    Ok(ResourceLinkMessage::Rendered {
        text: render_one(&resource, globals.verbose()),
        data: output::to_json(&resource),
    })
}

async fn list<A: EdgeApi + Sync>(
    args: ListArgs,
    api: &A,
    globals: &Globals,
) -> ResourceLinkResult {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let resources = api.list_resources(&service_id, version.number).await?;

    Ok(ResourceLinkMessage::Rendered {
        text: render_list(version.number, &resources, globals.verbose()),
        data: output::to_json(&resources),
    })
}

async fn update<A: EdgeApi + Sync>(
    args: UpdateArgs,
    api: &A,
    globals: &Globals,
) -> ResourceLinkResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    let input = UpdateResourceInput {
        service_id,
        service_version: version.number,
        id: args.id,
        name: args.name,
    };
    let resource = api.update_resource(input).await?;

    Ok(ResourceLinkMessage::Updated {
        data: output::to_json(&resource),
        id: resource.id,
        service_id: resource.service_id,
        version: resource.service_version,
    })
}

async fn delete<A: EdgeApi + Sync>(
    args: DeleteArgs,
    api: &A,
    globals: &Globals,
) -> ResourceLinkResult {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;
    api.delete_resource(&service_id, version.number, &args.id)
        .await?;

    Ok(ResourceLinkMessage::Deleted {
        id: args.id,
        service_id,
        version: version.number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockEdgeApi;
    use crate::commands::service_details::VersionSpec;
    use crate::test_utils::{api_error, expect_versions, globals, target, version};
    use common::api::client::ApiErrorKind;

    fn resource(version: u32) -> Resource {
        Resource {
            id: "link-1".into(),
            resource_id: "store-9".into(),
            name: "config".into(),
            service_id: "123".into(),
            service_version: version,
            resource_type: "kv-store".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_message() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(2, false, false)]);
        api.expect_update_resource()
            .withf(|input| {
                input.id == "link-1"
                    && serde_json::to_value(input).unwrap() == serde_json::json!({ "name": "renamed" })
            })
            .returning(|input| {
                Box::pin(std::future::ready(Ok(Resource {
                    name: input.name,
                    ..resource(input.service_version)
                })))
            });

        let args = UpdateArgs {
            id: "link-1".into(),
            name: "renamed".into(),
            target: target(VersionSpec::Number(2)),
            autoclone: AutoCloneArgs::default(),
        };
        let message = update(args, &api, &globals(false, false)).await.unwrap();
        assert_eq!(
            message.to_string(),
            "Updated service resource link link-1 on service 123 version 2"
        );
        assert_eq!(message.data().unwrap()["name"], "renamed");
    }

    #[tokio::test]
    async fn test_create_omits_missing_name() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(1, false, false)]);
        api.expect_create_resource()
            .withf(|input| {
                serde_json::to_value(input).unwrap()
                    == serde_json::json!({ "resource_id": "store-9" })
            })
            .returning(|input| Box::pin(std::future::ready(Ok(resource(input.service_version)))));

        let args = CreateArgs {
            resource_id: "store-9".into(),
            name: None,
            target: target(VersionSpec::Latest),
            autoclone: AutoCloneArgs::default(),
        };
        let message = create(args, &api, &globals(false, false)).await.unwrap();
        assert_eq!(
            message.to_string(),
            "Created service resource link config (link-1) on service 123 version 1"
        );
    }

    #[tokio::test]
    async fn test_describe_not_found() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(1, true, true)]);
        api.expect_get_resource().returning(|_, _, _| {
            Box::pin(std::future::ready(Err(api_error(ApiErrorKind::NotFound))))
        });

        let args = IdArgs {
            id: "missing".into(),
            target: target(VersionSpec::Active),
        };
        let err = describe(args, &api, &globals(false, false)).await.unwrap_err();
        assert_eq!(err.code(), "resource-link/api-error");
    }

    #[test]
    fn test_render() {
        assert_eq!(
            render_one(&resource(3), false),
            "Service ID: 123\nVersion: 3\nID: link-1\nName: config\nResource ID: store-9\nResource type: kv-store"
        );
        let verbose = render_list(3, &[resource(3)], true);
        assert!(verbose.starts_with("Version: 3\n\tResource link 1/1\n\t\tID: link-1\n"));

        let table = render_list(3, &[resource(3)], false);
        let lines: Vec<Vec<&str>> = table.lines().map(|l| l.split_whitespace().collect()).collect();
        assert_eq!(lines[1], ["123", "3", "link-1", "config", "store-9"]);
    }
}
