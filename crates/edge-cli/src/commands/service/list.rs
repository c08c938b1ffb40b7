use super::{ServiceError, ServiceMessage};
use crate::api::service::Service;
use crate::api::EdgeApi;
use crate::globals::Globals;
use crate::output::{self, Block};
use clap::Parser;
use prettytable::row;

/// List services
#[derive(Parser, Debug)]
#[command(name = "list")]
pub struct ListArgs {}

fn active_version(service: &Service) -> String {
    service
        .active_version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string())
}

pub fn render(services: &[Service], verbose: bool) -> String {
    if !verbose {
        let rows = services
            .iter()
            .map(|s| {
                row![
                    s.name,
                    s.id,
                    s.service_type,
                    active_version(s),
                    output::optional_time(&s.updated_at)
                ]
            })
            .collect();
        return output::table(
            row!["NAME", "ID", "TYPE", "ACTIVE VERSION", "LAST EDITED (UTC)"],
            rows,
        );
    }

    let mut block = Block::new();
    for (i, service) in services.iter().enumerate() {
        block
            .line(0, format!("Service {}/{}", i + 1, services.len()))
            .field(1, "ID", &service.id)
            .field(1, "Name", &service.name)
            .field(1, "Type", &service.service_type);
        if !service.comment.is_empty() {
            block.field(1, "Comment", &service.comment);
        }
        block
            .field(1, "Customer ID", &service.customer_id)
            .time(1, "Created (UTC)", &service.created_at)
            .time(1, "Last edited (UTC)", &service.updated_at)
            .time(1, "Deleted (UTC)", &service.deleted_at)
            .field(1, "Active version", active_version(service));
    }
    block.render()
}

pub async fn run<A: EdgeApi + Sync>(
    _: ListArgs,
    api: &A,
    globals: &Globals,
) -> Result<ServiceMessage, ServiceError> {
    let services = api.list_services().await?;
    log::debug!("Found {} services", services.len());

    Ok(ServiceMessage::Rendered {
        text: render(&services, globals.verbose()),
        data: output::to_json(&services),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockEdgeApi;
    use crate::test_utils::globals;
    use crate::CmdOutput;
    use chrono::{TimeZone, Utc};

    fn services() -> Vec<Service> {
        vec![
            Service {
                id: "123".into(),
                name: "Foo".into(),
                service_type: "vcl".into(),
                active_version: Some(2),
                updated_at: Utc.with_ymd_and_hms(2021, 6, 15, 23, 0, 0).single(),
                ..Default::default()
            },
            Service {
                id: "456".into(),
                name: "Bar".into(),
                service_type: "wasm".into(),
                comment: "compute".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_table() {
        let text = render(&services(), false);
        let lines: Vec<Vec<&str>> = text
            .lines()
            .map(|l| l.split_whitespace().collect())
            .collect();
        assert_eq!(
            lines[0],
            ["NAME", "ID", "TYPE", "ACTIVE", "VERSION", "LAST", "EDITED", "(UTC)"]
        );
        assert_eq!(lines[1], ["Foo", "123", "vcl", "2", "2021-06-15", "23:00"]);
        assert_eq!(lines[2], ["Bar", "456", "wasm", "none"]);
    }

    #[test]
    fn test_verbose() {
        let text = render(&services(), true);
        assert!(text.starts_with("Service 1/2\n\tID: 123\n\tName: Foo\n\tType: vcl\n\tCustomer ID: \n"));
        assert!(text.contains("\tLast edited (UTC): 2021-06-15 23:00\n\tActive version: 2\n"));
        assert!(text.contains("Service 2/2\n\tID: 456\n\tName: Bar\n\tType: wasm\n\tComment: compute\n"));
    }

    #[tokio::test]
    async fn test_json_lists_services() {
        let mut api = MockEdgeApi::new();
        api.expect_list_services()
            .returning(|| Box::pin(std::future::ready(Ok(services()))));

        let message = run(ListArgs {}, &api, &globals(false, true)).await.unwrap();
        let data = message.data().unwrap();
        assert_eq!(data[0]["id"], "123");
        assert_eq!(data[1]["type"], "wasm");
    }
}
