use super::{condition_type, ConditionError, ConditionMessage};
use crate::api::condition::Condition;
use crate::api::EdgeApi;
use crate::commands::service_details::ServiceVersionArgs;
use crate::globals::Globals;
use crate::output::{self, Block};
use clap::Parser;
use prettytable::row;

/// List conditions on a service version
#[derive(Parser, Debug)]
#[command(name = "list")]
pub struct ListArgs {
    #[command(flatten)]
    pub target: ServiceVersionArgs,
}

pub fn render(version: u32, conditions: &[Condition], verbose: bool) -> String {
    if !verbose {
        let rows = conditions
            .iter()
            .map(|c| {
                row![
                    c.service_id,
                    c.service_version,
                    c.name,
                    c.statement,
                    condition_type(c),
                    c.priority
                ]
            })
            .collect();
        return output::table(
            row!["SERVICE", "VERSION", "NAME", "STATEMENT", "TYPE", "PRIORITY"],
            rows,
        );
    }

    let mut block = Block::new();
    block.field(0, "Version", version);
    for (i, condition) in conditions.iter().enumerate() {
        block
            .line(1, format!("Condition {}/{}", i + 1, conditions.len()))
            .field(2, "Name", &condition.name)
            .field(2, "Statement", &condition.statement)
            .field(2, "Type", condition_type(condition))
            .field(2, "Priority", condition.priority);
    }
    block.blank();
    block.render()
}

pub async fn run<A: EdgeApi + Sync>(
    args: ListArgs,
    api: &A,
    globals: &Globals,
) -> Result<ConditionMessage, ConditionError> {
    let (service_id, version) = args.target.readable(api, globals).await?;
    let conditions = api.list_conditions(&service_id, version.number).await?;

    Ok(ConditionMessage::Rendered {
        text: render(version.number, &conditions, globals.verbose()),
        data: output::to_json(&conditions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::condition::ConditionType;
    use crate::api::MockEdgeApi;
    use crate::commands::service_details::VersionSpec;
    use crate::test_utils::{expect_versions, globals, target, version};

    fn conditions() -> Vec<Condition> {
        vec![
            Condition {
                service_id: "123".into(),
                service_version: 1,
                name: "always_false".into(),
                statement: "false".into(),
                condition_type: Some(ConditionType::Request),
                priority: 10,
                ..Default::default()
            },
            Condition {
                service_id: "123".into(),
                service_version: 1,
                name: "is_api".into(),
                statement: "req.url ~ \"^/api\"".into(),
                condition_type: Some(ConditionType::Cache),
                priority: 5,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_verbose() {
        let text = render(1, &conditions(), true);
        assert_eq!(
            text,
            "Version: 1\n\tCondition 1/2\n\t\tName: always_false\n\t\tStatement: false\n\t\tType: REQUEST\n\t\tPriority: 10\n\tCondition 2/2\n\t\tName: is_api\n\t\tStatement: req.url ~ \"^/api\"\n\t\tType: CACHE\n\t\tPriority: 5\n"
        );
    }

    #[tokio::test]
    async fn test_table_on_active_version() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(1, true, true), version(2, false, false)]);
        api.expect_list_conditions()
            .withf(|_, number| *number == 1)
            .returning(|_, _| Box::pin(std::future::ready(Ok(conditions()))));

        let args = ListArgs {
            target: target(VersionSpec::Active),
        };
        let text = run(args, &api, &globals(false, false))
            .await
            .unwrap()
            .to_string();
        let lines: Vec<Vec<&str>> = text
            .lines()
            .map(|l| l.split_whitespace().collect())
            .collect();
        assert_eq!(
            lines[0],
            ["SERVICE", "VERSION", "NAME", "STATEMENT", "TYPE", "PRIORITY"]
        );
        assert_eq!(lines[1], ["123", "1", "always_false", "false", "REQUEST", "10"]);
        assert_eq!(lines.len(), 3);
    }
}
