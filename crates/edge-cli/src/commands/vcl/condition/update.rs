use super::{parse_condition_type, ConditionError, ConditionMessage};
use crate::api::condition::{ConditionType, UpdateConditionInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use clap::Parser;

/// Update a condition on a service version
#[derive(Parser, Debug)]
#[command(name = "update")]
pub struct UpdateArgs {
    /// Name of the condition to update
    #[arg(short = 'n', long)]
    pub name: String,

    /// New name of the condition
    #[arg(long)]
    pub new_name: Option<String>,

    /// Condition statement, a VCL expression evaluated for each request
    #[arg(long)]
    pub statement: Option<String>,

    /// Type of the condition, one of REQUEST, RESPONSE, CACHE or PREFETCH
    #[arg(long = "type", value_parser = parse_condition_type)]
    pub condition_type: Option<ConditionType>,

    /// Priority determines the order in which conditions are evaluated, lower numbers first
    #[arg(long)]
    pub priority: Option<i64>,

    /// A freeform descriptive note
    #[arg(long)]
    pub comment: Option<String>,

    #[command(flatten)]
    pub target: ServiceVersionArgs,

    #[command(flatten)]
    pub autoclone: AutoCloneArgs,
}

pub async fn run<A: EdgeApi + Sync>(
    args: UpdateArgs,
    api: &A,
    globals: &Globals,
) -> Result<ConditionMessage, ConditionError> {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = UpdateConditionInput {
        service_id,
        service_version: version.number,
        name: args.name,
        new_name: args.new_name,
        statement: args.statement,
        condition_type: args.condition_type,
        priority: args.priority,
        comment: args.comment,
    };
    let condition = api.update_condition(input).await?;
    Ok(ConditionMessage::updated(&condition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::condition::Condition;
    use crate::api::MockEdgeApi;
    use crate::commands::service_details::VersionSpec;
    use crate::test_utils::{expect_versions, globals, target, version};
    use crate::CmdOutput;

    #[tokio::test]
    async fn test_update_with_autoclone() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(1, true, true)]);
        api.expect_clone_version()
            .returning(|_, _| Box::pin(std::future::ready(Ok(version(2, false, false)))));
        api.expect_update_condition()
            .withf(|input| {
                input.name == "old"
                    && input.service_version == 2
                    && serde_json::to_value(input).unwrap()
                        == serde_json::json!({ "name": "new", "priority": 5 })
            })
            .returning(|input| {
                Box::pin(std::future::ready(Ok(Condition {
                    service_id: input.service_id,
                    service_version: input.service_version,
                    name: input.new_name.unwrap_or(input.name),
                    priority: input.priority.unwrap_or_default(),
                    ..Default::default()
                })))
            });

        let args = UpdateArgs {
            name: "old".into(),
            new_name: Some("new".into()),
            statement: None,
            condition_type: None,
            priority: Some(5),
            comment: None,
            target: target(VersionSpec::Active),
            autoclone: AutoCloneArgs { autoclone: true },
        };
        let message = run(args, &api, &globals(false, true)).await.unwrap();
        assert_eq!(
            message.to_string(),
            "Updated condition new (service 123 version 2)"
        );
        assert_eq!(message.data().unwrap()["priority"], 5);
    }
}
