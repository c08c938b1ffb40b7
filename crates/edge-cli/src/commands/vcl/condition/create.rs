use super::{parse_condition_type, ConditionError, ConditionMessage};
use crate::api::condition::{ConditionType, CreateConditionInput};
use crate::api::EdgeApi;
use crate::commands::service_details::{AutoCloneArgs, ServiceVersionArgs};
use crate::globals::Globals;
use clap::Parser;

/// Create a condition on a service version
#[derive(Parser, Debug)]
#[command(name = "create")]
pub struct CreateArgs {
    /// Name of the condition. Referenced by other configuration objects
    #[arg(short = 'n', long)]
    pub name: String,

    /// Condition statement, a VCL expression evaluated for each request
    #[arg(long)]
    pub statement: String,

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
    args: CreateArgs,
    api: &A,
    globals: &Globals,
) -> Result<ConditionMessage, ConditionError> {
    let (service_id, version) = args.target.editable(api, globals, &args.autoclone).await?;

    let input = CreateConditionInput {
        service_id,
        service_version: version.number,
        name: Some(args.name),
        statement: Some(args.statement),
        condition_type: args.condition_type,
        priority: args.priority,
        comment: args.comment,
    };
    let condition = api.create_condition(input).await?;
    Ok(ConditionMessage::created(&condition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::condition::Condition;
    use crate::api::MockEdgeApi;
    use crate::commands::service_details::VersionSpec;
    use crate::test_utils::{expect_versions, globals, target, version};

    #[tokio::test]
    async fn test_create_sends_given_fields() {
        let mut api = MockEdgeApi::new();
        expect_versions(&mut api, vec![version(3, false, false)]);
        api.expect_create_condition()
            .withf(|input| {
                serde_json::to_value(input).unwrap()
                    == serde_json::json!({
                        "name": "always_false",
                        "statement": "false",
                        "type": "REQUEST",
                        "priority": 10
                    })
            })
            .returning(|input| {
                Box::pin(std::future::ready(Ok(Condition {
                    service_id: input.service_id,
                    service_version: input.service_version,
                    name: input.name.unwrap_or_default(),
                    ..Default::default()
                })))
            });

        let args = CreateArgs {
            name: "always_false".into(),
            statement: "false".into(),
            condition_type: Some(ConditionType::Request),
            priority: Some(10),
            comment: None,
            target: target(VersionSpec::Latest),
            autoclone: AutoCloneArgs::default(),
        };
        let message = run(args, &api, &globals(false, false)).await.unwrap();
        assert_eq!(
            message.to_string(),
            "Created condition always_false (service 123 version 3)"
        );
    }
}
