use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ConditionType {
    Request,
    Response,
    Cache,
    Prefetch,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Condition {
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub name: String,
    pub statement: String,
    #[serde(rename = "type")]
    pub condition_type: Option<ConditionType>,
    /// The API has historically returned this as both a number and a string.
    #[serde(deserialize_with = "priority_from_any")]
    pub priority: i64,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn priority_from_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Priority {
        Number(i64),
        Text(String),
        Missing(Option<()>),
    }

    match Priority::deserialize(deserializer)? {
        Priority::Number(n) => Ok(n),
        Priority::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Priority::Missing(_) => Ok(0),
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateConditionInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<ConditionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateConditionInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<ConditionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_priority_accepts_string_or_number() {
        let from_text: Condition =
            serde_json::from_value(serde_json::json!({ "name": "a", "priority": "10" })).unwrap();
        let from_number: Condition =
            serde_json::from_value(serde_json::json!({ "name": "b", "priority": 5 })).unwrap();
        let missing: Condition = serde_json::from_value(serde_json::json!({ "name": "c" })).unwrap();

        assert_eq!(from_text.priority, 10);
        assert_eq!(from_number.priority, 5);
        assert_eq!(missing.priority, 0);
    }

    #[test]
    fn test_condition_type_parses_case_insensitively() {
        assert_eq!(ConditionType::from_str("request").unwrap(), ConditionType::Request);
        assert_eq!(ConditionType::from_str("CACHE").unwrap(), ConditionType::Cache);
        assert_eq!(ConditionType::Prefetch.to_string(), "PREFETCH");
        assert!(ConditionType::from_str("deliver").is_err());
    }
}
