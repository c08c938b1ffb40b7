use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A link between a service version and a platform resource such as a
/// key-value store.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Resource {
    pub id: String,
    pub resource_id: String,
    pub name: String,
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub href: String,
    pub resource_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateResourceInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateResourceInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip)]
    pub id: String,
    pub name: String,
}
