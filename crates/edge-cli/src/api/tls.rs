use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Related objects that may be embedded in an activation response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ActivationInclude {
    TlsCertificate,
    TlsConfiguration,
    TlsDomain,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Relation {
    pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TlsActivation {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_certificate: Option<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_configuration: Option<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_domain: Option<Relation>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetTlsActivationInput {
    pub id: String,
    pub include: Option<ActivationInclude>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListTlsActivationsInput {
    pub filter_tls_certificate_id: Option<String>,
    pub filter_tls_domain_id: Option<String>,
    pub include: Option<ActivationInclude>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl GetTlsActivationInput {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        self.include
            .iter()
            .map(|include| ("include", include.to_string()))
            .collect()
    }
}

impl ListTlsActivationsInput {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(cert) = &self.filter_tls_certificate_id {
            query.push(("filter[tls_certificate.id]", cert.clone()));
        }
        if let Some(domain) = &self.filter_tls_domain_id {
            query.push(("filter[tls_domain.id]", domain.clone()));
        }
        if let Some(include) = &self.include {
            query.push(("include", include.to_string()));
        }
        if let Some(number) = self.page_number {
            query.push(("page[number]", number.to_string()));
        }
        if let Some(size) = self.page_size {
            query.push(("page[size]", size.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_only_contains_given_filters() {
        let input = ListTlsActivationsInput {
            filter_tls_domain_id: Some("example.com".into()),
            include: Some(ActivationInclude::TlsCertificate),
            page_size: Some(20),
            ..Default::default()
        };

        assert_eq!(
            input.query(),
            vec![
                ("filter[tls_domain.id]", "example.com".to_string()),
                ("include", "tls_certificate".to_string()),
                ("page[size]", "20".to_string()),
            ]
        );
        assert!(ListTlsActivationsInput::default().query().is_empty());
    }
}
