//! Logging endpoint resources. Responses default every missing field so older
//! endpoints that omit newer attributes still deserialize; inputs only send
//! the attributes that were explicitly provided.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// S3 storage class applied to uploaded log files.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Display, EnumString)]
pub enum S3Redundancy {
    #[serde(rename = "standard")]
    #[strum(serialize = "standard")]
    Standard,
    #[serde(rename = "standard_ia")]
    #[strum(serialize = "standard_ia")]
    StandardInfrequentAccess,
    #[serde(rename = "onezone_ia")]
    #[strum(serialize = "onezone_ia")]
    OneZoneInfrequentAccess,
    #[serde(rename = "glacier")]
    #[strum(serialize = "glacier")]
    GlacierFlexibleRetrieval,
    #[serde(rename = "glacier_ir")]
    #[strum(serialize = "glacier_ir")]
    GlacierInstantRetrieval,
    #[serde(rename = "deep_archive")]
    #[strum(serialize = "deep_archive")]
    GlacierDeepArchive,
    #[serde(rename = "reduced_redundancy")]
    #[strum(serialize = "reduced_redundancy")]
    Reduced,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Display, EnumString)]
pub enum S3ServerSideEncryption {
    #[serde(rename = "AES256")]
    #[strum(serialize = "AES256")]
    Aes,
    #[serde(rename = "aws:kms")]
    #[strum(serialize = "aws:kms")]
    Kms,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct S3 {
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub name: String,
    pub bucket_name: String,
    pub domain: String,
    pub access_key: String,
    pub secret_key: String,
    pub iam_role: String,
    pub path: String,
    pub period: u32,
    pub gzip_level: u8,
    pub format: String,
    pub format_version: u8,
    pub message_type: String,
    pub response_condition: String,
    pub timestamp_format: String,
    pub placement: String,
    pub public_key: String,
    pub redundancy: Option<S3Redundancy>,
    pub server_side_encryption: Option<S3ServerSideEncryption>,
    pub server_side_encryption_kms_key_id: String,
    pub file_max_bytes: u64,
    pub compression_codec: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateS3Input {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy: Option<S3Redundancy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption: Option<S3ServerSideEncryption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption_kms_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_max_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateS3Input {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    /// Current name of the endpoint, used to address it.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy: Option<S3Redundancy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption: Option<S3ServerSideEncryption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_side_encryption_kms_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_max_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Gcs {
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub name: String,
    pub bucket_name: String,
    pub user: String,
    pub account_name: String,
    pub secret_key: String,
    pub path: String,
    pub period: u32,
    pub gzip_level: u8,
    pub format: String,
    pub format_version: u8,
    pub message_type: String,
    pub response_condition: String,
    pub timestamp_format: String,
    pub placement: String,
    pub compression_codec: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateGcsInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateGcsInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BlobStorage {
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub name: String,
    pub container: String,
    pub account_name: String,
    pub sas_token: String,
    pub path: String,
    pub period: u32,
    pub gzip_level: u8,
    pub format: String,
    pub format_version: u8,
    pub message_type: String,
    pub response_condition: String,
    pub timestamp_format: String,
    pub placement: String,
    pub public_key: String,
    pub file_max_bytes: u64,
    pub compression_codec: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateBlobStorageInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_max_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateBlobStorageInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_max_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_codec: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Https {
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub name: String,
    pub url: String,
    pub request_max_entries: u32,
    pub request_max_bytes: u32,
    pub content_type: String,
    pub header_name: String,
    pub header_value: String,
    pub method: String,
    pub json_format: String,
    pub placement: String,
    pub tls_ca_cert: String,
    pub tls_client_cert: String,
    pub tls_client_key: String,
    pub tls_hostname: String,
    pub message_type: String,
    pub format: String,
    pub format_version: u8,
    pub response_condition: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreateHttpsInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_max_entries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_max_bytes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_client_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_client_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateHttpsInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_max_entries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_max_bytes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_client_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_client_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Papertrail {
    pub service_id: String,
    #[serde(rename = "version")]
    pub service_version: u32,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub format: String,
    pub format_version: u8,
    pub response_condition: String,
    pub placement: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CreatePapertrailInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdatePapertrailInput {
    #[serde(skip)]
    pub service_id: String,
    #[serde(skip)]
    pub service_version: u32,
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
}
