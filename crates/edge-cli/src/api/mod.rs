pub mod condition;
pub mod logging;
pub mod pop;
pub mod resource;
pub mod service;
pub mod tls;

use common::api::client::{ApiClient, ApiClientError, ApiResult, GenericApiClient, HandleResponse};
use common::api::AuthMode;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use condition::{Condition, CreateConditionInput, UpdateConditionInput};
use logging::{
    BlobStorage, CreateBlobStorageInput, CreateGcsInput, CreateHttpsInput, CreatePapertrailInput,
    CreateS3Input, Gcs, Https, Papertrail, UpdateBlobStorageInput, UpdateGcsInput,
    UpdateHttpsInput, UpdatePapertrailInput, UpdateS3Input, S3,
};
use pop::Datacenter;
use resource::{CreateResourceInput, Resource, UpdateResourceInput};
use service::{Service, ServiceDetail, Version};
use tls::{GetTlsActivationInput, ListTlsActivationsInput, TlsActivation};

#[cfg(test)]
use mockall::automock;

/// Typed client for the management API, authenticated with a session or API
/// token sent in the `Edge-Key` header.
#[derive(Clone)]
pub struct EdgeClient {
    inner: GenericApiClient,
    base: Url,
}

impl ApiClient for EdgeClient {
    fn auth(&self) -> &AuthMode {
        self.inner.auth()
    }

    fn update_auth(&mut self, auth: AuthMode) -> Result<(), ApiClientError> {
        self.inner.update_auth(auth)
    }

    fn client(&self) -> &Client {
        self.inner.client()
    }

    fn base_url(&self) -> String {
        self.inner.base_url()
    }
}

impl EdgeClient {
    pub fn new(endpoint: &str, token: String) -> Result<Self, url::ParseError> {
        let inner = GenericApiClient::new(endpoint, AuthMode::ApiToken(token));
        let base = Url::parse(inner.endpoint())?;
        Ok(Self { inner, base })
    }

    /// Joins percent-encoded path segments onto the API endpoint.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.to_string()
    }

    fn version_url(&self, service_id: &str, version: u32, rest: &[&str]) -> String {
        let version = version.to_string();
        let mut segments = vec!["service", service_id, "version", version.as_str()];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.get(url).send().await.handle_json_response().await
    }

    async fn create<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.post(url)
            .json(body)
            .send()
            .await
            .handle_json_response()
            .await
    }

    async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.put(url)
            .json(body)
            .send()
            .await
            .handle_json_response()
            .await
    }

    async fn remove(&self, url: &str) -> ApiResult<()> {
        self.delete(url).send().await.handle_no_op_response().await
    }
}

#[async_trait::async_trait]
#[cfg_attr(test, automock)]
pub trait EdgeApi {
    async fn list_services(&self) -> ApiResult<Vec<Service>>;
    async fn search_service(&self, name: &str) -> ApiResult<Service>;
    async fn get_service_details(&self, service_id: &str) -> ApiResult<ServiceDetail>;
    async fn list_versions(&self, service_id: &str) -> ApiResult<Vec<Version>>;
    async fn clone_version(&self, service_id: &str, version: u32) -> ApiResult<Version>;

    async fn list_s3s(&self, service_id: &str, version: u32) -> ApiResult<Vec<S3>>;
    async fn get_s3(&self, service_id: &str, version: u32, name: &str) -> ApiResult<S3>;
    async fn create_s3(&self, input: CreateS3Input) -> ApiResult<S3>;
    async fn update_s3(&self, input: UpdateS3Input) -> ApiResult<S3>;
    async fn delete_s3(&self, service_id: &str, version: u32, name: &str) -> ApiResult<()>;

    async fn list_gcss(&self, service_id: &str, version: u32) -> ApiResult<Vec<Gcs>>;
    async fn get_gcs(&self, service_id: &str, version: u32, name: &str) -> ApiResult<Gcs>;
    async fn create_gcs(&self, input: CreateGcsInput) -> ApiResult<Gcs>;
    async fn update_gcs(&self, input: UpdateGcsInput) -> ApiResult<Gcs>;
    async fn delete_gcs(&self, service_id: &str, version: u32, name: &str) -> ApiResult<()>;

    async fn list_blob_storages(
        &self,
        service_id: &str,
        version: u32,
    ) -> ApiResult<Vec<BlobStorage>>;
    async fn get_blob_storage(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<BlobStorage>;
    async fn create_blob_storage(&self, input: CreateBlobStorageInput) -> ApiResult<BlobStorage>;
    async fn update_blob_storage(&self, input: UpdateBlobStorageInput) -> ApiResult<BlobStorage>;
    async fn delete_blob_storage(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<()>;

    async fn list_httpss(&self, service_id: &str, version: u32) -> ApiResult<Vec<Https>>;
    async fn get_https(&self, service_id: &str, version: u32, name: &str) -> ApiResult<Https>;
    async fn create_https(&self, input: CreateHttpsInput) -> ApiResult<Https>;
    async fn update_https(&self, input: UpdateHttpsInput) -> ApiResult<Https>;
    async fn delete_https(&self, service_id: &str, version: u32, name: &str) -> ApiResult<()>;

    async fn list_papertrails(&self, service_id: &str, version: u32)
        -> ApiResult<Vec<Papertrail>>;
    async fn get_papertrail(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Papertrail>;
    async fn create_papertrail(&self, input: CreatePapertrailInput) -> ApiResult<Papertrail>;
    async fn update_papertrail(&self, input: UpdatePapertrailInput) -> ApiResult<Papertrail>;
    async fn delete_papertrail(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<()>;

    async fn list_conditions(&self, service_id: &str, version: u32) -> ApiResult<Vec<Condition>>;
    async fn get_condition(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Condition>;
    async fn create_condition(&self, input: CreateConditionInput) -> ApiResult<Condition>;
    async fn update_condition(&self, input: UpdateConditionInput) -> ApiResult<Condition>;
    async fn delete_condition(&self, service_id: &str, version: u32, name: &str)
        -> ApiResult<()>;

    async fn list_resources(&self, service_id: &str, version: u32) -> ApiResult<Vec<Resource>>;
    async fn get_resource(&self, service_id: &str, version: u32, id: &str)
        -> ApiResult<Resource>;
    async fn create_resource(&self, input: CreateResourceInput) -> ApiResult<Resource>;
    async fn update_resource(&self, input: UpdateResourceInput) -> ApiResult<Resource>;
    async fn delete_resource(&self, service_id: &str, version: u32, id: &str) -> ApiResult<()>;

    async fn get_tls_activation(&self, input: GetTlsActivationInput) -> ApiResult<TlsActivation>;
    async fn list_tls_activations(
        &self,
        input: ListTlsActivationsInput,
    ) -> ApiResult<Vec<TlsActivation>>;

    async fn list_datacenters(&self) -> ApiResult<Vec<Datacenter>>;
}

#[async_trait::async_trait]
impl EdgeApi for EdgeClient {
    async fn list_services(&self) -> ApiResult<Vec<Service>> {
        self.fetch(&self.url(&["service"])).await
    }

    async fn search_service(&self, name: &str) -> ApiResult<Service> {
        let search_url = self.url(&["service", "search"]);
        self.get(&search_url)
            .query(&[("name", name)])
            .send()
            .await
            .handle_json_response()
            .await
    }

    async fn get_service_details(&self, service_id: &str) -> ApiResult<ServiceDetail> {
        self.fetch(&self.url(&["service", service_id, "details"]))
            .await
    }

    async fn list_versions(&self, service_id: &str) -> ApiResult<Vec<Version>> {
        self.fetch(&self.url(&["service", service_id, "version"]))
            .await
    }

    async fn clone_version(&self, service_id: &str, version: u32) -> ApiResult<Version> {
        let clone_url = self.version_url(service_id, version, &["clone"]);
        self.put(&clone_url)
            .send()
            .await
            .handle_json_response()
            .await
    }

    async fn list_s3s(&self, service_id: &str, version: u32) -> ApiResult<Vec<S3>> {
        self.fetch(&self.version_url(service_id, version, &["logging", "s3"]))
            .await
    }

    async fn get_s3(&self, service_id: &str, version: u32, name: &str) -> ApiResult<S3> {
        self.fetch(&self.version_url(service_id, version, &["logging", "s3", name]))
            .await
    }

    async fn create_s3(&self, input: CreateS3Input) -> ApiResult<S3> {
        let url = self.version_url(&input.service_id, input.service_version, &["logging", "s3"]);
        self.create(&url, &input).await
    }

    async fn update_s3(&self, input: UpdateS3Input) -> ApiResult<S3> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "s3", &input.name],
        );
        self.update(&url, &input).await
    }

    async fn delete_s3(&self, service_id: &str, version: u32, name: &str) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["logging", "s3", name]))
            .await
    }

    async fn list_gcss(&self, service_id: &str, version: u32) -> ApiResult<Vec<Gcs>> {
        self.fetch(&self.version_url(service_id, version, &["logging", "gcs"]))
            .await
    }

    async fn get_gcs(&self, service_id: &str, version: u32, name: &str) -> ApiResult<Gcs> {
        self.fetch(&self.version_url(service_id, version, &["logging", "gcs", name]))
            .await
    }

    async fn create_gcs(&self, input: CreateGcsInput) -> ApiResult<Gcs> {
        let url = self.version_url(&input.service_id, input.service_version, &["logging", "gcs"]);
        self.create(&url, &input).await
    }

    async fn update_gcs(&self, input: UpdateGcsInput) -> ApiResult<Gcs> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "gcs", &input.name],
        );
        self.update(&url, &input).await
    }

    async fn delete_gcs(&self, service_id: &str, version: u32, name: &str) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["logging", "gcs", name]))
            .await
    }

    async fn list_blob_storages(
        &self,
        service_id: &str,
        version: u32,
    ) -> ApiResult<Vec<BlobStorage>> {
        self.fetch(&self.version_url(service_id, version, &["logging", "azureblob"]))
            .await
    }

    async fn get_blob_storage(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<BlobStorage> {
        self.fetch(&self.version_url(service_id, version, &["logging", "azureblob", name]))
            .await
    }

    async fn create_blob_storage(&self, input: CreateBlobStorageInput) -> ApiResult<BlobStorage> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "azureblob"],
        );
        self.create(&url, &input).await
    }

    async fn update_blob_storage(&self, input: UpdateBlobStorageInput) -> ApiResult<BlobStorage> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "azureblob", &input.name],
        );
        self.update(&url, &input).await
    }

    async fn delete_blob_storage(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["logging", "azureblob", name]))
            .await
    }

    async fn list_httpss(&self, service_id: &str, version: u32) -> ApiResult<Vec<Https>> {
        self.fetch(&self.version_url(service_id, version, &["logging", "https"]))
            .await
    }

    async fn get_https(&self, service_id: &str, version: u32, name: &str) -> ApiResult<Https> {
        self.fetch(&self.version_url(service_id, version, &["logging", "https", name]))
            .await
    }

    async fn create_https(&self, input: CreateHttpsInput) -> ApiResult<Https> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "https"],
        );
        self.create(&url, &input).await
    }

    async fn update_https(&self, input: UpdateHttpsInput) -> ApiResult<Https> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "https", &input.name],
        );
        self.update(&url, &input).await
    }

    async fn delete_https(&self, service_id: &str, version: u32, name: &str) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["logging", "https", name]))
            .await
    }

    async fn list_papertrails(
        &self,
        service_id: &str,
        version: u32,
    ) -> ApiResult<Vec<Papertrail>> {
        self.fetch(&self.version_url(service_id, version, &["logging", "papertrail"]))
            .await
    }

    async fn get_papertrail(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Papertrail> {
        self.fetch(&self.version_url(service_id, version, &["logging", "papertrail", name]))
            .await
    }

    async fn create_papertrail(&self, input: CreatePapertrailInput) -> ApiResult<Papertrail> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "papertrail"],
        );
        self.create(&url, &input).await
    }

    async fn update_papertrail(&self, input: UpdatePapertrailInput) -> ApiResult<Papertrail> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["logging", "papertrail", &input.name],
        );
        self.update(&url, &input).await
    }

    async fn delete_papertrail(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["logging", "papertrail", name]))
            .await
    }

    async fn list_conditions(&self, service_id: &str, version: u32) -> ApiResult<Vec<Condition>> {
        self.fetch(&self.version_url(service_id, version, &["condition"]))
            .await
    }

    async fn get_condition(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<Condition> {
        self.fetch(&self.version_url(service_id, version, &["condition", name]))
            .await
    }

    async fn create_condition(&self, input: CreateConditionInput) -> ApiResult<Condition> {
        let url = self.version_url(&input.service_id, input.service_version, &["condition"]);
        self.create(&url, &input).await
    }

    async fn update_condition(&self, input: UpdateConditionInput) -> ApiResult<Condition> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["condition", &input.name],
        );
        self.update(&url, &input).await
    }

    async fn delete_condition(
        &self,
        service_id: &str,
        version: u32,
        name: &str,
    ) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["condition", name]))
            .await
    }

    async fn list_resources(&self, service_id: &str, version: u32) -> ApiResult<Vec<Resource>> {
        self.fetch(&self.version_url(service_id, version, &["resource"]))
            .await
    }

    async fn get_resource(
        &self,
        service_id: &str,
        version: u32,
        id: &str,
    ) -> ApiResult<Resource> {
        self.fetch(&self.version_url(service_id, version, &["resource", id]))
            .await
    }

    async fn create_resource(&self, input: CreateResourceInput) -> ApiResult<Resource> {
        let url = self.version_url(&input.service_id, input.service_version, &["resource"]);
        self.create(&url, &input).await
    }

    async fn update_resource(&self, input: UpdateResourceInput) -> ApiResult<Resource> {
        let url = self.version_url(
            &input.service_id,
            input.service_version,
            &["resource", &input.id],
        );
        self.update(&url, &input).await
    }

    async fn delete_resource(&self, service_id: &str, version: u32, id: &str) -> ApiResult<()> {
        self.remove(&self.version_url(service_id, version, &["resource", id]))
            .await
    }

    async fn get_tls_activation(&self, input: GetTlsActivationInput) -> ApiResult<TlsActivation> {
        let activation_url = self.url(&["tls", "activations", &input.id]);
        self.get(&activation_url)
            .query(&input.query())
            .send()
            .await
            .handle_json_response()
            .await
    }

    async fn list_tls_activations(
        &self,
        input: ListTlsActivationsInput,
    ) -> ApiResult<Vec<TlsActivation>> {
        let activations_url = self.url(&["tls", "activations"]);
        self.get(&activations_url)
            .query(&input.query())
            .send()
            .await
            .handle_json_response()
            .await
    }

    async fn list_datacenters(&self) -> ApiResult<Vec<Datacenter>> {
        self.fetch(&self.url(&["datacenters"])).await
    }
}
