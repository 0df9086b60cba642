//! DigitalOcean Spaces storage backend.
//!
//! Spaces speaks the S3 protocol, so the adapter drives `aws-sdk-s3` against
//! `https://<region>.digitaloceanspaces.com` with virtual-hosted addressing.
//! Every object is written with the configured metadata policy, which by
//! default makes it publicly readable under [`SpacesStorage::link_base`].

use crate::core::registry::StorageRegistry;
use crate::domain::model::Opts;
use crate::domain::ports::{CredentialProvider, Storage};
use crate::utils::error::{Result, StorageError};
use crate::utils::validation::{self, Validate};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{
    Credentials as S3Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Name under which the backend is registered.
pub const BACKEND_NAME: &str = "Spaces";

// Keys used for storing dial options.
pub const REGION_OPT: &str = "spacesRegion";
pub const NAME_OPT: &str = "spacesName";
pub const ROOT_OPT: &str = "spacesRoot";

pub const ACCESS_KEY_ENV: &str = "SPACES_KEY";
pub const SECRET_KEY_ENV: &str = "SPACES_SECRET";

pub const PROVIDER_DOMAIN: &str = "digitaloceanspaces.com";

const ACL_HEADER: &str = "x-amz-acl";
const USER_META_PREFIX: &str = "x-amz-meta-";

/// Metadata attached to every uploaded object: public-read ACL.
pub fn default_object_metadata() -> HashMap<String, String> {
    HashMap::from([(ACL_HEADER.to_string(), "public-read".to_string())])
}

/// Joins the root prefix and a reference into the remote object key.
pub fn ref_path(root: &str, reference: &str) -> String {
    if root.is_empty() {
        reference.to_string()
    } else {
        format!("{}/{}", root, reference.trim_start_matches('/'))
    }
}

/// Public URL prefix for a bucket on the given endpoint.
pub fn link_base_for(bucket: &str, endpoint: &str, root: &str) -> String {
    if root.is_empty() {
        format!("https://{}.{}/", bucket, endpoint)
    } else {
        format!("https://{}.{}/{}/", bucket, endpoint, root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacesConfig {
    pub region: String,
    pub name: String,
    pub root: String,
    /// Applied on every put. `x-amz-acl` becomes the canned ACL, everything
    /// else is user metadata.
    pub metadata: HashMap<String, String>,
    /// Overrides the service URL (S3-compatible mirrors, test doubles).
    /// Forces path-style addressing.
    pub service_url: Option<String>,
}

impl SpacesConfig {
    pub fn new(region: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            name: name.into(),
            root: String::new(),
            metadata: default_object_metadata(),
            service_url: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    /// 從撥號選項建立設定並驗證
    pub fn from_opts(opts: &Opts) -> Result<Self> {
        const OP: &str = "cloud/storage/spaces.New";

        let region = validation::validate_required_option(OP, REGION_OPT, opts.get(REGION_OPT))?;
        let name = validation::validate_required_option(OP, NAME_OPT, opts.get(NAME_OPT))?;
        let root = opts.get(ROOT_OPT).map(String::as_str).unwrap_or_default();

        let config = Self::new(region, name).with_root(root);
        config.validate()?;
        Ok(config)
    }

    pub fn endpoint(&self) -> String {
        format!("{}.{}", self.region, PROVIDER_DOMAIN)
    }
}

impl Validate for SpacesConfig {
    fn validate(&self) -> Result<()> {
        const OP: &str = "cloud/storage/spaces.New";

        validation::validate_region(OP, REGION_OPT, &self.region)?;
        validation::validate_bucket_name(OP, NAME_OPT, &self.name)?;
        validation::validate_root(OP, ROOT_OPT, &self.root)?;
        if let Some(url) = &self.service_url {
            validation::validate_url("service_url", url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Session {
    client: S3Client,
    bucket: String,
}

/// Storage implementation backed by a Spaces bucket.
#[derive(Debug)]
pub struct SpacesStorage {
    session: RwLock<Option<Session>>,
    endpoint: String,
    root: String,
    link_base: String,
    metadata: HashMap<String, String>,
}

impl SpacesStorage {
    /// Builds the backend from dial options. Credentials are checked first,
    /// then `spacesRegion`, `spacesName` and `spacesRoot`.
    pub fn new(opts: &Opts, credentials: &dyn CredentialProvider) -> Result<Self> {
        let (access_key, secret_key) = resolve_credentials(credentials)?;
        let config = SpacesConfig::from_opts(opts)?;
        Ok(Self::build(config, access_key, secret_key))
    }

    pub fn with_config(config: SpacesConfig, credentials: &dyn CredentialProvider) -> Result<Self> {
        let (access_key, secret_key) = resolve_credentials(credentials)?;
        config.validate()?;
        Ok(Self::build(config, access_key, secret_key))
    }

    fn build(config: SpacesConfig, access_key: String, secret_key: String) -> Self {
        let endpoint = config.endpoint();
        let root = config.root.trim_end_matches('/').to_string();
        let path_style = config.service_url.is_some();
        let service_url = config
            .service_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", endpoint));

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(service_url.as_str())
            .credentials_provider(S3Credentials::new(
                access_key, secret_key, None, None, "spaces",
            ))
            .force_path_style(path_style)
            .retry_config(RetryConfig::disabled())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        tracing::info!(
            bucket = %config.name,
            endpoint = %service_url,
            root = %root,
            "🔌 Spaces storage configured"
        );

        Self {
            session: RwLock::new(Some(Session {
                client: S3Client::from_conf(s3_config),
                bucket: config.name.clone(),
            })),
            link_base: link_base_for(&config.name, &endpoint, &root),
            endpoint,
            root,
            metadata: config.metadata,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Remote object key for `reference`.
    pub fn key_for(&self, reference: &str) -> String {
        ref_path(&self.root, reference)
    }

    fn session(&self, op: &'static str) -> Result<Session> {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        guard
            .clone()
            .ok_or_else(|| StorageError::invalid(op, "storage is closed"))
    }

    fn prepare(&self, op: &'static str, reference: &str) -> Result<(Session, String)> {
        if reference.is_empty() {
            return Err(StorageError::invalid(op, "empty reference"));
        }
        let session = self.session(op)?;
        Ok((session, self.key_for(reference)))
    }
}

fn resolve_credentials(provider: &dyn CredentialProvider) -> Result<(String, String)> {
    const OP: &str = "cloud/storage/spaces.New";

    let credentials = provider.credentials();
    let access_key = credentials
        .access_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            StorageError::invalid(OP, format!("{} env variable is required", ACCESS_KEY_ENV))
        })?;
    let secret_key = credentials
        .secret_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            StorageError::invalid(OP, format!("{} env variable is required", SECRET_KEY_ENV))
        })?;
    Ok((access_key, secret_key))
}

#[async_trait]
impl Storage for SpacesStorage {
    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        const OP: &str = "cloud/storage/spaces.Download";

        let (session, key) = self.prepare(OP, reference)?;
        tracing::debug!(bucket = %session.bucket, key = %key, "downloading object");

        let context = || format!("unable to download ref {:?} from bucket {:?}", key, session.bucket);

        let output = session
            .client
            .get_object()
            .bucket(&session.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::io(OP, context(), DisplayErrorContext(&e).to_string()))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::io(OP, context(), e))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn put(&self, reference: &str, contents: &[u8]) -> Result<()> {
        const OP: &str = "cloud/storage/spaces.Put";

        let (session, key) = self.prepare(OP, reference)?;
        tracing::debug!(
            bucket = %session.bucket,
            key = %key,
            size = contents.len(),
            "uploading object"
        );

        let mut request = session
            .client
            .put_object()
            .bucket(&session.bucket)
            .key(&key)
            .body(ByteStream::from(contents.to_vec()));

        for (name, value) in &self.metadata {
            let name = name.to_ascii_lowercase();
            if name == ACL_HEADER {
                request = request.acl(ObjectCannedAcl::from(value.as_str()));
            } else {
                let meta_key = name.strip_prefix(USER_META_PREFIX).unwrap_or(&name);
                request = request.metadata(meta_key, value);
            }
        }

        request.send().await.map_err(|e| {
            StorageError::io(
                OP,
                format!("unable to upload ref {:?} to bucket {:?}", key, session.bucket),
                DisplayErrorContext(&e).to_string(),
            )
        })?;

        Ok(())
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        const OP: &str = "cloud/storage/spaces.Delete";

        let (session, key) = self.prepare(OP, reference)?;
        tracing::debug!(bucket = %session.bucket, key = %key, "deleting object");

        session
            .client
            .delete_object()
            .bucket(&session.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                StorageError::io(
                    OP,
                    format!("unable to delete ref {:?} from bucket {:?}", key, session.bucket),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        Ok(())
    }

    fn link_base(&self) -> String {
        self.link_base.clone()
    }

    fn close(&self) {
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            tracing::debug!(endpoint = %self.endpoint, "Spaces storage closed");
        }
    }
}

/// Registers the Spaces factory under [`BACKEND_NAME`].
pub fn register(
    registry: &StorageRegistry,
    credentials: Arc<dyn CredentialProvider>,
) -> Result<()> {
    registry.register(
        BACKEND_NAME,
        Arc::new(move |opts: &Opts| -> Result<Box<dyn Storage>> {
            let storage = SpacesStorage::new(opts, credentials.as_ref())?;
            Ok(Box::new(storage))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::credentials::StaticCredentials;
    use crate::utils::error::ErrorKind;

    fn opts(region: &str, name: &str) -> Opts {
        Opts::new()
            .with_key_value(REGION_OPT, region)
            .with_key_value(NAME_OPT, name)
    }

    #[test]
    fn test_ref_path() {
        assert_eq!(ref_path("", "a/b.txt"), "a/b.txt");
        assert_eq!(ref_path("store", "a/b.txt"), "store/a/b.txt");
        assert_eq!(ref_path("store", "/a/b.txt"), "store/a/b.txt");
    }

    #[test]
    fn test_link_base_for() {
        assert_eq!(
            link_base_for("mydata", "nyc3.example-provider.com", ""),
            "https://mydata.nyc3.example-provider.com/"
        );
        assert_eq!(
            link_base_for("mydata", "nyc3.example-provider.com", "prefix"),
            "https://mydata.nyc3.example-provider.com/prefix/"
        );
    }

    #[test]
    fn test_from_opts_requires_region_and_name() {
        let err = SpacesConfig::from_opts(&Opts::new().with_key_value(NAME_OPT, "mydata"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains(REGION_OPT));

        let err = SpacesConfig::from_opts(&Opts::new().with_key_value(REGION_OPT, "nyc3"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains(NAME_OPT));
    }

    #[test]
    fn test_from_opts_rejects_leading_slash_root() {
        let err = SpacesConfig::from_opts(&opts("nyc3", "mydata").with_key_value(ROOT_OPT, "/store"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains("shouldn't start with slash"));
    }

    #[test]
    fn test_from_opts_rejects_parent_segment_in_root() {
        let err = SpacesConfig::from_opts(&opts("nyc3", "mydata").with_key_value(ROOT_OPT, "a/../b"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(err.op(), "cloud/storage/spaces.New");
    }

    #[test]
    fn test_new_checks_credentials_before_options() {
        let err = SpacesStorage::new(&Opts::new(), &StaticCredentials::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains(ACCESS_KEY_ENV));

        let only_key = StaticCredentials::from(crate::domain::model::Credentials {
            access_key: Some("key".into()),
            secret_key: None,
        });
        let err = SpacesStorage::new(&opts("nyc3", "mydata"), &only_key).unwrap_err();
        assert!(err.to_string().contains(SECRET_KEY_ENV));
    }

    #[test]
    fn test_endpoint_root_and_link_base() {
        let creds = StaticCredentials::new("key", "secret");
        let storage =
            SpacesStorage::new(&opts("nyc3", "mydata").with_key_value(ROOT_OPT, "store/"), &creds)
                .unwrap();

        assert_eq!(storage.endpoint(), "nyc3.digitaloceanspaces.com");
        assert_eq!(storage.root(), "store");
        assert_eq!(storage.key_for("a/b.txt"), "store/a/b.txt");
        assert_eq!(
            storage.link_base(),
            "https://mydata.nyc3.digitaloceanspaces.com/store/"
        );
    }

    #[tokio::test]
    async fn test_operations_after_close_are_rejected() {
        let creds = StaticCredentials::new("key", "secret");
        let storage = SpacesStorage::new(&opts("nyc3", "mydata"), &creds).unwrap();
        let link_base = storage.link_base();

        storage.close();
        storage.close();

        let err = storage.download("ref").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains("storage is closed"));
        assert!(storage.put("ref", b"data").await.is_err());
        assert!(storage.delete("ref").await.is_err());
        assert_eq!(storage.link_base(), link_base);
    }

    #[tokio::test]
    async fn test_empty_reference_is_rejected() {
        let creds = StaticCredentials::new("key", "secret");
        let storage = SpacesStorage::new(&opts("nyc3", "mydata"), &creds).unwrap();

        let err = storage.put("", b"data").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(err.op(), "cloud/storage/spaces.Put");
    }
}
