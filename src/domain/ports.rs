use crate::domain::model::Credentials;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Blob storage contract implemented by every backend.
///
/// References are opaque, non-empty keys. Calling any remote operation
/// after [`Storage::close`] is a precondition violation and fails with an
/// `Invalid` error.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the full contents stored under `reference`.
    async fn download(&self, reference: &str) -> Result<Vec<u8>>;

    /// Stores `contents` under `reference`, overwriting any previous object.
    async fn put(&self, reference: &str, contents: &[u8]) -> Result<()>;

    async fn delete(&self, reference: &str) -> Result<()>;

    /// Public URL prefix under which stored references can be fetched directly.
    fn link_base(&self) -> String;

    /// Releases the client handle. Idempotent.
    fn close(&self);
}

pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Credentials;
}
