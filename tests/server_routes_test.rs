#![cfg(feature = "server")]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use spaces_store::server::create_router;
use spaces_store::{Result, Storage, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        if reference.is_empty() {
            return Err(StorageError::invalid("memory.Download", "empty reference"));
        }
        self.objects
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| {
                StorageError::io(
                    "memory.Download",
                    format!("unable to download ref {:?}", reference),
                    "not found",
                )
            })
    }

    async fn put(&self, reference: &str, contents: &[u8]) -> Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(reference.to_string(), contents.to_vec());
        Ok(())
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(reference);
        Ok(())
    }

    fn link_base(&self) -> String {
        "https://mydata.nyc3.digitaloceanspaces.com/store/".to_string()
    }

    fn close(&self) {}
}

async fn get(storage: Arc<MemoryStorage>, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = create_router(storage)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_healthz() {
    let (status, body) = get(Arc::new(MemoryStorage::default()), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_linkbase() {
    let (status, body) = get(Arc::new(MemoryStorage::default()), "/linkbase").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "https://mydata.nyc3.digitaloceanspaces.com/store/"
    );
}

#[tokio::test]
async fn test_download_nested_reference() {
    let storage = Arc::new(MemoryStorage::default());
    storage.put("a/b.txt", b"hello spaces").await.unwrap();

    let (status, body) = get(storage, "/refs/a/b.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hello spaces");
}

#[tokio::test]
async fn test_download_missing_reference_is_bad_gateway() {
    let (status, body) = get(Arc::new(MemoryStorage::default()), "/refs/missing").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(String::from_utf8(body).unwrap().contains("not found"));
}
