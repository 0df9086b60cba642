use crate::domain::model::Opts;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub type Factory = Arc<dyn Fn(&Opts) -> Result<Box<dyn Storage>> + Send + Sync>;

/// Name -> factory map used to pick a storage backend from configuration.
///
/// Owned by the application and populated at start-up, before any `dial`.
#[derive(Default)]
pub struct StorageRegistry {
    factories: RwLock<HashMap<String, Factory>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, factory: Factory) -> Result<()> {
        const OP: &str = "cloud/storage.Register";

        let mut factories = self.factories.write().unwrap_or_else(|e| e.into_inner());
        if factories.contains_key(name) {
            return Err(StorageError::invalid(
                OP,
                format!("storage backend {:?} already registered", name),
            ));
        }
        factories.insert(name.to_string(), factory);
        tracing::debug!(backend = name, "storage backend registered");
        Ok(())
    }

    /// Instantiates the backend registered under `name`.
    pub fn dial(&self, name: &str, opts: &Opts) -> Result<Box<dyn Storage>> {
        const OP: &str = "cloud/storage.Dial";

        // 先複製工廠再釋放鎖，避免工廠內部再呼叫 registry 時死鎖
        let factory = {
            let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
            factories.get(name).cloned()
        }
        .ok_or_else(|| {
            StorageError::invalid(OP, format!("storage backend {:?} not registered", name))
        })?;

        tracing::info!(backend = name, "📦 Dialing storage backend");
        factory(opts)
    }

    pub fn names(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;
    use async_trait::async_trait;

    struct NullStorage;

    #[async_trait]
    impl Storage for NullStorage {
        async fn download(&self, _reference: &str) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        async fn put(&self, _reference: &str, _contents: &[u8]) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _reference: &str) -> Result<()> {
            Ok(())
        }

        fn link_base(&self) -> String {
            "https://null.invalid/".to_string()
        }

        fn close(&self) {}
    }

    fn null_factory() -> Factory {
        Arc::new(|_opts: &Opts| -> Result<Box<dyn Storage>> { Ok(Box::new(NullStorage)) })
    }

    #[test]
    fn test_register_and_dial() {
        let registry = StorageRegistry::new();
        registry.register("Null", null_factory()).unwrap();

        let storage = registry.dial("Null", &Opts::new()).unwrap();
        assert_eq!(storage.link_base(), "https://null.invalid/");
        assert_eq!(registry.names(), vec!["Null".to_string()]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = StorageRegistry::new();
        registry.register("Null", null_factory()).unwrap();

        let err = registry.register("Null", null_factory()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_dial_unknown_backend_fails() {
        let registry = StorageRegistry::new();
        let err = registry.dial("GCS", &Opts::new()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.to_string().contains("\"GCS\" not registered"));
    }

    #[test]
    fn test_factory_errors_propagate() {
        let registry = StorageRegistry::new();
        registry
            .register(
                "Broken",
                Arc::new(|_opts: &Opts| -> Result<Box<dyn Storage>> {
                    Err(StorageError::invalid("test", "broken"))
                }),
            )
            .unwrap();

        assert!(registry.dial("Broken", &Opts::new()).is_err());
    }
}
