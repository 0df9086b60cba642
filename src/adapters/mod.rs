// Adapters layer: concrete implementations for external systems (object storage, credentials).

pub mod credentials;
pub mod storage;
