pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "cli")]
pub mod setup;
pub mod utils;

pub use adapters::credentials::{EnvCredentials, StaticCredentials};
pub use adapters::storage::{SpacesConfig, SpacesStorage};
pub use config::ServerConfig;
pub use core::registry::StorageRegistry;
pub use domain::model::{Credentials, Opts};
pub use domain::ports::{CredentialProvider, Storage};
pub use utils::error::{ErrorKind, Result, StorageError};
