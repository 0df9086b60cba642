use crate::adapters::storage::spaces::{self, NAME_OPT, REGION_OPT, ROOT_OPT};
use crate::domain::model::Opts;
use crate::utils::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SERVER_CONFIG_FILE: &str = "serverconfig.json";

/// Option key that selects the storage backend by registry name.
pub const BACKEND_OPT: &str = "backend";

/// Error op reported when `serverconfig.json` cannot be read or parsed.
pub const READ_OP: &str = "config.ReadServerConfig";

/// Persisted server configuration. Fields this crate does not know about are
/// kept as-is so that rewriting the file never loses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "Addr", default)]
    pub addr: String,

    #[serde(rename = "User", default)]
    pub user: String,

    #[serde(rename = "StoreConfig", default)]
    pub store_config: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerConfig {
    pub fn path_in<P: AsRef<Path>>(dir: P) -> PathBuf {
        dir.as_ref().join(SERVER_CONFIG_FILE)
    }

    /// 從設定目錄讀取 serverconfig.json
    pub fn read_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        const OP: &str = READ_OP;

        let path = Self::path_in(dir);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            StorageError::io(OP, format!("unable to read {}", path.display()), e)
        })?;

        serde_json::from_str(&content).map_err(|e| {
            StorageError::invalid(OP, format!("unable to parse {}: {}", path.display(), e))
        })
    }

    /// 寫回 serverconfig.json（保留未知欄位）
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        const OP: &str = "config.WriteServerConfig";

        let path = Self::path_in(dir);
        let mut content = serde_json::to_string_pretty(self).map_err(|e| {
            StorageError::invalid(OP, format!("unable to encode server config: {}", e))
        })?;
        content.push('\n');

        std::fs::write(&path, content).map_err(|e| {
            StorageError::io(OP, format!("unable to write {}", path.display()), e)
        })?;

        tracing::debug!(path = %path.display(), "server config written");
        Ok(())
    }

    /// Points the store at a Spaces bucket, replacing any previous store config.
    pub fn set_spaces_store(&mut self, name: &str, region: &str, root: &str) {
        self.store_config = vec![
            format!("{}={}", BACKEND_OPT, spaces::BACKEND_NAME),
            format!("{}={}", NAME_OPT, name),
            format!("{}={}", REGION_OPT, region),
            format!("{}={}", ROOT_OPT, root),
        ];
    }

    /// Parses `store_config` lines into dial options.
    pub fn store_opts(&self) -> Result<Opts> {
        const OP: &str = "config.StoreOpts";

        Opts::from_lines(&self.store_config).ok_or_else(|| {
            StorageError::invalid(OP, "store config lines must be of the form key=value")
        })
    }

    /// Backend name plus options, ready for `StorageRegistry::dial`.
    pub fn store_backend(&self) -> Result<(String, Opts)> {
        const OP: &str = "config.StoreOpts";

        let opts = self.store_opts()?;
        let backend = opts
            .get(BACKEND_OPT)
            .cloned()
            .ok_or_else(|| StorageError::invalid(OP, format!("{:?} option is required", BACKEND_OPT)))?;
        Ok((backend, opts))
    }
}
