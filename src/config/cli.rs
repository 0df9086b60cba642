use crate::adapters::storage::spaces::SpacesConfig;
use crate::utils::error::{Result, StorageError};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

const SETUP_HELP: &str = "\
upspin-setupstorage-spaces is the second step in establishing an upspinserver.
It sets up DigitalOcean Spaces storage for your Upspin installation. You may skip
this step if you wish to store Upspin data on your server's local disk.
The first step is 'setupdomain' and the final step is 'setupserver'.

It updates the server configuration file in $where/$domain/ to use the given
space and region. Before running this command, make sure you have a
DigitalOcean account with a Spaces access key and secret.";

fn home_dir_join(parts: &[&str]) -> PathBuf {
    let mut path = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    for part in parts {
        path.push(part);
    }
    path
}

fn default_where_dir() -> PathBuf {
    home_dir_join(&["upspin", "deploy"])
}

fn default_server_dir() -> PathBuf {
    home_dir_join(&["upspin", "server"])
}

#[derive(Debug, Clone, Parser)]
#[command(name = "upspin-setupstorage-spaces")]
#[command(about = "Configure an Upspin server to store data in DigitalOcean Spaces")]
#[command(long_about = SETUP_HELP)]
#[command(override_usage = "upspin-setupstorage-spaces --domain <name> [--region <region>] [--root <path>] <bucket_name>")]
pub struct SetupArgs {
    /// Directory to store private configuration files
    #[arg(long = "where", value_name = "DIR", default_value_os_t = default_where_dir())]
    pub where_dir: PathBuf,

    /// Domain name for this Upspin installation
    #[arg(long, value_name = "NAME", default_value = "")]
    pub domain: String,

    /// Region of the space
    #[arg(long, default_value = "nyc3")]
    pub region: String,

    /// Path prefix inside the space
    #[arg(long, default_value = "")]
    pub root: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Name of the space (bucket)
    #[arg(value_name = "BUCKET_NAME")]
    pub bucket_names: Vec<String>,
}

impl SetupArgs {
    pub fn config_dir(&self) -> PathBuf {
        self.where_dir.join(&self.domain)
    }

    pub fn bucket_name(&self) -> Option<&str> {
        match self.bucket_names.as_slice() {
            [name] => Some(name.as_str()),
            _ => None,
        }
    }
}

impl Validate for SetupArgs {
    fn validate(&self) -> Result<()> {
        const OP: &str = "setupstorage-spaces";

        let bucket = self
            .bucket_name()
            .ok_or_else(|| StorageError::invalid(OP, "a single bucket name must be provided"))?;

        if self.domain.trim().is_empty() {
            return Err(StorageError::invalid(OP, "the --domain flag must be provided"));
        }

        // 與後端建構時相同的檢查，提早在設定階段回報錯誤
        SpacesConfig::new(&self.region, bucket)
            .with_root(&self.root)
            .validate()
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "upspinserver-spaces")]
#[command(about = "Upspin server storing data in DigitalOcean Spaces")]
pub struct ServeArgs {
    /// Directory containing serverconfig.json
    #[arg(long, value_name = "DIR", default_value_os_t = default_server_dir())]
    pub config_dir: PathBuf,

    /// Address for the HTTPS listener
    #[arg(long = "https", value_name = "ADDR", default_value = "0.0.0.0:443")]
    pub https_addr: String,

    /// TLS certificate (PEM); defaults to <config-dir>/cert.pem
    #[arg(long, value_name = "FILE")]
    pub tls_cert: Option<PathBuf>,

    /// TLS private key (PEM); defaults to <config-dir>/key.pem
    #[arg(long, value_name = "FILE")]
    pub tls_key: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl ServeArgs {
    pub fn cert_path(&self) -> PathBuf {
        self.tls_cert
            .clone()
            .unwrap_or_else(|| self.config_dir.join("cert.pem"))
    }

    pub fn key_path(&self) -> PathBuf {
        self.tls_key
            .clone()
            .unwrap_or_else(|| self.config_dir.join("key.pem"))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.https_addr.parse().map_err(|e| {
            StorageError::invalid(
                "upspinserver-spaces",
                format!("invalid --https address {:?}: {}", self.https_addr, e),
            )
        })
    }
}

impl Validate for ServeArgs {
    fn validate(&self) -> Result<()> {
        const OP: &str = "upspinserver-spaces";

        validation::validate_non_empty_string(OP, "config_dir", &self.config_dir.to_string_lossy())?;
        self.socket_addr()?;
        Ok(())
    }
}
