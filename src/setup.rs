//! The `setupstorage-spaces` command: points an existing server config at a Spaces bucket.

use crate::config::cli::SetupArgs;
use crate::config::server_config::ServerConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// Validates `args`, then rewrites `StoreConfig` in `<where>/<domain>/serverconfig.json`.
/// The config file must already exist.
pub fn run(args: &SetupArgs) -> Result<()> {
    args.validate()?;

    let cfg_path = args.config_dir();
    let bucket = args.bucket_name().unwrap_or_default();

    let mut cfg = ServerConfig::read_from_dir(&cfg_path)?;
    cfg.set_spaces_store(bucket, &args.region, &args.root);
    cfg.write_to_dir(&cfg_path)?;

    tracing::info!(
        "✅ Server config in {} now stores data in space {:?} ({})",
        cfg_path.display(),
        bucket,
        args.region
    );
    Ok(())
}
