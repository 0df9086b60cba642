use clap::Parser;
use spaces_store::adapters::storage::spaces;
use spaces_store::config::ServeArgs;
use spaces_store::server::{self, tls};
use spaces_store::utils::{logger, validation::Validate};
use spaces_store::{EnvCredentials, StorageRegistry};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();

    // 初始化日誌
    logger::init_server_logger(args.verbose, args.log_json);

    tracing::info!("Starting upspinserver-spaces");
    tracing::debug!("Server args: {:?}", args);

    // 驗證參數
    if let Err(e) = args.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    // 註冊後端並依設定檔撥號
    let registry = StorageRegistry::new();
    spaces::register(&registry, Arc::new(EnvCredentials::default()))?;

    let storage = match server::open_storage(&registry, &args.config_dir) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("❌ Unable to open storage: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };
    tracing::info!("📁 Objects are public under {}", storage.link_base());

    let acceptor = tls::create_tls_acceptor(&args.cert_path(), &args.key_path())?;
    let listener = tokio::net::TcpListener::bind(args.socket_addr()?).await?;
    tracing::info!("🔒 Listening on https://{}", listener.local_addr()?);

    let app = server::create_router(storage.clone());
    server::serve_https(listener, acceptor, app, server::shutdown_signal()).await?;

    storage.close();
    tracing::info!("✅ Server stopped");
    Ok(())
}
