//! Read-only HTTPS front for a dialed storage backend.

pub mod tls;

use crate::config::server_config::ServerConfig;
use crate::core::registry::StorageRegistry;
use crate::domain::ports::Storage;
use crate::utils::error::{ErrorKind, Result, StorageError};
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::future::Future;
use std::io;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tower::Service;

pub type SharedStorage = Arc<dyn Storage>;

/// Reads `serverconfig.json` from `config_dir` and dials the configured backend.
pub fn open_storage<P: AsRef<FsPath>>(
    registry: &StorageRegistry,
    config_dir: P,
) -> Result<SharedStorage> {
    let config = ServerConfig::read_from_dir(config_dir)?;
    let (backend, opts) = config.store_backend()?;
    let storage = registry.dial(&backend, &opts)?;
    Ok(Arc::from(storage))
}

pub fn create_router(storage: SharedStorage) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/linkbase", get(link_base))
        .route("/refs/{*reference}", get(download))
        .with_state(storage)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn link_base(State(storage): State<SharedStorage>) -> String {
    storage.link_base()
}

async fn download(
    State(storage): State<SharedStorage>,
    Path(reference): Path<String>,
) -> std::result::Result<Vec<u8>, ApiError> {
    let data = storage.download(&reference).await?;
    Ok(data)
}

pub struct ApiError(StorageError);

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Invalid => StatusCode::BAD_REQUEST,
            ErrorKind::Io => StatusCode::BAD_GATEWAY,
        };
        tracing::error!("❌ request failed ({}): {}", status, self.0);
        (status, self.0.to_string()).into_response()
    }
}

/// Accepts TLS connections on `listener` until `shutdown` resolves, then
/// lets in-flight requests finish before returning.
pub async fn serve_https<F>(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    app: Router,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    serve_with(
        listener,
        move |tcp| {
            let acceptor = acceptor.clone();
            async move { acceptor.accept(tcp).await }
        },
        app,
        shutdown,
    )
    .await
}

/// Plain HTTP variant of [`serve_https`], for use behind a TLS-terminating proxy.
pub async fn serve_http<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    serve_with(listener, |tcp| async move { Ok::<_, io::Error>(tcp) }, app, shutdown).await
}

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

async fn serve_with<H, HFut, S, F>(
    listener: TcpListener,
    handshake: H,
    app: Router,
    shutdown: F,
) -> anyhow::Result<()>
where
    H: Fn(TcpStream) -> HFut,
    HFut: Future<Output = io::Result<S>> + Send + 'static,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let (draining_tx, draining_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    loop {
        let (tcp, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    // 例如 EMFILE：稍候再試，避免空轉
                    tracing::warn!("accept failed: {}", e);
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            },
            _ = &mut shutdown => break,
        };

        let handshake = handshake(tcp);
        let app = app.clone();
        let mut draining = draining_rx.clone();
        connections.spawn(async move {
            let stream = match handshake.await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::debug!(%peer, "handshake failed: {}", e);
                    return;
                }
            };

            let service = hyper::service::service_fn(move |request: Request<Incoming>| {
                app.clone().call(request)
            });

            let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
            let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let mut shutting_down = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(e) = result {
                            tracing::debug!(%peer, "connection closed with error: {}", e);
                        }
                        break;
                    }
                    _ = draining.changed(), if !shutting_down => {
                        shutting_down = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        });

        while connections.try_join_next().is_some() {}
    }

    drop(listener);
    let _ = draining_tx.send(true);
    tracing::info!(
        "Waiting for {} open connection(s) to finish",
        connections.len()
    );
    while connections.join_next().await.is_some() {}

    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
}
