//! TLS setup for the HTTPS listener.
//!
//! Certificates and keys are PEM files. The private key may be PKCS#8,
//! PKCS#1 (RSA) or SEC1 (EC).

use anyhow::{Context, Result};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::info;

/// Load certificates from a PEM file
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open certificate file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse certificates from: {}", path.display()))?;

    if certs.is_empty() {
        anyhow::bail!("No certificates found in: {}", path.display());
    }

    Ok(certs)
}

/// Load private key from a PEM file
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open private key file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    match rustls_pemfile::private_key(&mut reader)
        .with_context(|| format!("Failed to parse private key from: {}", path.display()))?
    {
        Some(key) => Ok(key),
        None => anyhow::bail!("No private key found in: {}", path.display()),
    }
}

pub fn create_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor> {
    info!("Loading TLS certificate from: {}", cert_path.display());
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    // 明確指定 crypto provider，避免與 S3 client 的 rustls 設定互相衝突
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let mut server_config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .context("Failed to select TLS protocol versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("Failed to build TLS server config")?;

    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_certificate_file() {
        let dir = TempDir::new().unwrap();
        let err = load_certs(&dir.path().join("cert.pem")).unwrap_err();
        assert!(err.to_string().contains("Failed to open certificate file"));
    }

    #[test]
    fn test_empty_pem_files() {
        let dir = TempDir::new().unwrap();
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        std::fs::write(&cert, "").unwrap();
        std::fs::write(&key, "").unwrap();

        assert!(load_certs(&cert)
            .unwrap_err()
            .to_string()
            .contains("No certificates found"));
        assert!(load_private_key(&key)
            .unwrap_err()
            .to_string()
            .contains("No private key found"));
        assert!(create_tls_acceptor(&cert, &key).is_err());
    }
}
