//! Serve the mock endpoint over TLS with client certificates required, the
//! way the real gateway does.

use std::io;
use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use crate::{router, MockState};

fn other(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

fn load_certs(path: &Path) -> io::Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| other(format!("{}: {e}", path.display())))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| other(format!("{}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(other(format!("no certificate in {}", path.display())));
    }
    Ok(certs)
}

/// Server identity from `cert`/`key`; clients must present a certificate
/// issued by a CA in `client_ca`.
pub fn server_config(cert: &Path, key: &Path, client_ca: &Path) -> io::Result<ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let chain = load_certs(cert)?;
    let key = PrivateKeyDer::from_pem_file(key).map_err(|e| other(format!("{}: {e}", key.display())))?;

    let mut roots = RootCertStore::empty();
    for ca in load_certs(client_ca)? {
        roots.add(ca).map_err(other)?;
    }
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()
        .map_err(other)?;

    ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(other)?
        .with_client_cert_verifier(verifier)
        .with_single_cert(chain, key)
        .map_err(other)
}

/// Like [`crate::run`], but every connection is a mutual-TLS handshake first.
pub async fn run_tls(listener: std::net::TcpListener, state: MockState, config: ServerConfig) -> io::Result<()> {
    listener.set_nonblocking(true)?;
    tracing::info!(addr = ?listener.local_addr()?, "serving pull funds endpoint over mTLS");
    axum_server::from_tcp_rustls(listener, RustlsConfig::from_config(Arc::new(config)))
        .serve(router(state).into_make_service())
        .await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../core/tests/fixtures")
            .join(name)
    }

    #[test]
    fn builds_from_fixture_material() {
        let config = server_config(&fixture("server.crt"), &fixture("server.key"), &fixture("ca.pem"));
        assert!(config.is_ok(), "{:?}", config.err());
    }

    #[test]
    fn key_of_another_certificate_is_refused() {
        let err = server_config(&fixture("server.crt"), &fixture("client.key"), &fixture("ca.pem")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_client_ca_is_an_error() {
        assert!(server_config(&fixture("server.crt"), &fixture("server.key"), &fixture("absent.pem")).is_err());
    }
}
