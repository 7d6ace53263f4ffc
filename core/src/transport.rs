//! Mutual-TLS execution of `HttpRequest` values.
//!
//! # Design
//! `MutualTlsTransport::new` reads every piece of TLS material up front, so a
//! missing or malformed certificate, key or CA bundle fails with
//! `ApiError::Config` before any socket is opened. That includes material
//! that parses as PEM but that rustls would refuse at handshake time, such as
//! a version 1 certificate or a key that belongs to another certificate. The
//! agent trusts only the configured CA bundle and verifies the server unless
//! the test-only override is set. Status codes come back as data;
//! `VisaDirectClient` interprets them.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::RootCertStore;
use ureq::tls::{parse_pem, Certificate, ClientCert, PemItem, PrivateKey, RootCerts, TlsConfig};
use ureq::{Agent, RequestBuilder};

use crate::config::{CertificatePaths, ClientConfig};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a plain-data request and returns the plain-data response.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

pub struct MutualTlsTransport {
    agent: Agent,
}

impl std::fmt::Debug for MutualTlsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutualTlsTransport").finish_non_exhaustive()
    }
}

impl MutualTlsTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let material = TlsMaterial::load(&config.certificates)?;
        material.validate(&config.certificates)?;
        let material_ca_count = material.ca_certs.len();

        if config.danger_skip_server_verification {
            tracing::warn!("server certificate verification is DISABLED; test use only");
        }
        let base_url = config.environment.base_url();
        if !base_url.starts_with("https://") {
            tracing::warn!(base_url, "base URL is not HTTPS; client certificate will not be presented");
        }

        let tls_config = TlsConfig::builder()
            .client_cert(Some(ClientCert::new_with_certs(&material.client_chain, material.client_key)))
            .root_certs(RootCerts::new_with_certs(&material.ca_certs))
            .disable_verification(config.danger_skip_server_verification)
            .build();

        let agent = Agent::config_builder()
            .tls_config(tls_config)
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        tracing::debug!(ca_certs = material_ca_count, "mTLS client authentication enabled");

        Ok(Self { agent })
    }
}

impl Transport for MutualTlsTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = ?request.method, url = %request.url, "sending request");

        let builder = match request.method {
            HttpMethod::Post => with_headers(self.agent.post(&request.url), &request.headers),
        };
        let result = match &request.body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        // Drain the body on every status so the connection is released.
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        tracing::debug!(status, body = %String::from_utf8_lossy(&body), "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Client chain, its key, and the CA pool, parsed from PEM files.
struct TlsMaterial {
    client_chain: Vec<Certificate<'static>>,
    client_key: PrivateKey<'static>,
    ca_certs: Vec<Certificate<'static>>,
}

impl TlsMaterial {
    fn load(paths: &CertificatePaths) -> Result<Self, ApiError> {
        let client_chain = load_certificates(&paths.client_cert)?;
        let key_pem = read_pem(&paths.client_key)?;
        let client_key = PrivateKey::from_pem(&key_pem).map_err(|e| {
            ApiError::Config(format!("could not load private key {}: {e}", paths.client_key.display()))
        })?;
        let ca_certs = load_certificates(&paths.ca_cert)?;
        Ok(Self {
            client_chain,
            client_key,
            ca_certs,
        })
    }

    /// Put the material through the checks rustls applies when the agent
    /// first builds its TLS config: a usable CA pool, an X.509 v3 client
    /// certificate, and a key that belongs to it.
    fn validate(&self, paths: &CertificatePaths) -> Result<(), ApiError> {
        let mut roots = RootCertStore::empty();
        let (added, _) = roots
            .add_parsable_certificates(self.ca_certs.iter().map(|cert| CertificateDer::from(cert.der().to_vec())));
        if added == 0 {
            return Err(ApiError::Config(format!(
                "no usable CA certificate in {}",
                paths.ca_cert.display()
            )));
        }

        let chain: Vec<CertificateDer<'static>> = self
            .client_chain
            .iter()
            .map(|cert| CertificateDer::from(cert.der().to_vec()))
            .collect();
        let key = PrivateKeyDer::try_from(self.client_key.der())
            .map(|key| key.clone_key())
            .map_err(|e| {
                ApiError::Config(format!("unsupported private key {}: {e}", paths.client_key.display()))
            })?;

        rustls::ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| ApiError::Config(format!("TLS provider: {e}")))?
            .with_root_certificates(roots)
            .with_client_auth_cert(chain, key)
            .map_err(|e| {
                ApiError::Config(format!(
                    "client certificate {} rejected with key {}: {e}",
                    paths.client_cert.display(),
                    paths.client_key.display()
                ))
            })?;
        Ok(())
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ApiError> {
    fs::read(path).map_err(|e| ApiError::Config(format!("could not read {}: {e}", path.display())))
}

fn load_certificates(path: &Path) -> Result<Vec<Certificate<'static>>, ApiError> {
    let pem = read_pem(path)?;
    let certs = parse_pem(&pem)
        .filter_map(|item| match item {
            Ok(PemItem::Certificate(cert)) => Some(Ok(cert)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::Config(format!("could not parse {}: {e}", path.display())))?;
    if certs.is_empty() {
        return Err(ApiError::Config(format!("no certificate found in {}", path.display())));
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::Credentials;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    fn config(client_cert: PathBuf, client_key: PathBuf, ca_cert: PathBuf) -> ClientConfig {
        ClientConfig::new(
            Credentials::new("user_id", "user_password"),
            CertificatePaths {
                client_cert,
                client_key,
                ca_cert,
            },
        )
    }

    #[test]
    fn loads_fixture_material() {
        let cfg = config(fixture("client.crt"), fixture("client.key"), fixture("ca.pem"));
        assert!(MutualTlsTransport::new(&cfg).is_ok());
    }

    #[test]
    fn plain_http_base_url_is_allowed_for_stand_ins() {
        let cfg = config(fixture("client.crt"), fixture("client.key"), fixture("ca.pem"))
            .with_environment(crate::config::Environment::Custom("http://127.0.0.1:3000".to_string()));
        assert!(MutualTlsTransport::new(&cfg).is_ok());
    }

    #[test]
    fn missing_client_certificate_is_config_error() {
        let cfg = config(fixture("absent.crt"), fixture("client.key"), fixture("ca.pem"));
        let err = MutualTlsTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("absent.crt")));
    }

    #[test]
    fn missing_ca_bundle_is_config_error() {
        let cfg = config(fixture("client.crt"), fixture("client.key"), fixture("absent-ca.pem"));
        let err = MutualTlsTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("absent-ca.pem")));
    }

    #[test]
    fn key_file_without_certificate_is_config_error() {
        // A private key is valid PEM but carries no certificate.
        let cfg = config(fixture("client.key"), fixture("client.key"), fixture("ca.pem"));
        let err = MutualTlsTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("no certificate")));
    }

    #[test]
    fn key_from_another_certificate_is_config_error() {
        let cfg = config(fixture("client.crt"), fixture("other-client.key"), fixture("ca.pem"));
        let err = MutualTlsTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("rejected")), "{err}");
    }

    #[test]
    fn version_1_client_certificate_is_config_error() {
        let cfg = config(fixture("client-v1.crt"), fixture("client.key"), fixture("ca.pem"));
        let err = MutualTlsTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("rejected")), "{err}");
    }

    #[test]
    fn certificate_in_place_of_key_is_config_error() {
        let cfg = config(fixture("client.crt"), fixture("client.crt"), fixture("ca.pem"));
        let err = MutualTlsTransport::new(&cfg).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("private key")));
    }
}
