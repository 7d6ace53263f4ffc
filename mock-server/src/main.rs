use std::path::PathBuf;

use mock_server::{MockState, DEFAULT_PASSWORD, DEFAULT_USER_ID};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let user_id = std::env::var("MOCK_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_string());
    let password = std::env::var("MOCK_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    let state = MockState::new(&user_id, &password);

    let addr = format!("127.0.0.1:{port}");
    let tls_files = ["MOCK_TLS_CERT", "MOCK_TLS_KEY", "MOCK_CLIENT_CA"].map(|name| std::env::var(name).ok());
    if let [Some(cert), Some(key), Some(client_ca)] = tls_files {
        let config = mock_server::tls::server_config(
            &PathBuf::from(cert),
            &PathBuf::from(key),
            &PathBuf::from(client_ca),
        )?;
        let listener = std::net::TcpListener::bind(&addr)?;
        tracing::info!(%addr, %user_id, "mock pull funds endpoint listening (mTLS)");
        return mock_server::tls::run_tls(listener, state, config).await;
    }

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %user_id, "mock pull funds endpoint listening");
    mock_server::run(listener, state).await
}
