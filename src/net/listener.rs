//! TCP listener setup.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Invalid bind address {0:?}")]
    Address(String),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Binds the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|_| ListenerError::Address(config.bind_address.clone()))?;

    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}
