//! Connectivity check performed before any request is dispatched.

use std::time::Duration;

use async_trait::async_trait;
use tokio::{net::TcpStream, time::timeout};

#[async_trait]
pub trait NetworkStatus: Send + Sync {
    async fn is_available(&self) -> bool;
}

/// Fixed answer; `StaticNetworkStatus(false)` forces offline behavior.
#[derive(Debug, Clone, Copy)]
pub struct StaticNetworkStatus(pub bool);

#[async_trait]
impl NetworkStatus for StaticNetworkStatus {
    async fn is_available(&self) -> bool {
        self.0
    }
}

/// Reports the network as available when a TCP connection to `host:port`
/// opens within the deadline.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    deadline: Duration,
}

impl TcpProbe {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            deadline: Self::DEFAULT_DEADLINE,
        }
    }

    /// Probe the host and port a provider base URL points at.
    pub fn for_base_url(base_url: &str) -> Option<Self> {
        let url = reqwest::Url::parse(base_url).ok()?;
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(Self::new(host, port))
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl NetworkStatus for TcpProbe {
    async fn is_available(&self) -> bool {
        match timeout(self.deadline, TcpStream::connect(self.addr.as_str())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(addr = %self.addr, error = %e, "connectivity probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(addr = %self.addr, "connectivity probe timed out");
                false
            }
        }
    }
}
