//! Per-account client sets, optionally bound to the account's proxy

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use super::chain::{ChainClient, RpcChainClient};
use super::eligibility_api::{EligibilityApi, HttpEligibilityApi};
use crate::config::AppConfig;
use crate::error::{ClaimerError, Result};

/// Clients used by one account, dropped when the account is done
pub struct AccountSession {
    pub chain: Box<dyn ChainClient>,
    pub eligibility: Box<dyn EligibilityApi>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Check that `proxy` can reach the probe URL.
    /// Returns the proxy URL to use, or `None` to fall back to a direct connection.
    async fn probe_proxy(&self, proxy: &str) -> Option<String>;

    /// Build a fresh client set, routed through `proxy` when given
    fn open(&self, proxy: Option<String>) -> Result<AccountSession>;
}

/// `host:port` and `user:pass@host:port` become `http://…`; explicit schemes are kept
pub fn proxy_url(proxy: &str) -> String {
    let proxy = proxy.trim();
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}

/// Real sessions over reqwest
pub struct HttpSessionFactory {
    config: AppConfig,
}

impl HttpSessionFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn http_client(&self, proxy: Option<&str>, timeout: Duration) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url(proxy)).map_err(|e| {
                ClaimerError::InvalidInput(format!("Invalid proxy {proxy}: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    async fn probe_proxy(&self, proxy: &str) -> Option<String> {
        let timeout = Duration::from_secs(self.config.proxy.probe_timeout_secs);
        let client = match self.http_client(Some(proxy), timeout) {
            Ok(client) => client,
            Err(e) => {
                warn!("Proxy {} rejected: {}", proxy, e);
                return None;
            }
        };

        match client.get(&self.config.proxy.probe_url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                debug!("Proxy {} is reachable", proxy);
                Some(proxy_url(proxy))
            }
            Ok(response) => {
                warn!("Proxy {} answered the probe with {}", proxy, response.status());
                None
            }
            Err(e) => {
                warn!("Proxy {} probe failed: {}", proxy, e);
                None
            }
        }
    }

    fn open(&self, proxy: Option<String>) -> Result<AccountSession> {
        let timeout = Duration::from_secs(self.config.api.request_timeout_secs);
        let http = self.http_client(proxy.as_deref(), timeout)?;

        let chain = RpcChainClient::new(&self.config.network.rpc_url, http.clone())?;
        let eligibility = HttpEligibilityApi::new(http, &self.config.api)?;

        Ok(AccountSession {
            chain: Box::new(chain),
            eligibility: Box::new(eligibility),
        })
    }
}
