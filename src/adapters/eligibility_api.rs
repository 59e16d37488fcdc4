//! Client for the StakeStone claim-data endpoint

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use serde::Serialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ClaimerError, Result};

/// Body of a claim-data request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDataRequest {
    pub wallet_address: String,
    pub batch_id: String,
    pub signature: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EligibilityApi: Send + Sync {
    /// POST the request and return the decoded JSON body, whatever its status code
    async fn post_claim_data(&self, request: &ClaimDataRequest) -> Result<serde_json::Value>;
}

pub struct HttpEligibilityApi {
    http: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl HttpEligibilityApi {
    pub fn new(http: reqwest::Client, api: &ApiConfig) -> Result<Self> {
        Ok(Self {
            http,
            url: api.claim_url.clone(),
            headers: build_headers(api)?,
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClaimerError::Configuration(format!("Invalid {name} header: {e}")))
}

fn build_headers(api: &ApiConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, header_value("Origin", &api.origin)?);
    headers.insert(REFERER, header_value("Referer", &api.referer)?);
    headers.insert(USER_AGENT, header_value("User-Agent", &api.user_agent)?);
    Ok(headers)
}

#[async_trait]
impl EligibilityApi for HttpEligibilityApi {
    async fn post_claim_data(&self, request: &ClaimDataRequest) -> Result<serde_json::Value> {
        let response = self
            .http
            .post(&self.url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("claim-data responded {} for {}", status, request.wallet_address);

        serde_json::from_str(&body).map_err(|e| {
            ClaimerError::EligibilityService(format!(
                "Non-JSON response (status {status}): {e}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_request_uses_service_field_names() {
        let request = ClaimDataRequest {
            wallet_address: "0xabc".to_string(),
            batch_id: "0".to_string(),
            signature: "0xsig".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"walletAddress": "0xabc", "batchId": "0", "signature": "0xsig"})
        );
    }

    #[test]
    fn test_headers_carry_origin_and_referer() {
        let config = AppConfig::defaults().unwrap();
        let headers = build_headers(&config.api).unwrap();
        assert_eq!(headers[ORIGIN], "https://airdrop.stakestone.io");
        assert_eq!(headers[REFERER], "https://airdrop.stakestone.io/unified");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_bad_header_value_is_rejected() {
        let mut config = AppConfig::defaults().unwrap();
        config.api.origin = "bad\nvalue".to_string();
        assert!(build_headers(&config.api).is_err());
    }
}
