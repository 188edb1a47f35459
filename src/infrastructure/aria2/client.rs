use super::daemon::ensure_daemon;
use super::status::StatusEntry;
use crate::config::settings::AppConfig;
use super::{DownloadView, RemoteDownloads};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RPC_ID: &str = "cloudtorrent";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[allow(dead_code)]
    code: i64,
    message: String,
}

/// JSON-RPC client for an aria2 daemon.
#[derive(Clone)]
pub struct Aria2Client {
    http: reqwest::Client,
    endpoint: String,
    secret: Option<String>,
    available: bool,
}

impl Aria2Client {
    pub fn new(endpoint: &str, secret: Option<String>, available: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build aria2 HTTP client: {}", e))?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            secret,
            available,
        })
    }

    /// Probes (and possibly starts) the daemon, then fixes availability.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let available = ensure_daemon(config).await;
        Self::new(
            &config.aria2_rpc_url,
            config.aria2_secret.clone(),
            available,
        )
    }

    /// A client that refuses every call.
    pub fn disabled(endpoint: &str) -> Result<Self> {
        Self::new(endpoint, None, false)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        if !self.available {
            bail!("aria2 not available");
        }

        let mut all_params = Vec::with_capacity(params.len() + 1);
        if let Some(secret) = &self.secret {
            all_params.push(Value::String(format!("token:{}", secret)));
        }
        all_params.extend(params);

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: RPC_ID,
            method,
            params: all_params,
        };

        debug!(method = %method, "aria2 RPC call");
        let response: RpcResponse = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("aria2 request failed: {}", e))?
            .json()
            .await
            .map_err(|e| anyhow!("aria2 response unreadable: {}", e))?;

        if let Some(err) = response.error {
            bail!("aria2 error: {}", err.message);
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn tell(&self, method: &str, params: Vec<Value>) -> Result<Vec<DownloadView>> {
        let result = self.call(method, params).await?;
        let entries: Vec<StatusEntry> = serde_json::from_value(result)
            .map_err(|e| anyhow!("aria2 {} returned unexpected data: {}", method, e))?;
        Ok(entries.into_iter().map(DownloadView::from).collect())
    }
}

#[async_trait]
impl RemoteDownloads for Aria2Client {
    fn available(&self) -> bool {
        self.available
    }

    async fn add(&self, url: &str) -> Result<String> {
        let result = self.call("aria2.addUri", vec![json!([url])]).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("aria2 returned no gid"))
    }

    /// Active downloads are required; the waiting and stopped lists are
    /// best-effort.
    async fn list(&self) -> Result<Vec<DownloadView>> {
        let mut downloads = self.tell("aria2.tellActive", vec![]).await?;

        for (method, params) in [
            ("aria2.tellWaiting", vec![json!(0), json!(100)]),
            ("aria2.tellStopped", vec![json!(0), json!(20)]),
        ] {
            match self.tell(method, params).await {
                Ok(more) => downloads.extend(more),
                Err(e) => warn!("{} skipped: {}", method, e),
            }
        }

        Ok(downloads)
    }

    async fn pause(&self, gid: &str) -> Result<()> {
        self.call("aria2.pause", vec![json!(gid)]).await.map(|_| ())
    }

    async fn resume(&self, gid: &str) -> Result<()> {
        self.call("aria2.unpause", vec![json!(gid)]).await.map(|_| ())
    }

    async fn remove(&self, gid: &str) -> Result<()> {
        if let Err(e) = self.call("aria2.remove", vec![json!(gid)]).await {
            warn!(gid = %gid, "aria2.remove failed: {}. Retrying with forceRemove.", e);
            self.call("aria2.forceRemove", vec![json!(gid)]).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_refuses_calls() {
        let client = Aria2Client::disabled("http://localhost:6800/jsonrpc").unwrap();

        assert!(!client.available());
        let err = client.add("https://example.com/file.iso").await.unwrap_err();
        assert_eq!(err.to_string(), "aria2 not available");
        assert!(client.list().await.is_err());
    }

    #[test]
    fn request_shape_matches_json_rpc() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: RPC_ID,
            method: "aria2.addUri",
            params: vec![json!("token:s3cret"), json!(["https://example.com/a"])],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["params"][1][0], "https://example.com/a");
    }
}
