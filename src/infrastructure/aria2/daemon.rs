use crate::config::settings::AppConfig;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const STARTUP_GRACE: Duration = Duration::from_secs(2);

/// Returns true when something accepts TCP connections on the RPC endpoint.
pub async fn probe_endpoint(endpoint: &str) -> bool {
    let Some(addr) = socket_address(endpoint) else {
        warn!("Invalid aria2 RPC URL: {}", endpoint);
        return false;
    };

    matches!(
        timeout(PROBE_TIMEOUT, TcpStream::connect(addr.as_str())).await,
        Ok(Ok(_))
    )
}

fn socket_address(endpoint: &str) -> Option<String> {
    let url = Url::parse(endpoint).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

/// Probes the daemon and, when allowed, launches a local `aria2c` with RPC
/// enabled. Returns the availability decided for the process lifetime.
pub async fn ensure_daemon(config: &AppConfig) -> bool {
    if probe_endpoint(&config.aria2_rpc_url).await {
        info!("✅ aria2 RPC reachable at {}", config.aria2_rpc_url);
        return true;
    }

    if !config.aria2_autostart {
        warn!("⚠️ aria2 not reachable and autostart disabled; downloads unavailable");
        return false;
    }

    let binary = match which::which("aria2c") {
        Ok(path) => path,
        Err(_) => {
            warn!("⚠️ aria2c not found in PATH; downloads unavailable");
            return false;
        }
    };

    let port = Url::parse(&config.aria2_rpc_url)
        .ok()
        .and_then(|u| u.port_or_known_default())
        .unwrap_or(6800);

    info!("🚀 Starting aria2c from {}", binary.display());
    let mut command = Command::new(&binary);
    command
        .args(daemon_args(config, port))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if let Err(e) = command.spawn() {
        warn!("⚠️ Failed to start aria2c: {}", e);
        return false;
    }

    sleep(STARTUP_GRACE).await;

    let reachable = probe_endpoint(&config.aria2_rpc_url).await;
    if reachable {
        info!("✅ aria2c started, RPC on port {}", port);
    } else {
        warn!("⚠️ aria2c started but RPC is still unreachable");
    }
    reachable
}

fn daemon_args(config: &AppConfig, port: u16) -> Vec<String> {
    let mut args = vec![
        "--enable-rpc".to_string(),
        "--rpc-listen-all=false".to_string(),
        format!("--rpc-listen-port={}", port),
        "--rpc-allow-origin-all=true".to_string(),
        "--max-concurrent-downloads=5".to_string(),
        "--max-connection-per-server=16".to_string(),
        "--split=16".to_string(),
        "--min-split-size=1M".to_string(),
        "--continue=true".to_string(),
        format!("--dir={}", config.download_root.display()),
    ];
    if let Some(secret) = &config.aria2_secret {
        args.push(format!("--rpc-secret={}", secret));
    }
    args
}
