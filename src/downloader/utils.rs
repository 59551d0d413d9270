// Helper functions shared by the backends and the interactive surface

use serde::{Deserialize, Serialize};
use std::net::TcpStream;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration as TokioDuration};

/// Network status information for the settings screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub proxy: Option<String>,
    pub mode: String, // "direct" or "proxy"
    pub external_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    ip: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimpleIp {
    ip: String,
}

/// Run command with timeout (shared by both backends)
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, String> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| format!("Failed to capture stdout from {}", program))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| format!("Failed to capture stderr from {}", program))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stdout: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stderr: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });

    let waited = timeout(TokioDuration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status =
                status_res.map_err(|e| format!("Failed to wait for {}: {}", program, e))?;
            let stdout = stdout_task
                .await
                .map_err(|e| format!("stdout task failed: {}", e))??;
            let stderr = stderr_task
                .await
                .map_err(|e| format!("stderr task failed: {}", e))??;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(format!("Timed out after {}s", timeout_secs))
        }
    }
}

/// Get the external IP address as seen by the platform. Used on the
/// settings screen so the user can tell whether their VPN/proxy is active
/// before scanning a channel.
pub async fn get_external_ip(proxy: Option<String>) -> Option<String> {
    let client_builder = reqwest::Client::builder().timeout(Duration::from_secs(10));

    let client = match proxy.as_deref() {
        Some(proxy_url) => match reqwest::Proxy::all(proxy_url) {
            Ok(p) => client_builder.proxy(p).build().ok()?,
            Err(e) => {
                log::warn!("invalid proxy URL {}: {}", proxy_url, e);
                return None;
            }
        },
        None => client_builder.build().ok()?,
    };

    let services = ["https://ipinfo.io/json", "https://api.ipify.org?format=json"];

    for service in services {
        match client.get(service).send().await {
            Ok(response) => {
                if let Ok(text) = response.text().await {
                    if let Ok(info) = serde_json::from_str::<IpInfoResponse>(&text) {
                        if let Some(ip) = info.ip {
                            return Some(match info.country {
                                Some(country) => format!("{} ({})", ip, country),
                                None => ip,
                            });
                        }
                    }
                    if let Ok(simple) = serde_json::from_str::<SimpleIp>(&text) {
                        return Some(simple.ip);
                    }
                }
            }
            Err(e) => {
                log::debug!("IP service {} failed: {}", service, e);
                continue;
            }
        }
    }

    None
}

/// Current network status: user proxy or auto-detected, plus external IP.
pub async fn get_network_status_info(user_proxy: Option<String>) -> NetworkStatus {
    let proxy = user_proxy.or_else(auto_detect_proxy);

    let mode = match &proxy {
        Some(_) => "proxy".to_string(),
        None => "direct".to_string(),
    };

    let external_ip = get_external_ip(proxy.clone()).await;

    NetworkStatus {
        proxy,
        mode,
        external_ip,
    }
}

/// Auto-detect a local SOCKS5 proxy on common ports.
pub fn auto_detect_proxy() -> Option<String> {
    if let Some(port) = detect_configured_socks_port() {
        log::debug!("found SOCKS5 port {} in local proxy config", port);
        return Some(format!("socks5h://127.0.0.1:{}", port));
    }

    let common_ports = [
        1080,  // Standard SOCKS5
        7890,  // Clash
        10808, // V2RayN
    ];

    for port in common_ports {
        if test_socks5_port(port) {
            log::debug!("found SOCKS5 on common port {}", port);
            return Some(format!("socks5h://127.0.0.1:{}", port));
        }
    }

    None
}

/// Read the SOCKS inbound port from a local proxy-client config, if any.
fn detect_configured_socks_port() -> Option<u16> {
    let config_path = dirs::home_dir()?.join(".config/xray/config.json");
    let content = std::fs::read_to_string(config_path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;

    for inbound in json["inbounds"].as_array()? {
        if inbound["protocol"].as_str() == Some("socks") {
            if let Some(port) = inbound["port"].as_u64() {
                return Some(port as u16);
            }
        }
    }

    None
}

fn test_socks5_port(port: u16) -> bool {
    let addr = format!("127.0.0.1:{}", port);
    match addr.parse() {
        Ok(addr) => TcpStream::connect_timeout(&addr, Duration::from_millis(200)).is_ok(),
        Err(_) => false,
    }
}
