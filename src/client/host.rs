//! Host identity stamped onto messages.

use std::net::IpAddr;

/// Hostname reported by inline clients instead of a real lookup.
pub const SENTINEL_HOSTNAME: &str = "hostname-xxx";
/// Address reported by inline clients instead of a real lookup.
pub const SENTINEL_ADDR: &str = "192.168.1.1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    pub hostname: String,
    /// Space separated IPv4 addresses.
    pub addr: String,
}

impl HostIdentity {
    pub fn sentinel() -> Self {
        Self {
            hostname: SENTINEL_HOSTNAME.to_string(),
            addr: SENTINEL_ADDR.to_string(),
        }
    }

    /// Look up the local hostname and the IPv4 addresses it resolves to.
    ///
    /// The hostname comes from the kernel files on Linux, then the
    /// `hostname` command (macOS, BSD, Windows), then the `HOSTNAME` /
    /// `COMPUTERNAME` variables. Failures leave the corresponding field empty.
    pub async fn lookup() -> Self {
        let hostname = local_hostname().await.unwrap_or_default();
        let addr = if hostname.is_empty() {
            String::new()
        } else {
            resolve_ipv4(&hostname).await
        };
        Self { hostname, addr }
    }
}

async fn local_hostname() -> Option<String> {
    for path in ["/proc/sys/kernel/hostname", "/etc/hostname"] {
        if let Ok(content) = tokio::fs::read_to_string(path).await {
            let name = content.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    if let Some(name) = hostname_command().await {
        return Some(name);
    }
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

async fn hostname_command() -> Option<String> {
    match tokio::process::Command::new("hostname").output().await {
        Ok(output) if output.status.success() => first_line(&output.stdout),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "hostname command unavailable");
            None
        }
    }
}

fn first_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

async fn resolve_ipv4(hostname: &str) -> String {
    let addrs = match tokio::net::lookup_host((hostname, 0)).await {
        Ok(addrs) => addrs,
        Err(e) => {
            tracing::debug!(hostname = %hostname, error = %e, "Host address lookup failed");
            return String::new();
        }
    };

    let mut ipv4: Vec<String> = Vec::new();
    for addr in addrs {
        if let IpAddr::V4(ip) = addr.ip() {
            let ip = ip.to_string();
            if !ipv4.contains(&ip) {
                ipv4.push(ip);
            }
        }
    }
    ipv4.join(" ")
}
