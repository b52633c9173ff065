use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;
use sqlx::PgPool;

use crate::db;
use crate::db::logs::NewLogEntry;

/// Record one audit entry for a mutation that has already committed. The
/// mutation is never rolled back on a failed append; instead the caller gets
/// a warning string to attach to its response.
pub async fn record(pool: &PgPool, entry: NewLogEntry<'_>) -> Option<String> {
    match db::logs::append(pool, entry).await {
        Ok(_) => None,
        Err(e) => {
            tracing::error!("Failed to write audit entry: {e}");
            Some("operation succeeded but was not recorded in the audit log".to_string())
        }
    }
}

/// Resolve the client address for the audit trail. X-Forwarded-For is only
/// honored when the direct peer is a trusted proxy.
pub fn client_ip(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> Option<String> {
    let peer = peer_addr?;

    if !trusted_proxies.is_empty() && trusted_proxies.iter().any(|net| net.contains(&peer)) {
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            for ip_str in xff.split(',').map(|s| s.trim()) {
                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    if !trusted_proxies.iter().any(|net| net.contains(&ip)) {
                        return Some(ip.to_string());
                    }
                }
            }
        }
    }

    Some(peer.to_string())
}
