//! Client Address
//!
//! Used only to annotate authentication logs; never for access decisions,
//! since forwarding headers are client controlled.

use std::net::IpAddr;

use http::HeaderMap;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Left-most `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    let header_ip = |name: &str, pick: fn(&str) -> Option<&str>| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(pick)
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
    };

    header_ip(FORWARDED_FOR, |v| v.split(',').next())
        .or_else(|| header_ip(REAL_IP, |v| Some(v)))
        .or(direct_ip)
}
