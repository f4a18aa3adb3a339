use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use super::classifier::RegionClassifier;
use super::types::RegionClassification;

/// Picks the address used for region classification.
///
/// With `trust_forwarded` set, the first `X-Forwarded-For` hop wins, then
/// `X-Real-IP`; otherwise (or when neither header is usable) the socket peer.
pub fn resolve_client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = real_ip {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}

/// Region classifier plus the policy for finding the caller's address.
///
/// Proxy headers are only read when `trust_forwarded_for` is set, and, if a
/// trusted proxy list is configured, only when the socket peer is on it.
/// Otherwise a client could name any address and skip moderation.
#[derive(Clone)]
pub struct GeoGate {
    classifier: Arc<dyn RegionClassifier>,
    trust_forwarded_for: bool,
    trusted_proxies: Arc<[IpAddr]>,
}

impl GeoGate {
    pub fn new(classifier: Arc<dyn RegionClassifier>, trust_forwarded_for: bool) -> Self {
        Self {
            classifier,
            trust_forwarded_for,
            trusted_proxies: Arc::from(Vec::new()),
        }
    }

    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Arc::from(proxies);
        self
    }

    /// Whether proxy headers sent by `peer` are believed.
    pub fn trusts(&self, peer: SocketAddr) -> bool {
        self.trust_forwarded_for
            && (self.trusted_proxies.is_empty() || self.trusted_proxies.contains(&peer.ip()))
    }

    pub fn classify_request(&self, headers: &HeaderMap, peer: SocketAddr) -> RegionClassification {
        let client_ip = resolve_client_ip(headers, peer, self.trusts(peer));
        let region = self.classifier.classify(&client_ip);
        tracing::debug!("Caller {} classified as {:?}", client_ip, region);
        region
    }
}
