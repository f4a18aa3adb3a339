//! Geo Classification Tests
//!
//! ## Test Scopes
//! - **StaticRangeClassifier**: local/private handling, placeholder table, junk input.
//! - **RangeDbClassifier**: parsing, binary-search lookup, range edges.
//! - **resolve_client_ip**: header precedence.

#[cfg(test)]
mod tests {
    use crate::geo::{
        resolve_client_ip, GeoGate, RangeDbClassifier, RegionClassification, RegionClassifier,
        StaticRangeClassifier,
    };
    use crate::config::Config;
    use axum::http::{HeaderMap, HeaderValue};
    use std::net::SocketAddr;
    use std::sync::Arc;

    use RegionClassification::{Other, Restricted};

    // ============================================================
    // STATIC RANGE TABLE
    // ============================================================

    #[test]
    fn test_loopback_is_restricted() {
        let classifier = StaticRangeClassifier::new();

        assert_eq!(classifier.classify("127.0.0.1"), Restricted);
        assert_eq!(classifier.classify("::1"), Restricted);
        assert_eq!(classifier.classify("[::1]"), Restricted);
    }

    #[test]
    fn test_private_ranges_are_restricted() {
        let classifier = StaticRangeClassifier::new();

        for addr in ["10.1.2.3", "172.16.0.1", "172.31.255.255", "192.168.1.10"] {
            assert_eq!(classifier.classify(addr), Restricted, "{}", addr);
        }
        // just outside 172.16/12
        assert_eq!(classifier.classify("172.32.0.1"), Other);
    }

    #[test]
    fn test_placeholder_table() {
        let classifier = StaticRangeClassifier::new();

        assert_eq!(classifier.classify("1.2.3.4"), Restricted);
        assert_eq!(classifier.classify("100.255.0.1"), Restricted);
        assert_eq!(classifier.classify("101.0.0.1"), Other);
        assert_eq!(classifier.classify("203.0.113.7"), Other);
    }

    #[test]
    fn test_unparsable_addresses_are_other() {
        let classifier = StaticRangeClassifier::new();

        for addr in ["", "not-an-ip", "999.1.1.1", "1.2.3"] {
            assert_eq!(classifier.classify(addr), Other, "{:?}", addr);
        }
    }

    #[test]
    fn test_public_ipv6_is_other() {
        let classifier = StaticRangeClassifier::new();
        assert_eq!(classifier.classify("2001:db8::1"), Other);
    }

    #[test]
    fn test_addresses_with_ports_are_accepted() {
        let classifier = StaticRangeClassifier::new();

        assert_eq!(classifier.classify("8.8.8.8:443"), Restricted);
        assert_eq!(classifier.classify("[::1]:8080"), Restricted);
        assert_eq!(classifier.classify("203.0.113.7:80"), Other);
    }

    #[test]
    fn test_custom_octet_range() {
        let classifier = StaticRangeClassifier::with_first_octets(200..=210);

        assert_eq!(classifier.classify("205.1.1.1"), Restricted);
        assert_eq!(classifier.classify("8.8.8.8"), Other);
    }

    // ============================================================
    // RANGE DATABASE
    // ============================================================

    const SAMPLE_DB: &str = "\
# start,end,region
1.0.4.0,1.0.7.255,AU
1.0.1.0,1.0.3.255,CN
36.0.0.0,36.255.255.255,cn

garbage line
5.5.5.5,5.5.5.1,CN
8.8.8.0,8.8.8.255,US
";

    #[test]
    fn test_range_db_skips_comments_and_malformed_lines() {
        let db = RangeDbClassifier::parse(SAMPLE_DB);

        // 2 malformed (garbage + inverted), 1 comment, 1 blank
        assert_eq!(db.len(), 4);
    }

    #[test]
    fn test_range_db_lookup() {
        let db = RangeDbClassifier::parse(SAMPLE_DB);

        assert_eq!(db.classify("1.0.2.50"), Restricted);
        assert_eq!(db.classify("36.12.0.1"), Restricted, "region match is case-insensitive");
        assert_eq!(db.classify("1.0.5.1"), Other);
        assert_eq!(db.classify("8.8.8.8"), Other);
        assert_eq!(db.classify("9.9.9.9"), Other, "address outside every range");
    }

    #[test]
    fn test_range_db_edges_are_inclusive() {
        let db = RangeDbClassifier::parse(SAMPLE_DB);

        assert_eq!(db.classify("1.0.1.0"), Restricted);
        assert_eq!(db.classify("1.0.3.255"), Restricted);
        assert_eq!(db.classify("1.0.0.255"), Other);
    }

    #[test]
    fn test_range_db_still_restricts_local_addresses() {
        let db = RangeDbClassifier::parse("");

        assert!(db.is_empty());
        assert_eq!(db.classify("127.0.0.1"), Restricted);
        assert_eq!(db.classify("192.168.0.5"), Restricted);
        assert_eq!(db.classify("1.0.2.50"), Other);
    }

    #[test]
    fn test_range_db_missing_file_is_config_error() {
        let result = RangeDbClassifier::load(std::path::Path::new("/nonexistent/geo.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_classifiers_are_usable_as_trait_objects() {
        let classifiers: Vec<Box<dyn RegionClassifier>> = vec![
            Box::new(StaticRangeClassifier::new()),
            Box::new(RangeDbClassifier::parse(SAMPLE_DB)),
        ];

        for classifier in &classifiers {
            assert!(classifier.classify("10.0.0.1").is_restricted());
        }
    }

    // ============================================================
    // CLIENT ADDRESS RESOLUTION
    // ============================================================

    fn peer() -> SocketAddr {
        "203.0.113.9:51000".parse().unwrap()
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));

        assert_eq!(resolve_client_ip(&headers, peer(), true), "1.2.3.4");
    }

    #[test]
    fn test_real_ip_used_without_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("5.6.7.8"));

        assert_eq!(resolve_client_ip(&headers, peer(), true), "5.6.7.8");
    }

    #[test]
    fn test_headers_ignored_when_untrusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));

        assert_eq!(resolve_client_ip(&headers, peer(), false), "203.0.113.9");
        assert_eq!(resolve_client_ip(&HeaderMap::new(), peer(), true), "203.0.113.9");
    }

    #[test]
    fn test_geo_gate_classifies_forwarded_caller() {
        let gate = GeoGate::new(Arc::new(StaticRangeClassifier::new()), true);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("8.8.8.8"));

        // peer is public and outside the table, the forwarded caller is inside it
        assert_eq!(gate.classify_request(&headers, peer()), Restricted);
        assert_eq!(gate.classify_request(&HeaderMap::new(), peer()), Other);
    }

    #[test]
    fn test_geo_gate_untrusted_uses_peer() {
        let gate = GeoGate::new(Arc::new(StaticRangeClassifier::new()), false);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("8.8.8.8"));

        assert_eq!(gate.classify_request(&headers, peer()), Other);
    }

    #[test]
    fn test_default_gate_ignores_spoofed_forwarded_for() {
        // restricted caller claiming a public address outside the table
        let trust = Config::default().trust_forwarded_for;
        let gate = GeoGate::new(Arc::new(StaticRangeClassifier::new()), trust);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("200.1.1.1"));
        let restricted_peer: SocketAddr = "36.1.2.3:40000".parse().unwrap();

        assert_eq!(gate.classify_request(&headers, restricted_peer), Restricted);
    }

    #[test]
    fn test_forwarded_for_only_from_trusted_proxy() {
        let proxy: SocketAddr = "10.0.0.5:443".parse().unwrap();
        let stranger: SocketAddr = "36.1.2.3:40000".parse().unwrap();
        let gate = GeoGate::new(Arc::new(StaticRangeClassifier::new()), true)
            .with_trusted_proxies(vec![proxy.ip()]);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("200.1.1.1"));

        assert!(gate.trusts(proxy));
        assert!(!gate.trusts(stranger));
        assert_eq!(gate.classify_request(&headers, proxy), Other);
        assert_eq!(gate.classify_request(&headers, stranger), Restricted);
    }
}
