use super::types::RegionClassification;
use crate::error::{GatewayError, Result};

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

/// Region code in a range database that marks an address as restricted.
pub const RESTRICTED_REGION_CODE: &str = "CN";

/// Capability for deciding the caller's region.
///
/// Implementations must be total: unparsable or unknown input classifies as
/// [`RegionClassification::Other`] rather than failing.
pub trait RegionClassifier: Send + Sync {
    fn classify(&self, addr: &str) -> RegionClassification;
}

/// Placeholder table: public IPv4 addresses whose first octet falls in
/// `first_octets` are restricted.
#[derive(Debug, Clone)]
pub struct StaticRangeClassifier {
    first_octets: std::ops::RangeInclusive<u8>,
}

impl StaticRangeClassifier {
    pub fn new() -> Self {
        Self { first_octets: 1..=100 }
    }

    pub fn with_first_octets(first_octets: std::ops::RangeInclusive<u8>) -> Self {
        Self { first_octets }
    }
}

impl Default for StaticRangeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionClassifier for StaticRangeClassifier {
    fn classify(&self, addr: &str) -> RegionClassification {
        let Some(ip) = parse_addr(addr) else {
            return RegionClassification::Other;
        };

        if is_local(&ip) {
            return RegionClassification::Restricted;
        }

        match ip {
            IpAddr::V4(v4) if self.first_octets.contains(&v4.octets()[0]) => {
                RegionClassification::Restricted
            }
            _ => RegionClassification::Other,
        }
    }
}

/// One contiguous block of addresses from the range database.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IpRange {
    start: u32,
    end: u32,
    restricted: bool,
}

/// Range-table classifier loaded from a geolocation export.
///
/// File format, one range per line:
///
/// ```text
/// # start,end,region
/// 1.0.1.0,1.0.3.255,CN
/// 1.0.4.0,1.0.7.255,AU
/// ```
#[derive(Debug, Clone, Default)]
pub struct RangeDbClassifier {
    ranges: Vec<IpRange>,
}

impl RangeDbClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("cannot read geo database {}: {}", path.display(), e))
        })?;
        let classifier = Self::parse(&contents);
        tracing::info!(
            "Loaded {} address ranges from {}",
            classifier.len(),
            path.display()
        );
        Ok(classifier)
    }

    /// Parses range lines, skipping comments and malformed entries.
    pub fn parse(contents: &str) -> Self {
        let mut ranges: Vec<IpRange> = contents
            .lines()
            .enumerate()
            .filter_map(|(line_no, line)| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let range = parse_range_line(line);
                if range.is_none() {
                    tracing::warn!("Skipping malformed geo range on line {}: {}", line_no + 1, line);
                }
                range
            })
            .collect();

        ranges.sort_by_key(|r| r.start);
        Self { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    fn lookup(&self, ip: Ipv4Addr) -> Option<&IpRange> {
        let needle = u32::from(ip);
        // Last range starting at or before the address.
        let idx = self.ranges.partition_point(|r| r.start <= needle);
        let candidate = self.ranges.get(idx.checked_sub(1)?)?;
        (needle <= candidate.end).then_some(candidate)
    }
}

impl RegionClassifier for RangeDbClassifier {
    fn classify(&self, addr: &str) -> RegionClassification {
        let Some(ip) = parse_addr(addr) else {
            return RegionClassification::Other;
        };

        if is_local(&ip) {
            return RegionClassification::Restricted;
        }

        match ip {
            IpAddr::V4(v4) => match self.lookup(v4) {
                Some(range) if range.restricted => RegionClassification::Restricted,
                _ => RegionClassification::Other,
            },
            IpAddr::V6(_) => RegionClassification::Other,
        }
    }
}

fn parse_range_line(line: &str) -> Option<IpRange> {
    let mut fields = line.split(',').map(str::trim);
    let start: Ipv4Addr = fields.next()?.parse().ok()?;
    let end: Ipv4Addr = fields.next()?.parse().ok()?;
    let region = fields.next()?;

    let (start, end) = (u32::from(start), u32::from(end));
    if start > end || region.is_empty() {
        return None;
    }

    Some(IpRange {
        start,
        end,
        restricted: region.eq_ignore_ascii_case(RESTRICTED_REGION_CODE),
    })
}

fn parse_addr(addr: &str) -> Option<IpAddr> {
    let addr = addr.trim();
    // Tolerate "[::1]" and "host:port" forms coming from headers.
    if let Ok(ip) = addr.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        return Some(ip);
    }
    addr.parse::<std::net::SocketAddr>().ok().map(|sa| sa.ip())
}

fn is_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.is_loopback() || v4.is_private(),
            None => v6.is_loopback(),
        },
    }
}
