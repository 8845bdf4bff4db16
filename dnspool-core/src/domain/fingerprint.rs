//! Change detection for resolved address sets.
//!
//! A resolution result is canonicalised by sorting the textual IP forms in
//! descending lexicographic order (string order, not numeric order) and the
//! fingerprint is those texts joined with `,`. Two lookups that return the
//! same addresses in any order therefore produce the same fingerprint.

use std::cmp::Reverse;
use std::fmt;
use std::net::IpAddr;

use crate::domain::endpoint::Endpoint;

/// Deterministic digest of a sorted address set.
///
/// The default value is the empty fingerprint, which is what a pool holds
/// before its first successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The fingerprint text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonically ordered resolution result and its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSet {
    addrs: Vec<IpAddr>,
    fingerprint: Fingerprint,
}

impl AddressSet {
    /// Canonicalise a raw lookup result.
    pub fn new(mut addrs: Vec<IpAddr>) -> Self {
        addrs.sort_by_cached_key(|ip| Reverse(ip.to_string()));

        let texts: Vec<String> = addrs.iter().map(IpAddr::to_string).collect();
        let fingerprint = Fingerprint(texts.join(","));

        Self { addrs, fingerprint }
    }

    /// Addresses in canonical order.
    pub fn addrs(&self) -> &[IpAddr] {
        &self.addrs
    }

    /// Fingerprint of this set.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Whether the lookup returned nothing.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Idle endpoints for every address, in canonical order.
    pub fn to_endpoints(&self, port: Option<&str>, version: u64) -> Vec<Endpoint> {
        self.addrs
            .iter()
            .map(|ip| Endpoint::from_ip(*ip, port, version))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ips(texts: &[&str]) -> Vec<IpAddr> {
        texts.iter().map(|t| t.parse().unwrap()).collect()
    }

    #[test]
    fn test_sorts_descending_by_text() {
        let set = AddressSet::new(ips(&["10.0.0.1", "10.0.0.3", "10.0.0.2"]));
        assert_eq!(set.fingerprint().as_str(), "10.0.0.3,10.0.0.2,10.0.0.1");
    }

    #[test]
    fn test_sort_is_lexicographic_not_numeric() {
        // Numerically 10.0.0.10 > 10.0.0.9, but "10.0.0.9" > "10.0.0.10" as text.
        let set = AddressSet::new(ips(&["10.0.0.10", "10.0.0.9", "9.1.1.1"]));
        assert_eq!(set.fingerprint().as_str(), "9.1.1.1,10.0.0.9,10.0.0.10");
    }

    #[test]
    fn test_mixed_families() {
        let set = AddressSet::new(ips(&["10.0.0.1", "fd00::1", "::1"]));
        assert_eq!(set.fingerprint().as_str(), "fd00::1,::1,10.0.0.1");
    }

    #[test]
    fn test_empty_set_has_default_fingerprint() {
        let set = AddressSet::new(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.fingerprint(), &Fingerprint::default());
    }

    #[test]
    fn test_to_endpoints_applies_port_and_version() {
        let set = AddressSet::new(ips(&["10.0.0.1", "10.0.0.2"]));
        let endpoints = set.to_endpoints(Some("443"), 7);
        let addresses: Vec<&str> = endpoints.iter().map(|e| e.address()).collect();
        assert_eq!(addresses, vec!["10.0.0.2:443", "10.0.0.1:443"]);
        assert!(endpoints.iter().all(|e| e.version() == 7 && e.busy() == 0));
    }

    proptest! {
        #[test]
        fn fingerprint_ignores_lookup_order(raw in proptest::collection::vec(any::<[u8; 4]>(), 0..16)) {
            let addrs: Vec<IpAddr> = raw.iter().map(|o| IpAddr::from(*o)).collect();
            let mut reversed = addrs.clone();
            reversed.reverse();

            prop_assert_eq!(
                AddressSet::new(addrs).fingerprint().clone(),
                AddressSet::new(reversed).fingerprint().clone()
            );
        }

        #[test]
        fn canonical_order_is_descending(raw in proptest::collection::vec(any::<[u8; 4]>(), 0..16)) {
            let set = AddressSet::new(raw.iter().map(|o| IpAddr::from(*o)).collect());
            let texts: Vec<String> = set.addrs().iter().map(IpAddr::to_string).collect();
            prop_assert!(texts.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
