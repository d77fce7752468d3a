//! Package query parsing and resolution
//!
//! A query is a pending set of package keys plus a pending set of index
//! content keys. Resolution walks the descriptors in order and consumes
//! every key it matches, so each key resolves at most once and whatever
//! is left afterwards is the unresolved remainder.

use std::collections::BTreeSet;

use crate::key::{ContentKey, PackageKey};
use crate::package::PackageDescriptor;
use crate::{Error, Result};

/// Pending keys still waiting for a matching package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    package_keys: BTreeSet<PackageKey>,
    /// Upper-case hex
    content_keys: BTreeSet<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse query arguments
    ///
    /// - `p<hex>`: package key in hexadecimal
    /// - `P<dec>`: package key in decimal
    /// - `i<hex>`: index content key (any case)
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut query = Self::new();
        for arg in args {
            query.push_arg(arg.as_ref())?;
        }
        Ok(query)
    }

    fn push_arg(&mut self, arg: &str) -> Result<()> {
        let invalid = || Error::InvalidQuery(arg.to_string());
        let mut chars = arg.chars();
        let prefix = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();

        match prefix {
            'p' => {
                let key = PackageKey::from_str_radix(rest, 16).map_err(|_| invalid())?;
                self.add_package_key(key);
            }
            'P' => {
                let key = rest.parse::<PackageKey>().map_err(|_| invalid())?;
                self.add_package_key(key);
            }
            'i' => {
                if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                self.add_content_key_hex(rest);
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    pub fn add_package_key(&mut self, key: PackageKey) {
        self.package_keys.insert(key);
    }

    pub fn add_content_key(&mut self, key: &ContentKey) {
        self.content_keys.insert(key.to_hex());
    }

    /// Add a content key given as hex; case is normalized
    pub fn add_content_key_hex(&mut self, hex: &str) {
        self.content_keys.insert(hex.to_ascii_uppercase());
    }

    pub fn package_keys(&self) -> &BTreeSet<PackageKey> {
        &self.package_keys
    }

    pub fn content_keys(&self) -> &BTreeSet<String> {
        &self.content_keys
    }

    pub fn is_empty(&self) -> bool {
        self.package_keys.is_empty() && self.content_keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.package_keys.len() + self.content_keys.len()
    }

    /// Keys that no descriptor has matched yet, in argument form (`p<hex>`, `i<hex>`)
    pub fn unresolved(&self) -> Vec<String> {
        self.package_keys
            .iter()
            .map(|k| format!("p{:X}", k))
            .chain(self.content_keys.iter().map(|k| format!("i{}", k)))
            .collect()
    }

    /// Consume whichever of the descriptor's keys are pending
    fn take(&mut self, descriptor: &PackageDescriptor) -> Option<MatchedBy> {
        let by_package = self.package_keys.remove(&descriptor.package_key);
        let by_content = !self.content_keys.is_empty()
            && self.content_keys.remove(&descriptor.index_content_key.to_hex());

        match (by_package, by_content) {
            (true, true) => Some(MatchedBy::Both),
            (true, false) => Some(MatchedBy::PackageKey),
            (false, true) => Some(MatchedBy::ContentKey),
            (false, false) => None,
        }
    }
}

/// Which part of the query selected a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    PackageKey,
    ContentKey,
    Both,
}

/// A descriptor selected by a query
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub descriptor: &'a PackageDescriptor,
    pub matched_by: MatchedBy,
}

/// Match pending keys against descriptors in order
///
/// Matched keys are removed from `query`; scanning stops once nothing is pending.
pub fn resolve<'a>(query: &mut Query, descriptors: &'a [PackageDescriptor]) -> Vec<Resolved<'a>> {
    let mut matched = Vec::new();

    for descriptor in descriptors {
        if query.is_empty() {
            break;
        }

        if let Some(matched_by) = query.take(descriptor) {
            tracing::debug!(
                package_key = format_args!("{:016X}", descriptor.package_key),
                index = %descriptor.index_content_key,
                ?matched_by,
                "Resolved package"
            );
            matched.push(Resolved {
                descriptor,
                matched_by,
            });
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageIndex;

    fn ckey(last: u8) -> ContentKey {
        let mut bytes = [0u8; 16];
        bytes[15] = last;
        ContentKey::from_bytes(bytes)
    }

    fn descriptor(package_key: PackageKey, index: u8) -> PackageDescriptor {
        PackageDescriptor {
            package_key,
            index_content_key: ckey(index),
            index: PackageIndex {
                bundle_content_key: ckey(0xB0 | index),
            },
            records: Vec::new(),
        }
    }

    #[test]
    fn test_from_args() {
        let query = Query::from_args(["p1A", "P26", "iabcdef"]).unwrap();
        assert_eq!(query.package_keys().len(), 1);
        assert!(query.package_keys().contains(&26));
        assert!(query.content_keys().contains("ABCDEF"));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_from_args_rejects_unknown() {
        assert!(matches!(
            Query::from_args(["x123"]),
            Err(Error::InvalidQuery(arg)) if arg == "x123"
        ));
        assert!(Query::from_args([""]).is_err());
        assert!(Query::from_args(["pZZ"]).is_err());
        assert!(Query::from_args(["P12a"]).is_err());
        assert!(Query::from_args(["i"]).is_err());
        assert!(Query::from_args(["ixyz"]).is_err());
    }

    #[test]
    fn test_resolve_by_package_key_leaves_unknown_content_key() {
        let descriptors = vec![descriptor(1, 1), descriptor(2, 2), descriptor(3, 3)];
        let mut query = Query::new();
        query.add_package_key(2);
        query.add_content_key(&ckey(0x7F));

        let matched = resolve(&mut query, &descriptors);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].descriptor.package_key, 2);
        assert_eq!(matched[0].matched_by, MatchedBy::PackageKey);

        assert!(query.package_keys().is_empty());
        assert_eq!(query.content_keys().len(), 1);
        assert_eq!(
            query.unresolved(),
            vec![format!("i{}", ckey(0x7F).to_hex())]
        );
    }

    #[test]
    fn test_resolve_content_key_case_insensitive() {
        let descriptors = vec![descriptor(1, 0xAB)];
        let mut query = Query::new();
        query.add_content_key_hex(&ckey(0xAB).to_hex().to_lowercase());

        let matched = resolve(&mut query, &descriptors);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].matched_by, MatchedBy::ContentKey);
        assert!(query.is_empty());
    }

    #[test]
    fn test_resolve_both_keys_cleared_together() {
        let descriptors = vec![descriptor(5, 5)];
        let mut query = Query::new();
        query.add_package_key(5);
        query.add_content_key(&ckey(5));

        let matched = resolve(&mut query, &descriptors);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].matched_by, MatchedBy::Both);
        assert!(query.is_empty());
    }

    #[test]
    fn test_resolve_consumes_each_key_once() {
        // Two descriptors share a package key; only the first is selected
        let descriptors = vec![descriptor(9, 1), descriptor(9, 2), descriptor(4, 3)];
        let mut query = Query::from_args(["p9", "p4"]).unwrap();

        let matched = resolve(&mut query, &descriptors);
        let indexes: Vec<_> = matched
            .iter()
            .map(|m| m.descriptor.index_content_key)
            .collect();
        assert_eq!(indexes, vec![ckey(1), ckey(3)]);
        assert!(query.is_empty());
    }

    #[test]
    fn test_resolve_never_yields_descriptor_twice() {
        let descriptors: Vec<_> = (0..8).map(|i| descriptor(i, i as u8)).collect();
        let mut query = Query::new();
        for i in 0..8 {
            query.add_package_key(i);
            query.add_content_key(&ckey(i as u8));
        }
        query.add_package_key(100);

        let matched = resolve(&mut query, &descriptors);
        assert_eq!(matched.len(), 8);
        for (i, m) in matched.iter().enumerate() {
            assert_eq!(m.descriptor.package_key, i as u64);
            assert_eq!(m.matched_by, MatchedBy::Both);
        }

        // Only the absent key is left over
        assert_eq!(query.unresolved(), vec!["p64".to_string()]);
    }

    #[test]
    fn test_resolve_stops_when_query_empty() {
        let descriptors = vec![descriptor(1, 1), descriptor(1, 1)];
        let mut query = Query::from_args(["p1"]).unwrap();
        assert_eq!(resolve(&mut query, &descriptors).len(), 1);

        let mut empty = Query::new();
        assert!(resolve(&mut empty, &descriptors).is_empty());
    }
}
