/*
    table.rs - Key/value entries scoped per namespace

    Keys are unique within their owning namespace only. Namespace existence
    is the registry's concern; this table just holds whatever it is given.
*/

use super::namespace::NamespaceId;
use std::collections::{BTreeMap, HashMap};

/// Entries grouped by owning namespace
#[derive(Debug, Default)]
pub struct KeyValueTable {
    namespaces: HashMap<NamespaceId, BTreeMap<String, String>>,
    entry_count: usize,
}

impl KeyValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, namespace: NamespaceId, key: &str) -> Option<&String> {
        self.namespaces.get(&namespace)?.get(key)
    }

    /// Insert or overwrite, returning the previous value
    pub fn insert(&mut self, namespace: NamespaceId, key: String, value: String) -> Option<String> {
        let previous = self.namespaces.entry(namespace).or_default().insert(key, value);
        if previous.is_none() {
            self.entry_count += 1;
        }
        previous
    }

    /// Remove an entry, returning its value. The namespace's bucket stays in
    /// place even when it becomes empty.
    pub fn remove(&mut self, namespace: NamespaceId, key: &str) -> Option<String> {
        let removed = self.namespaces.get_mut(&namespace)?.remove(key);
        if removed.is_some() {
            self.entry_count -= 1;
        }
        removed
    }

    /// Number of entries across all namespaces
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Number of entries in one namespace
    pub fn namespace_len(&self, namespace: NamespaceId) -> usize {
        self.namespaces.get(&namespace).map_or(0, BTreeMap::len)
    }

    /// Every entry as (namespace, key, value), in no particular namespace order
    pub fn entries(&self) -> impl Iterator<Item = (NamespaceId, &str, &str)> {
        self.namespaces.iter().flat_map(|(ns, entries)| {
            entries.iter().map(move |(k, v)| (*ns, k.as_str(), v.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::namespace::{NamespacePath, NamespaceRegistry};

    fn two_namespaces() -> (NamespaceId, NamespaceId) {
        let mut registry = NamespaceRegistry::new();
        let (a, _) = registry.ensure(&NamespacePath::parse("a").unwrap());
        let (b, _) = registry.ensure(&NamespacePath::parse("b").unwrap());
        (a, b)
    }

    #[test]
    fn test_insert_get_overwrite() {
        let (a, _) = two_namespaces();
        let mut table = KeyValueTable::new();

        assert_eq!(table.insert(a, "k".into(), "1".into()), None);
        assert_eq!(table.get(a, "k").map(String::as_str), Some("1"));

        assert_eq!(table.insert(a, "k".into(), "2".into()), Some("1".to_string()));
        assert_eq!(table.get(a, "k").map(String::as_str), Some("2"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_keys_scoped_per_namespace() {
        let (a, b) = two_namespaces();
        let mut table = KeyValueTable::new();

        table.insert(a, "k".into(), "in-a".into());
        table.insert(b, "k".into(), "in-b".into());

        assert_eq!(table.get(a, "k").map(String::as_str), Some("in-a"));
        assert_eq!(table.get(b, "k").map(String::as_str), Some("in-b"));
        assert_eq!(table.len(), 2);

        table.remove(a, "k");
        assert!(table.get(a, "k").is_none());
        assert_eq!(table.get(b, "k").map(String::as_str), Some("in-b"));
    }

    #[test]
    fn test_remove_missing() {
        let (a, b) = two_namespaces();
        let mut table = KeyValueTable::new();
        table.insert(a, "k".into(), "v".into());

        assert_eq!(table.remove(a, "other"), None);
        assert_eq!(table.remove(b, "k"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_entries_iterates_everything() {
        let (a, b) = two_namespaces();
        let mut table = KeyValueTable::new();
        table.insert(a, "x".into(), "1".into());
        table.insert(a, "y".into(), "2".into());
        table.insert(b, "x".into(), "3".into());

        let mut entries: Vec<_> = table.entries().collect();
        entries.sort();
        assert_eq!(entries.len(), 3);
        assert_eq!(table.namespace_len(a), 2);
        assert_eq!(table.namespace_len(b), 1);
    }
}
