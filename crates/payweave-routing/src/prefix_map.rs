use std::collections::HashMap;

/// A longest-prefix-match table keyed by ledger address prefixes.
///
/// Values are stored under string prefixes and looked up by full addresses:
/// `resolve` returns the value of the most specific prefix matching the
/// address. Specificity is kept in an explicit priority list ordered by
/// descending prefix length, with equal lengths ordered lexicographically
/// descending, so resolution is a scan for the first match. The empty
/// prefix `""` acts as a catch-all that matches every address but sits at
/// the very end of the list.
#[derive(Debug, Clone)]
pub struct PrefixMap<V> {
    /// Match priority: longest first, ties lexicographically greatest first.
    prefixes: Vec<String>,
    values: HashMap<String, V>,
}

impl<V> PrefixMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            prefixes: Vec::new(),
            values: HashMap::new(),
        }
    }

    /// Number of registered prefixes.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Returns true if no prefix is registered.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Registered prefixes in match-priority order.
    pub fn keys(&self) -> &[String] {
        &self.prefixes
    }

    /// Registered prefixes sorted lexicographically. Display order only,
    /// unrelated to match priority.
    pub fn prefixes(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.prefixes.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }

    /// Value registered under exactly `prefix`, with no prefix matching.
    pub fn get(&self, prefix: &str) -> Option<&V> {
        self.values.get(prefix)
    }

    /// Mutable access to the value registered under exactly `prefix`.
    pub fn get_mut(&mut self, prefix: &str) -> Option<&mut V> {
        self.values.get_mut(prefix)
    }

    /// Value of the most specific prefix matching `address`.
    ///
    /// An exact match wins outright; otherwise the first matching prefix in
    /// priority order wins, which is the longest one, and the
    /// lexicographically greatest among equally long ones.
    pub fn resolve(&self, address: &str) -> Option<&V> {
        if let Some(value) = self.values.get(address) {
            return Some(value);
        }
        self.prefixes
            .iter()
            .find(|prefix| address.starts_with(prefix.as_str()))
            .and_then(|prefix| self.values.get(prefix))
    }

    /// Register `value` under `prefix`, returning any displaced value.
    ///
    /// A fresh prefix is spliced into the priority list right before the
    /// first entry it outranks (shorter, or equally long but
    /// lexicographically less), keeping the list sorted without a rebuild.
    pub fn insert(&mut self, prefix: impl Into<String>, value: V) -> Option<V> {
        let prefix = prefix.into();
        let displaced = self.values.insert(prefix.clone(), value);
        if displaced.is_none() {
            let at = self.splice_position(&prefix);
            self.prefixes.insert(at, prefix);
        }
        displaced
    }

    /// Remove `prefix` and its value. Idempotent.
    pub fn remove(&mut self, prefix: &str) -> Option<V> {
        let removed = self.values.remove(prefix);
        if removed.is_some() {
            self.prefixes.retain(|existing| existing != prefix);
        }
        removed
    }

    /// Value under `prefix`, inserting `default()` first when absent.
    pub fn get_or_insert_with(&mut self, prefix: &str, default: impl FnOnce() -> V) -> &mut V {
        if !self.values.contains_key(prefix) {
            let at = self.splice_position(prefix);
            self.prefixes.insert(at, prefix.to_string());
        }
        self.values.entry(prefix.to_string()).or_insert_with(default)
    }

    /// Iterate `(prefix, value)` in match-priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.prefixes
            .iter()
            .filter_map(|prefix| self.values.get(prefix).map(|value| (prefix.as_str(), value)))
    }

    /// Iterate `(prefix, value)` with mutable values; order is unspecified.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.values
            .iter_mut()
            .map(|(prefix, value)| (prefix.as_str(), value))
    }

    fn splice_position(&self, prefix: &str) -> usize {
        self.prefixes
            .iter()
            .position(|existing| {
                existing.len() < prefix.len()
                    || (existing.len() == prefix.len() && existing.as_str() < prefix)
            })
            .unwrap_or(self.prefixes.len())
    }
}

impl<V> Default for PrefixMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
