//! Surname-bucketed name lookup.

use std::collections::HashMap;

use super::matcher::matches;
use super::normalize::{normalize, surname_key};

/// Lookup table from raw names to values.
///
/// Exact hits go through the normalized key; fuzzy lookups only scan the
/// bucket of entries sharing the query's surname, in insertion order.
#[derive(Debug, Clone)]
pub struct NameIndex<T> {
    entries: Vec<(String, T)>,
    by_key: HashMap<String, usize>,
    by_surname: HashMap<String, Vec<usize>>,
}

impl<T> Default for NameIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
            by_surname: HashMap::new(),
        }
    }
}

impl<T> NameIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a raw name.
    ///
    /// The first entry for a normalized key keeps the exact slot; later
    /// duplicates are still reachable through the surname bucket.
    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        let key = normalize(&name);
        let idx = self.entries.len();
        if !key.is_empty() {
            self.by_key.entry(key).or_insert(idx);
        }
        let surname = surname_key(&name);
        if !surname.is_empty() {
            self.by_surname.entry(surname).or_default().push(idx);
        }
        self.entries.push((name, value));
    }

    /// Exact lookup by normalized key.
    pub fn get_exact(&self, name: &str) -> Option<(&str, &T)> {
        let idx = *self.by_key.get(&normalize(name))?;
        let (raw, value) = &self.entries[idx];
        Some((raw.as_str(), value))
    }

    /// Exact lookup, then the first matcher hit within the surname bucket.
    pub fn find(&self, name: &str) -> Option<(&str, &T)> {
        self.get_exact(name).or_else(|| self.find_fuzzy(name))
    }

    /// Matcher-only lookup within the surname bucket.
    pub fn find_fuzzy(&self, name: &str) -> Option<(&str, &T)> {
        self.by_surname
            .get(&surname_key(name))?
            .iter()
            .map(|&idx| &self.entries[idx])
            .find(|(raw, _)| matches(raw, name))
            .map(|(raw, value)| (raw.as_str(), value))
    }

    /// Whether any entry matches the name.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(raw, value)| (raw.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_key.clear();
        self.by_surname.clear();
    }
}

impl<S: Into<String>, T> FromIterator<(S, T)> for NameIndex<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (name, value) in iter {
            index.insert(name, value);
        }
        index
    }
}
