//! Department lookup over the "all employees" map.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::names::NameIndex;

/// Name → department index with memoized lookups.
///
/// The cache is keyed by the raw lookup string and dropped whenever the
/// index changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct DepartmentIndex {
    index: NameIndex<String>,
    cache: HashMap<String, Option<String>>,
}

impl From<BTreeMap<String, String>> for DepartmentIndex {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self {
            index: map.into_iter().collect(),
            cache: HashMap::new(),
        }
    }
}

impl DepartmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, department: impl Into<String>) {
        self.index.insert(name, department.into());
        self.cache.clear();
    }

    /// Replace the whole index.
    pub fn replace(&mut self, map: BTreeMap<String, String>) {
        self.index = map.into_iter().collect();
        self.cache.clear();
    }

    /// Department of the person matching `name` (exact key, then fuzzy).
    pub fn lookup(&mut self, name: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(name) {
            return hit.clone();
        }
        let found = self.index.find(name).map(|(_, dept)| dept.clone());
        self.cache.insert(name.to_string(), found.clone());
        found
    }

    pub fn cached_lookups(&self) -> usize {
        self.cache.len()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_and_fuzzy() {
        let mut departments: DepartmentIndex = serde_json::from_str(r#"{"Иванов Иван Петрович": "Цех 1"}"#).unwrap();
        assert_eq!(departments.lookup("иванов иван петрович").as_deref(), Some("Цех 1"));
        assert_eq!(departments.lookup("Иванов И.П.").as_deref(), Some("Цех 1"));
        assert_eq!(departments.lookup("Петров"), None);
        assert_eq!(departments.cached_lookups(), 3);
    }

    #[test]
    fn test_cache_invalidated_on_change() {
        let mut departments = DepartmentIndex::new();
        assert_eq!(departments.lookup("Петров П."), None);
        departments.insert("Петров Пётр", "Склад");
        assert_eq!(departments.cached_lookups(), 0);
        assert_eq!(departments.lookup("Петров П.").as_deref(), Some("Склад"));

        departments.replace(BTreeMap::new());
        assert_eq!(departments.lookup("Петров П."), None);
    }
}
