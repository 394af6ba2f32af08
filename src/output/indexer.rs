//
//  indexer.rs
//  IntegrationMap
//
//  Created by hak (tharun)
//

use serde_json::{Map, Value};
use std::collections::HashMap;

/// FQN ↔ integer ID mapping for the compact format.
///
/// IDs start at 1 and follow first-seen order. Asking twice for the same
/// FQN returns the same ID.
#[derive(Debug, Clone, Default)]
pub struct ComponentIndexer {
    ids: HashMap<String, u64>,
    fqns: Vec<String>,
}

impl ComponentIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_id(&mut self, fqn: &str) -> u64 {
        if let Some(&id) = self.ids.get(fqn) {
            return id;
        }
        self.fqns.push(fqn.to_string());
        let id = self.fqns.len() as u64;
        self.ids.insert(fqn.to_string(), id);
        id
    }

    /// ID of an already-indexed FQN.
    pub fn id_of(&self, fqn: &str) -> Option<u64> {
        self.ids.get(fqn).copied()
    }

    pub fn len(&self) -> usize {
        self.fqns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fqns.is_empty()
    }

    /// `{"1": "fqn", ...}`, the `idx` section.
    pub fn to_json_index(&self) -> Value {
        let mut index = Map::new();
        for (slot, fqn) in self.fqns.iter().enumerate() {
            index.insert((slot + 1).to_string(), Value::String(fqn.clone()));
        }
        Value::Object(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_idempotent_and_monotonic() {
        let mut indexer = ComponentIndexer::new();
        assert_eq!(indexer.get_or_create_id("a"), 1);
        assert_eq!(indexer.get_or_create_id("a.f"), 2);
        assert_eq!(indexer.get_or_create_id("a"), 1);
        assert_eq!(indexer.get_or_create_id("b"), 3);
        assert_eq!(indexer.len(), 3);

        assert_eq!(indexer.id_of("a.f"), Some(2));
        assert_eq!(indexer.id_of("missing"), None);
    }

    #[test]
    fn test_json_index() {
        let mut indexer = ComponentIndexer::new();
        indexer.get_or_create_id("pkg");
        indexer.get_or_create_id("pkg.mod");
        let index = indexer.to_json_index();
        assert_eq!(index["1"], "pkg");
        assert_eq!(index["2"], "pkg.mod");
    }
}
