//! Entity registry: the authoritative set of report ids introduced so
//! far. Monotonic within a session; deleted entities stay registered so
//! later idempotent events referencing them are accepted as no-ops.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    ids: HashSet<String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an id. Re-introducing a known id is a no-op, not an
    /// error: some stages legitimately re-announce.
    pub fn introduce(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Full reset. Only a session `load()` may call this.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn introduce_is_idempotent() {
        let mut registry = EntityRegistry::new();
        registry.introduce("1");
        registry.introduce("1");
        assert_eq!(1, registry.len());
        assert!(registry.contains("1"));
    }

    #[test]
    fn membership_is_monotonic() {
        let mut registry = EntityRegistry::new();
        registry.introduce("1");
        registry.introduce("2");
        // Nothing short of a full reset removes an id.
        assert!(registry.contains("1"));
        assert!(registry.contains("2"));
        assert!(!registry.contains("3"));
    }

    #[test]
    fn clear_empties_the_set() {
        let mut registry = EntityRegistry::new();
        registry.introduce("1");
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains("1"));
    }
}
