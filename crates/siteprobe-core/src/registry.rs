//! In-memory registry of probe targets.
//!
//! The registry is the authoritative set of targets. It keeps insertion
//! order for deterministic listing and enforces name uniqueness. It knows
//! nothing about persistence or metrics: callers persist and rebuild the
//! collector after a successful mutation.

use thiserror::Error;
use tracing::debug;

use crate::target::Target;

/// Errors returned by registry lookups and mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("target not found: {0}")]
    NotFound(String),

    #[error("target already exists: {0}")]
    Conflict(String),

    #[error("invalid target: {0}")]
    Invalid(String),
}

/// Ordered, name-unique collection of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    targets: Vec<Target>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a loaded target list, keeping its order.
    ///
    /// Fails on the first invalid or duplicate entry.
    pub fn from_targets(targets: Vec<Target>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for target in targets {
            registry.add(target)?;
        }
        Ok(registry)
    }

    /// All targets in insertion order.
    pub fn list(&self) -> &[Target] {
        &self.targets
    }

    /// Look up a target by name.
    pub fn find(&self, name: &str) -> Result<&Target, RegistryError> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append a new target. Names must be non-empty and unique.
    pub fn add(&mut self, target: Target) -> Result<(), RegistryError> {
        if target.name.trim().is_empty() {
            return Err(RegistryError::Invalid("name must not be empty".to_string()));
        }
        if self.contains(&target.name) {
            return Err(RegistryError::Conflict(target.name));
        }
        debug!(site = %target.name, address = %target.address, "target added");
        self.targets.push(target);
        Ok(())
    }

    /// Remove a target by name, returning it.
    pub fn remove(&mut self, name: &str) -> Result<Target, RegistryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let removed = self.targets.remove(index);
        debug!(site = %name, "target removed");
        Ok(removed)
    }

    /// Replace the address of an existing target in place.
    pub fn update(&mut self, name: &str, address: impl Into<String>) -> Result<(), RegistryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let target = &mut self.targets[index];
        target.address = address.into();
        debug!(site = %name, address = %target.address, "target updated");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn registry_of(pairs: &[(&str, &str)]) -> Registry {
        Registry::from_targets(
            pairs
                .iter()
                .map(|(name, address)| Target::new(*name, *address))
                .collect(),
        )
        .unwrap()
    }

    fn names(registry: &Registry) -> Vec<&str> {
        registry.list().iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut registry = registry_of(&[("a", "http://x")]);
        registry.add(Target::new("b", "http://y")).unwrap();
        assert_eq!(names(&registry), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn add_rejects_duplicate_name() {
        let mut registry = registry_of(&[("a", "http://x")]);
        let err = registry.add(Target::new("a", "http://other")).unwrap_err();
        assert_eq!(err, RegistryError::Conflict("a".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("a").unwrap().address, "http://x");
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut registry = Registry::new();
        let err = registry.add(Target::new("  ", "http://x")).unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn from_targets_rejects_duplicates() {
        let err = Registry::from_targets(vec![
            Target::new("a", "http://x"),
            Target::new("a", "http://y"),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::Conflict("a".to_string()));
    }

    #[test]
    fn names_stay_unique_across_mutations() {
        let mut registry = Registry::new();
        let ops: &[(&str, bool)] = &[
            ("a", true),
            ("b", true),
            ("a", true),
            ("a", false),
            ("a", true),
            ("c", true),
            ("b", false),
            ("b", true),
            ("b", true),
        ];
        for (name, is_add) in ops {
            if *is_add {
                let _ = registry.add(Target::new(*name, "http://x"));
            } else {
                let _ = registry.remove(name);
            }
            let unique: HashSet<&str> = names(&registry).into_iter().collect();
            assert_eq!(unique.len(), registry.len());
        }
        assert_eq!(names(&registry), vec!["a", "c", "b"]);
    }

    #[test]
    fn list_is_idempotent() {
        let registry = registry_of(&[("a", "http://x"), ("b", "http://y")]);
        assert_eq!(registry.list(), registry.list());
        assert_eq!(registry.list().to_vec(), registry.list().to_vec());
    }

    #[test]
    fn find_present_and_absent() {
        let registry = registry_of(&[("a", "http://x")]);
        assert_eq!(registry.find("a").unwrap().address, "http://x");
        assert_eq!(
            registry.find("z").unwrap_err(),
            RegistryError::NotFound("z".to_string())
        );
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut registry = registry_of(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let removed = registry.remove("b").unwrap();
        assert_eq!(removed, Target::new("b", "2"));
        assert_eq!(names(&registry), vec!["a", "c"]);
    }

    #[test]
    fn remove_absent_leaves_registry_unchanged() {
        let mut registry = registry_of(&[("a", "http://x"), ("b", "http://y")]);
        let before = registry.clone();
        let err = registry.remove("z").unwrap_err();
        assert_eq!(err, RegistryError::NotFound("z".to_string()));
        assert_eq!(registry, before);
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let mut registry = registry_of(&[("a", "http://x"), ("b", "http://y")]);
        registry.remove("a").unwrap();
        assert_eq!(names(&registry), vec!["b"]);
        assert_eq!(
            registry.remove("a").unwrap_err(),
            RegistryError::NotFound("a".to_string())
        );
    }

    #[test]
    fn update_changes_only_named_address() {
        let mut registry = registry_of(&[("a", "1"), ("b", "2"), ("c", "3")]);
        registry.update("b", "22").unwrap();
        assert_eq!(
            registry.list(),
            &[
                Target::new("a", "1"),
                Target::new("b", "22"),
                Target::new("c", "3"),
            ]
        );
    }

    #[test]
    fn update_absent_is_not_found() {
        let mut registry = registry_of(&[("a", "1")]);
        let before = registry.clone();
        assert_eq!(
            registry.update("z", "2").unwrap_err(),
            RegistryError::NotFound("z".to_string())
        );
        assert_eq!(registry, before);
    }
}
