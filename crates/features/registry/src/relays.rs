//! The bounded relay list.
//!
//! Removal is a **swap-remove**: the last entry moves into the freed slot and the list
//! shrinks by one. Positions are therefore not stable across removals, and consumers that
//! mirror the list by index rely on exactly this relocation.

use crate::error::RegistryError;
use crate::hashing::uri_hash;
use fxhash::FxHashSet;
use rlist_domain::{Relay, Relays, RegistryEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRegistry {
    entries: Vec<Relay>,
    capacity: usize,
    version: u64,
}

impl RelayRegistry {
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, RegistryError> {
        if capacity == 0 {
            return Err(RegistryError::invalid("capacity must be greater than zero"));
        }
        Ok(Self { entries: Vec::new(), capacity, version: 0 })
    }

    /// Rebuilds a registry from persisted parts, keeping the entry order.
    pub(crate) fn from_parts(
        entries: Vec<Relay>,
        capacity: usize,
        version: u64,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(capacity)?;

        if entries.len() > capacity {
            return Err(RegistryError::invalid(format!(
                "{} relays exceed capacity {capacity}",
                entries.len()
            )));
        }
        if version < u64::try_from(entries.len()).unwrap_or(u64::MAX) {
            return Err(RegistryError::invalid(format!(
                "version {version} is lower than the number of relays {}",
                entries.len()
            )));
        }

        let mut seen = FxHashSet::default();
        for relay in &entries {
            if relay.uri.is_empty() {
                return Err(RegistryError::invalid("relay URI must not be empty"));
            }
            if !seen.insert(relay.uri.as_str()) {
                return Err(RegistryError::invalid(format!("duplicate relay URI {}", relay.uri)));
            }
        }

        registry.entries = entries;
        registry.version = version;
        Ok(registry)
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in storage order.
    #[must_use]
    pub fn entries(&self) -> &[Relay] {
        &self.entries
    }

    fn next_version(&self) -> Result<u64, RegistryError> {
        self.version
            .checked_add(1)
            .ok_or_else(|| RegistryError::precondition("registry version is exhausted"))
    }

    fn position(&self, uri: &str) -> Option<usize> {
        self.entries.iter().position(|relay| relay.uri == uri)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] when no entry has this URI.
    pub fn get(&self, uri: &str) -> Result<Relay, RegistryError> {
        self.position(uri)
            .map(|index| self.entries[index].clone())
            .ok_or_else(|| RegistryError::not_found(format!("no relay with the URI {uri}")))
    }

    /// Full listing; an empty registry answers [`Relays::Empty`].
    #[must_use]
    pub fn list(&self) -> Relays {
        if self.entries.is_empty() { Relays::Empty } else { Relays::Listed(self.entries.clone()) }
    }

    pub(crate) fn check_add(&self, relay: &Relay) -> Result<(), RegistryError> {
        if relay.uri.is_empty() {
            return Err(RegistryError::invalid("relay URI must not be empty"));
        }
        if self.position(&relay.uri).is_some() {
            return Err(RegistryError::AlreadyExists {
                message: format!("relay with the URI {} already exists", relay.uri).into(),
                context: None,
            });
        }
        if self.entries.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                message: format!("relay list is full ({} entries)", self.capacity).into(),
                context: None,
            });
        }
        self.next_version()?;
        Ok(())
    }

    /// Appends a validated relay. Callers run [`Self::check_add`] first.
    pub(crate) fn add(&mut self, relay: Relay) -> [RegistryEvent; 2] {
        let hash = uri_hash(&relay.uri);
        self.entries.push(relay.clone());
        self.version += 1;
        [
            RegistryEvent::RelayAdded { relay, uri_hash: hash },
            RegistryEvent::RegistryUpdated { version: self.version },
        ]
    }

    pub(crate) fn check_remove(&self, uri: &str) -> Result<usize, RegistryError> {
        if uri.is_empty() {
            return Err(RegistryError::invalid("relay URI must not be empty"));
        }
        let index = self
            .position(uri)
            .ok_or_else(|| RegistryError::not_found(format!("no relay with the URI {uri}")))?;
        self.next_version()?;
        Ok(index)
    }

    /// Swap-removes the entry at `index` as returned by [`Self::check_remove`].
    pub(crate) fn remove(&mut self, index: usize) -> [RegistryEvent; 2] {
        let removed = self.entries.swap_remove(index);
        self.version += 1;
        [
            RegistryEvent::RelayRemoved { uri_hash: uri_hash(&removed.uri), uri: removed.uri },
            RegistryEvent::RegistryUpdated { version: self.version },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn relay(uri: &str) -> Relay {
        Relay::new(uri, "Operator", false, "")
    }

    fn add(registry: &mut RelayRegistry, uri: &str) -> Result<[RegistryEvent; 2], RegistryError> {
        let relay = relay(uri);
        registry.check_add(&relay)?;
        Ok(registry.add(relay))
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(RelayRegistry::new(0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn add_emits_relay_then_version() {
        let mut registry = RelayRegistry::new(4).unwrap();
        let [added, updated] = add(&mut registry, "https://relay.test").unwrap();

        assert_eq!(
            added,
            RegistryEvent::RelayAdded {
                relay: relay("https://relay.test"),
                uri_hash: uri_hash("https://relay.test")
            }
        );
        assert_eq!(updated, RegistryEvent::RegistryUpdated { version: 1 });
    }

    #[test]
    fn add_checks_run_in_order() {
        let mut registry = RelayRegistry::new(1).unwrap();
        assert_eq!(add(&mut registry, "").unwrap_err().kind(), ErrorKind::InvalidArgument);

        add(&mut registry, "a").unwrap();
        // A duplicate is reported even when the list is also full.
        assert_eq!(add(&mut registry, "a").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(add(&mut registry, "b").unwrap_err().kind(), ErrorKind::CapacityExceeded);
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn remove_moves_last_entry_into_the_gap() {
        let mut registry = RelayRegistry::new(4).unwrap();
        for uri in ["a", "b", "c", "d"] {
            add(&mut registry, uri).unwrap();
        }

        let index = registry.check_remove("b").unwrap();
        let [removed, updated] = registry.remove(index);

        let order: Vec<_> = registry.entries().iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(order, ["a", "d", "c"]);
        assert_eq!(removed, RegistryEvent::RelayRemoved { uri: "b".into(), uri_hash: uri_hash("b") });
        assert_eq!(updated, RegistryEvent::RegistryUpdated { version: 5 });
    }

    #[test]
    fn removing_the_last_entry_keeps_the_rest_in_place() {
        let mut registry = RelayRegistry::new(3).unwrap();
        for uri in ["a", "b", "c"] {
            add(&mut registry, uri).unwrap();
        }
        let index = registry.check_remove("c").unwrap();
        registry.remove(index);

        let order: Vec<_> = registry.entries().iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(order, ["a", "b"]);
    }

    #[test]
    fn empty_listing_is_explicit() {
        let mut registry = RelayRegistry::new(2).unwrap();
        assert_eq!(registry.list(), Relays::Empty);

        add(&mut registry, "a").unwrap();
        assert_eq!(registry.list(), Relays::Listed(vec![relay("a")]));
    }

    #[test]
    fn from_parts_validates_invariants() {
        let ok = RelayRegistry::from_parts(vec![relay("a"), relay("b")], 2, 9).unwrap();
        assert_eq!(ok.version(), 9);
        assert_eq!(ok.len(), 2);

        let cases = [
            (vec![relay("a"), relay("b")], 1, 2),
            (vec![relay("a"), relay("a")], 4, 2),
            (vec![relay("")], 4, 1),
            (vec![relay("a"), relay("b")], 4, 1),
            (vec![], 0, 0),
        ];
        for (entries, capacity, version) in cases {
            let err = RelayRegistry::from_parts(entries, capacity, version).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn capacity_is_a_logical_bound_only() {
        let mut registry = RelayRegistry::new(usize::MAX).unwrap();
        assert_eq!(registry.capacity(), usize::MAX);

        add(&mut registry, "a").unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn exhausted_version_rejects_mutations_untouched() {
        let mut registry = RelayRegistry::from_parts(vec![relay("a")], 4, u64::MAX).unwrap();

        assert_eq!(add(&mut registry, "b").unwrap_err().kind(), ErrorKind::PreconditionFailed);
        assert_eq!(registry.check_remove("a").unwrap_err().kind(), ErrorKind::PreconditionFailed);
        // Lookup failures still win over the exhausted counter.
        assert_eq!(registry.check_remove("zz").unwrap_err().kind(), ErrorKind::NotFound);

        assert_eq!(registry.entries(), [relay("a")]);
        assert_eq!(registry.version(), u64::MAX);
    }
}
