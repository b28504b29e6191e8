//! Materialized entities and deferred references.

use std::collections::BTreeSet;

use dashmap::DashMap;

use super::types::{EntityType, Mrid, Role};

/// A domain object materialized from the wire format.
///
/// Outgoing references are declared at decode time. Associations are wired
/// by the local store as both ends become available and are stored as
/// identifiers, so the object graph never holds owning cycles.
#[derive(Debug)]
pub struct NetworkObject {
    mrid: Mrid,
    entity_type: EntityType,
    name: String,
    references: Vec<(Role, Mrid)>,
    associations: DashMap<Role, BTreeSet<Mrid>>,
}

impl NetworkObject {
    /// Creates a new object with no declared references.
    pub fn new(mrid: impl Into<Mrid>, entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            mrid: mrid.into(),
            entity_type,
            name: name.into(),
            references: Vec::new(),
            associations: DashMap::new(),
        }
    }

    /// Adds a declared outgoing reference.
    pub fn with_reference(mut self, role: Role, to: impl Into<Mrid>) -> Self {
        self.references.push((role, to.into()));
        self
    }

    /// Adds several declared outgoing references sharing a role.
    pub fn with_references<I, M>(mut self, role: Role, targets: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Mrid>,
    {
        self.references
            .extend(targets.into_iter().map(|to| (role, to.into())));
        self
    }

    pub fn mrid(&self) -> &Mrid {
        &self.mrid
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// References declared by the wire message, resolved or not.
    pub fn references(&self) -> &[(Role, Mrid)] {
        &self.references
    }

    /// Records an association. Returns false if it was already present.
    pub fn associate(&self, role: Role, other: &Mrid) -> bool {
        self.associations
            .entry(role)
            .or_default()
            .insert(other.clone())
    }

    /// Returns the wired associations for a role, in identifier order.
    pub fn associated(&self, role: Role) -> Vec<Mrid> {
        self.associations
            .get(&role)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `other` is wired under `role`.
    pub fn is_associated(&self, role: Role, other: &Mrid) -> bool {
        self.associations
            .get(&role)
            .is_some_and(|set| set.contains(other))
    }
}

/// A deferred link: `from`'s `role` should point at `to` once `to` is known.
///
/// Exists only while `to` is absent from the local store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedReference {
    pub from: Mrid,
    pub from_type: EntityType,
    pub role: Role,
    pub to: Mrid,
}

impl UnresolvedReference {
    pub fn new(from: &NetworkObject, role: Role, to: Mrid) -> Self {
        Self {
            from: from.mrid().clone(),
            from_type: from.entity_type(),
            role,
            to,
        }
    }
}
