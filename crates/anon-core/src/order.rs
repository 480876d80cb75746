//! Dependency ordering over entity types.
//!
//! The order is curated by hand: every entity must come after the entities it
//! references. Exports run in forward order; clearing runs in reverse so that
//! referencing rows disappear before the rows they point at.

use crate::entity::EntityDescriptor;
use std::collections::HashSet;

/// Error type for dependency order validation.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The same entity is listed twice
    #[error("entity '{0}' appears more than once in the dependency order")]
    Duplicate(String),

    /// An entity references something listed after it
    #[error("entity '{entity}' references '{reference}', which is not ordered before it")]
    ReferenceOutOfOrder { entity: String, reference: String },
}

/// A validated, fixed topological order over entity types.
#[derive(Debug, Clone, Default)]
pub struct DependencyOrder {
    entities: Vec<EntityDescriptor>,
}

impl DependencyOrder {
    /// Validate and wrap a hand-curated order.
    ///
    /// Self references are allowed.
    pub fn new(entities: Vec<EntityDescriptor>) -> Result<Self, OrderError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for entity in &entities {
            for reference in &entity.references {
                if reference != &entity.name && !seen.contains(reference.as_str()) {
                    return Err(OrderError::ReferenceOutOfOrder {
                        entity: entity.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }

            if !seen.insert(entity.name.as_str()) {
                return Err(OrderError::Duplicate(entity.name.clone()));
            }
        }

        Ok(Self { entities })
    }

    /// Entities in dependency (export) order.
    pub fn forward(&self) -> impl DoubleEndedIterator<Item = &EntityDescriptor> {
        self.entities.iter()
    }

    /// Entities in reverse dependency (clearing) order.
    pub fn reverse(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter().rev()
    }

    /// Look up an entity by name.
    pub fn get(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Position of an entity in the forward order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.name == name)
    }

    /// All entities as a slice, in forward order.
    pub fn as_slice(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
