//! Foreign-key-only projection of a spec.
//!
//! Entities exported "as-is" still have to follow the substitutions made
//! for the entities they reference. Projecting their static spec down to the
//! foreign-key fields keeps their content intact while routing the links
//! through the shared value cache.

use crate::entity::EntityDescriptor;
use crate::spec::{Spec, SpecNode};

/// Naming convention that identifies foreign-key fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConvention {
    suffixes: Vec<String>,
}

impl Default for ForeignKeyConvention {
    fn default() -> Self {
        Self::new(["Id", "_id"])
    }
}

impl ForeignKeyConvention {
    /// Create a convention from field-name suffixes.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Configured suffixes.
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Whether a field name looks like a foreign key.
    ///
    /// The suffix alone (e.g. a column literally named `Id`) does not count.
    pub fn is_foreign_key(&self, field: &str) -> bool {
        self.suffixes
            .iter()
            .any(|suffix| field.len() > suffix.len() && field.ends_with(suffix.as_str()))
    }
}

/// Restrict `spec` to the generator-mapped foreign-key fields of `entity`.
///
/// Primary-key columns and nested specs are never kept.
pub fn project_foreign_keys(
    spec: &Spec,
    entity: &EntityDescriptor,
    convention: &ForeignKeyConvention,
) -> Spec {
    spec.iter()
        .filter(|(name, node)| {
            matches!(node, SpecNode::Generator(_))
                && !entity.is_primary_key(name)
                && convention.is_foreign_key(name)
        })
        .map(|(name, node)| (name.clone(), node.clone()))
        .collect()
}
