//! Transformation specifications.
//!
//! A [`Spec`] maps field names to [`SpecNode`]s. A node is either a
//! [`Generator`] producing a substitute for the field's value, or a nested
//! `Spec` applied to an object-valued field.
//!
//! ```text
//! Spec {
//!   "email"    => Generator(email)
//!   "password" => Nested(Spec {
//!                    "hash" => Generator(hex)
//!                    "salt" => Generator(hex)
//!                 })
//! }
//! ```

use rand::RngCore;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Error raised by a generator that cannot produce a substitute.
#[derive(Debug, Clone, thiserror::Error)]
#[error("generator '{generator}' failed: {message}")]
pub struct GeneratorError {
    /// Name of the failing generator
    pub generator: String,
    /// What went wrong
    pub message: String,
}

impl GeneratorError {
    /// Create a new generator error.
    pub fn new(generator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            message: message.into(),
        }
    }
}

type GeneratorFn = dyn Fn(&Value, &mut dyn RngCore) -> Result<Value, GeneratorError> + Send + Sync;

/// A function mapping an original field value to its substitute.
///
/// Randomness is drawn from the RNG handed in by the caller, so an export
/// run can be seeded. Generators are cheap to clone and shared between specs.
#[derive(Clone)]
pub struct Generator {
    name: Cow<'static, str>,
    func: Arc<GeneratorFn>,
}

impl Generator {
    /// Create a generator that sees the original value.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&Value, &mut dyn RngCore) -> Result<Value, GeneratorError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Create a generator that ignores the original value and cannot fail.
    pub fn fresh<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> Value + Send + Sync + 'static,
    {
        Self::new(name, move |_, rng| Ok(func(rng)))
    }

    /// Generator name, used in logs and error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce a substitute for `original`.
    pub fn generate(
        &self,
        original: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GeneratorError> {
        (self.func)(original, rng)
    }

    /// Whether both handles share the same underlying function.
    pub fn ptr_eq(&self, other: &Generator) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Generator").field(&self.name).finish()
    }
}

/// One entry of a [`Spec`].
#[derive(Debug, Clone)]
pub enum SpecNode {
    /// Replace the field's value with a generated substitute
    Generator(Generator),
    /// Recurse into an object-valued field
    Nested(Spec),
}

impl SpecNode {
    /// The generator, if this node is one.
    pub fn as_generator(&self) -> Option<&Generator> {
        match self {
            SpecNode::Generator(generator) => Some(generator),
            SpecNode::Nested(_) => None,
        }
    }

    /// The nested spec, if this node is one.
    pub fn as_nested(&self) -> Option<&Spec> {
        match self {
            SpecNode::Nested(spec) => Some(spec),
            SpecNode::Generator(_) => None,
        }
    }
}

impl From<Generator> for SpecNode {
    fn from(generator: Generator) -> Self {
        SpecNode::Generator(generator)
    }
}

impl From<Spec> for SpecNode {
    fn from(spec: Spec) -> Self {
        SpecNode::Nested(spec)
    }
}

/// Declarative description of how to anonymise one record shape.
///
/// Fields absent from the spec are left alone (or dropped, depending on the
/// copy mode the spec is applied with).
#[derive(Debug, Clone, Default)]
pub struct Spec {
    fields: BTreeMap<String, SpecNode>,
}

impl Spec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: map a field through a generator.
    pub fn field(mut self, name: impl Into<String>, generator: Generator) -> Self {
        self.fields.insert(name.into(), SpecNode::Generator(generator));
        self
    }

    /// Builder: apply a nested spec to an object-valued field.
    pub fn nested(mut self, name: impl Into<String>, spec: Spec) -> Self {
        self.fields.insert(name.into(), SpecNode::Nested(spec));
        self
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<SpecNode>) {
        self.fields.insert(name.into(), node.into());
    }

    /// Get the node for a field.
    pub fn get(&self, name: &str) -> Option<&SpecNode> {
        self.fields.get(name)
    }

    /// Whether the spec mentions a field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over `(field, node)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SpecNode)> {
        self.fields.iter()
    }

    /// Field names in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the spec has no entries.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, SpecNode)> for Spec {
    fn from_iter<I: IntoIterator<Item = (String, SpecNode)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
