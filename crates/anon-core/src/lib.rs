//! Core types for the anon-export anonymisation pipeline.
//!
//! This crate provides the foundational types used across the export
//! workspace, including:
//!
//! - [`Record`] - One row of one entity, as a JSON object
//! - [`ValueCache`] - Run-scoped memo from original values to substitutes
//! - [`Spec`] / [`SpecNode`] / [`Generator`] - Declarative transformation trees
//! - [`apply`] - The recursive applier that produces anonymised copies
//! - [`project_foreign_keys`] - Restricts a spec to foreign-key fields
//! - [`EntityDescriptor`] / [`DependencyOrder`] - Entity metadata and ordering
//! - [`FormSchema`] - Schema-bearing form definitions for dynamic payloads
//!
//! # Architecture
//!
//! ```text
//! anon-core (this crate)
//!    │
//!    ├─── anon-generator   (fake generators + dynamic spec synthesis)
//!    ├─── record-source    (fetches pages of records)
//!    ├─── dump-sink        (SQL / JSON dump writers)
//!    └─── anon-export      (batch driver, model catalogue, CLI)
//! ```
//!
//! # Example
//!
//! ```rust
//! use anon_core::{apply, CopyMode, Generator, Spec, ValueCache};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use serde_json::json;
//!
//! let spec = Spec::new().field(
//!     "email",
//!     Generator::fresh("email", |_| json!("someone@example.com")),
//! );
//! let record = json!({ "id": 1, "email": "real@person.org" });
//! let record = record.as_object().unwrap();
//!
//! let mut cache = ValueCache::new();
//! let mut rng = StdRng::seed_from_u64(7);
//! let out = apply(record, &spec, &mut cache, &mut rng, CopyMode::KeepUnspecified).unwrap();
//! assert_eq!(out["email"], json!("someone@example.com"));
//! assert_eq!(out["id"], json!(1));
//! ```

pub mod apply;
pub mod cache;
pub mod entity;
pub mod order;
pub mod project;
pub mod record;
pub mod schema;
pub mod spec;

// Re-exports for convenience
pub use apply::{apply, apply_value, ApplyError, CopyMode};
pub use cache::{canonical_key, KeyError, ValueCache};
pub use entity::EntityDescriptor;
pub use order::{DependencyOrder, OrderError};
pub use project::{project_foreign_keys, ForeignKeyConvention};
pub use record::{is_empty_value, Record};
pub use schema::{
    ChoiceOption, FieldType, FormComponent, FormSchema, FormSlide, SchemaError, SchemaField,
    SelectData,
};
pub use spec::{Generator, GeneratorError, Spec, SpecNode};
