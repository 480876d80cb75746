//! Fake value generators for the anon-export pipeline.
//!
//! This crate provides the [`Generator`](anon_core::Generator)s used by the
//! static model specs, and the [`Synthesizer`] which builds a spec at run
//! time from a form schema.
//!
//! # Architecture
//!
//! ```text
//! FormSchema (callout.formSchema)
//!        │
//!        ▼
//! ┌─────────────────┐
//! │   Synthesizer   │   FieldType ──► generator table
//! └────────┬────────┘
//!          │
//!          ▼
//!   Spec { slideId: { key: Generator } }
//! ```
//!
//! # Generators
//!
//! - `uuid` - Random UUID v4
//! - `code` / `hex` - Random alphanumeric codes and hex strings
//! - `first_name` / `last_name` / `full_name` - Random names
//! - `email` - Random address in a fixed fake domain
//! - `phone_number` - Random mobile number
//! - `word` / `sentence` / `paragraph` - Lorem-style text
//! - `int_range` / `amount` / `boolean` - Numbers and flags
//! - `street` / `city` / `postcode` / `address` - Postal data
//! - `one_of` / `some_of` - Picks from declared options
//! - `timestamp_between` / `date_between` / `time_of_day` - Dates and times
//! - `url` / `image_upload` / `signature` - Web placeholders
//! - `constant` / `null` - Fixed values

pub mod generators;
pub mod synthesize;

// Re-exports for convenience
pub use synthesize::{synthesize, SynthesizeError, Synthesizer, FAKE_EMAIL_DOMAIN};
