//! Build an anonymisation [`Spec`] from a form schema at run time.
//!
//! Each answer type maps to a generator producing a plausible value of the
//! same shape. Choice fields draw from the options the form declares.

use crate::generators::{
    address, amount, boolean, date_between, email, image_upload, int_range, one_of, paragraph,
    phone_number, sentence, signature, some_of, time_of_day, timestamp_between, url,
};
use anon_core::{FieldType, FormSchema, Generator, SchemaField, Spec};
use chrono::{DateTime, Utc};

/// Domain used for every synthesised email address.
pub const FAKE_EMAIL_DOMAIN: &str = "example.com";

/// Error type for spec synthesis.
#[derive(Debug, thiserror::Error)]
pub enum SynthesizeError {
    /// Type tag outside the supported set
    #[error("field '{key}' has unknown type '{field_type}'")]
    UnknownFieldType { key: String, field_type: String },

    /// Choice field without any declared options
    #[error("field '{key}' of type '{field_type}' declares no options")]
    MissingOptions { key: String, field_type: FieldType },
}

/// Maps schema fields to generators.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    email_domain: String,
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self {
            email_domain: FAKE_EMAIL_DOMAIN.to_string(),
            earliest: DateTime::from_timestamp(1_577_836_800, 0).unwrap_or_default(),
            latest: DateTime::from_timestamp(1_735_689_599, 0).unwrap_or_default(),
        }
    }
}

impl Synthesizer {
    /// Create a synthesizer using `email_domain` for email answers.
    pub fn new(email_domain: impl Into<String>) -> Self {
        Self {
            email_domain: email_domain.into(),
            ..Self::default()
        }
    }

    /// Builder: bounds for date and date-time answers.
    pub fn with_date_range(mut self, earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Self {
        self.earliest = earliest;
        self.latest = latest;
        self
    }

    /// Domain used for email answers.
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }

    /// Pick the generator for one field.
    pub fn generator_for(&self, field: &SchemaField) -> Result<Generator, SynthesizeError> {
        let field_type =
            field
                .parsed_type()
                .map_err(|_| SynthesizeError::UnknownFieldType {
                    key: field.key.clone(),
                    field_type: field.field_type.clone(),
                })?;

        if field_type.is_choice() && field.options.is_empty() {
            return Err(SynthesizeError::MissingOptions {
                key: field.key.clone(),
                field_type,
            });
        }

        let generator = match field_type {
            FieldType::TextField => sentence(),
            FieldType::TextArea => paragraph(),
            FieldType::Email => email(self.email_domain.clone()),
            FieldType::Number => int_range(0, 1000),
            FieldType::Currency => amount(0.0, 1000.0),
            FieldType::PhoneNumber => phone_number(),
            FieldType::Select | FieldType::Radio => one_of(field.options.clone()),
            FieldType::SelectBoxes => some_of(field.options.clone()),
            FieldType::Checkbox => boolean(),
            FieldType::Address => address(),
            FieldType::File => image_upload(),
            FieldType::Signature => signature(),
            FieldType::Url => url(),
            FieldType::DateTime => timestamp_between(self.earliest, self.latest),
            FieldType::Day => date_between(self.earliest, self.latest),
            FieldType::Time => time_of_day(),
        };

        Ok(generator)
    }

    /// Build a flat spec, one generator per field key.
    ///
    /// A key declared twice keeps its last declaration.
    pub fn synthesize(&self, fields: &[SchemaField]) -> Result<Spec, SynthesizeError> {
        let mut spec = Spec::new();
        for field in fields {
            spec.insert(field.key.clone(), self.generator_for(field)?);
        }
        Ok(spec)
    }

    /// Build a spec nested by slide id, matching how answers are stored.
    ///
    /// ```text
    /// { "<slideId>": { "<key>": Generator, ... }, ... }
    /// ```
    pub fn synthesize_form(&self, schema: &FormSchema) -> Result<Spec, SynthesizeError> {
        let mut spec = Spec::new();
        for slide in &schema.slides {
            spec.insert(slide.id.clone(), self.synthesize(&slide.fields())?);
        }
        Ok(spec)
    }
}

/// Build a flat spec with the default synthesizer.
pub fn synthesize(fields: &[SchemaField]) -> Result<Spec, SynthesizeError> {
    Synthesizer::default().synthesize(fields)
}
