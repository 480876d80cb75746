//! Export of dependent records whose payload shape is described by an owner.
//!
//! Owners (e.g. callouts) carry a form schema; dependents (e.g. callout
//! responses) carry a payload answering that form. Dependents are exported
//! one owner group at a time:
//!
//! ```text
//! for owner in owners (paged, key order):
//!     page dependents where fk == owner.id (key order)
//!     first non-empty page → synthesise payload spec from owner.schema
//!     each dependent: static spec on fields, payload spec on payload
//! ```
//!
//! Owners without dependents are skipped without synthesising anything.

use super::ExportRun;
use anon_core::{
    apply, apply_value, is_empty_value, CopyMode, EntityDescriptor, FormSchema, Record, Spec,
};
use anyhow::{anyhow, bail, Context, Result};
use dump_sink::DumpSink;
use record_source::{PageRequest, RecordFilter, RecordSource};
use serde_json::Value;
use tracing::debug;

/// Export dependents grouped by a schema-bearing owner.
#[derive(Debug, Clone)]
pub struct SchemaDrivenExport {
    /// Entity carrying the schema
    pub owner: EntityDescriptor,
    /// Owner field holding the form schema
    pub schema_field: String,
    /// Optional restriction on the owners visited
    pub owner_filter: Option<RecordFilter>,
    /// Entity written by this step
    pub dependent: EntityDescriptor,
    /// Dependent field referencing the owner's key
    pub foreign_key: String,
    /// Dependent field holding the free-form payload
    pub payload_field: String,
    /// Static spec for the dependent's other fields
    pub spec: Spec,
    /// Copy mode for the static spec
    pub copy_mode: CopyMode,
    /// Optional extra restriction on the dependents read
    pub filter: Option<RecordFilter>,
}

impl SchemaDrivenExport {
    /// Group `dependent` rows by `owner`, joining on `foreign_key`.
    ///
    /// The schema is read from the owner's `formSchema` field and describes
    /// the dependent's `answers` field.
    pub fn new(
        owner: EntityDescriptor,
        dependent: EntityDescriptor,
        foreign_key: impl Into<String>,
        spec: Spec,
    ) -> Self {
        Self {
            owner,
            schema_field: "formSchema".to_string(),
            owner_filter: None,
            dependent,
            foreign_key: foreign_key.into(),
            payload_field: "answers".to_string(),
            spec,
            copy_mode: CopyMode::KeepUnspecified,
            filter: None,
        }
    }

    /// Builder: owner field holding the schema.
    pub fn with_schema_field(mut self, field: impl Into<String>) -> Self {
        self.schema_field = field.into();
        self
    }

    /// Builder: dependent field holding the payload.
    pub fn with_payload_field(mut self, field: impl Into<String>) -> Self {
        self.payload_field = field.into();
        self
    }

    /// Builder: only visit owners matching `filter`.
    pub fn with_owner_filter(mut self, filter: RecordFilter) -> Self {
        self.owner_filter = Some(filter);
        self
    }

    /// Builder: only export dependents matching `filter`.
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl<S: RecordSource, K: DumpSink> ExportRun<'_, S, K> {
    /// Page through owners, exporting each owner's dependents as a group.
    pub async fn export_schema_driven(&mut self, step: &SchemaDrivenExport) -> Result<u64> {
        let Some(owner_key) = step.owner.single_key() else {
            bail!(
                "{} must have a single-column primary key to own {} records",
                step.owner.name,
                step.dependent.name
            );
        };

        let mut offset = 0;
        let mut written = 0;

        loop {
            let request = PageRequest::new(&step.owner, offset, self.page_size)
                .with_filter(step.owner_filter.as_ref());
            let owners = self.fetch(&request).await?;
            if owners.is_empty() {
                break;
            }

            for owner in &owners {
                let owner_id = owner
                    .get(owner_key)
                    .cloned()
                    .ok_or_else(|| anyhow!("{} record without '{owner_key}'", step.owner.name))?;

                written += self
                    .export_group(step, owner, &owner_id)
                    .await
                    .with_context(|| {
                        format!("Failed to export group of {} {owner_id}", step.owner.name)
                    })?;
            }

            offset += self.page_size;
        }

        Ok(written)
    }

    async fn export_group(
        &mut self,
        step: &SchemaDrivenExport,
        owner: &Record,
        owner_id: &Value,
    ) -> Result<u64> {
        let filter = RecordFilter::and_optional(
            step.filter.as_ref(),
            RecordFilter::equals(step.foreign_key.clone(), owner_id.clone()),
        );
        let page_size = self.page_size;
        let page_request = |offset| {
            PageRequest::new(&step.dependent, offset, page_size).with_filter(Some(&filter))
        };

        let mut offset = 0;
        let mut page = self.fetch(&page_request(offset)).await?;
        if page.is_empty() {
            return Ok(0);
        }

        let schema = FormSchema::from_value(owner.get(&step.schema_field))
            .with_context(|| {
                format!(
                    "Invalid {} of {} {owner_id}",
                    step.schema_field, step.owner.name
                )
            })?;
        let payload_spec = self
            .synthesizer
            .synthesize_form(&schema)
            .with_context(|| format!("Cannot synthesise spec for {} {owner_id}", step.owner.name))?;
        self.summary.schemas_synthesized += 1;
        debug!(
            "Synthesised payload spec with {} slides for {} {owner_id}",
            payload_spec.len(),
            step.owner.name
        );

        let mut written = 0;
        loop {
            let mut out = Vec::with_capacity(page.len());
            for record in &page {
                out.push(
                    self.anonymise_dependent(step, &payload_spec, record)
                        .with_context(|| format!("Failed to anonymise page at offset {offset}"))?,
                );
            }
            self.write(&step.dependent, &out, offset).await?;
            written += out.len() as u64;

            offset += page_size;
            page = self.fetch(&page_request(offset)).await?;
            if page.is_empty() {
                break;
            }
        }

        Ok(written)
    }

    fn anonymise_dependent(
        &mut self,
        step: &SchemaDrivenExport,
        payload_spec: &Spec,
        record: &Record,
    ) -> Result<Record> {
        let mut out = apply(record, &step.spec, &mut self.cache, &mut self.rng, step.copy_mode)?;

        if let Some(payload) = record.get(&step.payload_field) {
            let payload = self
                .anonymise_payload(payload_spec, payload)
                .with_context(|| format!("Invalid {}", step.payload_field))?;
            out.insert(step.payload_field.clone(), payload);
        }

        Ok(out)
    }

    /// Apply each slide's spec to its answers, dropping undeclared slides and keys.
    fn anonymise_payload(&mut self, spec: &Spec, payload: &Value) -> Result<Value> {
        if is_empty_value(payload) {
            return Ok(payload.clone());
        }
        let Value::Object(answers) = payload else {
            bail!("expected an object payload");
        };

        let mut out = Record::new();
        for (slide, node) in spec.iter() {
            let (Some(slide_answers), Some(slide_spec)) = (answers.get(slide), node.as_nested())
            else {
                continue;
            };
            if is_empty_value(slide_answers) {
                out.insert(slide.clone(), slide_answers.clone());
                continue;
            }
            let value = apply_value(
                slide_answers,
                slide_spec,
                &mut self.cache,
                &mut self.rng,
                CopyMode::OmitUnspecified,
            )
            .with_context(|| format!("in slide '{slide}'"))?;
            out.insert(slide.clone(), value);
        }

        Ok(Value::Object(out))
    }
}
