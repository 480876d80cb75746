//! Export profiles.
//!
//! A profile turns the model catalogue into the ordered steps of one run:
//!
//! - `full` exports every row of every model
//! - `demo` exports a bounded sample of contacts and callouts together with
//!   the rows that belong to them, plus the small site-wide tables
//!
//! Both profiles clear every table of the catalogue first, so replaying a
//! demo dump never leaves rows from an earlier full dump behind.

use crate::export::{ExportStep, ModelExport, SchemaDrivenExport};
use crate::models::{self, Catalogue, Model};
use anon_core::{project_foreign_keys, DependencyOrder, ForeignKeyConvention, Spec};
use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use record_source::{PageRequest, RecordFilter, RecordSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

/// Which profile to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// Every row of every model
    Full,
    /// A small, self-consistent sample
    Demo,
}

/// How a model's static spec is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Treatment {
    /// Apply the full spec
    #[default]
    Anonymise,
    /// Only rewrite foreign-key columns, so references stay consistent
    ForeignKeysOnly,
    /// Copy rows unchanged
    AsIs,
}

/// Knobs shared by every profile.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Per-entity treatment overrides; unlisted entities are anonymised
    pub treatments: HashMap<String, Treatment>,
    /// How foreign-key columns are recognised
    pub foreign_keys: ForeignKeyConvention,
    /// Contacts sampled by the demo profile
    pub demo_contacts: usize,
    /// Callouts sampled by the demo profile
    pub demo_callouts: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            treatments: HashMap::new(),
            foreign_keys: ForeignKeyConvention::default(),
            demo_contacts: 400,
            demo_callouts: 20,
        }
    }
}

impl ProfileOptions {
    /// Reject treatment overrides naming no catalogue entity.
    fn check_treatments(&self, catalogue: &Catalogue) -> Result<()> {
        let mut unknown: Vec<&str> = self
            .treatments
            .keys()
            .filter(|name| catalogue.entity(name).is_none())
            .map(String::as_str)
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        unknown.sort_unstable();
        bail!("treatments name unknown entities: {}", unknown.join(", "))
    }

    fn treatment(&self, entity: &str) -> Treatment {
        self.treatments.get(entity).copied().unwrap_or_default()
    }

    fn spec_for(&self, model: &Model) -> Spec {
        match self.treatment(&model.entity.name) {
            Treatment::Anonymise => model.spec.clone(),
            Treatment::ForeignKeysOnly => {
                project_foreign_keys(&model.spec, &model.entity, &self.foreign_keys)
            }
            Treatment::AsIs => Spec::new(),
        }
    }
}

/// The ordered steps of one run.
#[derive(Debug, Clone)]
pub struct ExportProfile {
    /// Profile name, for logs
    pub name: &'static str,
    /// Tables to clear, in forward dependency order
    pub clear_order: DependencyOrder,
    /// Steps to run, in dependency order
    pub steps: Vec<ExportStep>,
}

/// Build the step for one model, grouping callout responses by callout.
fn step_for(
    catalogue: &Catalogue,
    options: &ProfileOptions,
    model: &Model,
    filter: Option<RecordFilter>,
    owner_filter: Option<RecordFilter>,
) -> Result<ExportStep> {
    let spec = options.spec_for(model);
    let as_is = options.treatment(&model.entity.name) == Treatment::AsIs;

    if model.entity.name == models::CALLOUT_RESPONSE && !as_is {
        let callout = catalogue
            .entity(models::CALLOUT)
            .ok_or_else(|| anyhow!("catalogue has no {} model", models::CALLOUT))?;
        let mut step =
            SchemaDrivenExport::new(callout.clone(), model.entity.clone(), "calloutId", spec);
        step.filter = filter;
        step.owner_filter = owner_filter;
        return Ok(step.into());
    }

    let mut step = ModelExport::new(model.entity.clone(), spec);
    step.filter = filter;
    Ok(step.into())
}

/// Every row of every model.
pub fn full(catalogue: &Catalogue, options: &ProfileOptions) -> Result<ExportProfile> {
    options.check_treatments(catalogue)?;
    let steps = catalogue
        .models()
        .map(|model| step_for(catalogue, options, &model, None, None))
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportProfile {
        name: "full",
        clear_order: catalogue.order().clone(),
        steps,
    })
}

/// What the demo profile does with one model.
enum DemoRule {
    /// Every row
    All,
    /// Rows matching a filter
    Filter(RecordFilter),
    /// Callout responses: owners and dependents both restricted
    Grouped {
        owners: RecordFilter,
        dependents: RecordFilter,
    },
    /// Not part of the demo
    Skip,
}

fn demo_rule(entity: &str, contacts: &[Value], callouts: &[Value]) -> DemoRule {
    let by_contact = |field: &str| DemoRule::Filter(RecordFilter::one_of(field, contacts.to_vec()));

    match entity {
        models::CONTENT | models::OPTION | models::EMAIL | models::SEGMENT | models::NOTICE => {
            DemoRule::All
        }
        models::CONTACT => by_contact("id"),
        models::CONTACT_ROLE
        | models::CONTACT_PROFILE
        | models::CONTACT_CONTRIBUTION
        | models::PAYMENT
        | models::RESET_SECURITY_FLOW
        | models::SEGMENT_CONTACT => by_contact("contactId"),
        models::API_KEY => by_contact("creatorId"),
        models::CALLOUT => DemoRule::Filter(RecordFilter::one_of("id", callouts.to_vec())),
        models::CALLOUT_TAG => {
            DemoRule::Filter(RecordFilter::one_of("calloutId", callouts.to_vec()))
        }
        models::CALLOUT_RESPONSE => DemoRule::Grouped {
            owners: RecordFilter::one_of("id", callouts.to_vec()),
            dependents: RecordFilter::one_of("contactId", contacts.to_vec()),
        },
        _ => DemoRule::Skip,
    }
}

/// Primary keys of the first `limit` rows of an entity.
async fn sample_keys<S: RecordSource>(
    catalogue: &Catalogue,
    source: &S,
    entity: &str,
    limit: usize,
) -> Result<Vec<Value>> {
    let entity = catalogue
        .entity(entity)
        .ok_or_else(|| anyhow!("catalogue has no {entity} model"))?;
    let page = source
        .fetch_page(&PageRequest::new(entity, 0, limit))
        .await
        .with_context(|| format!("Failed to sample {}", entity.name))?;

    Ok(page.iter().filter_map(|record| entity.key_of(record)).collect())
}

/// A bounded sample: the first contacts and callouts by key, plus their rows.
pub async fn demo<S: RecordSource>(
    catalogue: &Catalogue,
    options: &ProfileOptions,
    source: &S,
) -> Result<ExportProfile> {
    options.check_treatments(catalogue)?;
    let contacts = sample_keys(catalogue, source, models::CONTACT, options.demo_contacts).await?;
    let callouts = sample_keys(catalogue, source, models::CALLOUT, options.demo_callouts).await?;
    info!(
        "Demo sample: {} contacts, {} callouts",
        contacts.len(),
        callouts.len()
    );

    let mut steps = Vec::new();
    for model in catalogue.models() {
        let step = match demo_rule(&model.entity.name, &contacts, &callouts) {
            DemoRule::All => step_for(catalogue, options, &model, None, None)?,
            DemoRule::Filter(filter) => step_for(catalogue, options, &model, Some(filter), None)?,
            DemoRule::Grouped { owners, dependents } => {
                step_for(catalogue, options, &model, Some(dependents), Some(owners))?
            }
            DemoRule::Skip => continue,
        };
        steps.push(step);
    }

    Ok(ExportProfile {
        name: "demo",
        clear_order: catalogue.order().clone(),
        steps,
    })
}

/// Build the requested profile.
pub async fn build<S: RecordSource>(
    kind: ProfileKind,
    catalogue: &Catalogue,
    options: &ProfileOptions,
    source: &S,
) -> Result<ExportProfile> {
    match kind {
        ProfileKind::Full => full(catalogue, options),
        ProfileKind::Demo => demo(catalogue, options, source).await,
    }
}
