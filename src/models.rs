//! CRM model catalogue.
//!
//! Entity descriptors for the membership database, in dependency order, and
//! the static spec that anonymises each of them. Identifier columns use the
//! same generator wherever they appear so that a contact id rewritten in
//! `contact` is rewritten identically in every table referencing it (the
//! run's cache guarantees the identical substitute; a shared generator keeps
//! the shape identical even for ids first met as a foreign key).

use anon_core::{DependencyOrder, EntityDescriptor, OrderError, Spec};
use anon_generator::generators::{
    city, code, constant, email, first_name, full_name, hex, last_name, paragraph, phone_number,
    postcode, sentence, street, uuid, word,
};
use serde_json::json;
use std::collections::HashMap;

pub const CONTENT: &str = "Content";
pub const OPTION: &str = "Option";
pub const EMAIL: &str = "Email";
pub const SEGMENT: &str = "Segment";
pub const NOTICE: &str = "Notice";
pub const CONTACT: &str = "Contact";
pub const CONTACT_ROLE: &str = "ContactRole";
pub const CONTACT_PROFILE: &str = "ContactProfile";
pub const CONTACT_CONTRIBUTION: &str = "ContactContribution";
pub const PAYMENT: &str = "Payment";
pub const RESET_SECURITY_FLOW: &str = "ResetSecurityFlow";
pub const API_KEY: &str = "ApiKey";
pub const SEGMENT_CONTACT: &str = "SegmentContact";
pub const EMAIL_MAILING: &str = "EmailMailing";
pub const CALLOUT: &str = "Callout";
pub const CALLOUT_TAG: &str = "CalloutTag";
pub const CALLOUT_RESPONSE: &str = "CalloutResponse";
pub const CALLOUT_RESPONSE_COMMENT: &str = "CalloutResponseComment";
pub const CALLOUT_RESPONSE_TAG: &str = "CalloutResponseTag";
pub const PROJECT: &str = "Project";
pub const PROJECT_CONTACT: &str = "ProjectContact";
pub const PROJECT_ENGAGEMENT: &str = "ProjectEngagement";

/// One entity and its static spec.
#[derive(Debug, Clone)]
pub struct Model {
    pub entity: EntityDescriptor,
    pub spec: Spec,
}

/// Every exportable model, in dependency order.
#[derive(Debug, Clone)]
pub struct Catalogue {
    order: DependencyOrder,
    specs: HashMap<String, Spec>,
}

impl Catalogue {
    /// The membership database catalogue, with email addresses in `email_domain`.
    pub fn crm(email_domain: &str) -> Result<Self, OrderError> {
        Self::new(crm_models(email_domain))
    }

    /// Validate the order of `models` and index their specs.
    pub fn new(models: Vec<Model>) -> Result<Self, OrderError> {
        let mut specs = HashMap::with_capacity(models.len());
        let mut entities = Vec::with_capacity(models.len());
        for model in models {
            specs.insert(model.entity.name.clone(), model.spec);
            entities.push(model.entity);
        }

        Ok(Self {
            order: DependencyOrder::new(entities)?,
            specs,
        })
    }

    /// Entities in dependency order.
    pub fn order(&self) -> &DependencyOrder {
        &self.order
    }

    /// Descriptor of a named entity.
    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.order.get(name)
    }

    /// Static spec of a named entity.
    pub fn spec(&self, name: &str) -> Option<&Spec> {
        self.specs.get(name)
    }

    /// Models in dependency order.
    pub fn models(&self) -> impl Iterator<Item = Model> + '_ {
        self.order.forward().map(|entity| Model {
            entity: entity.clone(),
            spec: self.specs.get(&entity.name).cloned().unwrap_or_default(),
        })
    }
}

fn model(entity: EntityDescriptor, spec: Spec) -> Model {
    Model { entity, spec }
}

fn crm_models(email_domain: &str) -> Vec<Model> {
    let contact_id = uuid();
    let response_id = uuid();

    vec![
        model(EntityDescriptor::new(CONTENT, "content", ["id"]), Spec::new()),
        model(EntityDescriptor::new(OPTION, "option", ["key"]), Spec::new()),
        model(EntityDescriptor::new(EMAIL, "email", ["id"]), Spec::new()),
        model(EntityDescriptor::new(SEGMENT, "segment", ["id"]), Spec::new()),
        model(EntityDescriptor::new(NOTICE, "notice", ["id"]), Spec::new()),
        model(
            EntityDescriptor::new(CONTACT, "contact", ["id"]),
            Spec::new()
                .field("id", contact_id.clone())
                .field("email", email(email_domain))
                .field("firstname", first_name())
                .field("lastname", last_name())
                .field("passwordHash", hex(128))
                .field("passwordSalt", hex(64))
                .field("passwordTries", constant(json!(0)))
                .field("otpKey", code("", 32))
                .field("otpActivated", constant(json!(false))),
        ),
        model(
            EntityDescriptor::new(CONTACT_ROLE, "contact_role", ["contactId", "type"])
                .references([CONTACT]),
            Spec::new().field("contactId", contact_id.clone()),
        ),
        model(
            EntityDescriptor::new(CONTACT_PROFILE, "contact_profile", ["contactId"])
                .references([CONTACT]),
            Spec::new()
                .field("contactId", contact_id.clone())
                .field("description", sentence())
                .field("bio", paragraph())
                .field("notes", sentence())
                .field("telephone", phone_number())
                .field("twitter", word())
                .field("tags", constant(json!([])))
                .nested(
                    "deliveryAddress",
                    Spec::new()
                        .field("line1", street())
                        .field("line2", constant(json!("")))
                        .field("city", city())
                        .field("postcode", postcode()),
                ),
        ),
        model(
            EntityDescriptor::new(CONTACT_CONTRIBUTION, "contact_contribution", ["contactId"])
                .references([CONTACT]),
            Spec::new()
                .field("contactId", contact_id.clone())
                .field("customerId", code("cus_", 14))
                .field("mandateId", code("MD", 12))
                .field("subscriptionId", code("sub_", 14)),
        ),
        model(
            EntityDescriptor::new(PAYMENT, "payment", ["id"]).references([CONTACT]),
            Spec::new()
                .field("id", uuid())
                .field("subscriptionId", code("sub_", 14))
                .field("contactId", contact_id.clone()),
        ),
        model(
            EntityDescriptor::new(RESET_SECURITY_FLOW, "reset_security_flow", ["id"])
                .references([CONTACT]),
            Spec::new()
                .field("id", uuid())
                .field("contactId", contact_id.clone()),
        ),
        model(
            EntityDescriptor::new(API_KEY, "api_key", ["id"]).references([CONTACT]),
            Spec::new()
                .field("id", code("", 8))
                .field("secretHash", hex(64))
                .field("creatorId", contact_id.clone()),
        ),
        model(
            EntityDescriptor::new(SEGMENT_CONTACT, "segment_contacts", ["segmentId", "contactId"])
                .references([SEGMENT, CONTACT]),
            Spec::new().field("contactId", contact_id.clone()),
        ),
        model(
            EntityDescriptor::new(EMAIL_MAILING, "email_mailing", ["id"]).references([EMAIL]),
            Spec::new().field("recipients", constant(json!([]))),
        ),
        model(EntityDescriptor::new(CALLOUT, "callout", ["id"]), Spec::new()),
        model(
            EntityDescriptor::new(CALLOUT_TAG, "callout_tag", ["id"]).references([CALLOUT]),
            Spec::new(),
        ),
        model(
            EntityDescriptor::new(CALLOUT_RESPONSE, "callout_response", ["id"])
                .references([CALLOUT, CONTACT]),
            Spec::new()
                .field("id", response_id.clone())
                .field("contactId", contact_id.clone())
                .field("guestName", full_name())
                .field("guestEmail", email(email_domain)),
        ),
        model(
            EntityDescriptor::new(CALLOUT_RESPONSE_COMMENT, "callout_response_comment", ["id"])
                .references([CONTACT, CALLOUT_RESPONSE]),
            Spec::new()
                .field("id", uuid())
                .field("contactId", contact_id.clone())
                .field("responseId", response_id.clone())
                .field("text", paragraph()),
        ),
        model(
            EntityDescriptor::new(
                CALLOUT_RESPONSE_TAG,
                "callout_response_tag",
                ["responseId", "tagId"],
            )
            .references([CALLOUT_RESPONSE, CALLOUT_TAG]),
            Spec::new().field("responseId", response_id),
        ),
        model(
            EntityDescriptor::new(PROJECT, "project", ["id"]).references([CONTACT]),
            Spec::new()
                .field("ownerId", contact_id.clone())
                .field("title", sentence())
                .field("description", paragraph()),
        ),
        model(
            EntityDescriptor::new(PROJECT_CONTACT, "project_contact", ["id"])
                .references([PROJECT, CONTACT]),
            Spec::new()
                .field("id", uuid())
                .field("contactId", contact_id.clone())
                .field("tag", word()),
        ),
        model(
            EntityDescriptor::new(PROJECT_ENGAGEMENT, "project_engagement", ["id"])
                .references([PROJECT, CONTACT]),
            Spec::new()
                .field("id", uuid())
                .field("byContactId", contact_id.clone())
                .field("toContactId", contact_id)
                .field("notes", sentence()),
        ),
    ]
}
