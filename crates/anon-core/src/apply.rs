//! Recursive applier.
//!
//! Produces an anonymised copy of a record by walking a [`Spec`]. Every
//! generator-mapped value is routed through the run's [`ValueCache`], so the
//! same original value always yields the same substitute within one run.

use crate::cache::{canonical_key, KeyError, ValueCache};
use crate::record::{is_empty_value, kind_of, Record};
use crate::spec::{Generator, GeneratorError, Spec, SpecNode};
use rand::RngCore;
use serde_json::Value;

/// What happens to fields the spec does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Start from a copy of the record; unspecified fields pass through
    #[default]
    KeepUnspecified,
    /// Start empty; only specified fields appear in the output
    OmitUnspecified,
}

/// Error type for apply operations.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// A nested spec met a value that is not an object
    #[error("expected an object at '{path}', found {found}")]
    ExpectedObject { path: String, found: &'static str },

    /// The original value could not be turned into a cache key
    #[error("cannot key value at '{path}': {source}")]
    Key {
        path: String,
        #[source]
        source: KeyError,
    },

    /// A generator failed
    #[error("cannot anonymise '{path}': {source}")]
    Generator {
        path: String,
        #[source]
        source: GeneratorError,
    },
}

/// Apply `spec` to a record, producing a new record.
///
/// The input is never modified. Specified fields holding null or an empty
/// string are left as they are and never touch the cache. Nested specs are
/// always applied in [`CopyMode::KeepUnspecified`].
pub fn apply(
    record: &Record,
    spec: &Spec,
    cache: &mut ValueCache,
    rng: &mut dyn RngCore,
    mode: CopyMode,
) -> Result<Record, ApplyError> {
    let mut path = Vec::new();
    apply_object(record, spec, cache, rng, mode, &mut path)
}

/// Apply `spec` to an arbitrary value that must be an object.
///
/// Used for sub-objects such as free-form payloads.
pub fn apply_value(
    value: &Value,
    spec: &Spec,
    cache: &mut ValueCache,
    rng: &mut dyn RngCore,
    mode: CopyMode,
) -> Result<Value, ApplyError> {
    let mut path = Vec::new();
    apply_nested(value, spec, cache, rng, mode, &mut path)
}

fn apply_nested(
    value: &Value,
    spec: &Spec,
    cache: &mut ValueCache,
    rng: &mut dyn RngCore,
    mode: CopyMode,
    path: &mut Vec<String>,
) -> Result<Value, ApplyError> {
    match value {
        Value::Object(fields) => {
            apply_object(fields, spec, cache, rng, mode, path).map(Value::Object)
        }
        other => Err(ApplyError::ExpectedObject {
            path: display_path(path),
            found: kind_of(other),
        }),
    }
}

fn apply_object(
    fields: &Record,
    spec: &Spec,
    cache: &mut ValueCache,
    rng: &mut dyn RngCore,
    mode: CopyMode,
    path: &mut Vec<String>,
) -> Result<Record, ApplyError> {
    let mut out = match mode {
        CopyMode::KeepUnspecified => fields.clone(),
        CopyMode::OmitUnspecified => Record::new(),
    };

    for (name, node) in spec.iter() {
        let Some(value) = fields.get(name) else {
            continue;
        };

        // copied by the clone in keep mode, left out in omit mode
        if is_empty_value(value) {
            continue;
        }

        path.push(name.clone());
        let replaced = match node {
            SpecNode::Nested(inner) => {
                apply_nested(value, inner, cache, rng, CopyMode::KeepUnspecified, path)?
            }
            SpecNode::Generator(generator) => substitute(value, generator, cache, rng, path)?,
        };
        path.pop();

        out.insert(name.clone(), replaced);
    }

    Ok(out)
}

fn substitute(
    value: &Value,
    generator: &Generator,
    cache: &mut ValueCache,
    rng: &mut dyn RngCore,
    path: &[String],
) -> Result<Value, ApplyError> {
    let key = canonical_key(value).map_err(|source| ApplyError::Key {
        path: display_path(path),
        source,
    })?;

    if let Some(existing) = cache.get(&key) {
        return Ok(existing.clone());
    }

    let fresh = generator
        .generate(value, rng)
        .map_err(|source| ApplyError::Generator {
            path: display_path(path),
            source,
        })?;

    Ok(cache.set(key, fresh).clone())
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn counter_generator(prefix: &'static str) -> (Generator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let generator = Generator::fresh(prefix, move |_| {
            let n = seen.fetch_add(1, Ordering::SeqCst);
            json!(format!("{prefix}-{n}"))
        });
        (generator, calls)
    }

    fn random_id() -> Generator {
        Generator::fresh("random_id", |rng| json!(rng.random::<u64>()))
    }

    #[test]
    fn test_keep_mode_copies_unspecified_fields() {
        let (name_gen, _) = counter_generator("name");
        let spec = Spec::new().field("name", name_gen);
        let input = record(json!({"id": 7, "name": "Alice", "joined": "2020-01-01"}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = apply(&input, &spec, &mut cache, &mut rng, CopyMode::KeepUnspecified).unwrap();

        assert_eq!(out["id"], json!(7));
        assert_eq!(out["joined"], json!("2020-01-01"));
        assert_eq!(out["name"], json!("name-0"));
        assert_eq!(input["name"], json!("Alice"));
    }

    #[test]
    fn test_omit_mode_drops_unspecified_fields() {
        let (name_gen, _) = counter_generator("name");
        let spec = Spec::new().field("name", name_gen).field("missing", random_id());
        let input = record(json!({"id": 7, "name": "Alice"}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = apply(&input, &spec, &mut cache, &mut rng, CopyMode::OmitUnspecified).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out["name"], json!("name-0"));
        assert!(!out.contains_key("missing"));
    }

    #[test]
    fn test_empty_values_are_untouched_and_not_cached() {
        let (gen, calls) = counter_generator("x");
        let spec = Spec::new()
            .field("a", gen.clone())
            .field("b", gen.clone())
            .field("c", gen);
        let input = record(json!({"a": null, "b": "", "d": "untouched"}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = apply(&input, &spec, &mut cache, &mut rng, CopyMode::KeepUnspecified).unwrap();

        assert_eq!(out["a"], Value::Null);
        assert_eq!(out["b"], json!(""));
        assert!(!out.contains_key("c"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());

        let out = apply(&input, &spec, &mut cache, &mut rng, CopyMode::OmitUnspecified).unwrap();
        assert!(!out.contains_key("a"));
        assert!(!out.contains_key("b"));
        assert!(!out.contains_key("d"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_nested_spec_always_copies() {
        let (hash_gen, _) = counter_generator("hash");
        let spec = Spec::new().nested("password", Spec::new().field("hash", hash_gen));
        let input = record(json!({
            "id": 1,
            "password": {"hash": "abc", "salt": "def", "iterations": 1000}
        }));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = apply(&input, &spec, &mut cache, &mut rng, CopyMode::OmitUnspecified).unwrap();

        assert!(!out.contains_key("id"));
        assert_eq!(
            out["password"],
            json!({"hash": "hash-0", "salt": "def", "iterations": 1000})
        );
    }

    #[test]
    fn test_same_original_value_same_substitute_across_specs() {
        let contact_spec = Spec::new().field("id", random_id());
        let payment_spec = Spec::new()
            .field("id", random_id())
            .field("contactId", random_id());

        let contact = record(json!({"id": "c-1", "email": "a@b.c"}));
        let payment = record(json!({"id": "p-1", "contactId": "c-1"}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(99);
        let keep = CopyMode::KeepUnspecified;
        let new_contact = apply(&contact, &contact_spec, &mut cache, &mut rng, keep).unwrap();
        let new_payment = apply(&payment, &payment_spec, &mut cache, &mut rng, keep).unwrap();

        assert_eq!(new_contact["id"], new_payment["contactId"]);
        assert_ne!(new_payment["id"], new_payment["contactId"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_is_consulted_before_generator() {
        let (gen, calls) = counter_generator("v");
        let spec = Spec::new().field("x", gen);
        let input = record(json!({"x": {"b": 1, "a": 2}}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..3 {
            let out =
                apply(&input, &spec, &mut cache, &mut rng, CopyMode::KeepUnspecified).unwrap();
            assert_eq!(out["x"], json!("v-0"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_nested_spec_on_scalar_fails() {
        let spec = Spec::new().nested("address", Spec::new().field("line1", random_id()));
        let input = record(json!({"address": "10 Downing Street"}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        let err =
            apply(&input, &spec, &mut cache, &mut rng, CopyMode::KeepUnspecified).unwrap_err();

        assert!(matches!(
            err,
            ApplyError::ExpectedObject { ref path, found: "string" } if path == "address"
        ));
    }

    #[test]
    fn test_generator_failure_reports_path() {
        let failing = Generator::new("boom", |_, _| Err(GeneratorError::new("boom", "no luck")));
        let spec = Spec::new().nested("profile", Spec::new().field("bio", failing));
        let input = record(json!({"profile": {"bio": "hello"}}));

        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);
        let err =
            apply(&input, &spec, &mut cache, &mut rng, CopyMode::KeepUnspecified).unwrap_err();

        assert_eq!(
            err.to_string(),
            "cannot anonymise 'profile.bio': generator 'boom' failed: no luck"
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_apply_value_requires_object() {
        let spec = Spec::new();
        let mut cache = ValueCache::new();
        let mut rng = StdRng::seed_from_u64(1);

        let keep = CopyMode::KeepUnspecified;
        let err = apply_value(&json!([1, 2]), &spec, &mut cache, &mut rng, keep).unwrap_err();
        assert!(matches!(err, ApplyError::ExpectedObject { found: "array", .. }));

        let omit = CopyMode::OmitUnspecified;
        let out = apply_value(&json!({"k": 1}), &spec, &mut cache, &mut rng, omit).unwrap();
        assert_eq!(out, json!({}));
    }
}
