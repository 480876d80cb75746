//! Generators drawing from a fixed set of options.

use anon_core::{Generator, GeneratorError};
use rand::Rng;
use serde_json::{Map, Value};

/// Pick one option at random, or `None` if there are no options.
pub fn generate_one_of<'a, R: Rng + ?Sized>(
    rng: &mut R,
    options: &'a [Value],
) -> Option<&'a Value> {
    if options.is_empty() {
        return None;
    }
    Some(&options[rng.random_range(0..options.len())])
}

/// Build a multi-select answer: every option mapped to a random boolean.
pub fn generate_some_of<R: Rng + ?Sized>(rng: &mut R, options: &[Value]) -> Value {
    let mut selected = Map::with_capacity(options.len());
    for option in options {
        selected.insert(option_key(option), Value::Bool(rng.random_bool(0.5)));
    }
    Value::Object(selected)
}

fn option_key(option: &Value) -> String {
    match option {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One of `options`, chosen uniformly.
///
/// Fails at generation time when `options` is empty.
pub fn one_of(options: Vec<Value>) -> Generator {
    Generator::new("one_of", move |_, rng| {
        generate_one_of(rng, &options)
            .cloned()
            .ok_or_else(|| GeneratorError::new("one_of", "no options to choose from"))
    })
}

/// Object mapping each of `options` to a random boolean.
pub fn some_of(options: Vec<Value>) -> Generator {
    Generator::fresh("some_of", move |rng| generate_some_of(rng, &options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_one_of_picks_an_option() {
        let mut rng = StdRng::seed_from_u64(42);
        let options = vec![json!("a"), json!("b"), json!(3)];
        let generator = one_of(options.clone());

        for _ in 0..20 {
            let value = generator.generate(&json!("orig"), &mut rng).unwrap();
            assert!(options.contains(&value));
        }
    }

    #[test]
    fn test_one_of_empty_fails() {
        let mut rng = StdRng::seed_from_u64(42);
        let err = one_of(vec![]).generate(&json!("x"), &mut rng).unwrap_err();

        assert_eq!(err.generator, "one_of");
    }

    #[test]
    fn test_some_of_keys() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_some_of(&mut rng, &[json!("red"), json!("blue"), json!(7)]);
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert!(object["red"].is_boolean());
        assert!(object["blue"].is_boolean());
        assert!(object["7"].is_boolean());
    }

    #[test]
    fn test_some_of_empty() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(generate_some_of(&mut rng, &[]), json!({}));
    }
}
