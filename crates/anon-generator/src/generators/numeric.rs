//! Numeric value generators.

use anon_core::Generator;
use rand::Rng;
use serde_json::{json, Value};

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> Value {
    if min >= max {
        return json!(min);
    }
    json!(rng.random_range(min..=max))
}

/// Generate a random amount in the given range, rounded to 2 decimal places.
pub fn generate_amount<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> Value {
    let value = if min >= max {
        min
    } else {
        rng.random_range(min..=max)
    };
    json!((value * 100.0).round() / 100.0)
}

/// Random integer in `min..=max`.
pub fn int_range(min: i64, max: i64) -> Generator {
    Generator::fresh("int_range", move |rng| generate_int_range(rng, min, max))
}

/// Random amount in `min..=max` with 2 decimal places.
pub fn amount(min: f64, max: f64) -> Generator {
    Generator::fresh("amount", move |rng| generate_amount(rng, min, max))
}

/// Random boolean.
pub fn boolean() -> Generator {
    Generator::fresh("boolean", |rng| Value::Bool(rng.random_bool(0.5)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_int_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let v = generate_int_range(&mut rng, 10, 20).as_i64().unwrap();
            assert!((10..=20).contains(&v));
        }
    }

    #[test]
    fn test_generate_int_range_degenerate() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(generate_int_range(&mut rng, 5, 5), json!(5));
    }

    #[test]
    fn test_generate_amount() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let v = generate_amount(&mut rng, 1.0, 50.0).as_f64().unwrap();
            assert!((1.0..=50.0).contains(&v));
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_boolean() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = boolean().generate(&Value::Null, &mut rng).unwrap();
        assert!(value.is_boolean());
    }
}
