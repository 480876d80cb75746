//! Personal data generators.

use super::pick;
use anon_core::Generator;
use rand::Rng;
use serde_json::Value;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Amara", "Ben", "Chloe", "Dev", "Elena", "Farah", "George", "Hana", "Ibrahim",
    "Isla", "Jamal", "Kate", "Leo", "Maya", "Nadia", "Oscar", "Priya", "Quinn", "Rosa", "Sam",
    "Tomas", "Uma", "Victor", "Wren", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Baker", "Chen", "Davies", "Evans", "Fischer", "Garcia", "Hughes", "Ito", "Jones",
    "Khan", "Lewis", "Morgan", "Nowak", "Okafor", "Patel", "Quinn", "Roberts", "Smith", "Taylor",
    "Usman", "Vega", "Walsh", "Young", "Zielinski",
];

const EMAIL_LOCAL_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random email address in `domain`.
pub fn generate_email<R: Rng + ?Sized>(rng: &mut R, domain: &str) -> String {
    let local: String = (0..10)
        .map(|_| EMAIL_LOCAL_ALPHABET[rng.random_range(0..EMAIL_LOCAL_ALPHABET.len())] as char)
        .collect();
    format!("{local}@{domain}")
}

/// Generate a UK-style mobile number.
pub fn generate_phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let digits: String = (0..9)
        .map(|_| char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'))
        .collect();
    format!("07{digits}")
}

/// Random first name.
pub fn first_name() -> Generator {
    Generator::fresh("first_name", |rng| Value::String(pick(rng, FIRST_NAMES).to_string()))
}

/// Random last name.
pub fn last_name() -> Generator {
    Generator::fresh("last_name", |rng| Value::String(pick(rng, LAST_NAMES).to_string()))
}

/// Random "First Last" name.
pub fn full_name() -> Generator {
    Generator::fresh("full_name", |rng| {
        let first = pick(rng, FIRST_NAMES);
        let last = pick(rng, LAST_NAMES);
        Value::String(format!("{first} {last}"))
    })
}

/// Random email address in `domain`.
pub fn email(domain: impl Into<String>) -> Generator {
    let domain = domain.into();
    Generator::fresh("email", move |rng| Value::String(generate_email(rng, &domain)))
}

/// Random mobile number.
pub fn phone_number() -> Generator {
    Generator::fresh("phone_number", |rng| Value::String(generate_phone_number(rng)))
}
