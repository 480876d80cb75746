//! Identifier generators.

use anon_core::Generator;
use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// Generate an upper-case code of `len` characters, skipping look-alikes.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generate a lower-case hex string of `len` characters.
pub fn generate_hex<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..16), 16).unwrap_or('0'))
        .collect()
}

/// Random UUID v4, as a string.
pub fn uuid() -> Generator {
    Generator::fresh("uuid", |rng| Value::String(generate_uuid_v4(rng).to_string()))
}

/// Random code with an optional prefix, e.g. `cus_7KQ2M9XH`.
pub fn code(prefix: &'static str, len: usize) -> Generator {
    Generator::fresh("code", move |rng| {
        Value::String(format!("{prefix}{}", generate_code(rng, len)))
    })
}

/// Random hex string of `len` characters.
pub fn hex(len: usize) -> Generator {
    Generator::fresh("hex", move |rng| Value::String(generate_hex(rng, len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_generate_uuid_v4() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate_uuid_v4(&mut rng);
        let b = generate_uuid_v4(&mut rng);

        assert_eq!(a.get_version_num(), 4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_uuid_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(generate_uuid_v4(&mut rng1), generate_uuid_v4(&mut rng2));
    }

    #[test]
    fn test_uuid_generator_ignores_original() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = uuid().generate(&json!("whatever"), &mut rng).unwrap();

        let parsed = Uuid::parse_str(value.as_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_code() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = code("cus_", 8).generate(&Value::Null, &mut rng).unwrap();
        let s = value.as_str().unwrap();

        assert!(s.starts_with("cus_"));
        assert_eq!(s.len(), 12);
        assert!(s[4..].bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_hex() {
        let mut rng = StdRng::seed_from_u64(42);
        let s = generate_hex(&mut rng, 32);

        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
