//! Postal address generators.

use super::pick;
use anon_core::Generator;
use rand::Rng;
use serde_json::{json, Value};

const STREET_NAMES: &[&str] = &[
    "High", "Station", "Church", "Mill", "Park", "Victoria", "Queen", "King", "Green", "Manor",
    "Kingsway", "Chapel", "Orchard", "Meadow", "Bridge",
];

const STREET_KINDS: &[&str] = &["Street", "Road", "Lane", "Avenue", "Close", "Way", "Terrace"];

const CITIES: &[&str] = &[
    "Bristol", "Leeds", "Norwich", "Cardiff", "Glasgow", "Brighton", "York", "Exeter", "Bath",
    "Sheffield", "Oxford", "Derby",
];

const POSTCODE_LETTERS: &[u8] = b"ABDEFGHJLNPQRSTUWXYZ";

/// Generate a street line such as `42 Mill Lane`.
pub fn generate_street<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number = rng.random_range(1..=250);
    format!("{number} {} {}", pick(rng, STREET_NAMES), pick(rng, STREET_KINDS))
}

/// Generate a UK-shaped postcode such as `BS3 4QT`.
pub fn generate_postcode<R: Rng + ?Sized>(rng: &mut R) -> String {
    let letter =
        |rng: &mut R| POSTCODE_LETTERS[rng.random_range(0..POSTCODE_LETTERS.len())] as char;
    let area: String = [letter(rng), letter(rng)].iter().collect();
    let district = rng.random_range(1..=20);
    let sector = rng.random_range(0..=9);
    let unit: String = [letter(rng), letter(rng)].iter().collect();
    format!("{area}{district} {sector}{unit}")
}

/// Generate a geocoded address object.
///
/// ```text
/// { "formatted_address": "...", "geometry": { "location": { "lat": .., "lng": .. } } }
/// ```
pub fn generate_address<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let formatted = format!(
        "{}, {}, {}",
        generate_street(rng),
        pick(rng, CITIES),
        generate_postcode(rng)
    );
    let lat: f64 = rng.random_range(50.0..58.5);
    let lng: f64 = rng.random_range(-5.5..1.5);

    json!({
        "formatted_address": formatted,
        "geometry": {
            "location": {
                "lat": (lat * 1e6).round() / 1e6,
                "lng": (lng * 1e6).round() / 1e6,
            }
        }
    })
}

/// Random street line.
pub fn street() -> Generator {
    Generator::fresh("street", |rng| Value::String(generate_street(rng)))
}

/// Random city.
pub fn city() -> Generator {
    Generator::fresh("city", |rng| Value::String(pick(rng, CITIES).to_string()))
}

/// Random postcode.
pub fn postcode() -> Generator {
    Generator::fresh("postcode", |rng| Value::String(generate_postcode(rng)))
}

/// Random geocoded address object.
pub fn address() -> Generator {
    Generator::fresh("address", |rng| generate_address(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_postcode() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let postcode = generate_postcode(&mut rng);
            let (outward, inward) = postcode.split_once(' ').unwrap();

            assert!(outward.len() == 3 || outward.len() == 4);
            assert_eq!(inward.len(), 3);
            assert!(inward.chars().next().unwrap().is_ascii_digit());
        }
    }

    #[test]
    fn test_generate_address_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let address = generate_address(&mut rng);

        assert!(address["formatted_address"].is_string());
        let lat = address["geometry"]["location"]["lat"].as_f64().unwrap();
        let lng = address["geometry"]["location"]["lng"].as_f64().unwrap();
        assert!((50.0..=58.5).contains(&lat));
        assert!((-5.5..=1.5).contains(&lng));
    }

    #[test]
    fn test_street() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = street().generate(&Value::Null, &mut rng).unwrap();
        let street = value.as_str().unwrap();

        assert!(street.split(' ').next().unwrap().parse::<u32>().is_ok());
    }
}
