//! URL and upload generators.

use super::text::generate_word;
use anon_core::Generator;
use rand::Rng;
use serde_json::{json, Value};

/// A 1x1 transparent PNG.
const BLANK_SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Generate an `https` URL under `example.org`.
pub fn generate_url<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "https://{}-{}.example.org/{}",
        generate_word(rng),
        generate_word(rng),
        generate_word(rng)
    )
}

/// Generate a file-upload answer pointing at a placeholder image.
pub fn generate_image_upload<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let id = rng.random_range(1..=1000);
    json!([{
        "name": format!("{}.jpg", generate_word(rng)),
        "url": format!("https://picsum.photos/id/{id}/200/300"),
    }])
}

/// Random URL.
pub fn url() -> Generator {
    Generator::fresh("url", |rng| Value::String(generate_url(rng)))
}

/// Placeholder image upload.
pub fn image_upload() -> Generator {
    Generator::fresh("image_upload", |rng| generate_image_upload(rng))
}

/// Blank signature image.
pub fn signature() -> Generator {
    Generator::fresh("signature", |_| Value::String(BLANK_SIGNATURE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_url() {
        let mut rng = StdRng::seed_from_u64(42);
        let url = generate_url(&mut rng);

        assert!(url.starts_with("https://"));
        assert!(url.contains(".example.org/"));
    }

    #[test]
    fn test_generate_image_upload() {
        let mut rng = StdRng::seed_from_u64(42);
        let upload = generate_image_upload(&mut rng);
        let files = upload.as_array().unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0]["name"].as_str().unwrap().ends_with(".jpg"));
        assert!(files[0]["url"].as_str().unwrap().starts_with("https://picsum.photos/"));
    }

    #[test]
    fn test_signature_is_data_uri() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = signature().generate(&Value::Null, &mut rng).unwrap();

        assert!(value.as_str().unwrap().starts_with("data:image/png;base64,"));
    }
}
