//! Lorem-style text generators.

use super::pick;
use anon_core::Generator;
use rand::Rng;
use serde_json::Value;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "voluptate",
    "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint", "occaecat",
    "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt", "mollit",
    "anim", "id", "est", "laborum",
];

/// Generate a single lower-case word.
pub fn generate_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(rng, WORDS)
}

/// Generate a capitalised sentence of 6 to 14 words ending in a full stop.
pub fn generate_sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.random_range(6..=14);
    let words: Vec<&str> = (0..count).map(|_| generate_word(rng)).collect();
    let joined = words.join(" ");

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Generate a paragraph of 3 to 6 sentences.
pub fn generate_paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.random_range(3..=6);
    (0..count)
        .map(|_| generate_sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Random word.
pub fn word() -> Generator {
    Generator::fresh("word", |rng| Value::String(generate_word(rng).to_string()))
}

/// Random sentence.
pub fn sentence() -> Generator {
    Generator::fresh("sentence", |rng| Value::String(generate_sentence(rng)))
}

/// Random paragraph.
pub fn paragraph() -> Generator {
    Generator::fresh("paragraph", |rng| Value::String(generate_paragraph(rng)))
}
