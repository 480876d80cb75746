//! Individual value generators.
//!
//! Each submodule exposes `generate_*` functions taking an RNG, and
//! constructors wrapping them into [`Generator`](anon_core::Generator)s.

pub mod address;
pub mod choice;
pub mod identity;
pub mod numeric;
pub mod person;
pub mod static_value;
pub mod text;
pub mod timestamp;
pub mod web;

pub use address::{address, city, postcode, street};
pub use choice::{one_of, some_of};
pub use identity::{code, hex, uuid};
pub use numeric::{amount, boolean, int_range};
pub use person::{email, first_name, full_name, last_name, phone_number};
pub use static_value::{constant, null};
pub use text::{paragraph, sentence, word};
pub use timestamp::{date_between, time_of_day, timestamp_between};
pub use web::{image_upload, signature, url};

use rand::Rng;

/// Pick one entry from a non-empty static word list.
pub(crate) fn pick<R: Rng + ?Sized>(rng: &mut R, list: &[&'static str]) -> &'static str {
    list[rng.random_range(0..list.len())]
}
