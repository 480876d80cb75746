//! Date and time generators.

use anon_core::{Generator, GeneratorError};
use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use rand::Rng;
use serde_json::Value;

/// Generate a timestamp uniformly between `start` and `end` (inclusive).
pub fn generate_timestamp<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let (lo, hi) = if start <= end {
        (start.timestamp(), end.timestamp())
    } else {
        (end.timestamp(), start.timestamp())
    };
    DateTime::from_timestamp(rng.random_range(lo..=hi), 0)
}

/// Generate a time of day as `HH:MM:SS`.
pub fn generate_time_of_day<R: Rng + ?Sized>(rng: &mut R) -> String {
    let seconds = rng.random_range(0..86_400u32);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .unwrap_or(NaiveTime::MIN)
        .format("%H:%M:%S")
        .to_string()
}

/// Random RFC 3339 timestamp between `start` and `end`.
pub fn timestamp_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Generator {
    Generator::new("timestamp", move |_, rng| {
        generate_timestamp(rng, start, end)
            .map(|ts| Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .ok_or_else(|| GeneratorError::new("timestamp", "timestamp out of range"))
    })
}

/// Random calendar date between `start` and `end`, formatted `YYYY-MM-DD`.
pub fn date_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Generator {
    Generator::new("date", move |_, rng| {
        generate_timestamp(rng, start, end)
            .map(|ts| Value::String(ts.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| GeneratorError::new("date", "date out of range"))
    })
}

/// Random time of day, formatted `HH:MM:SS`.
pub fn time_of_day() -> Generator {
    Generator::fresh("time_of_day", |rng| Value::String(generate_time_of_day(rng)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn test_generate_timestamp_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let (start, end) = range();

        for _ in 0..100 {
            let ts = generate_timestamp(&mut rng, start, end).unwrap();
            assert!(ts >= start && ts <= end);
        }
    }

    #[test]
    fn test_generate_timestamp_swapped_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let (start, end) = range();
        let ts = generate_timestamp(&mut rng, end, start).unwrap();

        assert!(ts >= start && ts <= end);
    }

    #[test]
    fn test_timestamp_between_rfc3339() {
        let mut rng = StdRng::seed_from_u64(42);
        let (start, end) = range();
        let value = timestamp_between(start, end)
            .generate(&Value::Null, &mut rng)
            .unwrap();

        assert!(DateTime::parse_from_rfc3339(value.as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_date_between_is_date_only() {
        let mut rng = StdRng::seed_from_u64(42);
        let (start, end) = range();
        let value = date_between(start, end)
            .generate(&Value::Null, &mut rng)
            .unwrap();

        let date = NaiveDate::parse_from_str(value.as_str().unwrap(), "%Y-%m-%d").unwrap();
        assert!(date >= start.date_naive() && date <= end.date_naive());
        assert_eq!(value.as_str().unwrap().len(), 10);
    }

    #[test]
    fn test_time_of_day_format() {
        let mut rng = StdRng::seed_from_u64(42);
        let time = generate_time_of_day(&mut rng);

        assert!(NaiveTime::parse_from_str(&time, "%H:%M:%S").is_ok());
    }
}
