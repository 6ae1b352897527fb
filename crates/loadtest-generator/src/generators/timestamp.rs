//! Timestamp value generators.

use bench_core::{parse_timestamp, ScalarValue};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Generate the current UTC timestamp.
///
/// This is NOT deterministic - each call returns the current time.
pub fn generate_timestamp_now() -> ScalarValue {
    ScalarValue::Timestamp(Utc::now())
}

/// Generate a random timestamp (whole seconds) in the given range.
///
/// Bounds are validated when the schema is loaded; unparseable bounds fall
/// back to the current time.
pub fn generate_timestamp_range<R: Rng + ?Sized>(rng: &mut R, start: &str, end: &str) -> ScalarValue {
    match (parse_timestamp(start), parse_timestamp(end)) {
        (Some(start), Some(end)) => {
            let start_ts = start.timestamp();
            let end_ts = end.timestamp();

            if start_ts >= end_ts {
                ScalarValue::Timestamp(start)
            } else {
                let random_ts = rng.gen_range(start_ts..=end_ts);
                let dt = DateTime::from_timestamp(random_ts, 0).unwrap_or(start);
                ScalarValue::Timestamp(dt)
            }
        }
        (Some(dt), None) | (None, Some(dt)) => ScalarValue::Timestamp(dt),
        (None, None) => ScalarValue::Timestamp(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_timestamp_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            match generate_timestamp_range(&mut rng, "2020-01-01", "2024-12-31T23:59:59Z") {
                ScalarValue::Timestamp(dt) => assert!((2020..=2024).contains(&dt.year())),
                other => panic!("Expected Timestamp, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_deterministic_generation() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(
            generate_timestamp_range(&mut rng1, "2020-01-01", "2024-01-01"),
            generate_timestamp_range(&mut rng2, "2020-01-01", "2024-01-01")
        );
    }

    #[test]
    fn test_timestamp_now_is_recent() {
        let before = Utc::now();
        match generate_timestamp_now() {
            ScalarValue::Timestamp(dt) => assert!(dt >= before),
            other => panic!("Expected Timestamp, got {other:?}"),
        }
    }
}
