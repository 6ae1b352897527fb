//! Duration fields in configuration files.
//!
//! Durations may be written as a string (`"300"`, `"30s"`, `"5m"`, `"1h"`)
//! or as a bare integer number of seconds.

use loadtest_populate::parse_duration;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

impl RawDuration {
    fn into_duration<E: serde::de::Error>(self) -> Result<Duration, E> {
        match self {
            RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(text) => parse_duration(&text).map_err(E::custom),
        }
    }
}

/// Deserialize an optional duration; `null` or a missing field is `None`.
pub fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawDuration>::deserialize(deserializer)? {
        Some(raw) => raw.into_duration().map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_optional_duration")]
        timeout: Option<Duration>,
    }

    #[test]
    fn test_string_and_integer_forms() {
        let h: Holder = serde_json::from_str(r#"{"timeout": "5m"}"#).unwrap();
        assert_eq!(h.timeout, Some(Duration::from_secs(300)));

        let h: Holder = serde_json::from_str(r#"{"timeout": 45}"#).unwrap();
        assert_eq!(h.timeout, Some(Duration::from_secs(45)));

        let h: Holder = serde_json::from_str(r#"{"timeout": null}"#).unwrap();
        assert_eq!(h.timeout, None);

        let h: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(h.timeout, None);
    }

    #[test]
    fn test_rejects_bad_duration() {
        assert!(serde_json::from_str::<Holder>(r#"{"timeout": "soon"}"#).is_err());
    }
}
