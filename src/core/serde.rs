use serde::{Serialize, Deserialize, Serializer, Deserializer};
use std::time::Duration;

/// Serializes an optional Duration as seconds or null
pub fn serialize_opt_duration<S>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration.map(|d| d.as_secs_f64()).serialize(serializer)
}

/// Deserializes an optional Duration from seconds or null
pub fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?
        .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Test {
        #[serde(serialize_with = "serialize_opt_duration")]
        #[serde(deserialize_with = "deserialize_opt_duration")]
        period: Option<Duration>,
        #[serde(serialize_with = "serialize_opt_duration")]
        #[serde(deserialize_with = "deserialize_opt_duration")]
        timeout: Option<Duration>,
    }

    #[test]
    fn test_duration_serialization() {
        let value = Test {
            period: Some(Duration::from_millis(1500)),
            timeout: None,
        };

        let serialized = serde_json::to_string(&value).unwrap();
        assert_eq!(serialized, r#"{"period":1.5,"timeout":null}"#);

        let deserialized: Test = serde_json::from_str(&serialized).unwrap();
        assert_eq!(value, deserialized);
    }

    #[test]
    fn test_optional_duration() {
        let parsed: Test = serde_json::from_str(r#"{"period":30.0,"timeout":2.0}"#).unwrap();
        assert_eq!(parsed.period, Some(Duration::from_secs(30)));
        assert_eq!(parsed.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let parsed: Result<Test, _> = serde_json::from_str(r#"{"period":-1.0,"timeout":null}"#);
        assert!(parsed.is_err());
    }
}
