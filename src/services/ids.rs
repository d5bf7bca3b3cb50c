//! 64-bit ids travel as decimal strings in JSON; inputs accept either form.

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn resolve<E: Error>(self) -> Result<i64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id: {s:?}"))),
        }
    }
}

pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawId::deserialize(deserializer)?.resolve()
}

/// Missing, `null` and `""` all mean "none".
pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(raw) => raw.resolve().map(Some),
    }
}

/// Parse an id taken from a URL path segment.
pub fn parse(raw: &str) -> Option<i64> {
    raw.trim().parse().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(deserialize_with = "id")]
        a: i64,
        #[serde(default, deserialize_with = "opt_id")]
        b: Option<i64>,
    }

    #[test]
    fn test_accepts_strings_and_numbers() {
        let p: Payload = serde_json::from_str(r#"{"a": "9007199254740993", "b": 7}"#).unwrap();
        assert_eq!(p.a, 9_007_199_254_740_993);
        assert_eq!(p.b, Some(7));

        let p: Payload = serde_json::from_str(r#"{"a": 3, "b": ""}"#).unwrap();
        assert_eq!(p.b, None);

        let p: Payload = serde_json::from_str(r#"{"a": 3}"#).unwrap();
        assert_eq!(p.b, None);

        assert!(serde_json::from_str::<Payload>(r#"{"a": "x1"}"#).is_err());
    }

    #[test]
    fn test_parse_path_id() {
        assert_eq!(parse("42"), Some(42));
        assert_eq!(parse("0"), None);
        assert_eq!(parse("abc"), None);
    }
}
