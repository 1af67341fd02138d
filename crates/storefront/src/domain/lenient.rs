use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    fn into_id<E: Error>(self) -> Result<i64, E> {
        match self {
            RawId::Int(id) => Ok(id),
            RawId::Float(id) if id.fract() == 0.0 => Ok(id as i64),
            RawId::Float(id) => Err(E::custom(format!("fractional id: {id}"))),
            RawId::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("invalid id: {text:?}"))),
        }
    }
}

/// Identifiers arrive as numbers from the services and as strings from
/// older socket payloads; both are accepted.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.into_id()
}

pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::into_id)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "deserialize_id")]
        id: i64,
        #[serde(default, deserialize_with = "deserialize_opt_id")]
        other: Option<i64>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let probe: Probe = serde_json::from_str(r#"{"id": "42", "other": 7}"#).unwrap();
        assert_eq!(probe.id, 42);
        assert_eq!(probe.other, Some(7));

        let probe: Probe = serde_json::from_str(r#"{"id": 3.0, "other": null}"#).unwrap();
        assert_eq!(probe.id, 3);
        assert_eq!(probe.other, None);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(serde_json::from_str::<Probe>(r#"{"id": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"id": 1.5}"#).is_err());
    }
}
