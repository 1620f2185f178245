//! Serde helpers for the `yyyy-MM-dd HH:mm:ss` wire format used by both
//! services for every date-time field.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

use super::DATE_FORMAT;

pub mod date_format {
    use super::*;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub mod option_date_format {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) => NaiveDateTime::parse_from_str(&s, DATE_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamp {
        #[serde(with = "super::date_format")]
        at: chrono::NaiveDateTime,
        #[serde(default, with = "super::option_date_format")]
        maybe: Option<chrono::NaiveDateTime>,
    }

    #[test]
    fn round_trips_wire_format() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(18, 0, 5)
            .unwrap();
        let json = serde_json::to_string(&Stamp { at, maybe: None }).unwrap();
        assert!(json.contains("\"2025-03-01 18:00:05\""));
        let back: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at, at);
        assert_eq!(back.maybe, None);
    }

    #[test]
    fn rejects_iso_format() {
        assert!(serde_json::from_str::<Stamp>(r#"{"at":"2025-03-01T18:00:05"}"#).is_err());
    }
}
