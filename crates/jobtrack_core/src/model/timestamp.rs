//! Wire encoding for record timestamps and deadlines.
//!
//! # Responsibility
//! - Encode instants as ISO-8601 UTC strings with millisecond precision.
//! - Decode calendar-date deadlines leniently (`""`, `null` and absent mean none).
//!
//! # Invariants
//! - `format_timestamp(parse_timestamp(s)?) == s` for any millisecond UTC string,
//!   so persisted collections re-serialize to identical bytes.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp and normalizes it to UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Formats a deadline as `YYYY-MM-DD`.
pub fn format_deadline(value: &NaiveDate) -> String {
    value.format(DEADLINE_FORMAT).to_string()
}

/// Parses a deadline value.
///
/// Blank input means "no deadline". A full timestamp is accepted and reduced
/// to its UTC calendar date.
///
/// # Errors
/// - Returns a message when the value is neither a date nor a timestamp.
pub fn parse_deadline(value: &str) -> Result<Option<NaiveDate>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DEADLINE_FORMAT) {
        return Ok(Some(date));
    }
    parse_timestamp(trimmed)
        .map(|instant| Some(instant.date_naive()))
        .ok_or_else(|| format!("invalid deadline `{trimmed}`; expected YYYY-MM-DD"))
}

pub(crate) mod iso_millis {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}

pub(crate) mod iso_millis_option {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(instant) => serializer.serialize_str(&format_timestamp(instant)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            None => Ok(None),
        }
    }
}

pub(crate) mod deadline_option {
    use super::{format_deadline, parse_deadline};
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&format_deadline(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_deadline(&raw).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, parse_deadline, parse_timestamp};
    use chrono::NaiveDate;

    #[test]
    fn timestamp_text_is_stable_across_parse_and_format() {
        let raw = "2025-02-14T08:30:00.000Z";
        let parsed = parse_timestamp(raw).expect("timestamp should parse");
        assert_eq!(format_timestamp(&parsed), raw);
    }

    #[test]
    fn offset_timestamps_are_normalized_to_utc() {
        let parsed = parse_timestamp("2025-02-14T10:30:00.250+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2025-02-14T08:30:00.250Z");
    }

    #[test]
    fn blank_deadline_means_none() {
        assert_eq!(parse_deadline("").unwrap(), None);
        assert_eq!(parse_deadline("   ").unwrap(), None);
    }

    #[test]
    fn deadline_accepts_date_or_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_deadline("2025-03-01").unwrap(), expected);
        assert_eq!(parse_deadline("2025-03-01T00:00:00.000Z").unwrap(), expected);
    }

    #[test]
    fn deadline_rejects_garbage() {
        let err = parse_deadline("next tuesday").unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }
}
