use chrono::{
    DateTime,
    Local,
    NaiveDateTime,
    SecondsFormat,
    TimeZone,
    Utc,
};

use super::ReminderError;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a notification timestamp as the server hands it out.
///
/// Offsets (`Z`, `+02:00`) are honoured. A timestamp without an offset is a
/// wall-clock time in the local zone, which is how the server stores times
/// typed by the enhancer.
pub fn parse_notification_time(value: &str) -> Result<DateTime<Utc>, ReminderError> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            // `earliest` resolves the ambiguous hour at a DST fall-back
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(|| ReminderError::InvalidTimestamp(value.to_string()));
        }
    }

    Err(ReminderError::InvalidTimestamp(value.to_string()))
}

pub fn format_notification_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for notification timestamps on the wire.
pub mod wire_time {
    use chrono::{
        DateTime,
        Utc,
    };
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_notification_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_notification_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{
        Datelike,
        Timelike,
    };

    use super::*;

    #[test]
    fn test_parse_with_offset() {
        let utc = parse_notification_time("2025-01-19T13:52:00.000Z").unwrap();
        assert_eq!(utc.hour(), 13);
        assert_eq!(utc.minute(), 52);

        let shifted = parse_notification_time("2025-01-19T13:52:00+02:00").unwrap();
        assert_eq!(shifted.hour(), 11);
        assert_eq!(shifted.day(), 19);
    }

    #[test]
    fn test_parse_naive_is_local() {
        let parsed = parse_notification_time("2025-01-19T13:52:00").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.hour(), 13);
        assert_eq!(local.minute(), 52);

        // fractional seconds and minute precision are both accepted
        assert!(parse_notification_time("2025-01-19T13:52:00.123456").is_ok());
        assert!(parse_notification_time("2025-01-19T13:52").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_notification_time("tomorrow at noon"),
            Err(ReminderError::InvalidTimestamp(_))
        ));
        assert!(parse_notification_time("").is_err());
    }

    #[test]
    fn test_format_is_iso_millis() {
        let time = parse_notification_time("2025-01-19T13:52:00Z").unwrap();
        assert_eq!(format_notification_time(&time), "2025-01-19T13:52:00.000Z");
    }
}
