use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

pub fn hash_string(string: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of `value` with `salt` appended, as lowercase hex.
pub fn salted_hash(value: &str, salt: &str) -> String {
    hash_string(&format!("{value}{salt}"))
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2026-10-16T08:15:00.123Z`.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn salted_hash_appends_salt_before_hashing() {
        assert_eq!(
            salted_hash("1.2.3.4", "s"),
            "871602288455ee6d40055e94823ee71e6de0a72ff8a197e2fd6a58e425f9c519"
        );
    }

    #[test]
    fn empty_salt_is_plain_sha256() {
        assert_eq!(salted_hash("1.2.3.4", ""), hash_string("1.2.3.4"));
        assert_eq!(
            hash_string("1.2.3.4"),
            "6694f83c9f476da31f5df6bcc520034e7e57d421d247b9d34f49edbfc84a764c"
        );
    }

    #[test]
    fn timestamp_uses_millis_and_zulu() {
        let time = Utc.with_ymd_and_hms(2026, 10, 16, 8, 15, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(time), "2026-10-16T08:15:00.123Z");
    }
}
