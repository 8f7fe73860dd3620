use chrono::Utc;
use serde::Serialize;

use crate::{env_utils::AppConfig, request_metadata::RequestMetadata, utils};

/// One recorded consent. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentEvent {
    pub client_ip: Option<String>,
    pub stored_ip: Option<String>,
    pub forwarded_chain: Option<String>,
    pub user_agent: String,
    pub timestamp: String,
}

/// Row shape for the `ips` table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConsentRecord<'a> {
    pub ip: Option<&'a str>,
    pub forwarded_for: Option<&'a str>,
    pub user_agent: &'a str,
    pub consent_time: &'a str,
}

impl ConsentEvent {
    pub fn new(metadata: RequestMetadata, config: &AppConfig) -> Self {
        let timestamp = utils::format_timestamp(Utc::now());
        Self::with_timestamp(metadata, config, timestamp)
    }

    pub fn with_timestamp(metadata: RequestMetadata, config: &AppConfig, timestamp: String) -> Self {
        let stored_ip = match (&metadata.client_ip, config.hash_ip) {
            (Some(ip), true) if !ip.is_empty() => {
                Some(utils::salted_hash(ip, &config.hash_salt))
            }
            (ip, _) => ip.clone(),
        };
        let forwarded_chain = match metadata.forwarded_chain.is_empty() {
            true => None,
            false => Some(metadata.forwarded_chain),
        };

        ConsentEvent {
            client_ip: metadata.client_ip,
            stored_ip,
            forwarded_chain,
            user_agent: metadata.user_agent,
            timestamp,
        }
    }

    pub fn record(&self) -> ConsentRecord<'_> {
        ConsentRecord {
            ip: self.stored_ip.as_deref(),
            forwarded_for: self.forwarded_chain.as_deref(),
            user_agent: &self.user_agent,
            consent_time: &self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(forwarded_chain: &str, client_ip: Option<&str>) -> RequestMetadata {
        RequestMetadata {
            forwarded_chain: forwarded_chain.to_string(),
            client_ip: client_ip.map(str::to_string),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }

    fn hashing_config(salt: &str) -> AppConfig {
        AppConfig {
            hash_ip: true,
            hash_salt: salt.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_ip_when_hashing_is_off() {
        let event = ConsentEvent::with_timestamp(
            metadata("", Some("1.2.3.4")),
            &AppConfig::default(),
            "2026-10-16T08:15:00.000Z".to_string(),
        );
        assert_eq!(event.stored_ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(event.forwarded_chain, None);
    }

    #[test]
    fn hashes_ip_with_salt() {
        let event = ConsentEvent::with_timestamp(
            metadata("1.2.3.4", Some("1.2.3.4")),
            &hashing_config("s"),
            "2026-10-16T08:15:00.000Z".to_string(),
        );
        assert_eq!(
            event.stored_ip.as_deref(),
            Some("871602288455ee6d40055e94823ee71e6de0a72ff8a197e2fd6a58e425f9c519")
        );
        assert_eq!(event.client_ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(event.forwarded_chain.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn missing_ip_is_not_hashed() {
        let event = ConsentEvent::with_timestamp(
            metadata("", None),
            &hashing_config("s"),
            "2026-10-16T08:15:00.000Z".to_string(),
        );
        assert_eq!(event.stored_ip, None);
    }

    #[test]
    fn empty_ip_is_stored_unhashed() {
        let event = ConsentEvent::with_timestamp(
            metadata(" , 8.8.8.8", Some("")),
            &hashing_config("s"),
            "2026-10-16T08:15:00.000Z".to_string(),
        );
        assert_eq!(event.stored_ip.as_deref(), Some(""));
        assert_eq!(event.record().ip, Some(""));
    }

    #[test]
    fn record_serializes_nulls() {
        let event = ConsentEvent::with_timestamp(
            metadata("", None),
            &AppConfig::default(),
            "2026-10-16T08:15:00.000Z".to_string(),
        );
        let json = serde_json::to_value(event.record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ip": null,
                "forwarded_for": null,
                "user_agent": "Mozilla/5.0",
                "consent_time": "2026-10-16T08:15:00.000Z"
            })
        );
    }
}
