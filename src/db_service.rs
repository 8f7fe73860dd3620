use std::{error::Error, fmt};

use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::{consent_event::ConsentRecord, env_utils::SupabaseCredentials};

const CONSENT_TABLE_PATH: &str = "rest/v1/ips";

#[derive(Debug)]
pub enum DbError {
    Request(reqwest::Error),
    Rejected { status: StatusCode, body: String },
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DbError::Request(e) => write!(f, "request to supabase failed: {e}"),
            DbError::Rejected { status, body } => {
                write!(f, "supabase rejected insert with {status}: {body}")
            }
        }
    }
}

impl Error for DbError {}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> DbError {
        DbError::Request(err)
    }
}

/// Thin client for the Supabase REST insert endpoint.
pub struct DbService<'a> {
    client: &'a reqwest::Client,
    credentials: &'a SupabaseCredentials,
}

impl<'a> DbService<'a> {
    pub fn new(client: &'a reqwest::Client, credentials: &'a SupabaseCredentials) -> Self {
        DbService {
            client,
            credentials,
        }
    }

    fn insert_url(&self) -> String {
        format!(
            "{}/{}",
            self.credentials.url.trim_end_matches('/'),
            CONSENT_TABLE_PATH
        )
    }

    pub async fn insert_consent(&self, record: &ConsentRecord<'_>) -> Result<(), DbError> {
        let key = &self.credentials.service_role_key;
        let response = self
            .client
            .post(self.insert_url())
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DbError::Rejected { status, body });
        }

        Ok(())
    }
}

/// Best-effort insert. Failures are logged and never returned.
pub async fn record_consent(
    client: &reqwest::Client,
    credentials: Option<&SupabaseCredentials>,
    record: &ConsentRecord<'_>,
) {
    let credentials = match credentials {
        Some(credentials) => credentials,
        None => {
            warn!("SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY not set; skipping DB insert");
            return;
        }
    };

    match DbService::new(client, credentials).insert_consent(record).await {
        Ok(_) => debug!("Stored consent record"),
        Err(e) => error!("Supabase insert error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_url_tolerates_trailing_slash() {
        let client = reqwest::Client::new();
        let credentials = SupabaseCredentials {
            url: "https://abc.supabase.co/".to_string(),
            service_role_key: "key".to_string(),
        };
        assert_eq!(
            DbService::new(&client, &credentials).insert_url(),
            "https://abc.supabase.co/rest/v1/ips"
        );
    }
}
