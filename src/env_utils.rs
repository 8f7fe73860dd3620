use std::env;

use tracing::error;

/// Everything the consent handler needs from the environment, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub supabase: Option<SupabaseCredentials>,
    pub hash_ip: bool,
    pub hash_salt: String,
    pub discord_webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseCredentials {
    pub url: String,
    pub service_role_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            supabase: get_supabase_credentials(),
            hash_ip: get_hash_ip(),
            hash_salt: get_hash_salt(),
            discord_webhook_url: get_discord_webhook_url(),
        }
    }
}

pub fn get_port() -> u16 {
    let default_port: u16 = 8080;

    let port = match env::var("PORT") {
        Ok(port) => port,
        _ => default_port.to_string(),
    };
    let port: u16 = match port.parse::<_>() {
        Ok(port) => port,
        _ => {
            error!("Failed to parse PORT env var, using default");
            default_port
        }
    };

    port
}

// both values are needed, one without the other disables the insert
pub fn get_supabase_credentials() -> Option<SupabaseCredentials> {
    let url = non_empty_var("SUPABASE_URL")?;
    let service_role_key = non_empty_var("SUPABASE_SERVICE_ROLE_KEY")?;
    Some(SupabaseCredentials {
        url,
        service_role_key,
    })
}

pub fn get_hash_ip() -> bool {
    matches!(env::var("HASH_IP").as_deref(), Ok("1"))
}

pub fn get_hash_salt() -> String {
    env::var("HASH_SALT").unwrap_or_default()
}

pub fn get_discord_webhook_url() -> Option<String> {
    non_empty_var("DISCORD_WEBHOOK_URL")
}

fn non_empty_var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
