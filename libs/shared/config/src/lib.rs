use std::env;
use tracing::warn;

pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_FROM_ADDRESS: &str = "no-reply@clinic.example";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub resend_api_key: String,
    pub resend_base_url: String,
    pub notification_from_address: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            resend_api_key: env::var("RESEND_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("RESEND_API_KEY not set, confirmation emails are disabled");
                    String::new()
                }),
            resend_base_url: env::var("RESEND_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RESEND_BASE_URL.to_string()),
            notification_from_address: env::var("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| match value.parse() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("PORT '{}' is not a valid port, using {}", value, DEFAULT_PORT);
                        None
                    }
                })
                .unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// True when the PostgREST store and the JWT secret are both available.
    pub fn is_configured(&self) -> bool {
        self.is_store_configured() && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_store_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.resend_api_key.is_empty() && !self.resend_base_url.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            resend_api_key: String::new(),
            resend_base_url: DEFAULT_RESEND_BASE_URL.to_string(),
            notification_from_address: DEFAULT_FROM_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_not_configured() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert!(!config.is_email_configured());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn store_without_secret_is_not_fully_configured() {
        let config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon".to_string(),
            ..AppConfig::default()
        };
        assert!(config.is_store_configured());
        assert!(!config.is_configured());
    }
}
