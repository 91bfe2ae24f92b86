//! Environment-backed configuration, loaded once at startup.
//!
//! Follows the `std::env::var` conventions in `packages/gate/src/bin/server.rs`
//! and `packages/treasury/src/lock.rs`, but fails fast on missing
//! key material rather than silently defaulting: per spec §4.1/§6, absence of
//! the encryption or MAC key must refuse startup outside of test mode.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0} (set TRUSTGATE_EPHEMERAL=1 for local/test runs)")]
    Missing(&'static str),
}

pub struct Config {
    pub encryption_key_hex: String,
    pub mac_key_hex: String,
    pub card_webhook_secret: String,
    pub port: u16,
    pub default_advocate_id: String,
    pub ephemeral: bool,
}

impl Config {
    /// Loads configuration from the environment. `TRUSTGATE_EPHEMERAL=1` is
    /// the explicit test-only escape hatch spec §4.1 requires: every other
    /// path demands real key material or refuses to start.
    pub fn from_env() -> Result<Self, ConfigError> {
        let ephemeral = std::env::var("TRUSTGATE_EPHEMERAL").is_ok();

        let encryption_key_hex = match std::env::var("TRUSTGATE_ENCRYPTION_KEY") {
            Ok(key) => key,
            Err(_) if ephemeral => String::new(),
            Err(_) => return Err(ConfigError::Missing("TRUSTGATE_ENCRYPTION_KEY")),
        };
        let mac_key_hex = match std::env::var("TRUSTGATE_MAC_KEY") {
            Ok(key) => key,
            Err(_) if ephemeral => String::new(),
            Err(_) => return Err(ConfigError::Missing("TRUSTGATE_MAC_KEY")),
        };
        let card_webhook_secret = match std::env::var("TRUSTGATE_CARD_WEBHOOK_SECRET") {
            Ok(secret) => secret,
            Err(_) if ephemeral => "ephemeral-card-webhook-secret".to_string(),
            Err(_) => return Err(ConfigError::Missing("TRUSTGATE_CARD_WEBHOOK_SECRET")),
        };

        let port = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3001);
        let default_advocate_id = std::env::var("TRUSTGATE_DEFAULT_ADVOCATE").unwrap_or_else(|_| "default-advocate".to_string());

        Ok(Self { encryption_key_hex, mac_key_hex, card_webhook_secret, port, default_advocate_id, ephemeral })
    }
}
