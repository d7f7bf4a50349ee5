//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHIPLANE_DATABASE_URL` - `PostgreSQL` connection string
//! - `SHIPLANE_SERVICE_TOKEN` - Bearer token trusted frontends present on `/api` calls (min 32 chars, high entropy)
//! - `RAZORPAY_KEY_ID` - Payment gateway key id
//! - `RAZORPAY_KEY_SECRET` - Payment gateway key secret
//! - `RAZORPAY_WEBHOOK_SECRET` - Secret for webhook HMAC verification
//! - `DELHIVERY_API_TOKEN` - Delhivery API token
//! - `SHADOWFAX_API_TOKEN` - Shadowfax API token
//! - `XPRESSBEES_API_TOKEN` - Xpressbees API token
//!
//! ## Optional
//! - `SHIPLANE_HOST` - Bind address (default: 127.0.0.1)
//! - `SHIPLANE_PORT` - Listen port (default: 8080)
//! - `DELHIVERY_BASE_URL` / `SHADOWFAX_BASE_URL` / `XPRESSBEES_BASE_URL` -
//!   Courier API base URLs (overridable for staging and tests)
//! - `RAZORPAY_BASE_URL` - Gateway API base URL
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g., production, staging)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SERVICE_TOKEN_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token trusted frontends present on `/api` calls
    pub service_token: SecretString,
    /// Payment gateway configuration
    pub razorpay: RazorpayConfig,
    /// Courier partner API configuration
    pub couriers: CourierApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Payment gateway (Razorpay) configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API base URL
    pub base_url: String,
    /// Key id (safe to expose to the checkout frontend)
    pub key_id: String,
    /// Key secret (server-side only, signs checkout callbacks)
    pub key_secret: SecretString,
    /// Webhook signing secret
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

/// Per-partner courier API configuration.
#[derive(Debug, Clone)]
pub struct CourierApiConfig {
    pub delhivery: PartnerApiConfig,
    pub shadowfax: PartnerApiConfig,
    pub xpressbees: PartnerApiConfig,
}

/// Base URL + token for one courier partner's API.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct PartnerApiConfig {
    /// API base URL (overridable for staging and tests)
    pub base_url: String,
    /// API token
    pub api_token: SecretString,
}

impl std::fmt::Debug for PartnerApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHIPLANE_DATABASE_URL")?;
        let host = get_env_or_default("SHIPLANE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHIPLANE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHIPLANE_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHIPLANE_PORT".to_string(), e.to_string()))?;
        let service_token = get_validated_secret("SHIPLANE_SERVICE_TOKEN")?;
        validate_service_token(&service_token, "SHIPLANE_SERVICE_TOKEN")?;

        let razorpay = RazorpayConfig::from_env()?;
        let couriers = CourierApiConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            service_token,
            razorpay,
            couriers,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_env_or_default("RAZORPAY_BASE_URL", "https://api.razorpay.com"),
            key_id: get_required_env("RAZORPAY_KEY_ID")?,
            key_secret: get_validated_secret("RAZORPAY_KEY_SECRET")?,
            webhook_secret: get_validated_secret("RAZORPAY_WEBHOOK_SECRET")?,
        })
    }
}

impl CourierApiConfig {
    /// Load courier API configuration on its own (also used by the CLI's
    /// ad-hoc quote command, which needs no gateway or database).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a partner token is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            delhivery: PartnerApiConfig {
                base_url: get_env_or_default("DELHIVERY_BASE_URL", "https://track.delhivery.com"),
                api_token: get_required_secret("DELHIVERY_API_TOKEN")?,
            },
            shadowfax: PartnerApiConfig {
                base_url: get_env_or_default("SHADOWFAX_BASE_URL", "https://api.shadowfax.in"),
                api_token: get_required_secret("SHADOWFAX_API_TOKEN")?,
            },
            xpressbees: PartnerApiConfig {
                base_url: get_env_or_default(
                    "XPRESSBEES_BASE_URL",
                    "https://shipment.xpressbees.com",
                ),
                api_token: get_required_secret("XPRESSBEES_API_TOKEN")?,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by managed postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (SHIPLANE_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the service token meets minimum length requirements.
fn validate_service_token(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SERVICE_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SERVICE_TOKEN_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_service_token_too_short() {
        let secret = SecretString::from("short");
        let result = validate_service_token(&secret, "TEST_TOKEN");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_service_token_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_service_token(&secret, "TEST_TOKEN");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_razorpay_config_debug_redacts_secrets() {
        let config = RazorpayConfig {
            base_url: "https://api.razorpay.com".to_string(),
            key_id: "rzp_test_Fm3qasELJvTm2j".to_string(),
            key_secret: SecretString::from("super_secret_key"),
            webhook_secret: SecretString::from("super_secret_webhook"),
        };

        let debug_output = format!("{config:?}");

        // Public fields should be visible
        assert!(debug_output.contains("rzp_test_Fm3qasELJvTm2j"));

        // Secret fields should be redacted
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
        assert!(!debug_output.contains("super_secret_webhook"));
    }

    #[test]
    fn test_partner_config_debug_redacts_token() {
        let config = PartnerApiConfig {
            base_url: "https://track.delhivery.com".to_string(),
            api_token: SecretString::from("dlv_live_token_value"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("track.delhivery.com"));
        assert!(!debug_output.contains("dlv_live_token_value"));
    }

    pub(super) fn test_config() -> ServerConfig {
        let partner = |base: &str| PartnerApiConfig {
            base_url: base.to_string(),
            api_token: SecretString::from("token"),
        };
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            service_token: SecretString::from("x".repeat(32)),
            razorpay: RazorpayConfig {
                base_url: "https://api.razorpay.com".to_string(),
                key_id: "rzp_test_key".to_string(),
                key_secret: SecretString::from("key_secret"),
                webhook_secret: SecretString::from("webhook_secret"),
            },
            couriers: CourierApiConfig {
                delhivery: partner("https://track.delhivery.com"),
                shadowfax: partner("https://api.shadowfax.in"),
                xpressbees: partner("https://shipment.xpressbees.com"),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}
