//! RetroPost configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RETROPOST_OPERATOR_INBOX` - Inbox that receives every postcard and contact message
//!
//! ## Optional
//! - `RETROPOST_HOST` - Bind address (default: 127.0.0.1)
//! - `RETROPOST_PORT` - Listen port (default: 3000)
//! - `RETROPOST_BASE_URL` - Public URL of this server (default: <http://localhost:3000>)
//! - `RETROPOST_LANGUAGE` - Language for user-facing messages, `hr` or `en` (default: hr)
//! - `RETROPOST_SUPPORT_CONTACT` - Contact named when delivery fails (default: operator inbox)
//! - `RETROPOST_HOSTED_TRANSPORT` - Enable the hosted postcard function transport (default: false)
//! - `RETROPOST_HOSTED_URL` - Where the hosted function lives (default: base URL)
//! - `RETROPOST_RELAY_URL` - Form relay base URL (default: <https://formsubmit.co>)
//! - `RETROPOST_REQUEST_TIMEOUT_SECS` - Outbound request timeout (default: 30)
//! - `RETROPOST_FONT_DIR` - Directory with `serif.ttf`, `sans.ttf`, `mono.ttf`, `cursive.ttf`
//! - `RETROPOST_BACKGROUND_TIMEOUT_SECS` - Background image fetch timeout (default: 10)
//! - `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, `EMAILJS_PUBLIC_KEY` - Emergency transport
//! - `EMAILJS_URL` - Emergency transport endpoint
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` - Direct SMTP
//!   delivery for the hosted function (relay forwarding is used when unset)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use retropost_core::{Email, Language};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Default EmailJS REST endpoint.
pub const DEFAULT_EMAILJS_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Default form relay.
pub const DEFAULT_RELAY_URL: &str = "https://formsubmit.co";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your_",
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// RetroPost application configuration.
#[derive(Debug, Clone)]
pub struct RetroPostConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this server
    pub base_url: Url,
    /// Language for user-facing messages
    pub language: Language,
    /// Delivery chain configuration
    pub delivery: DeliveryConfig,
    /// Image compositor configuration
    pub compositor: CompositorConfig,
    /// Direct SMTP delivery for the hosted function
    pub smtp: Option<SmtpConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Delivery dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Inbox that receives every message; postcards cc the recipient.
    pub operator_inbox: Email,
    /// Contact named in the exhaustion message.
    pub support_contact: String,
    /// Whether the hosted function is deployed and reachable.
    pub hosted_enabled: bool,
    /// Base URL of the hosted function.
    pub hosted_url: Url,
    /// Form relay base URL; the operator inbox is appended as the path.
    pub relay_url: Url,
    /// Timeout applied to each outbound request.
    pub request_timeout: Duration,
    /// EmailJS-compatible emergency endpoint, when configured.
    pub emailjs: Option<EmailJsConfig>,
}

/// EmailJS-compatible emergency transport configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct EmailJsConfig {
    pub url: Url,
    pub service_id: String,
    pub template_id: String,
    pub public_key: SecretString,
}

impl std::fmt::Debug for EmailJsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsConfig")
            .field("url", &self.url.as_str())
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &"[REDACTED]")
            .finish()
    }
}

/// Image compositor configuration.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Directory holding outline fonts named after each font family.
    pub font_dir: Option<PathBuf>,
    /// Upper bound on a background image fetch.
    pub background_timeout: Duration,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            font_dir: None,
            background_timeout: Duration::from_secs(10),
        }
    }
}

/// SMTP configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl RetroPostConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let host = env
            .or_default("RETROPOST_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RETROPOST_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("RETROPOST_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("RETROPOST_PORT".to_string(), e.to_string()))?;
        let base_url = env.url_or_default("RETROPOST_BASE_URL", "http://localhost:3000")?;
        let language = env
            .or_default("RETROPOST_LANGUAGE", "hr")
            .parse::<Language>()
            .map_err(|e| ConfigError::InvalidEnvVar("RETROPOST_LANGUAGE".to_string(), e))?;

        let delivery = DeliveryConfig::from_env(&env, &base_url)?;
        let compositor = CompositorConfig::from_env(&env)?;
        let smtp = SmtpConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            base_url,
            language,
            delivery,
            compositor,
            smtp,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl DeliveryConfig {
    fn from_env(env: &Env<'_>, base_url: &Url) -> Result<Self, ConfigError> {
        let inbox = env.required("RETROPOST_OPERATOR_INBOX")?;
        let operator_inbox = Email::parse(inbox.trim()).map_err(|e| {
            ConfigError::InvalidEnvVar("RETROPOST_OPERATOR_INBOX".to_string(), e.to_string())
        })?;
        let support_contact = env
            .optional("RETROPOST_SUPPORT_CONTACT")
            .unwrap_or_else(|| operator_inbox.to_string());
        let hosted_url = match env.optional("RETROPOST_HOSTED_URL") {
            Some(raw) => parse_url("RETROPOST_HOSTED_URL", &raw)?,
            None => base_url.clone(),
        };

        Ok(Self {
            operator_inbox,
            support_contact,
            hosted_enabled: env.flag("RETROPOST_HOSTED_TRANSPORT")?,
            hosted_url,
            relay_url: env.url_or_default("RETROPOST_RELAY_URL", DEFAULT_RELAY_URL)?,
            request_timeout: Duration::from_secs(env.parse_or("RETROPOST_REQUEST_TIMEOUT_SECS", 30)?),
            emailjs: EmailJsConfig::from_env(env)?,
        })
    }
}

impl EmailJsConfig {
    /// Returns `None` unless all three identifiers are set and the public key
    /// is not a placeholder.
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let (Some(service_id), Some(template_id), Some(public_key)) = (
            env.optional("EMAILJS_SERVICE_ID"),
            env.optional("EMAILJS_TEMPLATE_ID"),
            env.optional("EMAILJS_PUBLIC_KEY"),
        ) else {
            return Ok(None);
        };

        if let Err(e) = validate_not_placeholder(&public_key, "EMAILJS_PUBLIC_KEY") {
            tracing::warn!(error = %e, "EmailJS disabled");
            return Ok(None);
        }

        Ok(Some(Self {
            url: env.url_or_default("EMAILJS_URL", DEFAULT_EMAILJS_URL)?,
            service_id,
            template_id,
            public_key: SecretString::from(public_key),
        }))
    }

    /// The public key, for request bodies.
    #[must_use]
    pub fn public_key(&self) -> &str {
        self.public_key.expose_secret()
    }
}

impl CompositorConfig {
    /// Load only the compositor settings, for tools that render without
    /// delivering.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a timeout is not a number.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_env(&Env(&lookup))
    }

    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            font_dir: env.optional("RETROPOST_FONT_DIR").map(PathBuf::from),
            background_timeout: Duration::from_secs(
                env.parse_or("RETROPOST_BACKGROUND_TIMEOUT_SECS", 10)?,
            ),
        })
    }
}

impl SmtpConfig {
    /// Returns `None` when `SMTP_HOST` is unset.
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let Some(host) = env.optional("SMTP_HOST") else {
            return Ok(None);
        };
        let password = env.required("SMTP_PASSWORD")?;
        validate_not_placeholder(&password, "SMTP_PASSWORD")?;

        Ok(Some(Self {
            host,
            port: env.parse_or("SMTP_PORT", 587)?,
            username: env.required("SMTP_USERNAME")?,
            password: SecretString::from(password),
            from_address: env.required("SMTP_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Typed accessors over a key lookup.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn url_or_default(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        parse_url(key, &self.or_default(key, default))
    }

    /// Boolean flag; unset means false.
    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.optional(key).map(|v| v.trim().to_lowercase()).as_deref() {
            None | Some("0" | "false" | "no" | "off") => Ok(false),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some(other) => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{other}'"),
            )),
        }
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject values that look like template placeholders.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
