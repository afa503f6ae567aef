//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/bike-billing").
    pub data_dir: String,

    /// Stripe API key (optional).
    pub stripe_api_key: Option<String>,

    /// Stripe API base URL.
    pub stripe_api_url: String,

    /// Currency every charge is made in (default: "brl").
    pub stripe_currency: String,

    /// SendGrid API key (optional).
    pub sendgrid_api_key: Option<String>,

    /// SendGrid API base URL.
    pub sendgrid_api_url: String,

    /// Sender address for notification emails (optional).
    pub email_sender: Option<String>,

    /// Rental platform base URL (optional). When unset, billers are resolved
    /// from `biller_payment_methods` and `biller_emails`.
    pub rental_service_url: Option<String>,

    /// Payment method charged for cyclists with a card on file.
    pub rental_payment_method: String,

    /// Static biller payment methods, `id=pm,...`.
    pub biller_payment_methods: String,

    /// Static biller emails, `id=email,...`.
    pub biller_emails: String,

    /// Admin API key for privileged endpoints.
    pub admin_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Timeout in seconds for requests that settle charges. Must exceed a
    /// biller lookup plus a gateway call.
    pub settlement_timeout_seconds: u64,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    api_key: String,
}

/// SendGrid secrets file structure.
#[derive(Debug, Deserialize)]
struct SendGridSecrets {
    api_key: String,
    #[serde(default)]
    sender: Option<String>,
}

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATA_DIR: &str = "/data/bike-billing";
const DEFAULT_CURRENCY: &str = "brl";
const DEFAULT_PAYMENT_METHOD: &str = "pm_card_visa";
const DEFAULT_SETTLEMENT_TIMEOUT_SECONDS: u64 = 120;

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Secrets files win over environment variables
        let stripe_api_key = load_stripe_secrets();
        let (sendgrid_api_key, sendgrid_sender) = load_sendgrid_secrets();

        Self {
            listen_addr: env_or("LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
            data_dir: env_or("DATA_DIR", DEFAULT_DATA_DIR),
            stripe_api_key,
            stripe_api_url: env_or("STRIPE_API_URL", crate::stripe::StripeClient::DEFAULT_BASE_URL),
            stripe_currency: env_or("STRIPE_CURRENCY", DEFAULT_CURRENCY),
            sendgrid_api_key,
            sendgrid_api_url: env_or(
                "SENDGRID_API_URL",
                crate::sendgrid::SendGridClient::DEFAULT_BASE_URL,
            ),
            email_sender: sendgrid_sender.or_else(|| std::env::var("EMAIL_SENDER").ok()),
            rental_service_url: std::env::var("RENTAL_SERVICE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            rental_payment_method: env_or("RENTAL_PAYMENT_METHOD", DEFAULT_PAYMENT_METHOD),
            biller_payment_methods: env_or("BILLER_PAYMENT_METHODS", ""),
            biller_emails: env_or("BILLER_EMAILS", ""),
            admin_api_key: std::env::var("ADMIN_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            settlement_timeout_seconds: std::env::var("SETTLEMENT_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SETTLEMENT_TIMEOUT_SECONDS),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Load the Stripe key from file or environment.
fn load_stripe_secrets() -> Option<String> {
    let secret_paths = [".secrets/stripe.json", "../.secrets/stripe.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path, "Loaded Stripe secrets from file");
            return Some(secrets.api_key);
        }
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    std::env::var("STRIPE_API_KEY").ok()
}

/// Load the SendGrid key and sender from file or environment.
fn load_sendgrid_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/sendgrid.json", "../.secrets/sendgrid.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<SendGridSecrets>(path) {
            tracing::info!(path = %path, "Loaded SendGrid secrets from file");
            return (Some(secrets.api_key), secrets.sender);
        }
    }

    tracing::debug!("SendGrid secrets file not found, using environment variables");
    (std::env::var("SENDGRID_API_KEY").ok(), None)
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            data_dir: DEFAULT_DATA_DIR.into(),
            stripe_api_key: None,
            stripe_api_url: crate::stripe::StripeClient::DEFAULT_BASE_URL.into(),
            stripe_currency: DEFAULT_CURRENCY.into(),
            sendgrid_api_key: None,
            sendgrid_api_url: crate::sendgrid::SendGridClient::DEFAULT_BASE_URL.into(),
            email_sender: None,
            rental_service_url: None,
            rental_payment_method: DEFAULT_PAYMENT_METHOD.into(),
            biller_payment_methods: String::new(),
            biller_emails: String::new(),
            admin_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            settlement_timeout_seconds: DEFAULT_SETTLEMENT_TIMEOUT_SECONDS,
        }
    }
}
