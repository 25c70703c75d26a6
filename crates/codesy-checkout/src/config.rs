//! Checkout configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use codesy_client::{ClientOptions, STRIPE_API_BASE};

/// Default secrets file locations, tried in order.
const SECRET_PATHS: [&str; 3] = [
    ".secrets/stripe.json",
    "codesy/.secrets/stripe.json",
    "../.secrets/stripe.json",
];

/// Configuration loaded from environment variables and secrets files.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL of the codesy site (default: `"http://localhost:8000"`).
    pub site_url: String,

    /// Path of the page reloaded after a submission (default: `"/"`).
    pub page_path: String,

    /// Stripe API base URL.
    pub stripe_api_base: String,

    /// Stripe publishable key rendered into the page (optional).
    pub stripe_publishable_key: Option<String>,

    /// Signed-in user's id as rendered into the page (optional).
    pub user_id: Option<String>,

    /// CSRF token from the page's form (optional).
    pub csrf_token: Option<String>,

    /// Raw `Cookie` header of the browser session (optional).
    pub session_cookie: Option<String>,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Ignore submissions while one is in flight.
    pub guard_double_submit: bool,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    publishable_key: String,
}

impl CheckoutConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let paths: Vec<PathBuf> = SECRET_PATHS.iter().map(PathBuf::from).collect();
        Self::from_lookup(|name| std::env::var(name).ok(), &paths)
    }

    /// Load configuration through `var`, trying `secret_paths` for the
    /// Stripe key before falling back to `STRIPE_PUBLISHABLE_KEY`.
    #[must_use]
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>, secret_paths: &[PathBuf]) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        Self {
            site_url: non_empty("CODESY_BASE_URL").unwrap_or(defaults.site_url),
            page_path: non_empty("CODESY_PAGE_PATH").unwrap_or(defaults.page_path),
            stripe_api_base: non_empty("CODESY_STRIPE_API_BASE")
                .unwrap_or(defaults.stripe_api_base),
            stripe_publishable_key: load_stripe_key(secret_paths)
                .or_else(|| non_empty("STRIPE_PUBLISHABLE_KEY")),
            user_id: non_empty("CODESY_USER_ID"),
            csrf_token: non_empty("CODESY_CSRF_TOKEN"),
            session_cookie: non_empty("CODESY_SESSION_COOKIE"),
            request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
            guard_double_submit: var("CODESY_GUARD_DOUBLE_SUBMIT")
                .is_some_and(|s| matches!(s.trim(), "1" | "true" | "yes" | "on")),
        }
    }

    /// Options for the HTTP clients.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout_seconds: self.request_timeout_seconds,
            stripe_api_base: self.stripe_api_base.clone(),
            session_cookie: self.session_cookie.clone(),
        }
    }

    /// Full URL of the checkout page.
    #[must_use]
    pub fn page_url(&self) -> String {
        let path = self.page_path.trim_start_matches('/');
        format!("{}/{path}", self.site_url.trim_end_matches('/'))
    }
}

/// Load the publishable key from the first readable secrets file.
fn load_stripe_key(paths: &[PathBuf]) -> Option<String> {
    for path in paths {
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path.display(), "Loaded Stripe key from file");
            return Some(secrets.publishable_key);
        }
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    None
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, std::io::Error> {
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

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:8000".into(),
            page_path: "/".into(),
            stripe_api_base: STRIPE_API_BASE.into(),
            stripe_publishable_key: None,
            user_id: None,
            csrf_token: None,
            session_cookie: None,
            request_timeout_seconds: 30,
            guard_double_submit: false,
        }
    }
}
