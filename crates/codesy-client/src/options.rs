//! Options shared by the HTTP clients.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;

/// Default Stripe API base URL.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Stripe API base URL (default: [`STRIPE_API_BASE`]).
    pub stripe_api_base: String,
    /// Raw `Cookie` header carrying the codesy session, if any.
    pub session_cookie: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            stripe_api_base: STRIPE_API_BASE.to_string(),
            session_cookie: None,
        }
    }
}

impl ClientOptions {
    /// Create options that send a session cookie with user-record requests.
    #[must_use]
    pub fn with_session_cookie(cookie: impl Into<String>) -> Self {
        Self {
            session_cookie: Some(cookie.into()),
            ..Self::default()
        }
    }

    /// Build an HTTP client with these options' timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is zero or the client cannot be built.
    pub fn build_http_client(&self) -> Result<Client, ClientError> {
        if self.timeout_seconds == 0 {
            return Err(ClientError::Configuration(
                "request timeout must be at least one second".into(),
            ));
        }
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .build()?)
    }
}

pub(crate) fn trim_base_url(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}
