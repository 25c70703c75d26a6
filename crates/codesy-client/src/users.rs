//! User-record updates on the codesy site.

use async_trait::async_trait;
use reqwest::Client;

use codesy_core::{CardToken, CsrfToken, UserId};

use crate::error::ClientError;
use crate::options::{trim_base_url, ClientOptions};

/// Header Django reads the CSRF token from.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Form field carrying the card token.
pub const CARD_TOKEN_FIELD: &str = "stripe_cc_token";

/// Longest response excerpt kept in an error.
const ERROR_EXCERPT_CHARS: usize = 200;

/// Stores a card token on a user record.
#[async_trait]
pub trait UserRecordUpdater: Send + Sync {
    /// Issue exactly one `PATCH /users/{user_id}/` carrying `token`.
    async fn set_card_token(
        &self,
        user_id: &UserId,
        csrf_token: &CsrfToken,
        token: &CardToken,
    ) -> Result<(), ClientError>;
}

/// Client for the codesy user-record endpoint.
#[derive(Debug, Clone)]
pub struct UsersClient {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl UsersClient {
    /// Create a client for the site at `base_url` (e.g. `"https://codesy.io"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, &ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the HTTP client cannot
    /// be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: &ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = trim_base_url(base_url);
        if base_url.is_empty() {
            return Err(ClientError::Configuration("site base URL is empty".into()));
        }

        Ok(Self {
            client: options.build_http_client()?,
            base_url,
            session_cookie: options.session_cookie.clone(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl UserRecordUpdater for UsersClient {
    async fn set_card_token(
        &self,
        user_id: &UserId,
        csrf_token: &CsrfToken,
        token: &CardToken,
    ) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, user_id.record_path());

        // Django rejects HTTPS posts without a same-origin referer
        let mut request = self
            .client
            .patch(&url)
            .header(CSRF_HEADER, csrf_token.expose())
            .header(reqwest::header::REFERER, format!("{}/", self.base_url))
            .form(&[(CARD_TOKEN_FIELD, token.id.as_str())]);

        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
