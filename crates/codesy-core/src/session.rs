//! Session context read from the page at load time.

use std::fmt;

use crate::error::CoreError;
use crate::ids::UserId;

/// Per-session CSRF secret sent as `X-CSRFToken` on state-changing requests.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Wrap a CSRF token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Return the raw token for use in a request header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(**redacted**)")
    }
}

/// Stripe publishable key (`pk_test_...` or `pk_live_...`).
#[derive(Clone, PartialEq, Eq)]
pub struct PublishableKey(String);

impl PublishableKey {
    /// Create a publishable key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(CoreError::Configuration(
                "Stripe publishable key is empty".into(),
            ));
        }
        Ok(Self(key))
    }

    /// Return the raw key for request authentication.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether this is a Stripe test-mode key.
    #[must_use]
    pub fn is_test_mode(&self) -> bool {
        self.0.starts_with("pk_test_")
    }
}

impl fmt::Debug for PublishableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_test_mode() {
            "pk_test_"
        } else {
            "pk_"
        };
        write!(f, "PublishableKey({prefix}**redacted**)")
    }
}

/// The signed-in user and CSRF token, fixed for the lifetime of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// The current user, if the page exposes one.
    pub user_id: Option<UserId>,
    /// CSRF token from the page's form.
    pub csrf_token: CsrfToken,
}

impl SessionContext {
    /// Create a session context.
    #[must_use]
    pub fn new(user_id: Option<UserId>, csrf_token: CsrfToken) -> Self {
        Self {
            user_id,
            csrf_token,
        }
    }

    /// Whether the page identified a user.
    #[must_use]
    pub fn has_user(&self) -> bool {
        self.user_id.is_some()
    }
}
