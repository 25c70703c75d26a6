//! The checkout form handler.
//!
//! One submission runs a fixed sequence: label the submit button, tokenize
//! the card, store the token on the user record, reload. Every path ends in
//! exactly one reload, and nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Instrument;

use codesy_client::{
    ClientOptions, StripeTokenizer, Tokenizer, UserRecordUpdater, UsersClient,
};
use codesy_core::{
    CardInput, CardToken, CsrfToken, PublishableKey, SessionContext, SubmissionId,
    SubmissionPath, SubmitState, TokenizationError, UserId,
};

use crate::error::CheckoutError;
use crate::page::{CheckoutPage, PageElement};

/// Submit button label while a submission is in progress.
pub const AUTHORIZING_LABEL: &str = "Authorizing ... ";

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Tokenization failed; the message was shown in the error region.
    TokenizeFailed(TokenizationError),
    /// The token was stored on the user record.
    Updated {
        /// The stored token.
        token_id: String,
    },
    /// The user-record update failed; the failure was only logged.
    UpdateFailed {
        /// The token that could not be stored.
        token_id: String,
        /// Description of the failure.
        error: String,
    },
    /// The page has no user, so no update was sent.
    UpdateSkipped {
        /// The token that was not stored.
        token_id: String,
    },
    /// Dropped because another submission was still in flight.
    Ignored,
}

/// Result of [`CheckoutHandler::submit`].
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// Identifier used in this submission's logs.
    pub submission_id: SubmissionId,
    /// The terminal path taken.
    pub result: SubmitResult,
    /// States visited, from `Idle` to `Reloading`.
    pub path: SubmissionPath,
}

/// Read the publishable key from the page.
///
/// # Errors
///
/// Returns an error if the page has no key or the key is blank.
pub fn read_publishable_key(page: &impl CheckoutPage) -> Result<PublishableKey, CheckoutError> {
    let key = page
        .read(PageElement::StripeKey)
        .ok_or(CheckoutError::MissingPublishableKey {
            selector: PageElement::StripeKey.selector(),
        })?;
    Ok(PublishableKey::new(key)?)
}

/// Read the session context from the page.
///
/// A missing or malformed user id yields a session without a user. A missing
/// CSRF input yields an empty token, which the site will reject.
#[must_use]
pub fn read_session(page: &impl CheckoutPage) -> SessionContext {
    let user_id = page
        .read(PageElement::UserId)
        .and_then(|raw| match raw.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring malformed user id on page");
                None
            }
        });

    let csrf_token = page.read(PageElement::CsrfToken).unwrap_or_else(|| {
        tracing::warn!(
            selector = PageElement::CsrfToken.selector(),
            "Page has no CSRF token"
        );
        String::new()
    });

    SessionContext::new(user_id, CsrfToken::new(csrf_token))
}

/// Snapshot the four card fields. Missing fields read as empty.
#[must_use]
pub fn read_card(page: &impl CheckoutPage) -> CardInput {
    let field = |element| page.read(element).unwrap_or_default();
    CardInput::new(
        field(PageElement::CardNumber),
        field(PageElement::ExpMonth),
        field(PageElement::ExpYear),
        field(PageElement::Cvc),
    )
}

/// Clears the in-flight flag when a guarded submission ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handles checkout submissions for one loaded page.
#[derive(Debug)]
pub struct CheckoutHandler<T, U> {
    tokenizer: T,
    users: U,
    session: SessionContext,
    guard_double_submit: bool,
    in_flight: AtomicBool,
}

impl CheckoutHandler<StripeTokenizer, UsersClient> {
    /// Set up the handler for a freshly loaded page.
    ///
    /// Configures Stripe with the page's publishable key and reads the
    /// session context.
    ///
    /// # Errors
    ///
    /// Returns an error if the page has no publishable key or the HTTP
    /// clients cannot be built.
    pub fn load(
        page: &impl CheckoutPage,
        site_url: &str,
        options: &ClientOptions,
    ) -> Result<Self, CheckoutError> {
        let key = read_publishable_key(page)?;
        let session = read_session(page);

        tracing::info!(
            test_mode = key.is_test_mode(),
            user_id = ?session.user_id,
            site_url = %site_url,
            "Checkout page loaded"
        );

        let tokenizer = StripeTokenizer::with_options(key, options)?;
        let users = UsersClient::with_options(site_url, options)?;
        Ok(Self::new(tokenizer, users, session))
    }
}

impl<T: Tokenizer, U: UserRecordUpdater> CheckoutHandler<T, U> {
    /// Create a handler from explicit collaborators.
    #[must_use]
    pub fn new(tokenizer: T, users: U, session: SessionContext) -> Self {
        Self {
            tokenizer,
            users,
            session,
            guard_double_submit: false,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Drop submissions that arrive while another is in flight.
    #[must_use]
    pub fn guard_double_submit(mut self, enabled: bool) -> Self {
        self.guard_double_submit = enabled;
        self
    }

    /// Session context read at load time.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Handle one click on the submit button.
    pub async fn submit(&self, page: &impl CheckoutPage) -> SubmitOutcome {
        let submission_id = SubmissionId::generate();
        let span = tracing::info_span!("checkout_submit", %submission_id);

        async {
            let mut path = SubmissionPath::new();

            let _in_flight = if self.guard_double_submit {
                let Some(guard) = InFlight::acquire(&self.in_flight) else {
                    tracing::info!("Submission already in flight, ignoring click");
                    return SubmitOutcome {
                        submission_id,
                        result: SubmitResult::Ignored,
                        path,
                    };
                };
                Some(guard)
            } else {
                None
            };

            page.write(PageElement::SubmitButton, AUTHORIZING_LABEL);
            let card = read_card(page);

            path.advance(SubmitState::Tokenizing);
            let result = match self.tokenizer.create_card_token(&card).await {
                Err(err) => {
                    path.advance(SubmitState::TokenizeFailed);
                    tracing::error!(
                        error = %err,
                        code = ?err.code,
                        detail = ?err.detail,
                        "Stripe failed to tokenize"
                    );
                    page.write(PageElement::PaymentErrors, &err.message);
                    SubmitResult::TokenizeFailed(err)
                }
                Ok(token) => {
                    path.advance(SubmitState::Tokenized);
                    self.store_token(token, &mut path).await
                }
            };

            path.advance(SubmitState::Reloading);
            page.reload().await;

            SubmitOutcome {
                submission_id,
                result,
                path,
            }
        }
        .instrument(span)
        .await
    }

    async fn store_token(&self, token: CardToken, path: &mut SubmissionPath) -> SubmitResult {
        let Some(user_id) = &self.session.user_id else {
            tracing::warn!(token_id = %token.id, "No user on page, skipping user update");
            return SubmitResult::UpdateSkipped { token_id: token.id };
        };

        path.advance(SubmitState::Updating);
        match self
            .users
            .set_card_token(user_id, &self.session.csrf_token, &token)
            .await
        {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "Updated user.");
                SubmitResult::Updated { token_id: token.id }
            }
            Err(err) => {
                // Logged only; the reload hides it from the user.
                tracing::error!(user_id = %user_id, error = %err, "Error updating user.");
                SubmitResult::UpdateFailed {
                    token_id: token.id,
                    error: err.to_string(),
                }
            }
        }
    }
}
