//! Card tokenization through Stripe.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use codesy_core::{CardInput, CardToken, PublishableKey, TokenizationError};

use crate::error::ClientError;
use crate::options::{trim_base_url, ClientOptions};

/// Turns raw card fields into a single-use token.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    /// Issue exactly one tokenization request for `card`.
    ///
    /// Transport failures are reported as a [`TokenizationError`] too, so
    /// callers have a single failure branch to handle.
    async fn create_card_token(&self, card: &CardInput) -> Result<CardToken, TokenizationError>;
}

/// Body of a `POST /v1/tokens` response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Failure { error: TokenizationError },
    Token(CardToken),
}

/// Stripe tokenization client authenticated with a publishable key.
#[derive(Debug, Clone)]
pub struct StripeTokenizer {
    client: Client,
    base_url: String,
    publishable_key: PublishableKey,
}

impl StripeTokenizer {
    /// Create a tokenizer against the public Stripe API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(publishable_key: PublishableKey) -> Result<Self, ClientError> {
        Self::with_options(publishable_key, &ClientOptions::default())
    }

    /// Create a tokenizer with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or the HTTP client cannot
    /// be built.
    pub fn with_options(
        publishable_key: PublishableKey,
        options: &ClientOptions,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: options.build_http_client()?,
            base_url: trim_base_url(options.stripe_api_base.as_str()),
            publishable_key,
        })
    }

    /// Form fields Stripe expects for a card token.
    fn form_fields(card: &CardInput) -> [(&'static str, &str); 4] {
        [
            ("card[number]", card.number.as_str()),
            ("card[exp_month]", card.exp_month.as_str()),
            ("card[exp_year]", card.exp_year.as_str()),
            ("card[cvc]", card.cvc.as_str()),
        ]
    }

    fn parse_response(
        status: reqwest::StatusCode,
        body: &str,
    ) -> Result<CardToken, TokenizationError> {
        match serde_json::from_str::<TokenResponse>(body) {
            Ok(TokenResponse::Token(token)) if status.is_success() => Ok(token),
            Ok(TokenResponse::Failure { error }) => Err(error),
            Ok(TokenResponse::Token(_)) | Err(_) => Err(TokenizationError::new(format!(
                "Unexpected response from the payment processor (HTTP {status})"
            ))),
        }
    }
}

#[async_trait]
impl Tokenizer for StripeTokenizer {
    async fn create_card_token(&self, card: &CardInput) -> Result<CardToken, TokenizationError> {
        tracing::debug!(
            last4 = %card.last4(),
            test_mode = self.publishable_key.is_test_mode(),
            "Requesting Stripe card token"
        );

        let response = self
            .client
            .post(format!("{}/tokens", self.base_url))
            .bearer_auth(self.publishable_key.expose())
            .form(&Self::form_fields(card))
            .send()
            .await
            .map_err(TokenizationError::transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(TokenizationError::transport)?;

        Self::parse_response(status, &body)
    }
}
