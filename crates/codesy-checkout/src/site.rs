//! A checkout page backed by the live site.
//!
//! Field values come from the command line or configuration, writes are
//! logged, and a reload re-fetches the checkout page with the session cookie.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::CheckoutConfig;
use crate::error::CheckoutError;
use crate::page::{CheckoutPage, MemoryPage, PageElement, PageEvent};

/// Checkout page for a headless run against the site.
#[derive(Debug)]
pub struct SitePage {
    fields: MemoryPage,
    client: Client,
    page_url: String,
    session_cookie: Option<String>,
}

impl SitePage {
    /// Create a page for `config`, pre-filled with the page-level values the
    /// configuration carries (Stripe key, user id, CSRF token).
    ///
    /// # Errors
    ///
    /// Returns an error if the request timeout is zero or the HTTP client
    /// cannot be built.
    pub fn new(config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let client = config.client_options().build_http_client()?;

        let fields = MemoryPage::new();
        let page_values = [
            (PageElement::StripeKey, &config.stripe_publishable_key),
            (PageElement::UserId, &config.user_id),
            (PageElement::CsrfToken, &config.csrf_token),
        ];
        for (element, value) in page_values {
            if let Some(value) = value {
                fields.set(element, value.as_str());
            }
        }

        Ok(Self {
            fields,
            client,
            page_url: config.page_url(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    /// Set an element's value.
    #[must_use]
    pub fn with(self, element: PageElement, value: impl Into<String>) -> Self {
        self.fields.set(element, value);
        self
    }

    /// Writes and reloads so far.
    #[must_use]
    pub fn events(&self) -> Vec<PageEvent> {
        self.fields.events()
    }
}

#[async_trait]
impl CheckoutPage for SitePage {
    fn read(&self, element: PageElement) -> Option<String> {
        self.fields.read(element)
    }

    fn write(&self, element: PageElement, text: &str) {
        tracing::info!(selector = element.selector(), text = %text, "Page updated");
        self.fields.write(element, text);
    }

    async fn reload(&self) {
        self.fields.reload().await;

        let mut request = self.client.get(&self.page_url);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        match request.send().await {
            Ok(response) => {
                tracing::info!(url = %self.page_url, status = %response.status(), "Page reloaded");
            }
            Err(err) => {
                tracing::warn!(url = %self.page_url, error = %err, "Page reload failed");
            }
        }
    }
}
