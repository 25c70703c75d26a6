//! The page the checkout handler reads from and writes to.
//!
//! [`PageElement`] names every element of the checkout page's DOM contract.
//! [`CheckoutPage`] is the seam a browser binding, the CLI, or a test double
//! implements.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

/// Elements of the checkout page the handler touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageElement {
    /// `data-stripe_key` attribute on the page root.
    StripeKey,
    /// Hidden input with the signed-in user's id. Optional.
    UserId,
    /// Card number input.
    CardNumber,
    /// Expiry month input.
    ExpMonth,
    /// Expiry year input.
    ExpYear,
    /// Security code input.
    Cvc,
    /// Django CSRF hidden input.
    CsrfToken,
    /// Submit button; its label is written.
    SubmitButton,
    /// Error region; its text is written.
    PaymentErrors,
}

impl PageElement {
    /// CSS selector of the element.
    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::StripeKey => "#codesy-html[data-stripe_key]",
            Self::UserId => "#codesy_user_id",
            Self::CardNumber => "#cc-number",
            Self::ExpMonth => "#cc-ex-month",
            Self::ExpYear => "#cc-ex-year",
            Self::Cvc => "#cvc",
            Self::CsrfToken => "form input[name=\"csrfmiddlewaretoken\"]",
            Self::SubmitButton => "#cc-submit",
            Self::PaymentErrors => "#payment-errors",
        }
    }
}

impl fmt::Display for PageElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// A checkout page.
///
/// Methods take `&self` so overlapping submissions can share one page, as
/// they do on a real page.
#[async_trait]
pub trait CheckoutPage: Send + Sync {
    /// Current value of an element, `None` if the page lacks it.
    fn read(&self, element: PageElement) -> Option<String>;

    /// Replace the text of an element.
    fn write(&self, element: PageElement, text: &str);

    /// Reload the page. All handler state for the page ends here.
    async fn reload(&self);
}

/// Something that happened to a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Text written to an element.
    Write {
        /// The element written.
        element: PageElement,
        /// The new text.
        text: String,
    },
    /// The page was reloaded.
    Reload,
}

#[derive(Debug, Default)]
struct PageState {
    values: HashMap<PageElement, String>,
    events: Vec<PageEvent>,
}

/// In-memory page that records every write and reload in order.
#[derive(Debug, Default)]
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl MemoryPage {
    /// Create an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an element's value.
    #[must_use]
    pub fn with(self, element: PageElement, value: impl Into<String>) -> Self {
        self.set(element, value);
        self
    }

    /// Set an element's value, e.g. as a user typing into a field.
    pub fn set(&self, element: PageElement, value: impl Into<String>) {
        self.lock().values.insert(element, value.into());
    }

    /// Current text of an element.
    #[must_use]
    pub fn text(&self, element: PageElement) -> Option<String> {
        self.lock().values.get(&element).cloned()
    }

    /// Writes and reloads, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<PageEvent> {
        self.lock().events.clone()
    }

    /// Number of reloads so far.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| matches!(e, PageEvent::Reload))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CheckoutPage for MemoryPage {
    fn read(&self, element: PageElement) -> Option<String> {
        self.text(element)
    }

    fn write(&self, element: PageElement, text: &str) {
        let mut state = self.lock();
        state.values.insert(element, text.to_string());
        state.events.push(PageEvent::Write {
            element,
            text: text.to_string(),
        });
    }

    async fn reload(&self) {
        self.lock().events.push(PageEvent::Reload);
    }
}
