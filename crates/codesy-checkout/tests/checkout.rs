//! End-to-end checkout scenarios against mock Stripe and codesy endpoints.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codesy_checkout::{
    CheckoutHandler, MemoryPage, PageElement, PageEvent, SubmitResult, AUTHORIZING_LABEL,
};
use codesy_client::ClientOptions;
use codesy_core::{SubmitState, TRANSPORT_ERROR_MESSAGE};

const CARD_FORM: &str = "card%5Bnumber%5D=4242424242424242&card%5Bexp_month%5D=12\
                         &card%5Bexp_year%5D=2030&card%5Bcvc%5D=123";

/// Mock Stripe and codesy site for one test.
struct Harness {
    stripe: MockServer,
    site: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            stripe: MockServer::start().await,
            site: MockServer::start().await,
        }
    }

    fn options(&self) -> ClientOptions {
        ClientOptions {
            stripe_api_base: format!("{}/v1", self.stripe.uri()),
            ..ClientOptions::default()
        }
    }

    fn handler(
        &self,
        page: &MemoryPage,
    ) -> CheckoutHandler<codesy_client::StripeTokenizer, codesy_client::UsersClient> {
        self.handler_with(page, &self.options())
    }

    fn handler_with(
        &self,
        page: &MemoryPage,
        options: &ClientOptions,
    ) -> CheckoutHandler<codesy_client::StripeTokenizer, codesy_client::UsersClient> {
        CheckoutHandler::load(page, &self.site.uri(), options)
            .expect("Failed to load checkout handler")
    }

    /// Options whose requests give up after one second.
    fn short_timeout(&self) -> ClientOptions {
        ClientOptions {
            timeout_seconds: 1,
            ..self.options()
        }
    }

    async fn stripe_returns(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/v1/tokens"))
            .and(body_string(CARD_FORM))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&self.stripe)
            .await;
    }
}

fn checkout_page() -> MemoryPage {
    MemoryPage::new()
        .with(PageElement::StripeKey, "pk_test_abc")
        .with(PageElement::UserId, "42")
        .with(PageElement::CsrfToken, "csrf-from-form")
        .with(PageElement::CardNumber, "4242424242424242")
        .with(PageElement::ExpMonth, "12")
        .with(PageElement::ExpYear, "2030")
        .with(PageElement::Cvc, "123")
}

#[tokio::test]
async fn token_is_patched_onto_user() {
    let harness = Harness::start().await;
    harness.stripe_returns(200, json!({"id": "tok_abc"})).await;

    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .and(header("x-csrftoken", "csrf-from-form"))
        .and(body_string("stripe_cc_token=tok_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let outcome = harness.handler(&page).submit(&page).await;

    assert_eq!(
        outcome.result,
        SubmitResult::Updated {
            token_id: "tok_abc".into()
        }
    );
    assert_eq!(
        page.events(),
        vec![
            PageEvent::Write {
                element: PageElement::SubmitButton,
                text: AUTHORIZING_LABEL.into()
            },
            PageEvent::Reload,
        ]
    );
}

#[tokio::test]
async fn rejected_card_shows_error_and_skips_update() {
    let harness = Harness::start().await;
    harness
        .stripe_returns(
            402,
            json!({"error": {"type": "card_error", "message": "Your card number is incorrect."}}),
        )
        .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let outcome = harness.handler(&page).submit(&page).await;

    assert!(matches!(
        outcome.result,
        SubmitResult::TokenizeFailed(ref err) if err.message == "Your card number is incorrect."
    ));
    assert_eq!(
        page.text(PageElement::PaymentErrors).as_deref(),
        Some("Your card number is incorrect.")
    );
    assert_eq!(page.reload_count(), 1);
    assert_eq!(page.events().last(), Some(&PageEvent::Reload));
    assert_eq!(outcome.path.current(), SubmitState::Reloading);
}

#[tokio::test]
async fn failed_update_is_hidden_and_still_reloads() {
    let harness = Harness::start().await;
    harness.stripe_returns(200, json!({"id": "tok_abc"})).await;

    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("CSRF verification failed."))
        .expect(1)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let outcome = harness.handler(&page).submit(&page).await;

    match outcome.result {
        SubmitResult::UpdateFailed { token_id, error } => {
            assert_eq!(token_id, "tok_abc");
            assert!(error.contains("403"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(page.text(PageElement::PaymentErrors), None);
    assert_eq!(page.reload_count(), 1);
}

#[tokio::test]
async fn page_without_user_skips_update() {
    let harness = Harness::start().await;
    harness.stripe_returns(200, json!({"id": "tok_abc"})).await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.site)
        .await;

    let page = MemoryPage::new()
        .with(PageElement::StripeKey, "pk_test_abc")
        .with(PageElement::CsrfToken, "csrf-from-form")
        .with(PageElement::CardNumber, "4242424242424242")
        .with(PageElement::ExpMonth, "12")
        .with(PageElement::ExpYear, "2030")
        .with(PageElement::Cvc, "123");
    let outcome = harness.handler(&page).submit(&page).await;

    assert!(matches!(outcome.result, SubmitResult::UpdateSkipped { .. }));
    assert_eq!(page.reload_count(), 1);
}

#[tokio::test]
async fn hung_tokenization_times_out_into_card_error() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "tok_late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&harness.stripe)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let outcome = harness
        .handler_with(&page, &harness.short_timeout())
        .submit(&page)
        .await;

    assert!(matches!(
        outcome.result,
        SubmitResult::TokenizeFailed(ref err)
            if err.error_type.as_deref() == Some("api_connection_error")
    ));
    assert_eq!(
        page.text(PageElement::PaymentErrors).as_deref(),
        Some(TRANSPORT_ERROR_MESSAGE)
    );
    assert_eq!(page.reload_count(), 1);
    assert_eq!(outcome.path.current(), SubmitState::Reloading);
}

#[tokio::test]
async fn hung_update_times_out_silently() {
    let harness = Harness::start().await;
    harness.stripe_returns(200, json!({"id": "tok_abc"})).await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let outcome = harness
        .handler_with(&page, &harness.short_timeout())
        .submit(&page)
        .await;

    assert!(matches!(
        outcome.result,
        SubmitResult::UpdateFailed { ref token_id, .. } if token_id == "tok_abc"
    ));
    assert_eq!(page.text(PageElement::PaymentErrors), None);
    assert_eq!(page.reload_count(), 1);
}

#[tokio::test]
async fn double_click_issues_two_tokenizations_by_default() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "tok_abc"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&harness.stripe)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let handler = harness.handler(&page);
    let (first, second) = tokio::join!(handler.submit(&page), handler.submit(&page));

    assert!(matches!(first.result, SubmitResult::Updated { .. }));
    assert!(matches!(second.result, SubmitResult::Updated { .. }));
    assert_eq!(page.reload_count(), 2);
}

#[tokio::test]
async fn guard_drops_second_click_while_in_flight() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "tok_abc"}))
                .set_delay(Duration::from_millis(100)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&harness.stripe)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&harness.site)
        .await;

    let page = checkout_page();
    let handler = harness.handler(&page).guard_double_submit(true);
    let (first, second) = tokio::join!(handler.submit(&page), handler.submit(&page));

    assert!(matches!(first.result, SubmitResult::Updated { .. }));
    assert_eq!(second.result, SubmitResult::Ignored);
    assert_eq!(second.path.states(), &[SubmitState::Idle]);
    assert_eq!(page.reload_count(), 1);

    // The guard is released once the first submission reloads.
    Mock::given(method("POST"))
        .and(path("/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "tok_def"})))
        .expect(1)
        .mount(&harness.stripe)
        .await;
    let third = handler.submit(&page).await;
    assert_eq!(
        third.result,
        SubmitResult::Updated {
            token_id: "tok_def".into()
        }
    );
}

#[test]
fn load_fails_without_publishable_key() {
    let page = MemoryPage::new().with(PageElement::UserId, "42");
    let result = CheckoutHandler::load(&page, "http://localhost:8000", &ClientOptions::default());
    assert!(result.is_err());
}
