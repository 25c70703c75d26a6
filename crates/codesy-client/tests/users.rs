//! User-record PATCH against a mock codesy site.

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codesy_client::{ClientError, ClientOptions, UserRecordUpdater, UsersClient};
use codesy_core::{CardToken, CsrfToken, UserId};

fn user_42() -> UserId {
    "42".parse().unwrap()
}

/// URL of a local port nothing listens on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn patches_user_record_with_token_and_csrf() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .and(header("x-csrftoken", "csrf-value"))
        .and(header("referer", format!("{}/", server.uri()).as_str()))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("stripe_cc_token=tok_abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = UsersClient::new(server.uri()).unwrap();
    client
        .set_card_token(&user_42(), &CsrfToken::new("csrf-value"), &CardToken::new("tok_abc"))
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn sends_session_cookie_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .and(header("cookie", "sessionid=abc; csrftoken=xyz"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions::with_session_cookie("sessionid=abc; csrftoken=xyz");
    let client = UsersClient::with_options(server.uri(), &options).unwrap();
    client
        .set_card_token(&user_42(), &CsrfToken::new("xyz"), &CardToken::new("tok_abc"))
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn forbidden_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string("CSRF verification failed. Request aborted."),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = UsersClient::new(server.uri()).unwrap();
    let err = client
        .set_card_token(&user_42(), &CsrfToken::new("stale"), &CardToken::new("tok_abc"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 403);
            assert!(message.starts_with("CSRF verification failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_error_body_uses_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/42/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = UsersClient::new(server.uri()).unwrap();
    let err = client
        .set_card_token(&user_42(), &CsrfToken::new("t"), &CardToken::new("tok_abc"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Api { status: 404, ref message } if message == "Not Found"
    ));
}

#[tokio::test]
async fn unreachable_site_is_an_http_error() {
    let client = UsersClient::new(closed_port_url()).unwrap();

    let err = client
        .set_card_token(&user_42(), &CsrfToken::new("t"), &CardToken::new("tok_abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Http(_)));
}
