//! HTTP clients for the codesy checkout flow.
//!
//! Two collaborators sit behind traits so the checkout handler can be driven
//! against real services or test doubles:
//!
//! - [`Tokenizer`]: exchanges card fields for a single-use token
//!   ([`StripeTokenizer`] talks to `POST /v1/tokens`).
//! - [`UserRecordUpdater`]: stores the token on the signed-in user
//!   ([`UsersClient`] sends `PATCH /users/{id}/`).
//!
//! # Example
//!
//! ```no_run
//! use codesy_client::{StripeTokenizer, Tokenizer, UserRecordUpdater, UsersClient};
//! use codesy_core::{CardInput, CsrfToken, PublishableKey, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tokenizer = StripeTokenizer::new(PublishableKey::new("pk_test_123")?)?;
//! let users = UsersClient::new("https://codesy.io")?;
//!
//! let card = CardInput::new("4242424242424242", "12", "2030", "123");
//! let token = tokenizer.create_card_token(&card).await?;
//!
//! let user_id: UserId = "42".parse()?;
//! users
//!     .set_card_token(&user_id, &CsrfToken::new("csrf-from-form"), &token)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod options;
mod tokenizer;
mod users;

pub use error::ClientError;
pub use options::{ClientOptions, STRIPE_API_BASE};
pub use tokenizer::{StripeTokenizer, Tokenizer};
pub use users::{UserRecordUpdater, UsersClient, CARD_TOKEN_FIELD, CSRF_HEADER};
