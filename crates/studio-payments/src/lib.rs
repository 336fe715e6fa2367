//! # studio-payments
//!
//! Payment collection for studio-checkout, delegated to Stripe Checkout.
//!
//! The studio never touches card data. The payer picks an amount on the
//! landing page, we open a hosted Checkout session for exactly that amount
//! and hand back the URL:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │ Studio page │────▶│  Stripe Hosted  │────▶│ Studio page │
//! │  (amount)   │     │  Checkout Page  │     │  /success   │
//! └─────────────┘     └─────────────────┘     │  /cancel    │
//!                                             └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use studio_payments::{Amount, CheckoutGateway, PaymentRequest, StripeClient};
//!
//! let client = StripeClient::new("sk_test_xxx");
//! let amount = Amount::parse(Some(&serde_json::json!(2500)))?;
//! let request = PaymentRequest::for_origin(amount, "https://studio.example");
//!
//! let session = client.create_session(&request).await?;
//! // Redirect the payer to: session.url
//! ```

mod checkout;
mod error;
mod request;

pub use checkout::{CheckoutGateway, CheckoutSession, STRIPE_API_BASE, StripeClient};
pub use error::{GENERIC_FAILURE_MESSAGE, PaymentError, Result};
pub use request::{Amount, MIN_AMOUNT_CENTS, PRODUCT_DESCRIPTION, PRODUCT_NAME, PaymentRequest};
