//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: one session per
//! payment, one attempt per call, no idempotency key.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stripe::{
    CheckoutSessionBillingAddressCollection, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, Currency,
};

use crate::error::{PaymentError, Result};
use crate::request::{PRODUCT_DESCRIPTION, PRODUCT_NAME, PaymentRequest};

/// Production Stripe API origin
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Something that can open a hosted checkout session
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a session for `request` and return where to send the payer
    async fn create_session(&self, request: &PaymentRequest) -> Result<CheckoutSession>;
}

/// Result of creating a checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session ID (`cs_...`)
    pub id: String,

    /// Hosted checkout URL to redirect the payer to
    pub url: String,
}

/// The part of Stripe's `checkout.session` object we relay.
///
/// Decoding only these two fields keeps the hand-off working when Stripe
/// adds or reshapes session fields we never read.
#[derive(Deserialize)]
struct CreatedSession {
    id: String,
    url: Option<String>,
}

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    base_url: String,
}

impl StripeClient {
    /// Create a client against the live Stripe API
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            base_url: STRIPE_API_BASE.into(),
        }
    }

    /// Create a client against another origin (stripe-mock, tests)
    pub fn with_base_url(secret_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::from_url(base_url, secret_key),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_key = lookup("STRIPE_SECRET_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;

        match lookup("STRIPE_API_BASE") {
            None => Ok(Self::new(&secret_key)),
            Some(base) if base.starts_with("http://") || base.starts_with("https://") => {
                Ok(Self::with_base_url(&secret_key, &base))
            }
            Some(base) => Err(PaymentError::Config(format!(
                "STRIPE_API_BASE must be an http(s) URL, got {base:?}"
            ))),
        }
    }

    /// Origin requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the underlying Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

impl fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

/// Session parameters for one line item at the payer-chosen amount
fn checkout_params(request: &PaymentRequest) -> CreateCheckoutSession<'_> {
    let mut params = CreateCheckoutSession::new();
    params.mode = Some(CheckoutSessionMode::Payment);
    params.success_url = Some(&request.success_url);
    params.cancel_url = Some(&request.cancel_url);
    params.billing_address_collection = Some(CheckoutSessionBillingAddressCollection::Auto);

    params.line_items = Some(vec![CreateCheckoutSessionLineItems {
        quantity: Some(1),
        price_data: Some(CreateCheckoutSessionLineItemsPriceData {
            currency: Currency::USD,
            unit_amount: Some(request.amount.cents()),
            product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                name: PRODUCT_NAME.to_string(),
                description: Some(PRODUCT_DESCRIPTION.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }]);

    params
}

#[async_trait]
impl CheckoutGateway for StripeClient {
    async fn create_session(&self, request: &PaymentRequest) -> Result<CheckoutSession> {
        tracing::debug!(amount = %request.amount, "Creating Stripe checkout session");

        let params = checkout_params(request);
        let session: CreatedSession = self
            .client
            .post_form("/checkout/sessions", &params)
            .await?;

        let url = session.url.ok_or_else(|| {
            PaymentError::MalformedResponse("No checkout URL returned".into())
        })?;

        tracing::info!(session_id = %session.id, amount = %request.amount, "Checkout session created");

        Ok(CheckoutSession { id: session.id, url })
    }
}
