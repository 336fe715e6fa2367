//! Application State

use std::sync::Arc;

use studio_payments::CheckoutGateway;

use crate::pages::Pages;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Studio display name rendered into pages
    pub studio_name: Arc<str>,

    /// Compiled page templates
    pub pages: Arc<Pages>,

    /// Checkout gateway (optional - None if Stripe is not configured)
    pub gateway: Option<Arc<dyn CheckoutGateway>>,

    /// Listening port, used when a request names no host at all
    pub port: u16,
}

impl AppState {
    pub fn new(
        studio_name: impl Into<Arc<str>>,
        pages: Pages,
        gateway: Option<Arc<dyn CheckoutGateway>>,
        port: u16,
    ) -> Self {
        Self {
            studio_name: studio_name.into(),
            pages: Arc::new(pages),
            gateway,
            port,
        }
    }
}
