//! studio-checkout HTTP Server
//!
//! Axum server for the studio's marketing page. Payments are handed off to
//! Stripe's hosted Checkout; this process only validates the amount and
//! opens the session.

mod config;
mod handlers;
mod pages;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_payments::{CheckoutGateway, StripeClient};

use crate::config::Config;
use crate::handlers::{cancel, create_checkout_session, health_check, landing, success};
use crate::pages::Pages;
use crate::state::AppState;

/// Build the application router
fn router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(landing))
        .route("/success", get(success))
        .route("/cancel", get(cancel))

        // Payments
        .route("/create-checkout-session", post(create_checkout_session))

        // Health
        .route("/health", get(health_check))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Initialize payments
    let gateway: Option<Arc<dyn CheckoutGateway>> = match StripeClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Stripe configured ({})", client.base_url());
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({})", e);
            tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            None
        }
    };

    let pages = Pages::new()?;
    let state = AppState::new(config.studio_name.as_str(), pages, gateway, config.port);
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 {} ready on http://localhost:{}", config.studio_name, config.port);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                        - Landing page");
    tracing::info!("  GET  /success                 - Payment success page");
    tracing::info!("  GET  /cancel                  - Checkout canceled page");
    tracing::info!("  POST /create-checkout-session - Create Stripe checkout");
    tracing::info!("  GET  /health                  - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
