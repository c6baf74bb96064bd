//! Example merchant server using Axum.
//!
//! This example shows how a shop would wire the library into its web layer:
//! one page that posts a signed payment request to the bank, and one endpoint
//! where the bank posts (or redirects with) its notification.
//!
//! Run with:
//! ```bash
//! cargo run --example merchant
//! ```
//!
//! Environment variables (a `.env` file is read if present):
//! - IPIZZA_SELLER_ID, IPIZZA_SELLER_NAME, IPIZZA_SELLER_ACCOUNT, IPIZZA_ENDPOINT_URL
//! - IPIZZA_PRIVATE_KEY: path to the merchant private key (PEM)
//! - IPIZZA_BANK_CERT: path to the bank certificate or public key (PEM)
//! - IPIZZA_BANK_URL: bank banklink URL the form posts to
//! - PORT: Server port (default: 3000)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use ipizza_rs::{Banklink, FieldMap, IpizzaError, KeyMaterial, MerchantConfig, ServiceRegistry};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct AppState {
    banklink: Banklink,
    bank_url: String,
}

/// Renders an auto-submitting form carrying the signed request.
async fn pay_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<u64>,
) -> Result<Html<String>, AppError> {
    // Demo pricing: every order costs 10.50 EUR.
    let fields = state.banklink.prepare_request(
        order_id,
        Decimal::new(1050, 2),
        &format!("Order {}", order_id),
        "EST",
        "EUR",
    )?;

    let inputs: String = fields
        .iter()
        .map(|(name, value)| {
            format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
                escape(name),
                escape(value)
            )
        })
        .collect();

    Ok(Html(format!(
        "<!doctype html>\n<html><body onload=\"document.forms[0].submit()\">\n\
         <form method=\"post\" action=\"{}\">\n{}<button>Pay</button>\n</form>\n</body></html>",
        escape(&state.bank_url),
        inputs
    )))
}

/// Bank notification delivered as a form post.
async fn callback_post(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<FieldMap>,
) -> Result<Response, AppError> {
    callback(&state, &fields)
}

/// Bank notification delivered as a redirect with query parameters.
async fn callback_get(
    State(state): State<Arc<AppState>>,
    Query(fields): Query<FieldMap>,
) -> Result<Response, AppError> {
    callback(&state, &fields)
}

fn callback(state: &AppState, fields: &FieldMap) -> Result<Response, AppError> {
    let response = state.banklink.interpret_response(fields)?;
    tracing::info!(
        order = response.order_id(),
        status = ?response.status(),
        "Bank notification received"
    );
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "protocol": "ipizza",
        "version": ipizza_rs::IPIZZA_VERSION,
    }))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ipizza_rs=debug")))
        .init();

    let config = MerchantConfig::from_env()?;
    let keys = KeyMaterial::from_files(
        std::env::var("IPIZZA_PRIVATE_KEY")?,
        std::env::var("IPIZZA_BANK_CERT")?,
    )?;
    let bank_url = std::env::var("IPIZZA_BANK_URL")?;
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    let banklink = Banklink::new(config, Arc::new(ServiceRegistry::ipizza()), keys)?.expect_recipient(true);
    let state = Arc::new(AppState { banklink, bank_url });

    let app = Router::new()
        .route("/pay/:order_id", get(pay_handler))
        .route("/callback", get(callback_get).post(callback_post))
        .route("/health", get(health_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Merchant demo listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// Error handling
struct AppError(IpizzaError);

impl From<IpizzaError> for AppError {
    fn from(err: IpizzaError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            IpizzaError::MissingField(_)
            | IpizzaError::UnsupportedService(_)
            | IpizzaError::InvalidAmount(_)
            | IpizzaError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
