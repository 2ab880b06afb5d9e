use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use super::{handlers, openapi};
use crate::domain::service::Service;
use crate::domain::store::LedgerStore;

pub const BASE_PATH: &str = "/loyalty/v1";

/// Mount the ledger REST API on `router` under [`BASE_PATH`].
pub fn register_routes<S: LedgerStore>(router: Router, service: Arc<Service<S>>) -> Router {
    let api = Router::new()
        .route(
            "/customers",
            post(handlers::register_customer::<S>).get(handlers::list_customers::<S>),
        )
        .route("/customers/{phone}", get(handlers::get_customer::<S>))
        .route(
            "/merchants",
            post(handlers::create_merchant::<S>).get(handlers::list_merchants::<S>),
        )
        .route(
            "/merchants/{id}",
            get(handlers::get_merchant::<S>).patch(handlers::update_merchant::<S>),
        )
        .route("/merchants/{id}/wallet", post(handlers::adjust_wallet::<S>))
        .route("/transactions/earn", post(handlers::earn::<S>))
        .route("/transactions/redeem", post(handlers::redeem::<S>))
        .route("/transactions", get(handlers::list_transactions::<S>))
        .route("/redemptions", get(handlers::list_redemptions::<S>))
        .route("/openapi.json", get(|| async { Json(openapi::document()) }))
        .layer(Extension(service));

    router.nest(BASE_PATH, api)
}
