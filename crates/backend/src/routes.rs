use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// All application routes
pub fn configure_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Customers
        .route(
            "/api/customers",
            get(handlers::a001_customer::list).post(handlers::a001_customer::create),
        )
        .route(
            "/api/customers/:id",
            get(handlers::a001_customer::get_by_id)
                .put(handlers::a001_customer::update)
                .delete(handlers::a001_customer::delete),
        )
        .route(
            "/api/customers/:id/units",
            get(handlers::a001_customer::list_units),
        )
        .route(
            "/api/customers/:id/service-events",
            get(handlers::a004_service_event::list_by_customer)
                .post(handlers::a004_service_event::create),
        )
        .route(
            "/api/customers/:id/part-purchases",
            get(handlers::a005_part_purchase::list_by_customer)
                .post(handlers::a005_part_purchase::create),
        )
        // A002 Units
        .route(
            "/api/units",
            get(handlers::a002_unit::list).post(handlers::a002_unit::create),
        )
        .route(
            "/api/units/:id",
            get(handlers::a002_unit::get_by_id)
                .put(handlers::a002_unit::update)
                .delete(handlers::a002_unit::delete),
        )
        // A003 Parts; static segments before `:id`
        .route(
            "/api/parts",
            get(handlers::a003_part::list).post(handlers::a003_part::create),
        )
        .route("/api/parts/import", post(handlers::a003_part::import_stock))
        .route("/api/parts/export", get(handlers::a003_part::export_stock))
        .route(
            "/api/parts/:id",
            get(handlers::a003_part::get_by_id)
                .put(handlers::a003_part::update)
                .delete(handlers::a003_part::delete),
        )
        // A004 Service events
        .route(
            "/api/service-events/:id",
            delete(handlers::a004_service_event::delete),
        )
        // A005 Part purchases
        .route(
            "/api/part-purchases/:id",
            patch(handlers::a005_part_purchase::update)
                .delete(handlers::a005_part_purchase::delete),
        )
        // D100 Units map
        .route(
            "/api/dashboard/units-map",
            get(handlers::d100_units_map::get_units_map),
        )
        .with_state(state)
}
