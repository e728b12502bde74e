//! Route definitions for the Palm Oil Mill Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - master data
        .nest("/suppliers", supplier_routes())
        .nest("/buyers", buyer_routes())
        .nest("/materials", material_routes())
        // Protected routes - TBS receiving
        .nest("/weighbridge", weighbridge_routes())
        // Protected routes - stock ledger
        .nest("/stock", stock_routes())
        // Protected routes - storage tanks
        .nest("/tanks", tank_routes())
        // Protected routes - production
        .nest("/production", production_routes())
        // Protected routes - warehouse procurement
        .nest("/procurement", procurement_routes())
        // Protected routes - shipments
        .nest("/shipments", shipment_routes())
        // Protected routes - payroll
        .nest("/payroll", payroll_routes())
        // Protected routes - reporting
        .nest("/reports", reporting_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Supplier master data routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::deactivate_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Buyer master data routes (protected)
fn buyer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_buyers).post(handlers::create_buyer))
        .route(
            "/:buyer_id",
            get(handlers::get_buyer).put(handlers::update_buyer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Material master data routes (protected)
fn material_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_materials).post(handlers::create_material),
        )
        .route(
            "/:material_id",
            get(handlers::get_material).put(handlers::update_material),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Weighbridge routes (protected)
fn weighbridge_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(handlers::list_tickets).post(handlers::weigh_in))
        .route("/tickets/:ticket_id", get(handlers::get_ticket))
        .route("/tickets/:ticket_id/weigh-out", post(handlers::weigh_out))
        .route("/tickets/:ticket_id/post", post(handlers::post_ticket))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::apply_movement),
        )
        .route("/balances", get(handlers::list_balances))
        .route("/materials/:material_id/balance", get(handlers::get_balance))
        .route(
            "/materials/:material_id/movements",
            get(handlers::get_material_movements),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Storage tank routes (protected)
fn tank_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tanks).post(handlers::create_tank))
        .route("/transfer", post(handlers::transfer_between_tanks))
        .route("/:tank_id", get(handlers::get_tank))
        .route("/:tank_id/movements", get(handlers::get_tank_movements))
        .route("/:tank_id/fill", post(handlers::fill_tank))
        .route("/:tank_id/drawdown", post(handlers::drawdown_tank))
        .route("/:tank_id/adjust", post(handlers::adjust_tank))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Production routes (protected)
fn production_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/batches",
            get(handlers::list_batches).post(handlers::record_batch),
        )
        .route(
            "/batches/:batch_id",
            get(handlers::get_batch)
                .put(handlers::update_batch)
                .delete(handlers::delete_batch),
        )
        .route("/batches/:batch_id/status", put(handlers::transition_batch))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse procurement routes (protected)
fn procurement_routes() -> Router<AppState> {
    Router::new()
        // Purchase requests
        .route(
            "/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/requests/:request_id", get(handlers::get_request))
        .route(
            "/requests/:request_id/status",
            put(handlers::transition_request),
        )
        // Purchase orders
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/orders/:order_id", get(handlers::get_order))
        .route("/orders/:order_id/cancel", post(handlers::cancel_order))
        .route("/orders/:order_id/receive", post(handlers::receive_order))
        // Goods issues
        .route(
            "/issues",
            get(handlers::list_issues).post(handlers::create_issue),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shipment routes (protected)
fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_shipments).post(handlers::create_shipment),
        )
        .route(
            "/:shipment_id",
            get(handlers::get_shipment).delete(handlers::delete_shipment),
        )
        .route("/:shipment_id/post", post(handlers::post_shipment))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Payroll routes (protected)
fn payroll_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/periods",
            get(handlers::list_periods).post(handlers::import_payroll),
        )
        .route("/periods/:period_id/entries", get(handlers::get_period_entries))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-summary", get(handlers::get_stock_summary))
        .route(
            "/production-yield",
            get(handlers::get_production_yield_report),
        )
        .route("/tbs-intake", get(handlers::get_tbs_intake_report))
        .route("/dashboard", get(handlers::get_dashboard_metrics))
        .route_layer(middleware::from_fn(auth_middleware))
}
