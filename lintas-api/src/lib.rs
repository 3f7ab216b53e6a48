use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod bookings;
pub mod error;
pub mod holds;
pub mod middleware;
pub mod seatmap;
pub mod state;
pub mod tickets;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let customer_routes = Router::new()
        .route("/v1/holds", post(holds::create_hold))
        .route("/v1/bookings/confirm", post(bookings::confirm_booking))
        .route("/v1/bookings/{booking_id}", get(bookings::get_booking))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::customer_auth_middleware,
        ));

    let agent_routes = Router::new()
        .route("/v1/tickets/scan", post(tickets::scan_ticket))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::agent_auth_middleware,
        ));

    let public_routes =
        Router::new().route("/v1/trips/{trip_id}/seats", get(seatmap::trip_seat_status));

    Router::new()
        .merge(customer_routes)
        .merge(agent_routes)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
