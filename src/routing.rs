//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
    },
    middleware,
    routing::get,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::{
    AppState,
    add_cash::{get_add_cash_page, post_add_cash},
    auth::{AuthState, auth_guard},
    endpoints,
    history::get_history_page,
    internal_server_error::get_internal_server_error_page,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    portfolio::get_portfolio_page,
    quote::{get_quote_page, post_quote},
    register_user::{get_register_page, post_register},
    trade::{get_buy_page, get_sell_page, post_buy, post_sell},
};

/// Return a router with all the app's routes.
///
/// Every response is marked as non-cacheable so that pages showing cash and holdings are never
/// served stale after a trade.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(endpoints::REGISTER, get(get_register_page).post(post_register))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_portfolio_page))
        .route(endpoints::BUY, get(get_buy_page).post(post_buy))
        .route(endpoints::SELL, get(get_sell_page).post(post_sell))
        .route(endpoints::QUOTE, get(get_quote_page).post(post_quote))
        .route(endpoints::ADD_CASH, get(get_add_cash_page).post(post_add_cash))
        .route(endpoints::HISTORY, get(get_history_page))
        .route_layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(state)
}
