//! HTTP handlers
//!
//! Handlers wrap every service failure in a controller error on the same
//! trace and answer with the root cause's envelope.

mod accounts;
mod appointments;
mod share_links;
mod staff;

use axum::{
    Extension, Router,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use http::StatusCode;
use rota_core::{DefinedError, RequestContext, catalog};
use serde::Serialize;

use crate::AppState;

/// Owner of all data while authentication is disabled
pub const ANONYMOUS_USER: &str = "anonymous";

/// Account entry points, reachable without a token under the API prefix
pub const ACCOUNT_PUBLIC_PATHS: [&str; 2] = ["/auth/register", "/auth/signin"];

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(accounts::register))
        .route("/auth/signin", post(accounts::sign_in))
        .route("/auth/me", get(accounts::me))
        .route("/staffs", get(staff::list).post(staff::create))
        .route("/staffs/{staff}", get(staff::find).put(staff::update).delete(staff::remove))
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route("/appointments/{week_view_id}/{staff_name}", delete(appointments::remove_week))
        .route("/share-links", post(share_links::create))
        .route("/share-links/{id}", get(share_links::find).delete(share_links::remove))
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Envelope for paths no route matches
pub async fn not_found_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Response {
    let error = DefinedError::server()
        .catalog_key(catalog::keys::RESOURCE_NOT_FOUND)
        .trace_id(context.trace_id.clone())
        .build();
    let error = state.responses.handler().handle_error(error, "router");

    state.responses.send_error(error, &context.request_id)
}

fn respond<T: Serialize>(
    state: &AppState,
    context: &RequestContext,
    component: &str,
    status: StatusCode,
    result: Result<T, DefinedError>,
) -> Response {
    match result {
        Ok(data) => state
            .responses
            .build_success_with_status(data, &context.request_id, status)
            .into_response(),
        Err(error) => {
            let error = state.responses.handler().handle_unknown_controller_error(error, component);
            state.responses.send_error(error, &context.request_id)
        }
    }
}
