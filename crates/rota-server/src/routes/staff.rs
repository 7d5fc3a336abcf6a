use axum::{Extension, extract::State, response::Response};
use http::StatusCode;
use rota_core::RequestContext;
use rota_scheduler::forms::{NewStaff, StaffUpdate};

use super::respond;
use crate::{AppState, Caller, PathParams, ValidatedJson};

const COMPONENT: &str = "staff_controller";

pub async fn list(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
) -> Response {
    let result = state.staff.list(&user_id).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}

pub async fn create(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    ValidatedJson(form): ValidatedJson<NewStaff>,
) -> Response {
    let result = state.staff.create(&user_id, form).await;
    respond(&state, &context, COMPONENT, StatusCode::CREATED, result)
}

pub async fn find(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    PathParams(name): PathParams<String>,
) -> Response {
    let result = state.staff.get_by_name(&user_id, &name).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}

pub async fn update(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    PathParams(id): PathParams<String>,
    ValidatedJson(form): ValidatedJson<StaffUpdate>,
) -> Response {
    let result = state.staff.update(&user_id, &id, form).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}

/// Deletes the staff member and every appointment of theirs
pub async fn remove(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    PathParams(name): PathParams<String>,
) -> Response {
    let result = state.staff.delete_by_name(&user_id, &name).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}
