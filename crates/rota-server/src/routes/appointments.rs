use axum::{Extension, extract::State, response::Response};
use http::StatusCode;
use rota_core::RequestContext;
use rota_scheduler::forms::NewAppointments;
use serde::Deserialize;

use super::respond;
use crate::{AppState, Caller, PathParams, QueryParams, ValidatedJson};

const COMPONENT: &str = "appointment_controller";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeekFilter {
    week_view_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    QueryParams(filter): QueryParams<WeekFilter>,
) -> Response {
    let result = state.appointments.list(&user_id, filter.week_view_id.as_deref()).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}

/// Bulk create; a partial failure answers 207 naming the failed items
pub async fn create(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    ValidatedJson(body): ValidatedJson<NewAppointments>,
) -> Response {
    let result = state.appointments.create_many(&user_id, body.appointments).await;
    respond(&state, &context, COMPONENT, StatusCode::CREATED, result)
}

pub async fn remove_week(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    PathParams((week_view_id, staff_name)): PathParams<(String, String)>,
) -> Response {
    let result = state
        .appointments
        .delete_week(&user_id, &week_view_id, &staff_name)
        .await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}
