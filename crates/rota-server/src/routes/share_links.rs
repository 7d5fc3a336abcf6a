use axum::{Extension, extract::State, response::Response};
use http::StatusCode;
use rota_core::RequestContext;
use rota_scheduler::forms::NewShareLink;

use super::respond;
use crate::{AppState, Caller, PathParams, ValidatedJson};

const COMPONENT: &str = "share_link_controller";

pub async fn create(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    ValidatedJson(form): ValidatedJson<NewShareLink>,
) -> Response {
    let result = state.share_links.create_or_reuse(&user_id, form).await;
    let status = match &result {
        Ok(link) if link.reused => StatusCode::OK,
        _ => StatusCode::CREATED,
    };
    respond(&state, &context, COMPONENT, status, result)
}

/// Anyone holding the id may read the schedule
pub async fn find(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    PathParams(id): PathParams<String>,
) -> Response {
    let result = state.share_links.get(&id).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
    PathParams(id): PathParams<String>,
) -> Response {
    let result = state
        .share_links
        .delete(&user_id, &id)
        .await
        .map(|()| serde_json::json!({ "id": id }));
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}
