use axum::{Extension, extract::State, response::Response};
use http::StatusCode;
use rota_core::RequestContext;
use rota_scheduler::forms::{Registration, SignIn};

use super::respond;
use crate::{AppState, Caller, ValidatedJson};

const COMPONENT: &str = "auth_controller";

pub async fn register(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    ValidatedJson(form): ValidatedJson<Registration>,
) -> Response {
    let result = state.accounts.register(form).await;
    respond(&state, &context, COMPONENT, StatusCode::CREATED, result)
}

pub async fn sign_in(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    ValidatedJson(form): ValidatedJson<SignIn>,
) -> Response {
    let result = state.accounts.sign_in(form).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Caller(user_id): Caller,
) -> Response {
    let result = state.accounts.me(&user_id).await;
    respond(&state, &context, COMPONENT, StatusCode::OK, result)
}
