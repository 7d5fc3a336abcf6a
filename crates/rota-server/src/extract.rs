use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    response::Response,
};
use rota_core::{AuthFailure, DefinedError, RequestContext, catalog::keys};
use rota_scheduler::forms::{Validate, validation_error};
use serde::de::DeserializeOwned;

use crate::{AppState, routes::ANONYMOUS_USER};

const COMPONENT: &str = "request_extract";

fn context_of(extensions: &http::Extensions) -> RequestContext {
    extensions
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(RequestContext::generate)
}

/// Register `error` and answer with its envelope
fn reject(state: &AppState, context: &RequestContext, error: DefinedError) -> Response {
    let error = state.responses.handler().handle_error(error, COMPONENT);
    state.responses.send_error(error, &context.request_id)
}

/// JSON body that has passed its field rules
///
/// A body that does not parse is answered with `Validation.InvalidForm`,
/// failed rules with `Validation.InvalidRequest`, both on the request's trace.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let context = context_of(request.extensions());

        let error = match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => {
                let failures = value.validate();
                if failures.is_empty() {
                    return Ok(Self(value));
                }
                validation_error(&failures, context.trace_id.clone())
            }
            Err(rejection) => DefinedError::validation(vec!["body".to_owned()])
                .catalog_key(keys::VALIDATION_INVALID_FORM)
                .message(format!("Invalid request: {}", rejection.body_text()))
                .trace_id(context.trace_id.clone())
                .build(),
        };

        Err(reject(state, &context, error))
    }
}

/// Path parameters; extraction failures use `Validation.InvalidParam`
#[derive(Debug)]
pub struct PathParams<T>(pub T);

impl<T> FromRequestParts<AppState> for PathParams<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                let context = context_of(&parts.extensions);
                let error = DefinedError::validation(vec!["path".to_owned()])
                    .catalog_key(keys::VALIDATION_INVALID_PARAM)
                    .message(format!("Invalid path: {}", rejection.body_text()))
                    .trace_id(context.trace_id.clone())
                    .build();
                Err(reject(state, &context, error))
            }
        }
    }
}

/// Query string; extraction failures use `Validation.InvalidQuery`
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T> FromRequestParts<AppState> for QueryParams<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let context = context_of(&parts.extensions);
                let error = DefinedError::validation(vec!["query".to_owned()])
                    .catalog_key(keys::VALIDATION_INVALID_QUERY)
                    .message(format!("Invalid query: {}", rejection.body_text()))
                    .trace_id(context.trace_id.clone())
                    .build();
                Err(reject(state, &context, error))
            }
        }
    }
}

/// Owner of the data a request acts on
///
/// The verified token's user. Only when authentication is disabled does a
/// request act as [`ANONYMOUS_USER`]; otherwise a request without a verified
/// user (one that came in through a public path) is refused with
/// `ClientAuth/TokenMissing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let context = context_of(&parts.extensions);

        if let Some(user_id) = context.user_id() {
            return Ok(Self(user_id.to_owned()));
        }

        if !state.auth_enabled {
            return Ok(Self(ANONYMOUS_USER.to_owned()));
        }

        let error = DefinedError::client_auth(AuthFailure::TokenMissing)
            .message(format!("{} requires a signed-in caller", parts.uri.path()))
            .trace_id(context.trace_id.clone())
            .build();
        Err(reject(state, &context, error))
    }
}
