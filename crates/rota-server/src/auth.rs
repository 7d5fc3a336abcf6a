use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use rota_auth::TokenVerifier;
use rota_core::{AuthenticatedUser, DefinedError, RequestContext, RequestId};
use rota_errors::ResponseBuilder;

const COMPONENT: &str = "auth_middleware";

/// Whether `path` is `prefix` itself or lies below it on a segment boundary
fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Bearer token check for every non-public path
///
/// A verified token attaches the user to the [`RequestContext`]. Any failure
/// becomes a client-auth error on the request's trace and is answered with
/// the error envelope.
pub async fn auth_middleware(
    verifier: TokenVerifier,
    public_paths: Vec<String>,
    responses: ResponseBuilder,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if public_paths.iter().any(|p| is_under(path, p)) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let verified = verifier.verify_header(header.as_deref());

    let mut request = request;
    let Some(context) = request.extensions_mut().get_mut::<RequestContext>() else {
        tracing::error!("auth middleware ran without a request context");
        return responses.send_error(
            DefinedError::server().message("request context missing").build(),
            &RequestId::generate(),
        );
    };

    match verified {
        Ok(user_id) => {
            tracing::debug!(user_id = %user_id, "request authenticated");
            context.user = Some(AuthenticatedUser { user_id });
            next.run(request).await
        }
        Err(e) => {
            let error = DefinedError::client_auth(e.failure())
                .trace_id(context.trace_id.clone())
                .cause(e)
                .build();
            let error = responses.handler().handle_error(error, COMPONENT);
            let request_id = context.request_id.clone();

            responses.send_error(error, &request_id)
        }
    }
}
