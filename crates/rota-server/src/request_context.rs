use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderValue;
use rota_core::{RequestContext, TraceId};
use rota_errors::ErrorHandler;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that opens and closes the per-request error scope
///
/// Generates the request and trace ids, stores the [`RequestContext`] for
/// downstream layers, echoes the request id, and releases every trace the
/// request registered once the response exists.
pub async fn request_context_middleware(errors: ErrorHandler, request: Request, next: Next) -> Response {
    let context = RequestContext::generate();
    let request_id = context.request_id.clone();
    let trace_id = context.trace_id.clone();

    let mut request = request;
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    errors.release(&trace_id);
    if let Some(replied) = response.extensions().get::<TraceId>()
        && replied != &trace_id
    {
        errors.release(replied);
    }

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
