use std::error::Error as StdError;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use rota_core::{Cause, DefinedError, RequestId, TraceId, catalog};
use serde::{Deserialize, Serialize};

use crate::ErrorHandler;

const COMPONENT: &str = "response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMessage {
    pub code: String,
    pub message: String,
}

/// Body of every API response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub status: ResponseStatus,
    pub message: EnvelopeMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub request_id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<TraceId>,
}

/// Envelope paired with its HTTP status
///
/// As a response, the trace id of an error reply is also stored in the
/// response extensions so the request middleware can release it.
#[derive(Debug)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub envelope: ResponseEnvelope<T>,
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let trace_id = self.envelope.trace_id.clone();
        let mut response = (self.status, Json(self.envelope)).into_response();

        if let Some(trace_id) = trace_id {
            response.extensions_mut().insert(trace_id);
        }

        response
    }
}

/// Converts data or a failure into a [`Reply`]
#[derive(Clone)]
pub struct ResponseBuilder {
    handler: ErrorHandler,
}

impl ResponseBuilder {
    pub const fn new(handler: ErrorHandler) -> Self {
        Self { handler }
    }

    pub const fn handler(&self) -> &ErrorHandler {
        &self.handler
    }

    /// Success envelope with status 200
    pub fn build_success<T>(&self, data: T, request_id: &RequestId) -> Reply<T> {
        self.build_success_with_status(data, request_id, StatusCode::OK)
    }

    pub fn build_success_with_status<T>(&self, data: T, request_id: &RequestId, status: StatusCode) -> Reply<T> {
        let entry = catalog::global().entry_or_fallback(catalog::keys::OPERATION_SUCCESS);

        Reply {
            status,
            envelope: ResponseEnvelope {
                status: ResponseStatus::Success,
                message: EnvelopeMessage {
                    code: entry.code,
                    message: entry.message,
                },
                data: Some(data),
                request_id: request_id.clone(),
                trace_id: None,
            },
        }
    }

    /// Error envelope for the root cause of `error`
    ///
    /// A failure outside the taxonomy is first passed through the error
    /// handler. The root cause comes from the registry when the trace is
    /// still live, otherwise from the error's own chain.
    pub fn build_error<E>(&self, error: E, request_id: &RequestId) -> Reply<()>
    where
        E: StdError + Send + Sync + 'static,
    {
        let error = match Cause::from_error(error) {
            Cause::Defined(error) => error,
            foreign @ Cause::Foreign(_) => self.handler.handle_cause(foreign, COMPONENT),
        };

        let root = self
            .handler
            .root_cause(error.trace_id())
            .unwrap_or_else(|| error.root_cause().clone());

        tracing::debug!(
            trace_id = %error.trace_id(),
            root_code = root.message_code(),
            "resolved root cause"
        );

        Self::error_reply(&root, error.trace_id(), request_id)
    }

    fn error_reply(root: &DefinedError, trace_id: &TraceId, request_id: &RequestId) -> Reply<()> {
        let status = root.http_status();
        let message = EnvelopeMessage {
            code: root.message_code().to_owned(),
            message: root.user_message().to_owned(),
        };

        Reply {
            status,
            envelope: ResponseEnvelope {
                status: ResponseStatus::Error,
                message,
                data: None,
                request_id: request_id.clone(),
                trace_id: Some(trace_id.clone()),
            },
        }
    }

    pub fn send_success<T: Serialize>(&self, data: T, request_id: &RequestId) -> Response {
        self.build_success(data, request_id).into_response()
    }

    pub fn send_error<E>(&self, error: E, request_id: &RequestId) -> Response
    where
        E: StdError + Send + Sync + 'static,
    {
        self.build_error(error, request_id).into_response()
    }
}
