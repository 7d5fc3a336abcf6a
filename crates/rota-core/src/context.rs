use crate::ids::{RequestId, TraceId};

/// Per-request state shared by middleware and handlers
///
/// Stored as a request extension by the request-id middleware. The trace id
/// is the one request-scoped code threads into the errors it raises, so the
/// middleware can release the whole chain when the response is produced.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: TraceId,
    /// Set by the auth middleware once a bearer token verifies
    pub user: Option<AuthenticatedUser>,
}

impl RequestContext {
    /// Context with freshly generated identifiers and no user
    #[must_use]
    pub fn generate() -> Self {
        Self {
            request_id: RequestId::generate(),
            trace_id: TraceId::generate(),
            user: None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.user_id.as_str())
    }
}

/// Identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_context_has_no_user() {
        let ctx = RequestContext::generate();
        assert!(ctx.user_id().is_none());
        assert_ne!(ctx.request_id.as_str(), ctx.trace_id.as_str());
    }

    #[test]
    fn attaches_user() {
        let mut ctx = RequestContext::generate();
        ctx.user = Some(AuthenticatedUser { user_id: "u-1".into() });
        assert_eq!(ctx.user_id(), Some("u-1"));
    }
}
