//! Typed failure taxonomy
//!
//! A [`DefinedError`] is an immutable, cheaply cloneable failure record. Its
//! [`ErrorKind`] decides the default catalog entry and carries kind-specific
//! diagnostics. Errors link to the failure that caused them, forming a chain
//! that the error handler walks to find the root cause.

use std::{error::Error as StdError, fmt, sync::Arc};

use http::StatusCode;

use crate::{
    catalog::{self, CatalogKey, keys},
    ids::TraceId,
};

/// Which storage step a database failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DatabaseOperation {
    Create,
    Read,
    Update,
    Delete,
    RecordNotFound,
    RecordExists,
    GenericFail,
}

impl DatabaseOperation {
    #[must_use]
    pub const fn catalog_key(self) -> CatalogKey {
        match self {
            Self::Create => keys::SQL_CREATE_FAIL,
            Self::Read => keys::SQL_READ_FAIL,
            Self::Update => keys::SQL_UPDATE_FAIL,
            Self::Delete => keys::SQL_DELETE_FAIL,
            Self::RecordNotFound => keys::SQL_RECORD_NOT_FOUND,
            Self::RecordExists => keys::SQL_RECORD_EXISTS,
            Self::GenericFail => keys::SQL_OPERATION_FAIL,
        }
    }
}

/// Why a client was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AuthFailure {
    AccessDenied,
    TokenMissing,
    TokenExpired,
    TokenInvalid,
    InvalidEmail,
    InvalidPassword,
    InvalidCredentials,
    DuplicateRegistration,
}

impl AuthFailure {
    #[must_use]
    pub const fn catalog_key(self) -> CatalogKey {
        match self {
            Self::AccessDenied => keys::AUTH_ACCESS_DENIED,
            Self::TokenMissing => keys::AUTH_TOKEN_MISSING,
            Self::TokenExpired => keys::AUTH_TOKEN_EXPIRED,
            Self::TokenInvalid => keys::AUTH_TOKEN_INVALID,
            Self::InvalidEmail => keys::AUTH_INVALID_EMAIL,
            Self::InvalidPassword => keys::AUTH_INVALID_PASSWORD,
            Self::InvalidCredentials => keys::AUTH_INVALID_CREDENTIALS,
            Self::DuplicateRegistration => keys::AUTH_DUPLICATE_REGISTRATION,
        }
    }
}

/// Closed set of failure kinds
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Catch-all for failures nothing else classified
    Server,
    /// Business-layer wrapper around a lower failure
    Service,
    /// Request-handler wrapper around a lower failure
    Controller,
    Database {
        operation: DatabaseOperation,
        /// Statement text, logged but never sent to clients
        query: Option<String>,
    },
    ClientAuth {
        failure: AuthFailure,
        user_id: Option<String>,
    },
    Validation {
        /// Names of the fields that failed validation
        fields: Vec<String>,
    },
    /// Bulk operation where some items failed
    Partial {
        failed: Vec<String>,
        total: usize,
    },
    /// A foreign failure absorbed at a boundary, before it is wrapped as `Server`
    Unknown,
}

impl ErrorKind {
    /// Catalog entry used when no explicit code is supplied
    #[must_use]
    pub const fn default_key(&self) -> CatalogKey {
        match self {
            Self::Server | Self::Unknown => keys::OPERATION_FAIL,
            Self::Service => keys::SERVICE_OPERATION_FAIL,
            Self::Controller => keys::CONTROLLER_OPERATION_FAIL,
            Self::Database { operation, .. } => operation.catalog_key(),
            Self::ClientAuth { failure, .. } => failure.catalog_key(),
            Self::Validation { .. } => keys::VALIDATION_INVALID_REQUEST,
            Self::Partial { .. } => keys::PARTIAL_SUCCESS,
        }
    }

    /// Short kind name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Leaf kinds describe the actual fault rather than wrapping one
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::ClientAuth { .. } | Self::Validation { .. })
    }

    /// Kind-specific diagnostics for the log record
    #[must_use]
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            Self::Database { query, .. } => query.clone(),
            Self::ClientAuth { user_id, .. } => user_id.as_ref().map(|id| format!("user_id={id}")),
            Self::Validation { fields } if !fields.is_empty() => Some(format!("fields={}", fields.join(","))),
            Self::Partial { failed, total } => Some(format!("failed={} total={total}", failed.join(","))),
            Self::Server | Self::Service | Self::Controller | Self::Unknown | Self::Validation { .. } => None,
        }
    }

    fn default_message(&self, catalog_text: &str) -> String {
        match self {
            Self::Partial { failed, total } => {
                format!("{} of {total} items failed: {}", failed.len(), failed.join(", "))
            }
            _ => catalog_text.to_owned(),
        }
    }
}

/// Link from an error to the failure that caused it
#[derive(Clone)]
pub enum Cause {
    Defined(DefinedError),
    Foreign(Arc<dyn StdError + Send + Sync>),
}

impl Cause {
    /// Wrap any error, keeping taxonomy members typed
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(error);
        match boxed.downcast::<DefinedError>() {
            Ok(defined) => Self::Defined(*defined),
            Err(other) => Self::Foreign(Arc::from(other)),
        }
    }

    #[must_use]
    pub fn as_defined(&self) -> Option<&DefinedError> {
        match self {
            Self::Defined(error) => Some(error),
            Self::Foreign(_) => None,
        }
    }

    #[must_use]
    pub fn as_error(&self) -> &(dyn StdError + 'static) {
        match self {
            Self::Defined(error) => error,
            Self::Foreign(error) => error.as_ref(),
        }
    }
}

impl From<DefinedError> for Cause {
    fn from(error: DefinedError) -> Self {
        Self::Defined(error)
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(error) => fmt::Debug::fmt(error, f),
            Self::Foreign(error) => f.debug_tuple("Foreign").field(error).finish(),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_error(), f)
    }
}

struct Inner {
    kind: ErrorKind,
    message: String,
    user_message: String,
    message_code: String,
    http_status: StatusCode,
    trace_id: TraceId,
    cause: Option<Cause>,
}

/// A classified failure
///
/// Cloning is cheap and shares the record; nothing mutates it after
/// [`DefinedErrorBuilder::build`].
#[derive(Clone)]
pub struct DefinedError(Arc<Inner>);

impl DefinedError {
    #[must_use]
    pub fn builder(kind: ErrorKind) -> DefinedErrorBuilder {
        DefinedErrorBuilder::new(kind)
    }

    #[must_use]
    pub fn server() -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Server)
    }

    #[must_use]
    pub fn service() -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Service)
    }

    #[must_use]
    pub fn controller() -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Controller)
    }

    #[must_use]
    pub fn unknown() -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Unknown)
    }

    #[must_use]
    pub fn database(operation: DatabaseOperation) -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Database { operation, query: None })
    }

    #[must_use]
    pub fn client_auth(failure: AuthFailure) -> DefinedErrorBuilder {
        Self::builder(ErrorKind::ClientAuth { failure, user_id: None })
    }

    #[must_use]
    pub fn validation(fields: Vec<String>) -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Validation { fields })
    }

    #[must_use]
    pub fn partial(failed: Vec<String>, total: usize) -> DefinedErrorBuilder {
        Self::builder(ErrorKind::Partial { failed, total })
    }

    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Internal description, logged
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0.message
    }

    /// Text safe to send to clients
    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.0.user_message
    }

    #[must_use]
    pub fn message_code(&self) -> &str {
        &self.0.message_code
    }

    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.0.http_status
    }

    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.0.trace_id
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.0.cause.as_ref()
    }

    /// Whether two handles share the same record
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The innermost taxonomy member reachable through the source chain
    ///
    /// Foreign links are traversed but never returned. Returns `self` when
    /// nothing below it is typed.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut root = self;
        let mut current = self.source();

        while let Some(error) = current {
            if let Some(defined) = error.downcast_ref::<Self>() {
                root = defined;
            }
            current = error.source();
        }

        root
    }
}

impl fmt::Debug for DefinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinedError")
            .field("kind", &self.0.kind)
            .field("message", &self.0.message)
            .field("message_code", &self.0.message_code)
            .field("http_status", &self.0.http_status.as_u16())
            .field("trace_id", &self.0.trace_id)
            .field("cause", &self.0.cause)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DefinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.message_code, self.0.message)
    }
}

impl StdError for DefinedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.cause.as_ref().map(Cause::as_error)
    }
}

/// Builder for [`DefinedError`]; construction never fails
#[must_use]
pub struct DefinedErrorBuilder {
    kind: ErrorKind,
    message: Option<String>,
    user_message: Option<String>,
    message_code: Option<String>,
    trace_id: Option<TraceId>,
    cause: Option<Cause>,
}

impl DefinedErrorBuilder {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            user_message: None,
            message_code: None,
            trace_id: None,
            cause: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the client-facing text; defaults to the message
    pub fn user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    /// Use a specific catalog code instead of the kind's default
    pub fn message_code(mut self, code: impl Into<String>) -> Self {
        self.message_code = Some(code.into());
        self
    }

    /// Use the code of a well-known catalog entry
    pub fn catalog_key(mut self, key: CatalogKey) -> Self {
        self.message_code = catalog::global().get(key).map(|entry| entry.code.clone());
        self
    }

    pub fn trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Cause::from_error(cause));
        self
    }

    /// Attach an already classified cause link
    pub fn caused_by(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attach statement text; ignored for non-database kinds
    pub fn query(mut self, text: impl Into<String>) -> Self {
        if let ErrorKind::Database { query, .. } = &mut self.kind {
            *query = Some(text.into());
        }
        self
    }

    /// Attach the affected user; ignored for non-auth kinds
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        if let ErrorKind::ClientAuth { user_id, .. } = &mut self.kind {
            *user_id = Some(id.into());
        }
        self
    }

    /// Resolve catalog defaults and freeze the record
    ///
    /// Trace id precedence: explicit, then the typed cause's, then fresh.
    #[must_use]
    pub fn build(self) -> DefinedError {
        let catalog = catalog::global();
        let default_entry = catalog.entry_or_fallback(self.kind.default_key());

        let explicit = self
            .message_code
            .filter(|code| !code.is_empty())
            .map(|code| catalog.find_by_code(&code).cloned().ok_or(code));

        let (message_code, http_status, catalog_text) = match explicit {
            Some(Ok(entry)) => (entry.code.clone(), entry.status(), entry.message),
            // unknown code: keep it, but take status and text from the kind
            Some(Err(code)) => (code, default_entry.status(), default_entry.message),
            None => (default_entry.code.clone(), default_entry.status(), default_entry.message),
        };

        let message = self
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.kind.default_message(&catalog_text));

        let user_message = self.user_message.filter(|m| !m.is_empty()).unwrap_or_else(|| message.clone());

        let trace_id = self
            .trace_id
            .or_else(|| self.cause.as_ref().and_then(Cause::as_defined).map(|c| c.trace_id().clone()))
            .unwrap_or_else(TraceId::generate);

        DefinedError(Arc::new(Inner {
            kind: self.kind,
            message,
            user_message,
            message_code,
            http_status,
            trace_id,
            cause: self.cause,
        }))
    }
}
