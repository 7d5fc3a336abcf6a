use std::{error::Error as StdError, time::Duration};

use mini_moka::sync::{Cache, ConcurrentCacheExt};
use rota_core::{Cause, DatabaseOperation, DefinedError, ErrorKind, TraceId};

/// Default upper bound on live trace chains
pub const DEFAULT_REGISTRY_CAPACITY: u64 = 10_000;

/// Default lifetime of a chain whose request never released it
pub const DEFAULT_REGISTRY_TTL: Duration = Duration::from_secs(300);

/// Central funnel for raised failures
///
/// Keeps the most recently registered error per trace id. Each registered
/// error links to its cause, so the entry is the head of that trace's chain.
/// Entries are released by the owning request; capacity and TTL bound the
/// registry when a release is missed.
#[derive(Clone)]
pub struct ErrorHandler {
    chains: Cache<TraceId, DefinedError>,
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("chains", &self.chains.entry_count())
            .finish()
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_CAPACITY, DEFAULT_REGISTRY_TTL)
    }
}

impl ErrorHandler {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let chains = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();

        Self { chains }
    }

    /// Classify, register, and log a failure raised by `component`
    ///
    /// Taxonomy members are registered as-is. Anything else is absorbed as
    /// an `Unknown` error and wrapped in a `Server` error, which is what gets
    /// registered and returned.
    pub fn handle_error<E>(&self, error: E, component: &str) -> DefinedError
    where
        E: StdError + Send + Sync + 'static,
    {
        self.handle_cause(Cause::from_error(error), component)
    }

    /// [`Self::handle_error`] for an already wrapped cause
    pub fn handle_cause(&self, cause: Cause, component: &str) -> DefinedError {
        let error = match cause {
            Cause::Defined(error) => error,
            Cause::Foreign(foreign) => {
                let unknown = DefinedError::unknown().caused_by(Cause::Foreign(foreign)).build();
                DefinedError::server().cause(unknown).build()
            }
        };

        self.register(&error);
        log_error(&error, component);

        error
    }

    /// Build a database error of `operation` around `error`
    pub fn handle_unknown_database_error<E>(
        &self,
        error: E,
        component: &str,
        query: Option<&str>,
        operation: DatabaseOperation,
    ) -> DefinedError
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut builder = DefinedError::database(operation).cause(error);
        if let Some(query) = query {
            builder = builder.query(query);
        }

        self.handle_error(builder.build(), component)
    }

    /// Build a service error around `error`
    pub fn handle_unknown_service_error<E>(&self, error: E, component: &str) -> DefinedError
    where
        E: StdError + Send + Sync + 'static,
    {
        self.handle_error(DefinedError::service().cause(error).build(), component)
    }

    /// Build a controller error around `error`
    pub fn handle_unknown_controller_error<E>(&self, error: E, component: &str) -> DefinedError
    where
        E: StdError + Send + Sync + 'static,
    {
        self.handle_error(DefinedError::controller().cause(error).build(), component)
    }

    /// Build a server error around `error`
    pub fn handle_unknown_server_error<E>(&self, error: E, component: &str) -> DefinedError
    where
        E: StdError + Send + Sync + 'static,
    {
        self.handle_error(DefinedError::server().cause(error).build(), component)
    }

    /// Innermost taxonomy member of the chain registered under `trace_id`
    pub fn defined_base_error(&self, trace_id: &TraceId) -> Option<DefinedError> {
        self.chains.get(trace_id).map(|head| head.root_cause().clone())
    }

    /// Alias of [`Self::defined_base_error`]
    pub fn root_cause(&self, trace_id: &TraceId) -> Option<DefinedError> {
        self.defined_base_error(trace_id)
    }

    /// Most recently registered error for `trace_id`
    pub fn head(&self, trace_id: &TraceId) -> Option<DefinedError> {
        self.chains.get(trace_id)
    }

    /// Drop the chain for a completed request
    pub fn release(&self, trace_id: &TraceId) {
        self.chains.invalidate(trace_id);
    }

    /// Number of live chains, after pending evictions are applied
    pub fn len(&self) -> u64 {
        self.chains.sync();
        self.chains.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn register(&self, error: &DefinedError) {
        self.chains.insert(error.trace_id().clone(), error.clone());
    }
}

fn log_error(error: &DefinedError, component: &str) {
    let kind = error.kind();
    let diagnostics = kind.diagnostics();
    let cause = error.cause().map(ToString::to_string);

    let severity = match kind {
        ErrorKind::Server | ErrorKind::Unknown => "fatal",
        ErrorKind::Service | ErrorKind::Controller => "wrapped",
        ErrorKind::Database { .. } | ErrorKind::ClientAuth { .. } | ErrorKind::Validation { .. } => "leaf",
        ErrorKind::Partial { .. } => "partial",
    };

    if error.http_status().is_server_error() {
        tracing::error!(
            component,
            severity,
            trace_id = %error.trace_id(),
            http_status = error.http_status().as_u16(),
            user_message = error.user_message(),
            message_code = error.message_code(),
            kind = kind.name(),
            diagnostics = diagnostics.as_deref(),
            cause = cause.as_deref(),
            "{}",
            error.message()
        );
    } else {
        tracing::warn!(
            component,
            severity,
            trace_id = %error.trace_id(),
            http_status = error.http_status().as_u16(),
            user_message = error.user_message(),
            message_code = error.message_code(),
            kind = kind.name(),
            diagnostics = diagnostics.as_deref(),
            cause = cause.as_deref(),
            "{}",
            error.message()
        );
    }
}
