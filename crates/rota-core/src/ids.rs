use std::{fmt, sync::Arc, sync::OnceLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace used when none has been configured
pub const DEFAULT_NAMESPACE: &str = "rota";

static NAMESPACE: OnceLock<String> = OnceLock::new();

/// Set the process-wide identifier namespace
///
/// Returns `false` if a namespace was already set; the first value wins.
pub fn set_namespace(namespace: impl Into<String>) -> bool {
    NAMESPACE.set(namespace.into()).is_ok()
}

/// The namespace prefixed to generated identifiers
pub fn namespace() -> &'static str {
    NAMESPACE.get().map_or(DEFAULT_NAMESPACE, String::as_str)
}

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident, $infix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Generate a fresh identifier in the configured namespace
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}.{}.{}", namespace(), $infix, Uuid::new_v4()).into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value.into())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

correlation_id!(
    /// Correlation token linking every failure raised on behalf of one operation
    ///
    /// Formatted as `<namespace>.traceId.<uuid>`. Process-local only.
    TraceId,
    "traceId"
);

correlation_id!(
    /// Identifier assigned to each inbound request, `<namespace>.requestId.<uuid>`
    RequestId,
    "requestId"
);
