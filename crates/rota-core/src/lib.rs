#![allow(clippy::must_use_candidate)]

pub mod catalog;
mod context;
mod error;
mod ids;

pub use catalog::{CatalogError, CatalogKey, MessageCatalog, MessageCodeEntry};
pub use context::{AuthenticatedUser, RequestContext};
pub use error::{AuthFailure, Cause, DatabaseOperation, DefinedError, DefinedErrorBuilder, ErrorKind};
pub use ids::{DEFAULT_NAMESPACE, RequestId, TraceId, namespace, set_namespace};
