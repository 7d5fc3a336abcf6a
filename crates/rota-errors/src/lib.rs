//! Error handling pipeline
//!
//! [`ErrorHandler`] is the single funnel every raised failure passes through:
//! it classifies, logs, and records the failure under its trace id.
//! [`ResponseBuilder`] turns data or a resolved root cause into the wire
//! envelope.

#![allow(clippy::must_use_candidate)]

mod handler;
mod response;

pub use handler::{DEFAULT_REGISTRY_CAPACITY, DEFAULT_REGISTRY_TTL, ErrorHandler};
pub use response::{EnvelopeMessage, Reply, ResponseBuilder, ResponseEnvelope, ResponseStatus};
