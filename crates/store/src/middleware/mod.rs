//! HTTP middleware stack for the store service.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//!
//! Caller identity is not a layer: handlers pull it per request with the
//! [`CallerIdentity`] extractor.

pub mod identity;

pub use identity::{CallerIdentity, IDENTITY_HEADER};
