//! Caller identity extraction.
//!
//! The service sits behind a gateway that verifies the bearer token and
//! forwards the authenticated identity in a trusted header. Handlers pull
//! the caller out with the [`CallerIdentity`] extractor; requests without
//! the header are anonymous, not rejected, since several catalog reads are
//! open to the public.

use axum::{extract::FromRequestParts, http::request::Parts};

use clementine_core::IdentityId;
use clementine_policy::Caller;

use crate::error::{StoreError, set_sentry_user};

/// Header carrying the verified identity UUID, set by the gateway.
pub const IDENTITY_HEADER: &str = "x-identity-id";

/// Extractor resolving the request's [`Caller`].
///
/// A missing header yields [`Caller::Anonymous`]. A present but malformed
/// header is an identity resolution failure and denies the request
/// outright rather than downgrading it to anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     CallerIdentity(caller): CallerIdentity,
/// ) -> impl IntoResponse {
///     format!("caller: {caller}")
/// }
/// ```
pub struct CallerIdentity(pub Caller);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(IDENTITY_HEADER) else {
            return Ok(Self(Caller::Anonymous));
        };

        let identity = value
            .to_str()
            .ok()
            .and_then(|raw| IdentityId::parse_str(raw.trim()).ok())
            .ok_or_else(|| {
                tracing::error!(
                    header = IDENTITY_HEADER,
                    "malformed identity header, denying request"
                );
                StoreError::NotPermitted
            })?;

        set_sentry_user(&identity);

        Ok(Self(Caller::Identity(identity)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/products");
        if let Some(value) = value {
            builder = builder.header(IDENTITY_HEADER, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let mut parts = parts_with_header(None);
        let CallerIdentity(caller) = CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(caller.is_anonymous());
    }

    #[tokio::test]
    async fn test_valid_header_resolves_identity() {
        let mut parts = parts_with_header(Some("b5cbd60c-4b76-46e5-9a97-b831fe1e2b2e"));
        let CallerIdentity(caller) = CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        let identity = caller.identity().unwrap();
        assert_eq!(identity.to_string(), "b5cbd60c-4b76-46e5-9a97-b831fe1e2b2e");
    }

    #[tokio::test]
    async fn test_malformed_header_is_denied() {
        let mut parts = parts_with_header(Some("not-a-uuid"));
        let result = CallerIdentity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(StoreError::NotPermitted)));
    }

    #[tokio::test]
    async fn test_whitespace_around_uuid_is_tolerated() {
        let mut parts = parts_with_header(Some(" b5cbd60c-4b76-46e5-9a97-b831fe1e2b2e "));
        let CallerIdentity(caller) = CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(!caller.is_anonymous());
    }
}
