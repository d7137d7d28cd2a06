//! Business logic services for the store.
//!
//! # Services
//!
//! - `profiles` - Profile provisioning and administration
//! - `catalog` - Categories and products
//! - `orders` - Order placement and fulfilment status
//!
//! Every service method that touches a resource runs the policy engine
//! first and maps a denial to [`StoreError::NotPermitted`] before any row
//! is returned or written. The services never look at the decision's
//! reason; the engine already logged it.

pub mod catalog;
pub mod orders;
pub mod profiles;

pub use catalog::CatalogService;
pub use orders::OrderService;
pub use profiles::ProfileService;

use clementine_policy::Decision;

use crate::error::StoreError;

/// Convert a policy decision into a service-level result.
fn require_allowed(decision: Decision) -> Result<(), StoreError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(_) => Err(StoreError::NotPermitted),
    }
}

#[cfg(test)]
mod tests {
    use clementine_policy::DenyReason;

    use super::*;

    #[test]
    fn test_require_allowed() {
        assert!(require_allowed(Decision::Allow).is_ok());
        assert!(matches!(
            require_allowed(Decision::Deny(DenyReason::Forbidden)),
            Err(StoreError::NotPermitted)
        ));
        assert!(matches!(
            require_allowed(Decision::Deny(DenyReason::RoleResolution)),
            Err(StoreError::NotPermitted)
        ));
    }
}
