//! Evaluation inputs: who is calling, what they are doing, and which row.

use core::fmt;

use clementine_core::{IdentityId, Role};

/// The principal attempting an operation.
///
/// Anonymous is a first-class caller, not an error: public reads (product
/// images) are granted to it and everything else denies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    /// No verified identity attached to the request.
    Anonymous,
    /// A verified identity issued by the auth provider.
    Identity(IdentityId),
}

impl Caller {
    /// The identity behind this caller, if any.
    #[must_use]
    pub const fn identity(self) -> Option<IdentityId> {
        match self {
            Self::Anonymous => None,
            Self::Identity(id) => Some(id),
        }
    }

    /// Whether this caller carries no identity.
    #[must_use]
    pub const fn is_anonymous(self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Whether this caller is the given identity.
    #[must_use]
    pub fn is(self, identity: IdentityId) -> bool {
        matches!(self, Self::Identity(me) if me == identity)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Identity(id) => write!(f, "{id}"),
        }
    }
}

impl From<IdentityId> for Caller {
    fn from(identity: IdentityId) -> Self {
        Self::Identity(identity)
    }
}

impl From<Option<IdentityId>> for Caller {
    fn from(identity: Option<IdentityId>) -> Self {
        identity.map_or(Self::Anonymous, Self::Identity)
    }
}

/// Row-level operation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// The row an operation targets, carrying only the fields the rules read.
///
/// For writes the fields are the values as they would be after the write;
/// for reads and deletes they are the stored values. The distinction only
/// matters for [`Target::Profile`], where the submitted `role` is what the
/// self-promotion guard inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// A profile row: its owning identity and its role field.
    Profile { id: IdentityId, role: Role },
    /// A category row. No per-row fields participate in the rules.
    Category,
    /// A product row. No per-row fields participate in the rules.
    Product,
    /// An order row: the identity that owns it.
    Order { customer: IdentityId },
    /// A product image object and the bucket it lives in.
    ProductImage { bucket: &'a str },
}

impl Target<'_> {
    /// Resource name for logging.
    #[must_use]
    pub const fn resource(&self) -> &'static str {
        match self {
            Self::Profile { .. } => "profile",
            Self::Category => "category",
            Self::Product => "product",
            Self::Order { .. } => "order",
            Self::ProductImage { .. } => "product_image",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_caller_identity_accessors() {
        let id = IdentityId::new(Uuid::from_u128(7));
        let caller = Caller::from(id);
        assert_eq!(caller.identity(), Some(id));
        assert!(!caller.is_anonymous());
        assert!(caller.is(id));
        assert!(!caller.is(IdentityId::new(Uuid::from_u128(8))));
    }

    #[test]
    fn test_anonymous_is_nobody() {
        assert!(Caller::Anonymous.is_anonymous());
        assert_eq!(Caller::Anonymous.identity(), None);
        assert!(!Caller::Anonymous.is(IdentityId::new(Uuid::from_u128(7))));
    }

    #[test]
    fn test_caller_from_option() {
        let id = IdentityId::new(Uuid::from_u128(7));
        assert_eq!(Caller::from(Some(id)), Caller::Identity(id));
        assert_eq!(Caller::from(None), Caller::Anonymous);
    }

    #[test]
    fn test_resource_names() {
        let id = IdentityId::new(Uuid::from_u128(1));
        assert_eq!(
            Target::Profile {
                id,
                role: Role::User
            }
            .resource(),
            "profile"
        );
        assert_eq!(Target::Category.resource(), "category");
        assert_eq!(Target::Product.resource(), "product");
        assert_eq!(Target::Order { customer: id }.resource(), "order");
        assert_eq!(
            Target::ProductImage { bucket: "x" }.resource(),
            "product_image"
        );
    }
}
