//! Clementine Policy - row-level access control.
//!
//! Every data operation in the store is authorized here before it touches a
//! row. The engine answers one question: may this caller perform this
//! operation on this row? Anything not explicitly granted is denied.
//!
//! # Rules
//!
//! | Resource | select | insert | update | delete |
//! |---|---|---|---|---|
//! | profile | self or admin | self (role `user` only) or admin | self (role `user` only) or admin | admin |
//! | category | any authenticated | admin | admin | admin |
//! | product | any authenticated | admin | admin | admin |
//! | order | owner or admin | owner or admin | admin | admin |
//! | product image | public, image bucket only | admin, image bucket only | admin, image bucket only | admin, image bucket only |
//!
//! # Role resolution
//!
//! Admin checks read the caller's persisted role through a [`RoleSource`]
//! at evaluation time. The lookup happens at most once per evaluation and
//! is never cached across evaluations, so a role grant takes effect on the
//! very next request. When the lookup cannot complete the engine denies
//! (fail-closed) and logs the failure separately from ordinary denials.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod decision;
pub mod engine;
pub mod request;
pub mod role_source;

pub use decision::{Decision, DenyReason};
pub use engine::PolicyEngine;
pub use request::{Caller, Operation, Target};
pub use role_source::{RoleLookupError, RoleSource};
