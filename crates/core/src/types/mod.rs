//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod status;

pub use category::{CategoryName, CategoryNameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::Role;
pub use status::OrderStatus;
