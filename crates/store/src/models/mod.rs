//! Domain models for the store.
//!
//! These types represent validated domain objects separate from database
//! row types; the `db` layer converts rows into them.

pub mod catalog;
pub mod order;
pub mod profile;

pub use catalog::{Category, NewProduct, Product};
pub use order::{NewOrder, Order};
pub use profile::{Profile, ProfilePatch};
