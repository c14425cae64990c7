//! `pondops-core`: shared domain building blocks (ids, errors, entity traits).
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{LedgerLinkId, PondId};
pub use value_object::ValueObject;
