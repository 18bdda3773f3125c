//! Front-end type descriptors.
//!
//! The front-end builds a [`TypeTable`] of [`TypeKind`] descriptors; the
//! lowering engine in `tessera-layout` reads it without mutating it.

use thiserror::Error;

pub mod hir;
mod table;

pub use hir::*;
pub use table::TypeTable;

/// Errors raised while building a [`TypeTable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HirError {
    #[error("descriptor {0} does not exist in this type table")]
    UnknownType(TypeId),

    #[error("descriptor {0} is not an aggregate")]
    NotAnAggregate(TypeId),

    #[error("aggregate `{name}` already has members")]
    AggregateRedefined { name: String },
}
