//! Type vocabulary and marshalers for the nodeglue generator.
//!
//! ## Modules
//!
//! - [`registry`] - The [`TypeRegistry`] mapping native type spellings to
//!   marshaling strategies, with the pointer out-parameter fallback
//! - [`marshal`] - The closed [`Marshaler`] set and its emitted
//!   conversion expressions

pub mod marshal;
pub mod registry;

pub use marshal::{Assertion, Marshaler, SimpleKind};
pub use registry::TypeRegistry;
