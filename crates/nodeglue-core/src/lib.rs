//! Shared foundation for the nodeglue generator.
//!
//! This crate holds the vocabulary every stage of the pipeline speaks:
//! the spec input model, parsed signatures, naming conventions, and the
//! unified error hierarchy.
//!
//! ## Modules
//!
//! - [`spec`] - Declarative binding spec model deserialized from JSON
//! - [`signature`] - Parsed C function signatures
//! - [`names`] - GObject-style naming derivations shared by all stages
//! - [`error`] - Phase error types and the unified [`GenerateError`]

pub mod error;
pub mod names;
pub mod signature;
pub mod spec;

// Re-export the common types so downstream crates can use
// `nodeglue_core::Signature` directly.
pub use error::{GenerateError, ParseError, ParseErrorKind, TypeError, UnsupportedError};
pub use signature::{ERROR_SENTINEL, Param, Signature, normalize_type};
pub use spec::{BindSpec, ClassSpec, MarshalKind};
