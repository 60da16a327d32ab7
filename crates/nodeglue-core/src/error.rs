//! Unified error types for binding generation.
//!
//! This module provides a consistent error type hierarchy for all phases
//! of glue generation: prototype parsing, type resolution, and emission.
//!
//! ## Error Hierarchy
//!
//! ```text
//! GenerateError (top-level wrapper)
//! ├── ParseError       - Prototype grammar errors (with ParseErrorKind)
//! ├── TypeError        - Type vocabulary resolution errors
//! └── UnsupportedError - Declarations the generator refuses to emit
//! ```
//!
//! ## Usage
//!
//! Each phase-specific error type can be used directly for fine-grained
//! handling, or converted to `GenerateError` for unified error handling:
//!
//! ```ignore
//! use nodeglue_core::{GenerateError, ParseError};
//!
//! fn generate(spec: &BindSpec) -> Result<String, GenerateError> {
//!     let sig = parse_prototype(proto)?;   // ParseError -> GenerateError
//!     let m = registry.lookup(ty, name)?;  // TypeError -> GenerateError
//!     Ok(render(sig, m))
//! }
//! ```

use thiserror::Error;

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of prototype parse errors.
///
/// This enum provides a structured way to identify error types,
/// enabling precise assertions in tests and specific diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    // Shape errors
    /// The prototype has no `(` introducing a parameter list.
    MissingParameterList,
    /// The parameter list is never closed with `)`.
    UnterminatedParameterList,
    /// Non-whitespace text follows the closing `)`.
    TrailingCharacters,
    /// A nested `(` inside the parameter list (function-pointer spelling).
    NestedParameterList,

    // Declarator errors
    /// The text before `(` does not split into a return type and a name.
    MissingName,
    /// The function name is not a plain C identifier.
    InvalidName,

    // Parameter errors
    /// A parameter does not split into a type and a name.
    InvalidParameter,
    /// A `...` variadic parameter.
    VariadicParameter,
    /// A parameter carries an `=` default value.
    DefaultArgument,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::MissingParameterList => "missing parameter list",
            ParseErrorKind::UnterminatedParameterList => "unterminated parameter list",
            ParseErrorKind::TrailingCharacters => "trailing characters after parameter list",
            ParseErrorKind::NestedParameterList => "nested parameter list",
            ParseErrorKind::MissingName => "missing function name",
            ParseErrorKind::InvalidName => "invalid function name",
            ParseErrorKind::InvalidParameter => "invalid parameter",
            ParseErrorKind::VariadicParameter => "variadic parameter",
            ParseErrorKind::DefaultArgument => "default argument",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A prototype parse error with the offending declaration and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} in `{prototype}`: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The prototype string that failed to parse.
    pub prototype: String,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, prototype: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            prototype: prototype.into(),
            message: message.into(),
        }
    }

    /// Create a "missing parameter list" error.
    pub fn missing_parameter_list(prototype: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingParameterList,
            prototype,
            "expected '(' after the function name".to_string(),
        )
    }

    /// Create an "unterminated parameter list" error.
    pub fn unterminated_parameter_list(prototype: &str) -> Self {
        Self::new(
            ParseErrorKind::UnterminatedParameterList,
            prototype,
            "expected ')' closing the parameter list".to_string(),
        )
    }

    /// Create an "invalid parameter" error.
    pub fn invalid_parameter(prototype: &str, parameter: &str) -> Self {
        Self::new(
            ParseErrorKind::InvalidParameter,
            prototype,
            format!("expected a type and a name, found `{parameter}`"),
        )
    }
}

// ============================================================================
// Type Errors
// ============================================================================

/// Errors raised while resolving native type names against the vocabulary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// A native type name has no registered marshaler, even after the
    /// pointer fallback.
    #[error("unknown native type '{type_name}' for parameter '{param}'")]
    UnknownType {
        /// The native type spelling that failed to resolve.
        type_name: String,
        /// The parameter (or "return") the type was declared for.
        param: String,
    },

    /// A wrapped type override does not name a class this generation run
    /// produces a wrapper for.
    #[error("wrapped type '{type_name}' has no generated wrapper class")]
    UnresolvedWrapped {
        /// The offending type name from the spec.
        type_name: String,
    },

    /// A callback type override has no matching callback prototype, so no
    /// trampoline would exist for the generated cast to point at.
    #[error("callback type '{type_name}' has no declared callback prototype")]
    UnresolvedCallback {
        /// The offending type name from the spec.
        type_name: String,
    },
}

// ============================================================================
// Unsupported Declarations
// ============================================================================

/// Declarations the generator understands but refuses to emit glue for.
///
/// These are hard failures of the whole run. Silently skipping a method
/// would ship an addon with a hole in its API surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnsupportedError {
    /// After result packaging, more than one value would have to be
    /// returned to the host.
    #[error("method '{method}' would return multiple values")]
    MultipleResults {
        /// The native function name.
        method: String,
    },

    /// A callback signature declares a non-void return type.
    #[error("callback '{callback}' returns '{return_type}', only void callbacks can be dispatched")]
    CallbackReturn {
        /// The callback type name.
        callback: String,
        /// The declared return type.
        return_type: String,
    },

    /// A wrapped type appears as an explicit host-supplied argument.
    #[error("wrapped type '{type_name}' cannot be accepted from script for parameter '{param}'")]
    WrappedArgument {
        /// The wrapped native type.
        type_name: String,
        /// The parameter name.
        param: String,
    },

    /// A combo parameter's companions run past the end of the list.
    #[error("combo parameter '{param}' extends past the end of the parameter list")]
    ComboTail {
        /// The leading combo parameter name.
        param: String,
    },

    /// A byte buffer declared as an out parameter.
    #[error("byte buffer parameter '{param}' cannot be used as an out parameter")]
    OutByteBuffer {
        /// The parameter name.
        param: String,
    },

    /// A callback declared as an out parameter.
    #[error("callback parameter '{param}' cannot be used as an out parameter")]
    OutCallback {
        /// The parameter name.
        param: String,
    },

    /// A callback signature declares an out parameter or an error slot.
    /// The trampoline has no native caller to hand values back to.
    #[error("callback '{callback}' declares out parameter '{param}'")]
    CallbackOutParam {
        /// The callback type name.
        callback: String,
        /// The parameter name.
        param: String,
    },

    /// A callback signature has no trailing user_data parameter, leaving
    /// the trampoline without a slot to recover its wrapped state from.
    #[error("callback '{callback}' lacks a trailing user_data parameter")]
    MissingUserData {
        /// The callback type name.
        callback: String,
    },

    /// A class spec lists two or more constructor prototypes.
    #[error("class '{class}' declares more than one constructor")]
    DuplicateConstructor {
        /// The class name.
        class: String,
    },
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for a whole generation run.
///
/// This enum wraps all phase-specific error types, enabling unified
/// error handling across parsing, type resolution, and emission.
///
/// Each variant uses `#[from]` to enable automatic conversion with the
/// `?` operator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    /// A prototype parse error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A type resolution error.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// An unsupported declaration.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
}

impl GenerateError {
    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, GenerateError::Parse(_))
    }

    /// Check if this is a type resolution error.
    pub fn is_type(&self) -> bool {
        matches!(self, GenerateError::Type(_))
    }

    /// Check if this is an unsupported declaration.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, GenerateError::Unsupported(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
