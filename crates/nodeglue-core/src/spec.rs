//! Binding spec input model.
//!
//! A [`BindSpec`] is the declarative description of one addon module:
//! which classes to wrap, their method prototypes, standalone callback
//! signatures, and extra entries for the type vocabulary. Specs are
//! written as JSON and deserialized with serde.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The marshaling strategy a native type name maps to.
///
/// This is a closed vocabulary. Every native type the generator accepts
/// resolves to exactly one of these, either directly or through the
/// pointer fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarshalKind {
    /// Host boolean <-> `gboolean`.
    Boolean,
    /// Host number <-> a C integer (or integer-like enum) type.
    Integer,
    /// Host string <-> `const gchar*` UTF-8 text.
    String,
    /// Host external <-> an opaque `void*`.
    Pointer,
    /// Host array buffer <-> `guint8*` plus a trailing length parameter.
    Bytes,
    /// Host function <-> a C function pointer plus target and destructor.
    Callback,
    /// A generated wrapper class instance. Outbound only.
    Wrapped,
}

impl MarshalKind {
    /// Returns the spec-file spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarshalKind::Boolean => "boolean",
            MarshalKind::Integer => "integer",
            MarshalKind::String => "string",
            MarshalKind::Pointer => "pointer",
            MarshalKind::Bytes => "bytes",
            MarshalKind::Callback => "callback",
            MarshalKind::Wrapped => "wrapped",
        }
    }
}

impl std::fmt::Display for MarshalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One class to wrap: its native name and its method prototypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// The native CamelCase type name, e.g. `ShmchChannel`.
    pub name: String,
    /// Header to `#include` for this class, if any.
    #[serde(default)]
    pub header: Option<String>,
    /// Method prototypes, verbatim C declarations without a trailing `;`.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ClassSpec {
    /// Create a class spec with no header and no methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            methods: Vec::new(),
        }
    }
}

/// A whole addon module description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindSpec {
    /// The addon target name, used as the registered module identifier.
    pub target: String,
    /// CamelCase prefix stripped from class names for export, e.g. `Shmch`.
    #[serde(default)]
    pub strip_prefix: String,
    /// Classes to wrap, in declaration order.
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    /// Standalone callback type prototypes, in declaration order.
    #[serde(default)]
    pub callbacks: Vec<String>,
    /// Extra vocabulary entries layered over the base vocabulary.
    ///
    /// A `BTreeMap` keeps iteration deterministic so repeated runs report
    /// errors and register entries in the same order.
    #[serde(default)]
    pub types: BTreeMap<String, MarshalKind>,
}

impl BindSpec {
    /// Create an empty spec for the given target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            strip_prefix: String::new(),
            classes: Vec::new(),
            callbacks: Vec::new(),
            types: BTreeMap::new(),
        }
    }
}
