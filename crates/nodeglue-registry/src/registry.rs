//! The type vocabulary: native type names resolved to marshalers.
//!
//! The registry is a flat map from normalized native type spellings to
//! [`MarshalKind`]s. Resolution is literal string matching plus exactly
//! one fallback: a type ending in `*` whose base spelling is registered
//! resolves to the base entry as an out parameter. `int*` is an out
//! `int`; `ShmchIncomingRequest**` is an out `ShmchIncomingRequest*`.
//!
//! Specs layer their own entries over the base vocabulary, and may
//! override it. Later registrations win.

use nodeglue_core::error::TypeError;
use nodeglue_core::signature::normalize_type;
use nodeglue_core::spec::MarshalKind;
use rustc_hash::FxHashMap;

use crate::marshal::Marshaler;

/// The entries every registry starts from.
const BASE_VOCABULARY: &[(&str, MarshalKind)] = &[
    ("gboolean", MarshalKind::Boolean),
    ("int", MarshalKind::Integer),
    ("const gchar*", MarshalKind::String),
    ("void*", MarshalKind::Pointer),
    ("guint8*", MarshalKind::Bytes),
    ("GDestroyNotify", MarshalKind::Wrapped),
];

/// Maps native type spellings to marshaling strategies.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    kinds: FxHashMap<String, MarshalKind>,
}

impl TypeRegistry {
    /// Create an empty registry with no vocabulary at all.
    pub fn new() -> Self {
        Self {
            kinds: FxHashMap::default(),
        }
    }

    /// Create a registry seeded with the base vocabulary.
    pub fn with_base_vocabulary() -> Self {
        let mut registry = Self::new();
        for (name, kind) in BASE_VOCABULARY {
            registry.register(name, *kind);
        }
        registry
    }

    /// Register a type name. The spelling is normalized first, and an
    /// existing entry for the same spelling is replaced.
    pub fn register(&mut self, native_type: &str, kind: MarshalKind) {
        self.kinds.insert(normalize_type(native_type), kind);
    }

    /// Whether a spelling resolves directly (without the fallback).
    pub fn contains(&self, native_type: &str) -> bool {
        self.kinds.contains_key(&normalize_type(native_type))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Resolve a native type for a named parameter into a marshaler.
    ///
    /// Tries the exact spelling first, then the pointer fallback. The
    /// fallback strips one `*` and marks the marshaler as an out
    /// parameter carrying the stripped type.
    pub fn lookup(&self, native_type: &str, param: &str) -> Result<Marshaler, TypeError> {
        let spelling = normalize_type(native_type);
        if let Some(kind) = self.kinds.get(&spelling) {
            return Ok(Marshaler::new(*kind, spelling, param, false));
        }
        if let Some(stripped) = spelling.strip_suffix('*') {
            if let Some(kind) = self.kinds.get(stripped) {
                return Ok(Marshaler::new(*kind, stripped, param, true));
            }
        }
        Err(TypeError::UnknownType {
            type_name: spelling,
            param: param.to_string(),
        })
    }
}
