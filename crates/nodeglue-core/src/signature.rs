//! Parsed C function signatures.
//!
//! A [`Signature`] is the structured form of a prototype string such as
//! `int shmch_channel_open (ShmchChannel* self, GError** error)`. It keeps
//! the native type spellings exactly as written (after pointer
//! normalization) so later stages can match on them literally.

/// The native spelling of the error out-parameter slot.
///
/// A parameter of this exact type is never surfaced to the host. The
/// generated body declares a zero-initialized local, passes its address,
/// and converts a populated error into a host exception after the call.
pub const ERROR_SENTINEL: &str = "GError**";

/// Canonicalize a native type spelling: collapse whitespace runs and fold
/// spaced stars onto the type, so `const  gchar *` becomes `const gchar*`.
///
/// Every stage matches type spellings literally, so they all have to
/// agree on one spelling per type.
pub fn normalize_type(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" *", "*")
}

/// One parameter of a native function: a type spelling and a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// The normalized native type, e.g. `const gchar*` or `GError**`.
    pub ty: String,
    /// The parameter name as written in the prototype.
    pub name: String,
}

impl Param {
    /// Create a parameter from a type spelling and a name.
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Whether this parameter is the error sentinel slot.
    pub fn is_error_sentinel(&self) -> bool {
        self.ty == ERROR_SENTINEL
    }
}

/// A parsed function prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// The normalized return type, `void` for none.
    pub return_type: String,
    /// The bare function name.
    pub name: String,
    /// The declared parameters, in order.
    pub params: Vec<Param>,
}

impl Signature {
    /// Create a signature from its parts.
    pub fn new(return_type: impl Into<String>, name: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            return_type: return_type.into(),
            name: name.into(),
            params,
        }
    }

    /// Whether the function returns nothing.
    pub fn returns_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Number of declared parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Whether any parameter is the error sentinel slot.
    pub fn has_error_sentinel(&self) -> bool {
        self.params.iter().any(Param::is_error_sentinel)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} (", self.return_type, self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", p.ty, p.name)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Signature {
        Signature::new(
            "int",
            "shmch_channel_open",
            vec![
                Param::new("ShmchChannel*", "self"),
                Param::new("GError**", "error"),
            ],
        )
    }

    #[test]
    fn accessors() {
        let sig = sample();
        assert!(!sig.returns_void());
        assert_eq!(sig.param_count(), 2);
        assert!(sig.has_error_sentinel());
        assert!(!sig.params[0].is_error_sentinel());
        assert!(sig.params[1].is_error_sentinel());
    }

    #[test]
    fn display_round_trip() {
        let sig = sample();
        assert_eq!(
            sig.to_string(),
            "int shmch_channel_open (ShmchChannel* self, GError** error)"
        );
    }

    #[test]
    fn void_return() {
        let sig = Signature::new("void", "shmch_channel_close", vec![]);
        assert!(sig.returns_void());
        assert!(!sig.has_error_sentinel());
    }

    #[test]
    fn normalize_type_spellings() {
        assert_eq!(normalize_type("const  gchar *"), "const gchar*");
        assert_eq!(normalize_type("GError * *"), "GError**");
        assert_eq!(normalize_type("guint8*"), "guint8*");
        assert_eq!(normalize_type("int"), "int");
    }
}
