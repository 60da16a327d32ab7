//! nodeglue: a Node.js addon glue generator for GObject-style C APIs.
//!
//! Reads a declarative binding spec (classes, method prototypes,
//! callback signatures, type vocabulary) and emits one complete C++
//! translation unit that marshals between V8 values and native calling
//! conventions: wrapper classes around reference-counted instances,
//! `GError**` re-throwing, array-buffer views over byte regions, and
//! trampolines that dispatch native callbacks into retained host
//! functions.
//!
//! Generation itself is synchronous and pure. The emitted trampolines,
//! however, run whenever native code invokes them; callers of the
//! generated addon must arrange for callback registration and delivery
//! to respect V8's thread affinity.
//!
//! # Example
//!
//! ```
//! use nodeglue::{generate, BindSpec, ClassSpec};
//!
//! let mut spec = BindSpec::new("demo");
//! let mut class = ClassSpec::new("DemoCounter");
//! class.methods.push("DemoCounter* demo_counter_new ()".to_string());
//! class.methods.push("void demo_counter_bump (DemoCounter* self)".to_string());
//! spec.classes.push(class);
//!
//! let code = generate(&spec).unwrap();
//! assert!(code.contains("class DemoCounterNodejsWrapper"));
//! ```
//!
//! The crates underneath split the pipeline the way the data flows:
//! prototypes are parsed ([`nodeglue_parser`]), parameters resolve
//! against the type vocabulary ([`nodeglue_registry`]), and classified
//! signatures are planned and assembled into the output file
//! ([`nodeglue_codegen`]).

pub use nodeglue_codegen::{generate, Generator};
pub use nodeglue_core::error::{
    GenerateError, ParseError, ParseErrorKind, TypeError, UnsupportedError,
};
pub use nodeglue_core::signature::{normalize_type, Param, Signature};
pub use nodeglue_core::spec::{BindSpec, ClassSpec, MarshalKind};
pub use nodeglue_parser::parse_prototype;
pub use nodeglue_registry::{Marshaler, TypeRegistry};
