//! Code emission for the nodeglue generator.
//!
//! Takes a [`BindSpec`](nodeglue_core::BindSpec) and produces the
//! complete C++ translation unit for a Node.js addon: wrapper classes
//! around reference-counted native instances, callback trampolines that
//! dispatch into retained host functions, and the module registration
//! epilogue.
//!
//! ## Modules
//!
//! - [`classify`] - Sorts parsed parameters into call slots
//! - [`model`] - Per-class derived names and parsed methods
//! - [`plan`] - Structured method and trampoline bodies
//! - [`emit`] - Builds plans and per-class boilerplate
//! - [`assemble`] - Fixed section layout of the output file
//! - [`generator`] - Whole-spec orchestration
//!
//! # Example
//!
//! ```
//! use nodeglue_codegen::generate;
//! use nodeglue_core::spec::{BindSpec, ClassSpec};
//!
//! let mut spec = BindSpec::new("demo");
//! let mut class = ClassSpec::new("DemoCounter");
//! class.methods.push("DemoCounter* demo_counter_new ()".to_string());
//! spec.classes.push(class);
//!
//! let code = generate(&spec).unwrap();
//! assert!(code.contains("NODE_MODULE(demo, InitAll)"));
//! ```

pub mod assemble;
pub mod classify;
pub mod emit;
pub mod generator;
pub mod model;
pub mod plan;

pub use generator::Generator;

use nodeglue_core::error::GenerateError;
use nodeglue_core::spec::BindSpec;

/// Generate the addon source for one spec.
pub fn generate(spec: &BindSpec) -> Result<String, GenerateError> {
    Generator::new(spec).generate()
}
