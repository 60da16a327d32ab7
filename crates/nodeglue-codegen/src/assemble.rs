//! Output file assembly.
//!
//! Collects the emitted pieces and lays them out in the fixed section
//! order of the generated translation unit: includes, the shared
//! callback-retention support block, forward declarations, wrapper
//! class declarations, wrapper definitions, trampoline definitions,
//! and the module registration epilogue. Headers are included once
//! each, in the order the class specs first name them.

use nodeglue_core::names;
use rustc_hash::FxHashSet;

use crate::emit::{CallbackUnit, ClassUnit};

/// Accumulates emitted code and renders the final translation unit.
#[derive(Debug)]
pub struct Assembler {
    target: String,
    headers: Vec<String>,
    seen_headers: FxHashSet<String>,
    callback_decls: Vec<String>,
    callback_bodies: Vec<String>,
    class_decls: Vec<String>,
    class_bodies: Vec<String>,
    wrappers: Vec<String>,
}

impl Assembler {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            headers: Vec::new(),
            seen_headers: FxHashSet::default(),
            callback_decls: Vec::new(),
            callback_bodies: Vec::new(),
            class_decls: Vec::new(),
            class_bodies: Vec::new(),
            wrappers: Vec::new(),
        }
    }

    /// Record a native header to include. Repeats are dropped, keeping
    /// the first-seen position.
    pub fn add_header(&mut self, header: &str) {
        if self.seen_headers.insert(header.to_string()) {
            self.headers.push(header.to_string());
        }
    }

    pub fn add_callback(&mut self, unit: CallbackUnit) {
        self.callback_decls.push(unit.declaration);
        self.callback_bodies.push(unit.body);
    }

    pub fn add_class(&mut self, wrapper: &str, unit: ClassUnit) {
        self.wrappers.push(wrapper.to_string());
        self.class_decls.push(unit.declaration);
        self.class_bodies.extend(unit.bodies);
    }

    /// Render the whole translation unit.
    pub fn finish(self) -> String {
        let mut sections: Vec<String> = Vec::new();
        sections.push(self.prelude());
        sections.push(support_block());
        if !self.callback_decls.is_empty() {
            sections.push(self.callback_decls.join("\n"));
        }
        let epilogue = self.epilogue();
        sections.extend(self.class_decls);
        sections.extend(self.class_bodies);
        sections.extend(self.callback_bodies);
        sections.push(epilogue);

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    fn prelude(&self) -> String {
        let mut lines = vec![
            "#include <node.h>".to_string(),
            "#include <node_object_wrap.h>".to_string(),
            "#include <glib.h>".to_string(),
            "#include <string.h>".to_string(),
        ];
        for header in &self.headers {
            lines.push(format!("#include <{header}>"));
        }
        lines.join("\n")
    }

    fn epilogue(&self) -> String {
        let inits: Vec<String> = self
            .wrappers
            .iter()
            .map(|wrapper| format!("    {wrapper}::Init(exports);"))
            .collect();
        let body = if inits.is_empty() {
            String::new()
        } else {
            format!("{}\n", inits.join("\n"))
        };
        format!(
            "void InitAll(v8::Local<v8::Object> exports) {{\n{body}}}\n\nNODE_MODULE({target}, InitAll)",
            target = self.target
        )
    }
}

fn support_block() -> String {
    format!(
        "struct {retained} {{\n    v8::Isolate* isolate;\n    v8::Persistent<v8::Function> func;\n}};\n\nvoid {destroy}(void* data) {{\n    if (data != NULL) {{\n        {retained}* func = reinterpret_cast<{retained}*>(data);\n        func->func.Reset();\n        delete func;\n    }}\n}}",
        retained = names::WRAPPED_CALLBACK_STRUCT,
        destroy = names::DESTROY_CALLBACK_FN
    )
}
