//! Structured method bodies.
//!
//! A [`MethodPlan`] holds every part of one generated wrapper method in
//! a fixed field order, and [`MethodPlan::render`] is the only place
//! that turns a plan into C++ text. The emitter fills fields; it never
//! concatenates body text itself, so guard ordering (arity before type
//! checks, unwrap before conversions, the error check right after the
//! call) is enforced by construction.

use nodeglue_core::names;

/// A guard that throws a host `TypeError` and returns when `cond` holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowIf {
    pub cond: String,
    pub message: String,
}

impl ThrowIf {
    pub fn new(cond: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            cond: cond.into(),
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        format!(
            "    if ({cond}) {{\n        isolate->ThrowException(v8::Exception::TypeError(\n            v8::String::NewFromUtf8(isolate, \"{message}\")));\n        return;\n    }}",
            cond = self.cond,
            message = self.message
        )
    }
}

/// One step of the conversion section: either straight statement lines
/// or a guard interleaved between them.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Lines(Vec<String>),
    Guard(ThrowIf),
}

/// Receiver recovery: unwrap the holder, assert, take the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Unwrap {
    /// Wrapper struct name, e.g. `ShmchChannelNodejsWrapper`.
    pub wrapper: String,
    /// Receiver handle type, e.g. `ShmchChannel*`.
    pub handle_type: String,
    /// Class name for the empty-instance message.
    pub class_name: String,
}

/// How the method body ends after the call and any result conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Finish {
    /// Nothing to hand back.
    None,
    /// `args.GetReturnValue().Set(<js local>);`
    SetResult(String),
    /// Constructor epilogue: wrap the fresh instance into `args.This()`.
    WrapThis,
    /// Private constructor stub: reject script construction outright.
    ThrowPrivate(String),
}

/// One wrapper method body, in emission order.
#[derive(Debug, Clone)]
pub struct MethodPlan {
    /// Wrapper struct the method belongs to.
    pub wrapper: String,
    /// Native function name, used for the `Method_<fn>` label.
    pub fn_name: String,
    /// Constructor paths short-circuit when invoked through the factory.
    pub factory_bypass: bool,
    /// Constructor-only: reject plain calls without `new`.
    pub construct_guard: Option<ThrowIf>,
    pub arity_guard: Option<ThrowIf>,
    pub type_guard: Option<ThrowIf>,
    pub unwrap: Option<Unwrap>,
    /// Declare `GError* __g_error__` before the call.
    pub error_slot: bool,
    /// Host -> native conversions with their interleaved guards.
    pub conversions: Vec<Fragment>,
    /// Native storage declarations for out parameters.
    pub out_decls: Vec<String>,
    /// The native call statement.
    pub call: Option<String>,
    /// Check and rethrow `__g_error__` right after the call.
    pub check_error: bool,
    /// Native -> host conversion lines for the packaged result.
    pub results: Vec<String>,
    pub finish: Finish,
}

impl MethodPlan {
    pub fn new(wrapper: impl Into<String>, fn_name: impl Into<String>) -> Self {
        Self {
            wrapper: wrapper.into(),
            fn_name: fn_name.into(),
            factory_bypass: false,
            construct_guard: None,
            arity_guard: None,
            type_guard: None,
            unwrap: None,
            error_slot: false,
            conversions: Vec::new(),
            out_decls: Vec::new(),
            call: None,
            check_error: false,
            results: Vec::new(),
            finish: Finish::None,
        }
    }

    /// The `static void Method_<fn>(...)` declaration line for the class
    /// body, without indentation.
    pub fn declaration(&self) -> String {
        format!(
            "static void {}(const v8::FunctionCallbackInfo<v8::Value>& args);",
            names::method_label(&self.fn_name)
        )
    }

    /// Render the full method definition.
    pub fn render(&self) -> String {
        let mut chunks: Vec<String> = Vec::new();
        chunks.push("    v8::Isolate* isolate = args.GetIsolate();".to_string());

        if self.factory_bypass {
            chunks.push("    if (factory_call) {\n        return;\n    }".to_string());
        }
        if let Some(guard) = &self.construct_guard {
            chunks.push(guard.render());
        }
        if let Some(guard) = &self.arity_guard {
            chunks.push(guard.render());
        }
        if let Some(guard) = &self.type_guard {
            chunks.push(guard.render());
        }
        if let Some(unwrap) = &self.unwrap {
            chunks.push(format!(
                "    {wrapper}* wrapper = ObjectWrap::Unwrap<{wrapper}>(args.Holder());\n    g_assert(wrapper != NULL);\n    {handle} self = wrapper->instance;",
                wrapper = unwrap.wrapper,
                handle = unwrap.handle_type
            ));
            chunks.push(
                ThrowIf::new(
                    "self == NULL",
                    format!("{} wrapper has empty instance.", unwrap.class_name),
                )
                .render(),
            );
        }
        if self.error_slot {
            chunks.push("    GError* __g_error__ = NULL;".to_string());
        }
        for fragment in &self.conversions {
            match fragment {
                Fragment::Lines(lines) => chunks.push(indent_lines(lines)),
                Fragment::Guard(guard) => chunks.push(guard.render()),
            }
        }
        if !self.out_decls.is_empty() {
            chunks.push(indent_lines(&self.out_decls));
        }
        if let Some(call) = &self.call {
            chunks.push(format!("    {call}"));
        }
        if self.check_error {
            chunks.push(
                "    if (__g_error__ != NULL) {\n        isolate->ThrowException(v8::Exception::TypeError(\n            v8::String::NewFromUtf8(isolate, __g_error__->message)));\n        g_clear_error(&__g_error__);\n        return;\n    }"
                    .to_string(),
            );
        }
        if !self.results.is_empty() {
            chunks.push(indent_lines(&self.results));
        }
        match &self.finish {
            Finish::None => {}
            Finish::SetResult(js_local) => {
                chunks.push(format!("    args.GetReturnValue().Set({js_local});"));
            }
            Finish::WrapThis => {
                chunks.push(format!(
                    "    {wrapper}* wrapper = new {wrapper}();\n    wrapper->instance = self;\n    wrapper->Wrap(args.This());\n    args.GetReturnValue().Set(args.This());",
                    wrapper = self.wrapper
                ));
            }
            Finish::ThrowPrivate(message) => {
                chunks.push(format!(
                    "    isolate->ThrowException(v8::Exception::TypeError(\n        v8::String::NewFromUtf8(isolate, \"{message}\")));"
                ));
            }
        }

        format!(
            "void {wrapper}::{label}(const v8::FunctionCallbackInfo<v8::Value>& args) {{\n{body}\n}}",
            wrapper = self.wrapper,
            label = names::method_label(&self.fn_name),
            body = chunks.join("\n\n")
        )
    }
}

/// One callback trampoline body.
#[derive(Debug, Clone)]
pub struct CallbackPlan {
    /// Callback type name, used for the `Callback_<type>` label.
    pub callback_type: String,
    /// Expanded C parameter declarations, `(type, name)` pairs.
    pub c_params: Vec<(String, String)>,
    /// Name of the trailing user_data parameter, verbatim.
    pub user_data: String,
    /// Native -> host conversion lines, one group per host argument.
    pub conversions: Vec<Vec<String>>,
    /// Host locals passed to the retained function, in order.
    pub js_args: Vec<String>,
}

impl CallbackPlan {
    /// The file-scope forward declaration for the trampoline.
    pub fn declaration(&self) -> String {
        format!(
            "static void {}({});",
            names::trampoline_fn(&self.callback_type),
            self.param_list()
        )
    }

    fn param_list(&self) -> String {
        let params: Vec<String> = self
            .c_params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect();
        params.join(", ")
    }

    /// Render the full trampoline definition.
    pub fn render(&self) -> String {
        let mut chunks: Vec<String> = Vec::new();
        chunks.push(format!(
            "    WrappedCallbackFunc* cb = reinterpret_cast<WrappedCallbackFunc*>({user_data});\n    g_assert(cb != NULL);\n    v8::Isolate* isolate = cb->isolate;",
            user_data = self.user_data
        ));
        for group in &self.conversions {
            chunks.push(indent_lines(group));
        }
        let argv = if self.js_args.is_empty() {
            "v8::Local<v8::Value> argv[argc] = {};".to_string()
        } else {
            format!("v8::Local<v8::Value> argv[argc] = {{ {} }};", self.js_args.join(", "))
        };
        chunks.push(format!(
            "    const unsigned argc = {argc};\n    {argv}\n    v8::Local<v8::Function> func = v8::Local<v8::Function>::New(isolate, cb->func);\n    v8::TryCatch try_catch(isolate);\n    func->Call(v8::Null(isolate), argc, argv);\n    if (try_catch.HasCaught()) {{\n        node::FatalException(isolate, try_catch);\n    }}",
            argc = self.js_args.len(),
            argv = argv
        ));

        format!(
            "void {label}({params}) {{\n{body}\n}}",
            label = names::trampoline_fn(&self.callback_type),
            params = self.param_list(),
            body = chunks.join("\n\n")
        )
    }
}

fn indent_lines(lines: &[String]) -> String {
    let indented: Vec<String> = lines.iter().map(|line| format!("    {line}")).collect();
    indented.join("\n")
}
