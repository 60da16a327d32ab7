//! Marshalers: the closed set of host/native conversion strategies.
//!
//! Every native type the generator accepts resolves to exactly one
//! [`Marshaler`] variant. A marshaler knows, for one named parameter (or
//! the return value), how to:
//!
//! - type-check the incoming host value (`check`)
//! - convert host -> native before the call (`convert_in`)
//! - declare native storage for out parameters (`declare_out`)
//! - convert native -> host after the call (`convert_out`)
//! - spell its portion of the native argument list (`call_args`)
//!
//! Combo kinds span more than one C parameter. A byte buffer owns its
//! trailing length parameter; a callback owns its target and destructor
//! parameters. The companions are bound during classification and the
//! leading marshaler speaks for all of them. A capability a variant
//! cannot provide is an [`UnsupportedError`], never silently wrong code.
//!
//! All emitted lines are unindented; the planner indents them when it
//! renders a body.

use nodeglue_core::error::UnsupportedError;
use nodeglue_core::names::{self, DESTROY_CALLBACK_FN, WRAPPED_CALLBACK_STRUCT};
use nodeglue_core::spec::MarshalKind;

/// A post-conversion runtime check emitted into the generated body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// Condition that must hold, spelled as a C++ expression.
    pub cond: String,
    /// Exception message when it does not.
    pub message: String,
}

/// Scalar conversion flavors that share the simple two-line shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleKind {
    /// `gboolean` and friends.
    Boolean,
    /// C integers and integer-like enums.
    Integer,
    /// `const gchar*` UTF-8 text.
    Utf8,
}

/// A scalar value: boolean, integer, or UTF-8 string.
#[derive(Debug, Clone, PartialEq)]
pub struct Simple {
    pub kind: SimpleKind,
    pub c_type: String,
    pub name: String,
    pub out: bool,
}

/// An opaque `void*` passed through as a host external.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    pub c_type: String,
    pub name: String,
    pub out: bool,
}

/// A `guint8*` region plus its trailing length parameter.
///
/// Host side this is a single array buffer argument; the length is
/// derived from the buffer, never passed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteBuffer {
    pub c_type: String,
    pub name: String,
    pub out: bool,
    /// The consumed length companion, bound at classification.
    pub length: Option<Box<Marshaler>>,
}

/// A host function installed as a C callback.
///
/// Spans three C parameters: the function pointer, the `void*` target,
/// and the `GDestroyNotify` destructor. The generated glue retains the
/// host function on the heap and hands the native side a trampoline, the
/// retained state as target, and a destructor that releases the state.
#[derive(Debug, Clone, PartialEq)]
pub struct Callback {
    pub c_type: String,
    pub name: String,
    pub out: bool,
    /// The consumed `void*` target companion, bound at classification.
    pub target: Option<Box<Marshaler>>,
    /// The consumed destructor companion, bound at classification.
    pub destroy: Option<Box<Marshaler>>,
}

/// An instance of a generated wrapper class. Outbound only: the value
/// crosses to the host through the class factory, and there is no
/// inbound conversion at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapped {
    pub c_type: String,
    pub name: String,
    pub out: bool,
}

/// One parameter's (or return value's) conversion strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Marshaler {
    Simple(Simple),
    Pointer(Pointer),
    ByteBuffer(ByteBuffer),
    Callback(Callback),
    Wrapped(Wrapped),
}

impl Marshaler {
    /// Build the marshaler for a resolved vocabulary entry.
    pub fn new(kind: MarshalKind, c_type: impl Into<String>, name: impl Into<String>, out: bool) -> Self {
        let c_type = c_type.into();
        let name = name.into();
        match kind {
            MarshalKind::Boolean => Marshaler::Simple(Simple {
                kind: SimpleKind::Boolean,
                c_type,
                name,
                out,
            }),
            MarshalKind::Integer => Marshaler::Simple(Simple {
                kind: SimpleKind::Integer,
                c_type,
                name,
                out,
            }),
            MarshalKind::String => Marshaler::Simple(Simple {
                kind: SimpleKind::Utf8,
                c_type,
                name,
                out,
            }),
            MarshalKind::Pointer => Marshaler::Pointer(Pointer { c_type, name, out }),
            MarshalKind::Bytes => Marshaler::ByteBuffer(ByteBuffer {
                c_type,
                name,
                out,
                length: None,
            }),
            MarshalKind::Callback => Marshaler::Callback(Callback {
                c_type,
                name,
                out,
                target: None,
                destroy: None,
            }),
            MarshalKind::Wrapped => Marshaler::Wrapped(Wrapped { c_type, name, out }),
        }
    }

    /// The vocabulary kind this marshaler was built from.
    pub fn kind(&self) -> MarshalKind {
        match self {
            Marshaler::Simple(s) => match s.kind {
                SimpleKind::Boolean => MarshalKind::Boolean,
                SimpleKind::Integer => MarshalKind::Integer,
                SimpleKind::Utf8 => MarshalKind::String,
            },
            Marshaler::Pointer(_) => MarshalKind::Pointer,
            Marshaler::ByteBuffer(_) => MarshalKind::Bytes,
            Marshaler::Callback(_) => MarshalKind::Callback,
            Marshaler::Wrapped(_) => MarshalKind::Wrapped,
        }
    }

    /// The parameter name this marshaler speaks for.
    pub fn name(&self) -> &str {
        match self {
            Marshaler::Simple(s) => &s.name,
            Marshaler::Pointer(p) => &p.name,
            Marshaler::ByteBuffer(b) => &b.name,
            Marshaler::Callback(c) => &c.name,
            Marshaler::Wrapped(w) => &w.name,
        }
    }

    /// The native type the conversion targets.
    pub fn c_type(&self) -> &str {
        match self {
            Marshaler::Simple(s) => &s.c_type,
            Marshaler::Pointer(p) => &p.c_type,
            Marshaler::ByteBuffer(b) => &b.c_type,
            Marshaler::Callback(c) => &c.c_type,
            Marshaler::Wrapped(w) => &w.c_type,
        }
    }

    /// Whether this value travels native -> host through an out parameter.
    pub fn is_out(&self) -> bool {
        match self {
            Marshaler::Simple(s) => s.out,
            Marshaler::Pointer(p) => p.out,
            Marshaler::ByteBuffer(b) => b.out,
            Marshaler::Callback(c) => c.out,
            Marshaler::Wrapped(w) => w.out,
        }
    }

    /// The native-side local for this value.
    pub fn c_name(&self) -> String {
        names::c_local(self.name())
    }

    /// The host-side local for this value.
    pub fn js_name(&self) -> String {
        names::js_local(self.name())
    }

    /// How many following C parameters this kind consumes as companions.
    pub fn companion_count(&self) -> usize {
        match self {
            Marshaler::ByteBuffer(_) => 1,
            Marshaler::Callback(_) => 2,
            _ => 0,
        }
    }

    /// The host-side type predicate for one incoming argument.
    pub fn check(&self, source: &str) -> Result<String, UnsupportedError> {
        match self {
            Marshaler::Simple(s) => Ok(format!("{source}->{}()", s.kind.js_predicate())),
            Marshaler::Pointer(_) => Ok(format!("{source}->IsExternal()")),
            Marshaler::ByteBuffer(_) => Ok(format!("{source}->IsArrayBuffer()")),
            Marshaler::Callback(_) => Ok(format!("{source}->IsFunction()")),
            Marshaler::Wrapped(w) => Err(UnsupportedError::WrappedArgument {
                type_name: w.c_type.clone(),
                param: w.name.clone(),
            }),
        }
    }

    /// Host -> native conversion lines for one incoming argument.
    pub fn convert_in(&self, source: &str) -> Result<Vec<String>, UnsupportedError> {
        match self {
            Marshaler::Simple(s) => Ok(s.convert_in(source)),
            Marshaler::Pointer(p) => Ok(vec![
                format!("v8::Local<v8::External> {js} = v8::External::Cast({source});", js = self.js_name()),
                format!(
                    "{ty} {c} = ({ty}) {js}->ExternalValue();",
                    ty = p.c_type,
                    c = self.c_name(),
                    js = self.js_name()
                ),
            ]),
            Marshaler::ByteBuffer(b) => b.convert_in(source),
            Marshaler::Callback(c) => c.convert_in(source),
            Marshaler::Wrapped(w) => Err(UnsupportedError::WrappedArgument {
                type_name: w.c_type.clone(),
                param: w.name.clone(),
            }),
        }
    }

    /// Runtime checks to emit right after `convert_in`.
    pub fn assertions(&self) -> Vec<Assertion> {
        match self {
            Marshaler::ByteBuffer(b) => vec![Assertion {
                cond: format!("{}_len_ <= G_MAXINT", names::c_local(&b.name)),
                message: "Buffer too large.".to_string(),
            }],
            _ => Vec::new(),
        }
    }

    /// Declarations of native storage for an out parameter.
    pub fn declare_out(&self) -> Result<Vec<String>, UnsupportedError> {
        match self {
            Marshaler::Simple(_) | Marshaler::Pointer(_) | Marshaler::Wrapped(_) => {
                Ok(vec![format!("{} {};", self.c_type(), self.c_name())])
            }
            Marshaler::ByteBuffer(b) => Err(UnsupportedError::OutByteBuffer {
                param: b.name.clone(),
            }),
            Marshaler::Callback(c) => Err(UnsupportedError::OutCallback {
                param: c.name.clone(),
            }),
        }
    }

    /// Native -> host conversion lines after the call.
    pub fn convert_out(&self) -> Result<Vec<String>, UnsupportedError> {
        match self {
            Marshaler::Simple(s) => Ok(vec![format!(
                "{} {} = {};",
                s.kind.js_type(),
                self.js_name(),
                s.kind.c_to_js(&self.c_name())
            )]),
            Marshaler::Pointer(_) => Ok(vec![format!(
                "v8::Local<v8::External> {} = v8::External::New(isolate, {});",
                self.js_name(),
                self.c_name()
            )]),
            Marshaler::ByteBuffer(b) => b.convert_out(),
            Marshaler::Callback(c) => Err(UnsupportedError::OutCallback {
                param: c.name.clone(),
            }),
            Marshaler::Wrapped(w) => {
                if !w.c_type.ends_with('*') {
                    return Err(UnsupportedError::WrappedArgument {
                        type_name: w.c_type.clone(),
                        param: w.name.clone(),
                    });
                }
                Ok(vec![format!(
                    "v8::Local<v8::Object> {} = {}NodejsWrapper::Factory(isolate, {});",
                    self.js_name(),
                    w.c_type.trim_end_matches('*'),
                    self.c_name()
                )])
            }
        }
    }

    /// This marshaler's portion of the native call argument list.
    pub fn call_args(&self) -> Vec<String> {
        match self {
            Marshaler::ByteBuffer(b) => {
                let mut args = vec![self.c_name()];
                if let Some(length) = &b.length {
                    args.extend(length.call_args());
                }
                args
            }
            Marshaler::Callback(c) => {
                let mut args = vec![self.c_name()];
                if let Some(target) = &c.target {
                    args.extend(target.call_args());
                }
                if let Some(destroy) = &c.destroy {
                    args.extend(destroy.call_args());
                }
                args
            }
            _ if self.is_out() => vec![format!("&{}", self.c_name())],
            _ => vec![self.c_name()],
        }
    }

    /// This marshaler's portion of a trampoline's C parameter list.
    pub fn c_param_decls(&self) -> Vec<(String, String)> {
        match self {
            Marshaler::ByteBuffer(b) => {
                let mut decls = vec![(b.c_type.clone(), self.c_name())];
                if let Some(length) = &b.length {
                    decls.extend(length.c_param_decls());
                }
                decls
            }
            _ => vec![(self.c_type().to_string(), self.c_name())],
        }
    }
}

impl SimpleKind {
    fn js_predicate(&self) -> &'static str {
        match self {
            SimpleKind::Boolean => "IsBoolean",
            SimpleKind::Integer => "IsNumber",
            SimpleKind::Utf8 => "IsString",
        }
    }

    fn js_type(&self) -> &'static str {
        match self {
            SimpleKind::Boolean => "v8::Local<v8::Boolean>",
            SimpleKind::Integer => "v8::Local<v8::Integer>",
            SimpleKind::Utf8 => "v8::Local<v8::String>",
        }
    }

    fn c_to_js(&self, c_name: &str) -> String {
        match self {
            SimpleKind::Boolean => format!("v8::Boolean::New(isolate, (bool) {c_name})"),
            SimpleKind::Integer => format!("v8::Integer::New(isolate, {c_name})"),
            SimpleKind::Utf8 => format!("v8::String::NewFromUtf8(isolate, {c_name})"),
        }
    }
}

impl Simple {
    fn convert_in(&self, source: &str) -> Vec<String> {
        let js = names::js_local(&self.name);
        let c = names::c_local(&self.name);
        match self.kind {
            SimpleKind::Boolean => vec![
                format!("v8::Local<v8::Boolean> {js} = {source}->ToBoolean();"),
                format!("{ty} {c} = ({ty}) {js}->BooleanValue();", ty = self.c_type),
            ],
            SimpleKind::Integer => vec![
                format!("v8::Local<v8::Integer> {js} = {source}->ToInteger();"),
                format!("{ty} {c} = ({ty}) {js}->IntegerValue();", ty = self.c_type),
            ],
            SimpleKind::Utf8 => vec![
                format!("v8::Local<v8::String> {js} = {source}->ToString();"),
                format!("v8::String::Utf8Value {js}_utf8({js});"),
                format!("{ty} {c} = ({ty}) *{js}_utf8;", ty = self.c_type),
            ],
        }
    }
}

impl ByteBuffer {
    fn convert_in(&self, source: &str) -> Result<Vec<String>, UnsupportedError> {
        let length = self.length.as_ref().ok_or_else(|| UnsupportedError::ComboTail {
            param: self.name.clone(),
        })?;
        let js = names::js_local(&self.name);
        let c = names::c_local(&self.name);
        Ok(vec![
            format!("v8::ArrayBuffer* {js}_buf_ = v8::ArrayBuffer::Cast(*{source});"),
            format!("v8::ArrayBuffer::Contents {js} = {js}_buf_->GetContents();"),
            format!("{ty} {c} = ({ty}) {js}.Data();", ty = self.c_type),
            format!("size_t {c}_len_ = {js}.ByteLength();"),
            format!(
                "{lty} {lc} = ({lty}) {c}_len_;",
                lty = length.c_type(),
                lc = length.c_name()
            ),
        ])
    }

    fn convert_out(&self) -> Result<Vec<String>, UnsupportedError> {
        let length = self.length.as_ref().ok_or_else(|| UnsupportedError::ComboTail {
            param: self.name.clone(),
        })?;
        let js = names::js_local(&self.name);
        let c = names::c_local(&self.name);
        let len = length.c_name();
        // The host gets its own copy of the region.
        Ok(vec![
            format!("v8::Local<v8::ArrayBuffer> {js} = v8::ArrayBuffer::New(isolate, (size_t) {len});"),
            format!("void* {js}_buf = {js}->GetContents().Data();"),
            format!("memcpy({js}_buf, {c}, (size_t) {len});"),
        ])
    }
}

impl Callback {
    fn convert_in(&self, source: &str) -> Result<Vec<String>, UnsupportedError> {
        let (target, destroy) = match (&self.target, &self.destroy) {
            (Some(t), Some(d)) => (t, d),
            _ => {
                return Err(UnsupportedError::ComboTail {
                    param: self.name.clone(),
                });
            }
        };
        let state = target.js_name();
        let c = names::c_local(&self.name);
        Ok(vec![
            format!("{WRAPPED_CALLBACK_STRUCT}* {state} = new {WRAPPED_CALLBACK_STRUCT};"),
            format!("{state}->isolate = isolate;"),
            format!("v8::Local<v8::Function> {state}_func = v8::Local<v8::Function>::Cast({source});"),
            format!("{state}->func.Reset(isolate, {state}_func);"),
            format!(
                "{ty} {c} = reinterpret_cast<{ty}>({tramp});",
                ty = self.c_type,
                tramp = names::trampoline_fn(&self.c_type)
            ),
            format!(
                "{tty} {tc} = reinterpret_cast<{tty}>({state});",
                tty = target.c_type(),
                tc = target.c_name()
            ),
            format!(
                "GDestroyNotify {dc} = reinterpret_cast<GDestroyNotify>({DESTROY_CALLBACK_FN});",
                dc = destroy.c_name()
            ),
        ])
    }
}
