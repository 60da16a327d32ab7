//! Naming conventions shared by every generation stage.
//!
//! The C API side follows GObject-style naming: a CamelCase type name
//! `ShmchChannel` owns functions prefixed `shmch_channel_`. The host side
//! exposes lowerCamelCase methods. Everything here is pure string
//! derivation so each stage computes the same names independently.

/// Name of the emitted struct that carries a retained host function.
pub const WRAPPED_CALLBACK_STRUCT: &str = "WrappedCallbackFunc";

/// Name of the emitted destructor handed to the native side as the
/// `GDestroyNotify` for a retained host function.
pub const DESTROY_CALLBACK_FN: &str = "destroy_wrapped_callback_func";

/// Name of the local error slot passed through the error sentinel.
pub const ERROR_LOCAL: &str = "__g_error__";

/// Lower the CamelCase class name to its snake_case function prefix base.
///
/// `ShmchChannel` becomes `shmch_channel`.
pub fn snake_base(class_name: &str) -> String {
    let mut out = String::with_capacity(class_name.len() + 4);
    for ch in class_name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out.trim_start_matches('_').to_string()
}

/// Convert a snake_case name to lowerCamelCase.
///
/// `set_request_callback` becomes `setRequestCallback`.
pub fn lower_camel(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    for (i, seg) in snake.split('_').filter(|s| !s.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(seg);
        } else {
            let mut chars = seg.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// Strip the module prefix from a class name for export.
///
/// `ShmchChannel` with prefix `Shmch` exports as `Channel`. Names that do
/// not carry the prefix are exported unchanged.
pub fn unprefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return name;
    }
    name.strip_prefix(prefix).unwrap_or(name)
}

/// Drop the class function prefix from a native function name.
///
/// `shmch_channel_set_request_callback` with base `shmch_channel` yields
/// `set_request_callback`. Names outside the prefix come back whole.
pub fn strip_fn_prefix<'a>(fn_name: &'a str, base: &str) -> &'a str {
    let prefix_len = base.len() + 1;
    if fn_name.len() > prefix_len && fn_name.starts_with(base) && fn_name.as_bytes()[base.len()] == b'_' {
        &fn_name[prefix_len..]
    } else {
        fn_name
    }
}

/// The host-visible method name for a native function of a class.
pub fn export_method_name(base: &str, fn_name: &str) -> String {
    lower_camel(strip_fn_prefix(fn_name, base))
}

/// The emitted wrapper struct name for a class.
pub fn wrapper_struct(class_name: &str) -> String {
    format!("{class_name}NodejsWrapper")
}

/// The conventional constructor for a class base name.
pub fn constructor_fn(base: &str) -> String {
    format!("{base}_new")
}

/// The conventional reference-acquire function for a class base name.
pub fn ref_fn(base: &str) -> String {
    format!("{base}_ref")
}

/// The conventional reference-release function for a class base name.
pub fn unref_fn(base: &str) -> String {
    format!("{base}_unref")
}

/// The emitted trampoline function name for a callback type.
pub fn trampoline_fn(callback_type: &str) -> String {
    format!("Callback_{callback_type}")
}

/// The emitted method label for a bound native function.
pub fn method_label(fn_name: &str) -> String {
    format!("Method_{fn_name}")
}

/// The native-side local emitted for a parameter name.
pub fn c_local(name: &str) -> String {
    format!("_c_{name}_")
}

/// The host-side local emitted for a parameter name.
pub fn js_local(name: &str) -> String {
    format!("_js_{name}_")
}
