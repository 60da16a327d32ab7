//! Per-class derived model.
//!
//! A [`ClassModel`] is everything the emitter needs to know about one
//! wrapped class, derived once from its spec entry: the GObject-style
//! function names, the export name, the wrapper struct name, and the
//! parsed method signatures.

use nodeglue_core::error::{GenerateError, UnsupportedError};
use nodeglue_core::names;
use nodeglue_core::signature::Signature;
use nodeglue_core::spec::ClassSpec;
use nodeglue_parser::parse_prototype;

/// One method of a class: the verbatim prototype and its parsed form.
///
/// The prototype string survives into the generated code as the text of
/// arity and type-check exception messages.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub prototype: String,
    pub signature: Signature,
}

/// A wrapped class with its derived naming and parsed methods.
#[derive(Debug, Clone)]
pub struct ClassModel {
    /// Native CamelCase type name, e.g. `ShmchChannel`.
    pub name: String,
    /// snake_case function prefix base, e.g. `shmch_channel`.
    pub base: String,
    /// The receiver handle type, e.g. `ShmchChannel*`.
    pub handle_type: String,
    /// Conventional constructor function name, e.g. `shmch_channel_new`.
    pub construct_fn: String,
    /// Conventional reference-acquire function, e.g. `shmch_channel_ref`.
    pub ref_fn: String,
    /// Conventional reference-release function, e.g. `shmch_channel_unref`.
    pub unref_fn: String,
    /// Host-visible class name after prefix stripping, e.g. `Channel`.
    pub export_name: String,
    /// Emitted wrapper struct name, e.g. `ShmchChannelNodejsWrapper`.
    pub wrapper: String,
    /// Parsed methods in declaration order.
    pub methods: Vec<MethodDecl>,
}

impl ClassModel {
    /// Derive the model for one class spec, parsing every prototype.
    pub fn from_spec(spec: &ClassSpec, strip_prefix: &str) -> Result<Self, GenerateError> {
        let base = names::snake_base(&spec.name);
        let construct_fn = names::constructor_fn(&base);

        let mut methods = Vec::with_capacity(spec.methods.len());
        for prototype in &spec.methods {
            let signature = parse_prototype(prototype)?;
            methods.push(MethodDecl {
                prototype: prototype.clone(),
                signature,
            });
        }

        let constructors = methods
            .iter()
            .filter(|m| m.signature.name == construct_fn)
            .count();
        if constructors > 1 {
            return Err(UnsupportedError::DuplicateConstructor {
                class: spec.name.clone(),
            }
            .into());
        }

        Ok(Self {
            handle_type: format!("{}*", spec.name),
            ref_fn: names::ref_fn(&base),
            unref_fn: names::unref_fn(&base),
            export_name: names::unprefix(&spec.name, strip_prefix).to_string(),
            wrapper: names::wrapper_struct(&spec.name),
            name: spec.name.clone(),
            base,
            construct_fn,
            methods,
        })
    }

    /// Whether the given native function is this class's constructor.
    pub fn is_constructor(&self, fn_name: &str) -> bool {
        fn_name == self.construct_fn
    }

    /// The declared constructor method, if the spec lists one.
    pub fn constructor(&self) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| self.is_constructor(&m.signature.name))
    }

    /// Whether the spec lists a constructor at all. Classes without one
    /// get a synthesized private stub and are factory-only.
    pub fn has_constructor(&self) -> bool {
        self.constructor().is_some()
    }

    /// The host-visible method name for one of this class's functions.
    pub fn export_method_name(&self, fn_name: &str) -> String {
        names::export_method_name(&self.base, fn_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeglue_core::error::GenerateError;

    fn channel_spec() -> ClassSpec {
        ClassSpec {
            name: "ShmchChannel".to_string(),
            header: Some("shmchannel.h".to_string()),
            methods: vec![
                "ShmchChannel* shmch_channel_new (const gchar* name, ShmchMode mode)".to_string(),
                "int shmch_channel_open (ShmchChannel* self, GError** error)".to_string(),
            ],
        }
    }

    #[test]
    fn derives_gobject_names() {
        let model = ClassModel::from_spec(&channel_spec(), "Shmch").unwrap();
        assert_eq!(model.base, "shmch_channel");
        assert_eq!(model.handle_type, "ShmchChannel*");
        assert_eq!(model.construct_fn, "shmch_channel_new");
        assert_eq!(model.ref_fn, "shmch_channel_ref");
        assert_eq!(model.unref_fn, "shmch_channel_unref");
        assert_eq!(model.export_name, "Channel");
        assert_eq!(model.wrapper, "ShmchChannelNodejsWrapper");
    }

    #[test]
    fn finds_the_constructor() {
        let model = ClassModel::from_spec(&channel_spec(), "Shmch").unwrap();
        assert!(model.has_constructor());
        assert!(model.is_constructor("shmch_channel_new"));
        assert!(!model.is_constructor("shmch_channel_open"));
        assert_eq!(
            model.constructor().unwrap().signature.return_type,
            "ShmchChannel*"
        );
    }

    #[test]
    fn factory_only_class_has_no_constructor() {
        let spec = ClassSpec {
            name: "ShmchIncomingRequest".to_string(),
            header: None,
            methods: vec![
                "guint8* shmch_incoming_request_get_data (ShmchIncomingRequest* self, int* result_length1)"
                    .to_string(),
            ],
        };
        let model = ClassModel::from_spec(&spec, "Shmch").unwrap();
        assert!(!model.has_constructor());
        assert_eq!(model.construct_fn, "shmch_incoming_request_new");
    }

    #[test]
    fn rejects_duplicate_constructors() {
        let mut spec = channel_spec();
        spec.methods
            .push("ShmchChannel* shmch_channel_new (const gchar* name)".to_string());
        let err = ClassModel::from_spec(&spec, "Shmch").unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Unsupported(UnsupportedError::DuplicateConstructor { .. })
        ));
    }

    #[test]
    fn bad_prototype_surfaces_parse_error() {
        let mut spec = channel_spec();
        spec.methods.push("not a prototype".to_string());
        let err = ClassModel::from_spec(&spec, "Shmch").unwrap_err();
        assert!(err.is_parse());
    }
}
