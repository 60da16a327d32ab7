//! Whole-spec orchestration.
//!
//! The [`Generator`] owns the generation pipeline: seed the vocabulary
//! from the spec, validate spec-level cross references, bind every
//! callback and class, and assemble the final translation unit.
//! Generation is pure and deterministic; the same spec always produces
//! byte-identical output.

use nodeglue_core::error::{GenerateError, TypeError};
use nodeglue_core::signature::{normalize_type, Signature};
use nodeglue_core::spec::{BindSpec, MarshalKind};
use nodeglue_parser::parse_prototype;
use nodeglue_registry::TypeRegistry;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::assemble::Assembler;
use crate::emit;
use crate::model::ClassModel;

/// Drives generation for one spec.
pub struct Generator<'a> {
    spec: &'a BindSpec,
    registry: TypeRegistry,
}

impl<'a> Generator<'a> {
    /// Build a generator with the base vocabulary plus the spec's
    /// type overrides.
    pub fn new(spec: &'a BindSpec) -> Self {
        let mut registry = TypeRegistry::with_base_vocabulary();
        for (name, kind) in &spec.types {
            registry.register(name, *kind);
        }
        Self { spec, registry }
    }

    /// Generate the complete C++ translation unit.
    pub fn generate(&self) -> Result<String, GenerateError> {
        let callbacks = self.parse_callbacks()?;
        self.validate_overrides(&callbacks)?;

        let mut assembler = Assembler::new(&self.spec.target);
        for signature in &callbacks {
            debug!(callback = %signature.name, "binding callback");
            assembler.add_callback(emit::callback_unit(signature, &self.registry)?);
        }
        for class_spec in &self.spec.classes {
            let model = ClassModel::from_spec(class_spec, &self.spec.strip_prefix)?;
            debug!(class = %model.name, methods = model.methods.len(), "binding class");
            if let Some(header) = &class_spec.header {
                assembler.add_header(header);
            }
            let unit = emit::class_unit(&model, &self.registry)?;
            assembler.add_class(&model.wrapper, unit);
        }

        let out = assembler.finish();
        debug!(bytes = out.len(), "assembled module");
        Ok(out)
    }

    fn parse_callbacks(&self) -> Result<Vec<Signature>, GenerateError> {
        let mut signatures = Vec::with_capacity(self.spec.callbacks.len());
        for prototype in &self.spec.callbacks {
            signatures.push(parse_prototype(prototype)?);
        }
        Ok(signatures)
    }

    /// Cross-check type overrides against what this run will emit:
    /// every wrapped pointer needs a wrapper class behind its factory
    /// call, and every callback type needs a trampoline to cast to.
    fn validate_overrides(&self, callbacks: &[Signature]) -> Result<(), TypeError> {
        let class_names: FxHashSet<&str> = self
            .spec
            .classes
            .iter()
            .map(|class| class.name.as_str())
            .collect();
        let callback_names: FxHashSet<&str> = callbacks
            .iter()
            .map(|signature| signature.name.as_str())
            .collect();

        for (name, kind) in &self.spec.types {
            let spelling = normalize_type(name);
            match kind {
                MarshalKind::Wrapped if spelling.ends_with('*') => {
                    let class = spelling.trim_end_matches('*');
                    if !class_names.contains(class) {
                        return Err(TypeError::UnresolvedWrapped {
                            type_name: spelling,
                        });
                    }
                }
                MarshalKind::Callback => {
                    if !callback_names.contains(spelling.as_str()) {
                        return Err(TypeError::UnresolvedCallback {
                            type_name: spelling,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeglue_core::spec::ClassSpec;
    use pretty_assertions::assert_eq;

    fn channel_spec() -> BindSpec {
        let mut spec = BindSpec::new("shmchannel");
        spec.strip_prefix = "Shmch".to_string();
        spec.callbacks = vec![
            "void ShmchDataCallback (guint8* data, int data_length1, void* user_data)".to_string(),
        ];
        spec.types
            .insert("ShmchMode".to_string(), MarshalKind::Integer);
        spec.types
            .insert("ShmchDataCallback".to_string(), MarshalKind::Callback);
        spec.classes = vec![ClassSpec {
            name: "ShmchChannel".to_string(),
            header: Some("shmchannel.h".to_string()),
            methods: vec![
                "ShmchChannel* shmch_channel_new (const gchar* name, ShmchMode mode, GError** error)"
                    .to_string(),
                "int shmch_channel_open (ShmchChannel* self, GError** error)".to_string(),
                "void shmch_channel_set_request_callback (ShmchChannel* self, ShmchDataCallback callback, void* callback_target, GDestroyNotify callback_target_destroy_notify)"
                    .to_string(),
            ],
        }];
        spec
    }

    #[test]
    fn generates_a_complete_module() {
        let spec = channel_spec();
        let out = Generator::new(&spec).generate().unwrap();
        assert!(out.starts_with("#include <node.h>"));
        assert!(out.contains("#include <shmchannel.h>"));
        assert!(out.contains("static void Callback_ShmchDataCallback("));
        assert!(out.contains("class ShmchChannelNodejsWrapper : public node::ObjectWrap {"));
        assert!(out.contains("void Callback_ShmchDataCallback("));
        assert!(out.contains("void ShmchChannelNodejsWrapper::Method_shmch_channel_open("));
        assert!(out.contains("NODE_MODULE(shmchannel, InitAll)"));
    }

    #[test]
    fn generation_is_deterministic() {
        let spec = channel_spec();
        let first = Generator::new(&spec).generate().unwrap();
        let second = Generator::new(&spec).generate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn wrapped_override_must_name_a_class() {
        let mut spec = channel_spec();
        spec.types
            .insert("ShmchShmem*".to_string(), MarshalKind::Wrapped);
        let err = Generator::new(&spec).generate().unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Type(TypeError::UnresolvedWrapped { .. })
        ));
    }

    #[test]
    fn callback_override_must_name_a_prototype() {
        let mut spec = channel_spec();
        spec.types
            .insert("ShmchLostCallback".to_string(), MarshalKind::Callback);
        let err = Generator::new(&spec).generate().unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Type(TypeError::UnresolvedCallback { .. })
        ));
    }

    #[test]
    fn bad_callback_prototype_fails_the_run() {
        let mut spec = channel_spec();
        spec.callbacks.push("void Broken".to_string());
        let err = Generator::new(&spec).generate().unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn unknown_method_type_fails_the_run() {
        let mut spec = channel_spec();
        spec.classes[0]
            .methods
            .push("void shmch_channel_walk (ShmchChannel* self, GList* entries)".to_string());
        let err = Generator::new(&spec).generate().unwrap_err();
        assert!(err.is_type());
    }
}
