//! Parameter classification.
//!
//! Walks a parsed parameter list left to right and sorts every C
//! parameter into one of four roles: the receiver handle, the trailing
//! `GError**` slot, an explicit host-supplied argument, or a native out
//! parameter. Combo heads (byte buffers, callbacks) consume the
//! companion parameters that follow them, so several C parameters can
//! collapse into a single host-visible argument.

use nodeglue_core::error::{GenerateError, UnsupportedError};
use nodeglue_core::signature::Param;
use nodeglue_registry::{Marshaler, TypeRegistry};

/// The role one C parameter slot plays in the native call.
///
/// Indices point into [`ClassifiedArgs::explicit`] or
/// [`ClassifiedArgs::out`]; the slot order is the original C parameter
/// order, which is what the call argument list is rebuilt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The instance handle, filled with the unwrapped `self`.
    Receiver,
    /// The `GError**` slot, filled with `&__g_error__`.
    ErrorSentinel,
    /// A host-supplied argument (combo companions included).
    Explicit(usize),
    /// A native out parameter, passed by address.
    Out(usize),
}

/// A parameter list sorted into call slots.
#[derive(Debug, Clone)]
pub struct ClassifiedArgs {
    /// One entry per consumed parameter group, in C declaration order.
    pub slots: Vec<Slot>,
    /// Explicit host arguments, one per host-visible argument.
    pub explicit: Vec<Marshaler>,
    /// Native out parameters.
    pub out: Vec<Marshaler>,
}

impl ClassifiedArgs {
    /// Number of arguments the host must pass.
    pub fn arity(&self) -> usize {
        self.explicit.len()
    }

    pub fn has_receiver(&self) -> bool {
        self.slots.contains(&Slot::Receiver)
    }

    pub fn has_error_slot(&self) -> bool {
        self.slots.contains(&Slot::ErrorSentinel)
    }
}

/// Classify a parameter list against the vocabulary.
///
/// `receiver_type` is the handle type of the class being bound, when
/// there is one; any parameter with that exact type becomes the
/// receiver slot. Callback parameter lists are classified with no
/// receiver type.
pub fn classify(
    params: &[Param],
    receiver_type: Option<&str>,
    registry: &TypeRegistry,
) -> Result<ClassifiedArgs, GenerateError> {
    let mut slots = Vec::with_capacity(params.len());
    let mut explicit: Vec<Marshaler> = Vec::new();
    let mut out: Vec<Marshaler> = Vec::new();

    let mut i = 0;
    while i < params.len() {
        let param = &params[i];

        if Some(param.ty.as_str()) == receiver_type {
            slots.push(Slot::Receiver);
            i += 1;
            continue;
        }
        if param.is_error_sentinel() {
            slots.push(Slot::ErrorSentinel);
            i += 1;
            continue;
        }

        let mut marshaler = registry.lookup(&param.ty, &param.name)?;
        let companions = marshaler.companion_count();
        if companions > 0 {
            if i + companions >= params.len() {
                return Err(UnsupportedError::ComboTail {
                    param: param.name.clone(),
                }
                .into());
            }
            let mut tail = Vec::with_capacity(companions);
            for companion in &params[i + 1..=i + companions] {
                tail.push(registry.lookup(&companion.ty, &companion.name)?);
            }
            bind_companions(&mut marshaler, tail);
        }

        if marshaler.is_out() {
            if matches!(marshaler, Marshaler::Callback(_)) {
                return Err(UnsupportedError::OutCallback {
                    param: param.name.clone(),
                }
                .into());
            }
            out.push(marshaler);
            slots.push(Slot::Out(out.len() - 1));
        } else {
            explicit.push(marshaler);
            slots.push(Slot::Explicit(explicit.len() - 1));
        }
        i += 1 + companions;
    }

    Ok(ClassifiedArgs {
        slots,
        explicit,
        out,
    })
}

fn bind_companions(marshaler: &mut Marshaler, mut tail: Vec<Marshaler>) {
    match marshaler {
        Marshaler::ByteBuffer(buffer) => {
            buffer.length = Some(Box::new(tail.remove(0)));
        }
        Marshaler::Callback(callback) => {
            callback.target = Some(Box::new(tail.remove(0)));
            callback.destroy = Some(Box::new(tail.remove(0)));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeglue_core::error::GenerateError;
    use nodeglue_parser::parse_prototype;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_base_vocabulary();
        registry.register("ShmchMode", nodeglue_core::spec::MarshalKind::Integer);
        registry.register(
            "ShmchDataCallback",
            nodeglue_core::spec::MarshalKind::Callback,
        );
        registry
    }

    fn params_of(prototype: &str) -> Vec<Param> {
        parse_prototype(prototype).unwrap().params
    }

    #[test]
    fn receiver_and_sentinel_take_no_host_arguments() {
        let params = params_of("int shmch_channel_open (ShmchChannel* self, GError** error)");
        let classified = classify(&params, Some("ShmchChannel*"), &registry()).unwrap();
        assert_eq!(classified.slots, vec![Slot::Receiver, Slot::ErrorSentinel]);
        assert_eq!(classified.arity(), 0);
        assert!(classified.has_receiver());
        assert!(classified.has_error_slot());
    }

    #[test]
    fn buffer_combo_collapses_to_one_argument() {
        let params = params_of(
            "void shmch_channel_notify (ShmchChannel* self, guint8* data, int data_length1, GError** error)",
        );
        let classified = classify(&params, Some("ShmchChannel*"), &registry()).unwrap();
        assert_eq!(
            classified.slots,
            vec![Slot::Receiver, Slot::Explicit(0), Slot::ErrorSentinel]
        );
        assert_eq!(classified.arity(), 1);
        let Marshaler::ByteBuffer(buffer) = &classified.explicit[0] else {
            panic!("expected a byte buffer");
        };
        assert_eq!(buffer.length.as_deref().unwrap().name(), "data_length1");
    }

    #[test]
    fn callback_combo_consumes_target_and_destructor() {
        let params = params_of(
            "void shmch_channel_set_request_callback (ShmchChannel* self, ShmchDataCallback callback, void* callback_target, GDestroyNotify callback_target_destroy_notify)",
        );
        let classified = classify(&params, Some("ShmchChannel*"), &registry()).unwrap();
        assert_eq!(classified.slots, vec![Slot::Receiver, Slot::Explicit(0)]);
        let Marshaler::Callback(callback) = &classified.explicit[0] else {
            panic!("expected a callback");
        };
        assert_eq!(callback.target.as_deref().unwrap().c_type(), "void*");
        assert_eq!(
            callback.destroy.as_deref().unwrap().name(),
            "callback_target_destroy_notify"
        );
    }

    #[test]
    fn eight_parameters_collapse_to_three_host_arguments() {
        let params = params_of(
            "void shmch_channel_post (ShmchChannel* self, const gchar* topic, guint8* data, int data_length1, ShmchDataCallback callback, void* callback_target, GDestroyNotify callback_target_destroy_notify, GError** error)",
        );
        let classified = classify(&params, Some("ShmchChannel*"), &registry()).unwrap();
        assert_eq!(
            classified.slots,
            vec![
                Slot::Receiver,
                Slot::Explicit(0),
                Slot::Explicit(1),
                Slot::Explicit(2),
                Slot::ErrorSentinel,
            ]
        );
        assert_eq!(classified.arity(), 3);
        assert!(classified.out.is_empty());
        assert_eq!(classified.explicit[0].name(), "topic");
        assert_eq!(classified.explicit[1].name(), "data");
        assert_eq!(classified.explicit[2].name(), "callback");
    }

    #[test]
    fn unknown_pointer_falls_back_to_out_parameter() {
        let mut registry = registry();
        registry.register("ShmchStat", nodeglue_core::spec::MarshalKind::Integer);
        let params = params_of("void shmch_channel_stat (ShmchChannel* self, ShmchStat* result)");
        let classified = classify(&params, Some("ShmchChannel*"), &registry).unwrap();
        assert_eq!(classified.slots, vec![Slot::Receiver, Slot::Out(0)]);
        assert_eq!(classified.out[0].c_type(), "ShmchStat");
        assert!(classified.out[0].is_out());
    }

    #[test]
    fn combo_head_at_end_of_list_is_rejected() {
        let params = params_of("void shmch_channel_notify (ShmchChannel* self, guint8* data)");
        let err = classify(&params, Some("ShmchChannel*"), &registry()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Unsupported(UnsupportedError::ComboTail { .. })
        ));
    }

    #[test]
    fn receiver_is_positional_not_name_based() {
        let params =
            params_of("void shmch_channel_mix (int first, ShmchChannel* chan, int last)");
        let classified = classify(&params, Some("ShmchChannel*"), &registry()).unwrap();
        assert_eq!(
            classified.slots,
            vec![Slot::Explicit(0), Slot::Receiver, Slot::Explicit(1)]
        );
    }

    #[test]
    fn without_receiver_type_handle_is_an_unknown_type() {
        let params = params_of("void shmch_cb (ShmchChannel* chan, void* user_data)");
        let err = classify(&params, None, &registry()).unwrap_err();
        assert!(err.is_type());
    }
}
