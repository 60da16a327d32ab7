//! Plan construction for classes and callbacks.
//!
//! This module turns classified signatures into [`MethodPlan`]s and
//! [`CallbackPlan`]s, and renders the per-class boilerplate around them:
//! the wrapper class declaration, the `Init` registration block, the
//! shared object factory, and the reference-dropping destructor.
//!
//! ## Method body layout
//!
//! Every instance method body runs through the same stations: arity
//! guard, type guard, receiver unwrap, error slot, inbound conversions,
//! out-parameter storage, the native call, the error re-throw, result
//! packaging. Constructors swap the unwrap for a construct-call guard
//! and finish by wrapping `args.This()`.

use nodeglue_core::error::{GenerateError, UnsupportedError};
use nodeglue_core::names;
use nodeglue_core::signature::Signature;
use nodeglue_registry::{Marshaler, TypeRegistry};

use crate::classify::{classify, ClassifiedArgs, Slot};
use crate::model::{ClassModel, MethodDecl};
use crate::plan::{CallbackPlan, Finish, Fragment, MethodPlan, ThrowIf, Unwrap};

/// A bound callback: its file-scope forward declaration and the
/// trampoline definition.
#[derive(Debug, Clone)]
pub struct CallbackUnit {
    pub declaration: String,
    pub body: String,
}

/// A bound class: the wrapper declaration block and its definition
/// blocks in file order.
#[derive(Debug, Clone)]
pub struct ClassUnit {
    pub declaration: String,
    pub bodies: Vec<String>,
}

/// Bind one callback prototype into its trampoline.
pub fn callback_unit(
    signature: &Signature,
    registry: &TypeRegistry,
) -> Result<CallbackUnit, GenerateError> {
    if !signature.returns_void() {
        return Err(UnsupportedError::CallbackReturn {
            callback: signature.name.clone(),
            return_type: signature.return_type.clone(),
        }
        .into());
    }
    let Some((user_data, leading)) = signature.params.split_last() else {
        return Err(UnsupportedError::MissingUserData {
            callback: signature.name.clone(),
        }
        .into());
    };
    for param in leading {
        if param.is_error_sentinel() {
            return Err(UnsupportedError::CallbackOutParam {
                callback: signature.name.clone(),
                param: param.name.clone(),
            }
            .into());
        }
    }

    let classified = classify(leading, None, registry)?;
    if let Some(first_out) = classified.out.first() {
        return Err(UnsupportedError::CallbackOutParam {
            callback: signature.name.clone(),
            param: first_out.name().to_string(),
        }
        .into());
    }

    let mut c_params: Vec<(String, String)> = Vec::new();
    let mut conversions: Vec<Vec<String>> = Vec::new();
    let mut js_args: Vec<String> = Vec::new();
    for marshaler in &classified.explicit {
        c_params.extend(marshaler.c_param_decls());
        conversions.push(marshaler.convert_out()?);
        js_args.push(marshaler.js_name());
    }
    c_params.push((user_data.ty.clone(), user_data.name.clone()));

    let plan = CallbackPlan {
        callback_type: signature.name.clone(),
        c_params,
        user_data: user_data.name.clone(),
        conversions,
        js_args,
    };
    Ok(CallbackUnit {
        declaration: plan.declaration(),
        body: plan.render(),
    })
}

/// Bind one class into its declaration and definition blocks.
pub fn class_unit(model: &ClassModel, registry: &TypeRegistry) -> Result<ClassUnit, GenerateError> {
    let mut method_decls: Vec<String> = Vec::new();
    let mut method_bodies: Vec<String> = Vec::new();
    for method in &model.methods {
        let plan = if model.is_constructor(&method.signature.name) {
            constructor_plan(model, method, registry)?
        } else {
            instance_method_plan(model, method, registry)?
        };
        method_decls.push(plan.declaration());
        method_bodies.push(plan.render());
    }
    if !model.has_constructor() {
        let plan = private_constructor_plan(model);
        method_decls.push(plan.declaration());
        method_bodies.push(plan.render());
    }

    let mut bodies = Vec::with_capacity(method_bodies.len() + 4);
    bodies.push(factory_block(model));
    bodies.push(init_block(model));
    bodies.push(format!(
        "{wrapper}::{wrapper}({name}* self) : instance(self) {{}}",
        wrapper = model.wrapper,
        name = model.name
    ));
    bodies.push(format!(
        "{wrapper}::~{wrapper}() {{\n    {unref}(instance);\n    instance = NULL;\n}}",
        wrapper = model.wrapper,
        unref = model.unref_fn
    ));
    bodies.extend(method_bodies);

    Ok(ClassUnit {
        declaration: declaration_block(model, &method_decls),
        bodies,
    })
}

fn declaration_block(model: &ClassModel, method_decls: &[String]) -> String {
    let methods: Vec<String> = method_decls
        .iter()
        .map(|decl| format!("        {decl}"))
        .collect();
    format!(
        "class {wrapper} : public node::ObjectWrap {{\n    public:\n        static void Init(v8::Local<v8::Object> exports);\n        static v8::Local<v8::Object> Factory(v8::Isolate* isolate, {name}* self);\n\n    private:\n        ~{wrapper}();\n        static v8::Persistent<v8::Function> constructor;\n        static bool factory_call;\n\n        {name}* instance;\n\n        explicit {wrapper}({name}* self = NULL);\n\n{methods}\n}};",
        wrapper = model.wrapper,
        name = model.name,
        methods = methods.join("\n")
    )
}

fn init_block(model: &ClassModel) -> String {
    let mut registrations: Vec<String> = Vec::new();
    for method in &model.methods {
        if model.is_constructor(&method.signature.name) {
            continue;
        }
        registrations.push(format!(
            "    NODE_SET_PROTOTYPE_METHOD(tpl, \"{export}\", {label});",
            export = model.export_method_name(&method.signature.name),
            label = names::method_label(&method.signature.name)
        ));
    }
    let registration_block = if registrations.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", registrations.join("\n"))
    };
    format!(
        "v8::Persistent<v8::Function> {wrapper}::constructor;\nbool {wrapper}::factory_call = false;\n\nvoid {wrapper}::Init(v8::Local<v8::Object> exports) {{\n    v8::Isolate* isolate = exports->GetIsolate();\n\n    v8::Local<v8::FunctionTemplate> tpl = v8::FunctionTemplate::New(isolate, {construct});\n    tpl->SetClassName(v8::String::NewFromUtf8(isolate, \"{export}\"));\n    tpl->InstanceTemplate()->SetInternalFieldCount(1);\n{registrations}\n    constructor.Reset(isolate, tpl->GetFunction());\n    exports->Set(v8::String::NewFromUtf8(isolate, \"{export}\"), tpl->GetFunction());\n}}",
        wrapper = model.wrapper,
        construct = names::method_label(&model.construct_fn),
        export = model.export_name,
        registrations = registration_block
    )
}

fn factory_block(model: &ClassModel) -> String {
    format!(
        "v8::Local<v8::Object> {wrapper}::Factory(v8::Isolate* isolate, {name}* self) {{\n    v8::EscapableHandleScope handle_scope(isolate);\n    const int argc = 0;\n    v8::Local<v8::Value> argv[argc] = {{}};\n    v8::Local<v8::Context> context = isolate->GetCurrentContext();\n    v8::Local<v8::Function> obj_constructor = v8::Local<v8::Function>::New(isolate, constructor);\n    factory_call = true;\n    v8::Local<v8::Object> obj_instance = obj_constructor->NewInstance(context, argc, argv).ToLocalChecked();\n    factory_call = false;\n    {wrapper}* wrapper = new {wrapper}();\n    {ref_fn}(self);\n    wrapper->instance = self;\n    wrapper->Wrap(obj_instance);\n    return handle_scope.Escape(obj_instance);\n}}",
        wrapper = model.wrapper,
        name = model.name,
        ref_fn = model.ref_fn
    )
}

fn instance_method_plan(
    model: &ClassModel,
    method: &MethodDecl,
    registry: &TypeRegistry,
) -> Result<MethodPlan, GenerateError> {
    let sig = &method.signature;
    let classified = classify(&sig.params, Some(&model.handle_type), registry)?;

    let mut plan = MethodPlan::new(&model.wrapper, &sig.name);
    argument_guards(&mut plan, &classified, &method.prototype)?;
    plan.unwrap = Some(Unwrap {
        wrapper: model.wrapper.clone(),
        handle_type: model.handle_type.clone(),
        class_name: model.name.clone(),
    });
    plan.error_slot = classified.has_error_slot();
    conversion_fragments(&mut plan, &classified)?;
    for marshaler in &classified.out {
        plan.out_decls.extend(marshaler.declare_out()?);
    }
    plan.call = Some(call_statement(sig, &classified, CallFlavor::Instance));
    plan.check_error = classified.has_error_slot();

    if let Some(unit) = package_results(sig, &classified, registry)? {
        plan.results = unit.convert_out()?;
        plan.finish = Finish::SetResult(unit.js_name());
    }
    Ok(plan)
}

fn constructor_plan(
    model: &ClassModel,
    method: &MethodDecl,
    registry: &TypeRegistry,
) -> Result<MethodPlan, GenerateError> {
    let sig = &method.signature;
    let classified = classify(&sig.params, Some(&model.handle_type), registry)?;
    if !classified.out.is_empty() {
        return Err(UnsupportedError::MultipleResults {
            method: sig.name.clone(),
        }
        .into());
    }

    let mut plan = MethodPlan::new(&model.wrapper, &sig.name);
    plan.factory_bypass = true;
    plan.construct_guard = Some(ThrowIf::new(
        "!args.IsConstructCall()",
        format!(
            "Must be called as a constructor with `new`: `{}`.",
            method.prototype
        ),
    ));
    argument_guards(&mut plan, &classified, &method.prototype)?;
    plan.error_slot = classified.has_error_slot();
    conversion_fragments(&mut plan, &classified)?;
    plan.call = Some(call_statement(sig, &classified, CallFlavor::Constructor));
    plan.check_error = classified.has_error_slot();
    plan.finish = Finish::WrapThis;
    Ok(plan)
}

fn private_constructor_plan(model: &ClassModel) -> MethodPlan {
    let mut plan = MethodPlan::new(&model.wrapper, &model.construct_fn);
    plan.factory_bypass = true;
    plan.finish = Finish::ThrowPrivate(format!(
        "{} cannot be constructed directly.",
        model.name
    ));
    plan
}

fn argument_guards(
    plan: &mut MethodPlan,
    classified: &ClassifiedArgs,
    prototype: &str,
) -> Result<(), GenerateError> {
    let arity = classified.arity();
    plan.arity_guard = Some(ThrowIf::new(
        format!("args.Length() != {arity}"),
        format!("Wrong number of arguments for `{prototype}`."),
    ));
    if arity > 0 {
        let mut checks = Vec::with_capacity(arity);
        for (i, marshaler) in classified.explicit.iter().enumerate() {
            checks.push(format!("!{}", marshaler.check(&format!("args[{i}]"))?));
        }
        plan.type_guard = Some(ThrowIf::new(
            checks.join(" || "),
            format!("Wrong type of arguments for `{prototype}`."),
        ));
    }
    Ok(())
}

fn conversion_fragments(
    plan: &mut MethodPlan,
    classified: &ClassifiedArgs,
) -> Result<(), GenerateError> {
    for (i, marshaler) in classified.explicit.iter().enumerate() {
        plan.conversions
            .push(Fragment::Lines(marshaler.convert_in(&format!("args[{i}]"))?));
        for assertion in marshaler.assertions() {
            plan.conversions.push(Fragment::Guard(ThrowIf::new(
                format!("!({})", assertion.cond),
                assertion.message,
            )));
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum CallFlavor {
    Instance,
    Constructor,
}

fn call_statement(sig: &Signature, classified: &ClassifiedArgs, flavor: CallFlavor) -> String {
    let mut args_text: Vec<String> = Vec::new();
    for slot in &classified.slots {
        match slot {
            Slot::Receiver => args_text.push("self".to_string()),
            Slot::ErrorSentinel => args_text.push(format!("&{}", names::ERROR_LOCAL)),
            Slot::Explicit(i) => args_text.extend(classified.explicit[*i].call_args()),
            Slot::Out(i) => args_text.extend(classified.out[*i].call_args()),
        }
    }
    let call = format!("{}({})", sig.name, args_text.join(", "));
    match flavor {
        CallFlavor::Constructor => format!("{} self = {call};", sig.return_type),
        CallFlavor::Instance if sig.returns_void() => format!("{call};"),
        CallFlavor::Instance => format!("{} {} = {call};", sig.return_type, names::c_local("return")),
    }
}

/// Collapse the return value and out parameters into at most one
/// host-visible result. A result byte buffer takes the unit that
/// follows it as its length.
fn package_results(
    sig: &Signature,
    classified: &ClassifiedArgs,
    registry: &TypeRegistry,
) -> Result<Option<Marshaler>, GenerateError> {
    let mut units: Vec<Marshaler> = Vec::new();
    if !sig.returns_void() {
        units.push(registry.lookup(&sig.return_type, "return")?);
    }
    units.extend(classified.out.iter().cloned());

    let mut fused: Vec<Marshaler> = Vec::new();
    let mut rest = units.into_iter();
    while let Some(mut unit) = rest.next() {
        if let Marshaler::ByteBuffer(buffer) = &mut unit {
            if buffer.length.is_none() {
                let length = rest.next().ok_or_else(|| UnsupportedError::ComboTail {
                    param: buffer.name.clone(),
                })?;
                buffer.length = Some(Box::new(length));
            }
        }
        fused.push(unit);
    }

    match fused.len() {
        0 => Ok(None),
        1 => Ok(fused.pop()),
        _ => Err(UnsupportedError::MultipleResults {
            method: sig.name.clone(),
        }
        .into()),
    }
}
