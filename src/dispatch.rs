//! Dispatch trampolines: the per-call entrypoints the engine invokes.
//!
//! The driver builds three trampolines per class and hands them to the host
//! at registration time. Construction creates a fresh instance, wires in the
//! owner handle, and records it in the instance registry; destruction removes
//! the registry entry; invocation resolves the registered class and method,
//! validates the argument count, converts the tagged arguments, and calls the
//! stored method closure under the instance's lock.
//!
//! Every failure on this path is a configuration error: it is logged with
//! class/method context and aborts the call, never silently coerced.

use std::sync::{Arc, PoisonError};

use crate::class::{ClassConstructor, MethodArgs};
use crate::convert::{from_variant, to_variant};
use crate::core_types::Object;
use crate::error::DispatchError;
use crate::host::{CreateFn, DestroyFn, InvokeFn};
use crate::naming;
use crate::registry::{BindingRuntime, InstanceId};
use crate::variant::Variant;

/// Separator between class and method in an invoke label.
pub(crate) const LABEL_SEPARATOR: &str = "::";

/// Build the construct trampoline for one class.
pub(crate) fn construct_trampoline(
    runtime: Arc<BindingRuntime>,
    class_name: String,
    constructor: ClassConstructor,
) -> CreateFn {
    Box::new(move |owner: Object| {
        let mut instance = constructor();
        instance.set_owner(owner);

        let id = InstanceId::from(owner);
        if crate::debug_enabled() {
            log::debug!("constructed {class_name} instance {id}");
        }
        runtime.insert_instance(id, instance);
        id
    })
}

/// Build the destroy trampoline for one class.
pub(crate) fn destroy_trampoline(runtime: Arc<BindingRuntime>, class_name: String) -> DestroyFn {
    Box::new(move |id: InstanceId| {
        if crate::debug_enabled() {
            log::debug!("destroying {class_name} instance {id}");
        }
        if !runtime.remove_instance(id) {
            // The engine owns the lifetime signal; a stray destroy is noted
            // but not an error.
            log::warn!("destroy for {class_name} instance {id} which is not registered");
        }
    })
}

/// Build the invoke trampoline shared by every method of every class.
///
/// The engine passes back the `Class::method` label bound at registration,
/// so one closure serves all methods.
pub(crate) fn invoke_trampoline(runtime: Arc<BindingRuntime>) -> InvokeFn {
    Box::new(move |label, id, args| invoke(&runtime, label, id, args))
}

fn invoke(
    runtime: &BindingRuntime,
    label: &str,
    id: InstanceId,
    args: &[Variant],
) -> Result<Variant, DispatchError> {
    let (class_name, engine_method) = split_label(label)?;

    let class = runtime.class(class_name).ok_or_else(|| {
        fatal(DispatchError::ClassNotRegistered {
            class: class_name.to_owned(),
            method: engine_method.to_owned(),
        })
    })?;

    // Labels carry the engine-convention name; the method table is keyed by
    // the host export label.
    let host_method = naming::to_host_name(engine_method);
    let method = class.method(&host_method).ok_or_else(|| {
        fatal(DispatchError::MethodNotRegistered {
            class: class_name.to_owned(),
            method: host_method.clone(),
        })
    })?;

    let expected = method.wire_arg_count();
    if expected != args.len() {
        return Err(fatal(DispatchError::ArgumentCountMismatch {
            class: class_name.to_owned(),
            method: host_method.clone(),
            expected,
            actual: args.len(),
        }));
    }

    let natives: Vec<_> = args.iter().map(from_variant).collect();

    let instance = runtime
        .instance(id)
        .ok_or_else(|| fatal(DispatchError::InstanceNotFound { id }))?;

    if crate::debug_enabled() {
        log::debug!(
            "invoking {class_name}::{host_method} on instance {id} with {} arguments",
            natives.len()
        );
    }

    let result = {
        let mut guard = instance.lock().unwrap_or_else(PoisonError::into_inner);
        (method.method())(guard.as_mut(), MethodArgs::new(natives)).map_err(fatal)?
    };

    match result {
        None => Ok(Variant::Nil),
        Some(value) => {
            let declared = method.returns().first().copied().ok_or_else(|| {
                fatal(DispatchError::UnsupportedReturnKind {
                    class: class_name.to_owned(),
                    method: host_method.clone(),
                    kind: "none declared",
                })
            })?;
            to_variant(value, declared).map_err(fatal)
        }
    }
}

fn split_label(label: &str) -> Result<(&str, &str), DispatchError> {
    label
        .split_once(LABEL_SEPARATOR)
        .filter(|(class, method)| !class.is_empty() && !method.is_empty())
        .ok_or_else(|| {
            fatal(DispatchError::MalformedLabel {
                label: label.to_owned(),
            })
        })
}

fn fatal(err: DispatchError) -> DispatchError {
    log::error!("dispatch aborted: {err}");
    err
}
