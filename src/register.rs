//! Auto-registration driver.
//!
//! Runs exactly once at plugin load, single-threaded, before the engine
//! issues any construct/invoke/destroy call. For every class entry it probes
//! one discarded instance for the base class, registers the class and its
//! trampolines with the engine host, builds the method table from the export
//! descriptors, and finally publishes the completed class metadata in the
//! class registry.
//!
//! Any error aborts the whole pass: a class that fails to register correctly
//! must not be left half-registered, and the plugin must fail to load.

use std::sync::Arc;

use crate::class::{ClassEntry, MethodExport, RegisteredClass, RegisteredMethod};
use crate::convert::ValueKind;
use crate::dispatch;
use crate::error::RegistrationError;
use crate::host::{MethodAttributes, NativeScriptHost};
use crate::naming;
use crate::registry::BindingRuntime;

/// Register every class entry with the engine host and the class registry.
///
/// This is the plugin's initialization entrypoint body: the engine's
/// parameterless load hook calls it once with the application's class list.
pub fn auto_register_classes(
    runtime: &Arc<BindingRuntime>,
    host: &mut dyn NativeScriptHost,
    entries: Vec<ClassEntry>,
) -> Result<(), RegistrationError> {
    log::info!("discovering {} classes to register with the engine", entries.len());

    for entry in entries {
        register_class(runtime, host, entry)?;
    }
    Ok(())
}

fn register_class(
    runtime: &Arc<BindingRuntime>,
    host: &mut dyn NativeScriptHost,
    entry: ClassEntry,
) -> Result<(), RegistrationError> {
    let class_name = entry.name().to_owned();
    if class_name.is_empty() {
        return Err(RegistrationError::EmptyClassName);
    }

    // Probe one instance purely for inspection; it is discarded, never
    // registered as live.
    let probe = (entry.constructor())();
    let base_class = probe.base_class();
    drop(probe);

    if crate::debug_enabled() {
        log::debug!("registering class {class_name} with base class {base_class}");
    }

    host.register_class(
        &class_name,
        base_class,
        dispatch::construct_trampoline(
            Arc::clone(runtime),
            class_name.clone(),
            Arc::clone(entry.constructor()),
        ),
        dispatch::destroy_trampoline(Arc::clone(runtime), class_name.clone()),
    );

    let mut class = RegisteredClass::new(&class_name, base_class);
    for export in entry.exports() {
        validate_export(&class_name, export)?;

        if !class.add_method(export.name, RegisteredMethod::from_export(export)) {
            return Err(RegistrationError::DuplicateMethod {
                class: class_name,
                method: export.name.to_owned(),
            });
        }

        let engine_name = naming::to_engine_name(export.name);
        if crate::debug_enabled() {
            log::debug!(
                "  method {} -> {engine_name} ({} wire arguments)",
                export.name,
                export.params.len() - 1
            );
        }

        // All methods register as locally invoked; remote-call modes are out
        // of scope.
        host.register_method(
            &class_name,
            &engine_name,
            MethodAttributes::default(),
            dispatch::invoke_trampoline(Arc::clone(runtime)),
        );
    }

    // Publishing the class metadata is the last step, so a failure above
    // leaves nothing half-visible in the registry.
    runtime.register_class(class);
    Ok(())
}

fn validate_export(class_name: &str, export: &MethodExport) -> Result<(), RegistrationError> {
    let stripped = export
        .name
        .strip_prefix(naming::HOST_PRIVATE_PREFIX)
        .unwrap_or(export.name);

    let invalid = |reason| RegistrationError::InvalidMethodName {
        class: class_name.to_owned(),
        method: export.name.to_owned(),
        reason,
    };

    if stripped.is_empty() {
        return Err(invalid("name is empty"));
    }
    if !stripped.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("name must contain only ASCII letters and digits"));
    }
    if !stripped.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Err(invalid("name must start with an uppercase letter"));
    }

    if export.params.is_empty() {
        return Err(RegistrationError::EmptyParameterList {
            class: class_name.to_owned(),
            method: export.name.to_owned(),
        });
    }
    if export.params[0] != ValueKind::Receiver {
        return Err(RegistrationError::MissingReceiverSlot {
            class: class_name.to_owned(),
            method: export.name.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ScriptClass, ScriptExports, downcast_receiver};
    use crate::convert::NativeValue;
    use crate::core_types::Object;
    use crate::host::{CreateFn, DestroyFn, InvokeFn};
    use std::any::Any;

    #[derive(Default)]
    struct StubHost {
        classes: Vec<(String, String)>,
        methods: Vec<(String, String)>,
        creates: Vec<CreateFn>,
        destroys: Vec<DestroyFn>,
        invokes: Vec<InvokeFn>,
    }

    impl NativeScriptHost for StubHost {
        fn register_class(
            &mut self,
            name: &str,
            base_class: &str,
            create: CreateFn,
            destroy: DestroyFn,
        ) {
            self.classes.push((name.to_owned(), base_class.to_owned()));
            self.creates.push(create);
            self.destroys.push(destroy);
        }

        fn register_method(
            &mut self,
            class_name: &str,
            engine_method_name: &str,
            _attributes: MethodAttributes,
            invoke: InvokeFn,
        ) {
            self.methods
                .push((class_name.to_owned(), engine_method_name.to_owned()));
            self.invokes.push(invoke);
        }
    }

    struct Widget {
        owner: Object,
    }

    impl Widget {
        fn new() -> Self {
            Self {
                owner: Object::default(),
            }
        }
    }

    impl ScriptClass for Widget {
        fn base_class(&self) -> &'static str {
            "Control"
        }
        fn set_owner(&mut self, owner: Object) {
            self.owner = owner;
        }
        fn owner(&self) -> Object {
            self.owner
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl ScriptExports for Widget {
        fn exported_methods() -> Vec<MethodExport> {
            vec![
                MethodExport::new(
                    "GetLabel",
                    &[ValueKind::Receiver],
                    &[ValueKind::Str],
                    |this, _args| {
                        let _widget = downcast_receiver::<Widget>(this)?;
                        Ok(Some(NativeValue::Str("widget".into())))
                    },
                ),
                MethodExport::new("X_Ready", &[ValueKind::Receiver], &[], |_this, _args| Ok(None)),
            ]
        }
    }

    #[test]
    fn driver_registers_class_and_methods() {
        let runtime = BindingRuntime::new();
        let mut host = StubHost::default();

        auto_register_classes(
            &runtime,
            &mut host,
            vec![ClassEntry::of::<Widget>(Widget::new)],
        )
        .unwrap();

        assert_eq!(host.classes, vec![("Widget".to_owned(), "Control".to_owned())]);
        assert_eq!(
            host.methods,
            vec![
                ("Widget".to_owned(), "get_label".to_owned()),
                ("Widget".to_owned(), "_ready".to_owned()),
            ]
        );

        let class = runtime.class("Widget").unwrap();
        assert_eq!(class.base_class(), "Control");
        assert_eq!(class.method_count(), 2);
        assert!(class.method("GetLabel").is_some());
        assert!(class.method("X_Ready").is_some());

        // One trampoline pair per class, one invoke trampoline per method.
        assert_eq!(host.creates.len(), 1);
        assert_eq!(host.destroys.len(), 1);
        assert_eq!(host.invokes.len(), 2);
    }

    #[test]
    fn probe_instance_is_not_registered() {
        let runtime = BindingRuntime::new();
        let mut host = StubHost::default();

        auto_register_classes(
            &runtime,
            &mut host,
            vec![ClassEntry::of::<Widget>(Widget::new)],
        )
        .unwrap();

        assert_eq!(runtime.instance_count(), 0);
    }

    struct BadExports {
        owner: Object,
    }

    impl ScriptClass for BadExports {
        fn base_class(&self) -> &'static str {
            "Node"
        }
        fn set_owner(&mut self, owner: Object) {
            self.owner = owner;
        }
        fn owner(&self) -> Object {
            self.owner
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl ScriptExports for BadExports {
        fn exported_methods() -> Vec<MethodExport> {
            vec![MethodExport::new("NoReceiver", &[], &[], |_this, _args| Ok(None))]
        }
    }

    #[test]
    fn malformed_export_aborts_initialization() {
        let runtime = BindingRuntime::new();
        let mut host = StubHost::default();

        let err = auto_register_classes(
            &runtime,
            &mut host,
            vec![ClassEntry::of::<BadExports>(|| BadExports {
                owner: Object::default(),
            })],
        )
        .unwrap_err();

        assert!(matches!(err, RegistrationError::EmptyParameterList { .. }));
        // The failing class never reached the class registry.
        assert!(runtime.class("BadExports").is_none());
    }

    #[test]
    fn validate_rejects_bad_names() {
        let cases: [(&'static str, fn() -> MethodExport); 3] = [
            ("snake_case", || {
                MethodExport::new("snake_case", &[ValueKind::Receiver], &[], |_t, _a| Ok(None))
            }),
            ("X_", || {
                MethodExport::new("X_", &[ValueKind::Receiver], &[], |_t, _a| Ok(None))
            }),
            ("lower", || {
                MethodExport::new("lower", &[ValueKind::Receiver], &[], |_t, _a| Ok(None))
            }),
        ];
        for (name, make) in cases {
            let err = validate_export("Widget", &make()).unwrap_err();
            assert!(
                matches!(err, RegistrationError::InvalidMethodName { .. }),
                "{name}"
            );
        }
    }

    #[test]
    fn validate_rejects_missing_receiver_slot() {
        let export = MethodExport::new("Go", &[ValueKind::I64], &[], |_t, _a| Ok(None));
        let err = validate_export("Widget", &export).unwrap_err();
        assert!(matches!(err, RegistrationError::MissingReceiverSlot { .. }));
    }

    #[test]
    fn validate_accepts_private_marker() {
        let export = MethodExport::new("X_Process", &[ValueKind::Receiver], &[], |_t, _a| Ok(None));
        assert!(validate_export("Widget", &export).is_ok());
    }
}
