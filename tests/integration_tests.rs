//! End-to-end tests driving the binding layer the way the engine would:
//! register classes through a recording host, then construct, invoke, and
//! destroy through the captured trampolines.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gdnative_bridge::prelude::*;

/// Engine stand-in: stores every registration and lets tests drive the
/// trampolines like the plugin host would.
#[derive(Default)]
struct RecordingHost {
    classes: Vec<(String, String)>,
    creates: HashMap<String, CreateFn>,
    destroys: HashMap<String, DestroyFn>,
    methods: HashMap<String, (MethodAttributes, InvokeFn)>,
}

impl NativeScriptHost for RecordingHost {
    fn register_class(&mut self, name: &str, base_class: &str, create: CreateFn, destroy: DestroyFn) {
        self.classes.push((name.to_owned(), base_class.to_owned()));
        self.creates.insert(name.to_owned(), create);
        self.destroys.insert(name.to_owned(), destroy);
    }

    fn register_method(
        &mut self,
        class_name: &str,
        engine_method_name: &str,
        attributes: MethodAttributes,
        invoke: InvokeFn,
    ) {
        // The host binds each method trampoline under its invoke label and
        // passes that label back on every call.
        let label = format!("{class_name}::{engine_method_name}");
        self.methods.insert(label, (attributes, invoke));
    }
}

impl RecordingHost {
    fn construct(&self, class: &str, owner: Object) -> InstanceId {
        (self.creates[class])(owner)
    }

    fn destroy(&self, class: &str, id: InstanceId) {
        (self.destroys[class])(id);
    }

    fn invoke(
        &self,
        label: &str,
        id: InstanceId,
        args: &[Variant],
    ) -> Result<Variant, DispatchError> {
        let (_, invoke) = self
            .methods
            .get(label)
            .unwrap_or_else(|| panic!("no method registered under label {label}"));
        invoke(label, id, args)
    }
}

struct Greeter {
    owner: Object,
    greetings: i64,
}

impl Greeter {
    fn new() -> Self {
        Self {
            owner: Object::default(),
            greetings: 0,
        }
    }

    fn say_hello(&mut self, name: &str) -> String {
        self.greetings += 1;
        format!("Hello, {name}")
    }
}

impl ScriptClass for Greeter {
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

impl ScriptExports for Greeter {
    fn exported_methods() -> Vec<MethodExport> {
        vec![
            MethodExport::new(
                "SayHello",
                &[ValueKind::Receiver, ValueKind::Str],
                &[ValueKind::Str],
                |this, mut args| {
                    let greeter = downcast_receiver::<Greeter>(this)?;
                    let name: String = args.take(0)?;
                    Ok(Some(NativeValue::Str(greeter.say_hello(&name))))
                },
            ),
            MethodExport::new(
                "GreetingCount",
                &[ValueKind::Receiver],
                &[ValueKind::I64],
                |this, _args| {
                    let greeter = downcast_receiver::<Greeter>(this)?;
                    Ok(Some(NativeValue::I64(greeter.greetings)))
                },
            ),
            MethodExport::new("X_Ready", &[ValueKind::Receiver], &[], |_this, _args| Ok(None)),
        ]
    }
}

static SPY_CALLS: AtomicUsize = AtomicUsize::new(0);

struct Spy {
    owner: Object,
}

impl ScriptClass for Spy {
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

impl ScriptExports for Spy {
    fn exported_methods() -> Vec<MethodExport> {
        vec![MethodExport::new(
            "Observe",
            &[ValueKind::Receiver, ValueKind::I64],
            &[],
            |_this, _args| {
                SPY_CALLS.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            },
        )]
    }
}

fn registered_world() -> (Arc<BindingRuntime>, RecordingHost) {
    let _ = env_logger::builder().is_test(true).try_init();

    let runtime = BindingRuntime::new();
    let mut host = RecordingHost::default();
    auto_register_classes(
        &runtime,
        &mut host,
        vec![
            ClassEntry::of::<Greeter>(Greeter::new),
            ClassEntry::of::<Spy>(|| Spy {
                owner: Object::default(),
            }),
        ],
    )
    .unwrap();
    (runtime, host)
}

#[test]
fn registration_reports_classes_and_engine_names() {
    let (_runtime, host) = registered_world();

    assert!(host.classes.contains(&("Greeter".to_owned(), "Node".to_owned())));
    assert!(host.classes.contains(&("Spy".to_owned(), "Node".to_owned())));
    assert!(host.methods.contains_key("Greeter::say_hello"));
    assert!(host.methods.contains_key("Greeter::greeting_count"));
    assert!(host.methods.contains_key("Greeter::_ready"));
    assert!(host.methods.contains_key("Spy::observe"));

    let (attributes, _) = &host.methods["Greeter::say_hello"];
    assert_eq!(attributes.rpc_mode, RpcMode::Disabled);
}

#[test]
fn greeter_end_to_end() {
    let (_runtime, host) = registered_world();

    let id = host.construct("Greeter", Object::new(0x1001));
    let result = host
        .invoke("Greeter::say_hello", id, &[Variant::from("World")])
        .unwrap();
    assert_eq!(result, Variant::from("Hello, World"));

    // State persisted across calls on the same instance.
    let count = host.invoke("Greeter::greeting_count", id, &[]).unwrap();
    assert_eq!(count, Variant::Int(1));
}

#[test]
fn void_method_returns_nil_tag() {
    let (_runtime, host) = registered_world();

    let id = host.construct("Greeter", Object::new(2));
    let result = host.invoke("Greeter::_ready", id, &[]).unwrap();
    assert_eq!(result.get_type(), VariantType::Nil);
}

#[test]
fn same_method_name_on_two_classes_is_independent() {
    let runtime = BindingRuntime::new();
    let mut host = RecordingHost::default();

    struct A {
        owner: Object,
    }
    struct B {
        owner: Object,
    }

    macro_rules! impl_script_class {
        ($ty:ident, $base:literal, $reply:literal) => {
            impl ScriptClass for $ty {
                fn base_class(&self) -> &'static str {
                    $base
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
            impl ScriptExports for $ty {
                fn exported_methods() -> Vec<MethodExport> {
                    vec![MethodExport::new(
                        "Describe",
                        &[ValueKind::Receiver],
                        &[ValueKind::Str],
                        |_this, _args| Ok(Some(NativeValue::Str($reply.into()))),
                    )]
                }
            }
        };
    }

    impl_script_class!(A, "Node", "from A");
    impl_script_class!(B, "Node2D", "from B");

    auto_register_classes(
        &runtime,
        &mut host,
        vec![
            ClassEntry::of::<A>(|| A {
                owner: Object::default(),
            }),
            ClassEntry::of::<B>(|| B {
                owner: Object::default(),
            }),
        ],
    )
    .unwrap();

    assert!(runtime.class("A").unwrap().method("Describe").is_some());
    assert!(runtime.class("B").unwrap().method("Describe").is_some());

    let a = host.construct("A", Object::new(1));
    let b = host.construct("B", Object::new(2));
    assert_eq!(
        host.invoke("A::describe", a, &[]).unwrap(),
        Variant::from("from A")
    );
    assert_eq!(
        host.invoke("B::describe", b, &[]).unwrap(),
        Variant::from("from B")
    );
}

#[test]
fn wrong_argument_count_never_reaches_the_method() {
    let (_runtime, host) = registered_world();

    let id = host.construct("Spy", Object::new(3));
    SPY_CALLS.store(0, Ordering::SeqCst);

    let err = host.invoke("Spy::observe", id, &[]).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::ArgumentCountMismatch {
            expected: 1,
            actual: 0,
            ..
        }
    ));
    let err = host
        .invoke("Spy::observe", id, &[Variant::Int(1), Variant::Int(2)])
        .unwrap_err();
    assert!(matches!(err, DispatchError::ArgumentCountMismatch { .. }));

    assert_eq!(SPY_CALLS.load(Ordering::SeqCst), 0);

    host.invoke("Spy::observe", id, &[Variant::Int(1)]).unwrap();
    assert_eq!(SPY_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn destroy_then_invoke_reports_instance_not_found() {
    let (_runtime, host) = registered_world();

    let id = host.construct("Greeter", Object::new(4));
    host.destroy("Greeter", id);

    let err = host
        .invoke("Greeter::say_hello", id, &[Variant::from("gone")])
        .unwrap_err();
    assert!(matches!(err, DispatchError::InstanceNotFound { .. }));
}

#[test]
fn concurrent_constructs_produce_distinct_live_instances() {
    let (runtime, host) = registered_world();
    let host = &host;

    const N: u64 = 64;
    let ids: Vec<InstanceId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..N)
            .map(|i| scope.spawn(move || host.construct("Greeter", Object::new(0x4000 + i))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(runtime.instance_count() as u64, N);
    let unique: std::collections::HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len() as u64, N);

    // Every constructed instance is independently invokable.
    for id in ids {
        let reply = host
            .invoke("Greeter::say_hello", id, &[Variant::from("thread")])
            .unwrap();
        assert_eq!(reply, Variant::from("Hello, thread"));
    }
}

#[test]
fn instances_do_not_share_state() {
    let (_runtime, host) = registered_world();

    let first = host.construct("Greeter", Object::new(10));
    let second = host.construct("Greeter", Object::new(11));

    host.invoke("Greeter::say_hello", first, &[Variant::from("a")])
        .unwrap();
    host.invoke("Greeter::say_hello", first, &[Variant::from("b")])
        .unwrap();

    assert_eq!(
        host.invoke("Greeter::greeting_count", first, &[]).unwrap(),
        Variant::Int(2)
    );
    assert_eq!(
        host.invoke("Greeter::greeting_count", second, &[]).unwrap(),
        Variant::Int(0)
    );
}

#[test]
fn owner_handle_is_wired_at_construction() {
    let (runtime, host) = registered_world();

    let owner = Object::new(0xBEEF);
    let id = host.construct("Greeter", owner);

    let instance = runtime.instance(id).unwrap();
    assert_eq!(instance.lock().unwrap().owner(), owner);
}
