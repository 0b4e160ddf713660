//! Dynamic class binding layer for a NativeScript-style engine plugin ABI.
//!
//! This crate lets Rust types be registered as native script classes inside a
//! game engine's plugin interface, and lets the engine invoke their methods at
//! runtime without any compile-time glue per class. Each registrable type
//! provides a small descriptor (class name, base class, exported method table
//! with typed parameter/return descriptors); the auto-registration driver
//! turns those descriptors into engine registrations, and the dispatch
//! trampolines resolve every later construct/invoke/destroy call against the
//! process-wide registries.
//!
//! # Architecture
//!
//! ```text
//! engine load ──> auto_register_classes() ──> class registry + engine trampolines
//! engine call ──> construct/destroy/invoke trampoline
//!                   │ registry lookups (class, method, instance)
//!                   │ tagged-value conversion (Variant <-> NativeValue)
//!                   └ stored-closure dispatch on the live instance
//! ```
//!
//! Values cross the engine boundary only as [`variant::Variant`] tagged
//! values. The engine owns all object lifetimes; this layer is purely
//! reactive.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod class;
pub mod convert;
pub mod core_types;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod naming;
pub mod register;
pub mod registry;
pub mod variant;

pub mod prelude {
    pub use crate::class::{
        ClassEntry, MethodArgs, MethodExport, RegisteredClass, RegisteredMethod, ScriptClass,
        ScriptExports, downcast_receiver,
    };
    pub use crate::convert::{FromNative, NativeValue, ValueKind, from_variant, to_variant};
    pub use crate::core_types::*;
    pub use crate::error::{BridgeError, BridgeResult, DispatchError, RegistrationError};
    pub use crate::host::{
        CreateFn, DestroyFn, InvokeFn, MethodAttributes, NativeScriptHost, RpcMode,
    };
    pub use crate::naming::{to_engine_name, to_host_name};
    pub use crate::register::auto_register_classes;
    pub use crate::registry::{BindingRuntime, InstanceId};
    pub use crate::variant::{Dictionary, Variant, VariantType};
}

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Enable or disable verbose registration and dispatch logging.
///
/// When enabled, the driver and the trampolines emit per-class and per-call
/// detail at debug level. Off by default.
pub fn set_debug_enabled(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

pub(crate) fn debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}
