//! Process-scoped class and instance registries.
//!
//! Both registries are owned by one [`BindingRuntime`] value rather than
//! ambient globals; the surrounding application creates it once at plugin
//! load and shares it with the trampolines via `Arc`.
//!
//! The class side is written only by the single-threaded auto-registration
//! pass and read-only afterwards. The instance side is live for the whole
//! process: the engine may construct, destroy, and invoke concurrently for
//! different instances, so lookups take a read lock, insert/remove serialize
//! under the write lock, and each instance sits behind its own mutex so
//! concurrent invokes on different instances do not contend.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::class::{RegisteredClass, ScriptClass};
use crate::core_types::Object;

/// Opaque identifier for a live instance, derived from the engine object
/// handle. Stable for the instance's lifetime; the engine may reuse it after
/// destroy, never while the instance is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<Object> for InstanceId {
    fn from(owner: Object) -> Self {
        Self(owner.id())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live instance shared between the registry and an in-flight dispatch.
pub type SharedInstance = Arc<Mutex<Box<dyn ScriptClass>>>;

/// Owner of the process-wide registries.
pub struct BindingRuntime {
    classes: RwLock<FxHashMap<String, Arc<RegisteredClass>>>,
    instances: RwLock<FxHashMap<InstanceId, SharedInstance>>,
}

impl BindingRuntime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            classes: RwLock::new(FxHashMap::default()),
            instances: RwLock::new(FxHashMap::default()),
        })
    }

    /// Store class metadata under its registered name.
    ///
    /// Overwriting an existing entry is allowed (last registration wins)
    /// but points at a registration smell, so it is logged.
    pub fn register_class(&self, class: RegisteredClass) {
        let name = class.name().to_owned();
        let mut classes = self.classes.write().unwrap_or_else(PoisonError::into_inner);
        if classes.insert(name.clone(), Arc::new(class)).is_some() {
            log::warn!("class {name} registered more than once; last registration wins");
        }
    }

    /// Look up class metadata by registered name.
    ///
    /// Absence during dispatch is a configuration error the caller treats as
    /// fatal; the registry itself just reports not-found.
    pub fn class(&self, name: &str) -> Option<Arc<RegisteredClass>> {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn class_count(&self) -> usize {
        self.classes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Insert a live instance. Atomic with respect to concurrent lookups: a
    /// reader either sees the complete entry or none at all.
    pub fn insert_instance(&self, id: InstanceId, instance: Box<dyn ScriptClass>) {
        let shared = Arc::new(Mutex::new(instance));
        self.instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, shared);
    }

    /// Look up a live instance by identifier.
    pub fn instance(&self, id: InstanceId) -> Option<SharedInstance> {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Remove an instance entry; returns whether one was present. The
    /// underlying instance drops once any in-flight dispatch releases it.
    pub fn remove_instance(&self, id: InstanceId) -> bool {
        self.instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn instance_count(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for BindingRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRuntime")
            .field("classes", &self.class_count())
            .field("instances", &self.instance_count())
            .finish()
    }
}
