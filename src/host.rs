//! Engine plugin host boundary.
//!
//! The engine side of the plugin ABI is an external collaborator: this module
//! only defines the surface the binding layer talks to. At load time the
//! driver hands the host one registration per class (name, base class,
//! construct/destroy trampolines) and one per exported method (engine name,
//! attributes, invoke trampoline). Afterwards the engine drives everything by
//! calling those trampolines.

use crate::core_types::Object;
use crate::error::DispatchError;
use crate::registry::InstanceId;
use crate::variant::Variant;

/// Remote-call mode carried in method attributes.
///
/// The engine ABI defines the full set; this layer always registers methods
/// as locally invoked (`Disabled`). Reproducing remote-call semantics is out
/// of scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RpcMode {
    #[default]
    Disabled,
    Remote,
    Master,
    Puppet,
    RemoteSync,
    MasterSync,
    PuppetSync,
}

/// Attributes attached to a method registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodAttributes {
    pub rpc_mode: RpcMode,
}

/// Construct trampoline: the engine supplies the owning object handle and
/// receives the instance identifier for all later calls.
pub type CreateFn = Box<dyn Fn(Object) -> InstanceId + Send + Sync>;

/// Destroy trampoline: removes the identified instance.
pub type DestroyFn = Box<dyn Fn(InstanceId) + Send + Sync>;

/// Invoke trampoline: the engine passes the `Class::method` label it bound at
/// registration, the instance identifier, and the tagged arguments, and
/// receives a tagged result. An `Err` aborts the call loudly; the engine
/// surfaces it as a failed script call.
pub type InvokeFn =
    Box<dyn Fn(&str, InstanceId, &[Variant]) -> Result<Variant, DispatchError> + Send + Sync>;

/// Registration interface of the engine's native plugin host.
///
/// Called exactly once per class and once per method during the single
/// auto-registration pass at plugin load.
pub trait NativeScriptHost {
    fn register_class(
        &mut self,
        name: &str,
        base_class: &str,
        create: CreateFn,
        destroy: DestroyFn,
    );

    fn register_method(
        &mut self,
        class_name: &str,
        engine_method_name: &str,
        attributes: MethodAttributes,
        invoke: InvokeFn,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_mode_defaults_to_disabled() {
        assert_eq!(RpcMode::default(), RpcMode::Disabled);
        assert_eq!(MethodAttributes::default().rpc_mode, RpcMode::Disabled);
    }
}
