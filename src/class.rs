//! Class and method descriptors.
//!
//! Registration is descriptor-driven rather than reflective: a registrable
//! type implements [`ScriptClass`] (the minimal capability set the dispatch
//! machinery depends on) and [`ScriptExports`] (the explicit table of
//! engine-callable methods). Only methods listed in the export table are
//! registered, so inherited or infrastructure methods never leak into the
//! engine; the capability methods themselves are infrastructure and are never
//! listed.
//!
//! Each exported method stores a type-erased closure captured at registration
//! time. Dispatch resolves `(class, method name)` to that closure and calls
//! it with the converted positional arguments; the closure downcasts its
//! receiver and pulls typed arguments through [`MethodArgs`].

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::convert::{FromNative, NativeValue, ValueKind};
use crate::core_types::Object;
use crate::error::DispatchError;
use crate::naming;

/// Minimal capability set every registrable class must satisfy.
///
/// `base_class` names the engine class this script extends; the owner pair
/// stores and returns the engine object handle supplied at construction.
/// These methods exist for the registration and dispatch machinery and are
/// never registered as script-callable.
pub trait ScriptClass: Any + Send {
    /// Name of the engine base class this script extends.
    fn base_class(&self) -> &'static str;

    /// Store the owning engine object handle.
    fn set_owner(&mut self, owner: Object);

    /// The owning engine object handle.
    fn owner(&self) -> Object;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Explicit export declaration for a registrable class.
///
/// The returned table is the complete set of engine-callable methods; the
/// driver registers exactly these, in order.
pub trait ScriptExports: ScriptClass + Sized {
    fn exported_methods() -> Vec<MethodExport>;
}

/// Downcast a dispatch receiver to its concrete class.
///
/// Bound method closures call this first; a mismatch means the instance
/// registry handed dispatch an instance of the wrong class, which is a
/// configuration error.
pub fn downcast_receiver<'a, T: ScriptClass>(
    this: &'a mut dyn ScriptClass,
) -> Result<&'a mut T, DispatchError> {
    this.as_any_mut()
        .downcast_mut::<T>()
        .ok_or(DispatchError::ReceiverTypeMismatch {
            expected: naming::short_type_name(std::any::type_name::<T>()),
        })
}

/// Stored method implementation: the function value dispatch invokes in
/// place of reflective method lookup.
pub type MethodFn = Arc<
    dyn Fn(&mut dyn ScriptClass, MethodArgs) -> Result<Option<NativeValue>, DispatchError>
        + Send
        + Sync,
>;

/// Positional arguments handed to a stored method closure.
///
/// Values arrive already decoded from their tagged form; `take` moves one out
/// by index and converts it to the requested Rust type.
#[derive(Debug)]
pub struct MethodArgs {
    values: Vec<Option<NativeValue>>,
}

impl MethodArgs {
    pub fn new(values: Vec<NativeValue>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Number of wire arguments supplied (the receiver is not counted).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move the argument at `index` out, converted to `T`.
    pub fn take<T: FromNative>(&mut self, index: usize) -> Result<T, DispatchError> {
        let count = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(DispatchError::ArgumentIndexOutOfBounds { index, count })?;
        T::from_native(slot).map_err(|failure| DispatchError::ArgumentConversion {
            index,
            expected: failure.expected,
            actual: failure.actual,
        })
    }
}

/// One entry in a class's export table.
#[derive(Clone)]
pub struct MethodExport {
    /// Host export label, PascalCase with an optional leading `X_` private
    /// marker.
    pub name: &'static str,
    /// Declared parameter kinds; the first entry is always the receiver slot.
    pub params: Vec<ValueKind>,
    /// Declared return kinds; empty for void methods.
    pub returns: Vec<ValueKind>,
    /// The stored implementation.
    pub method: MethodFn,
}

impl MethodExport {
    pub fn new<F>(
        name: &'static str,
        params: &[ValueKind],
        returns: &[ValueKind],
        method: F,
    ) -> Self
    where
        F: Fn(&mut dyn ScriptClass, MethodArgs) -> Result<Option<NativeValue>, DispatchError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            params: params.to_vec(),
            returns: returns.to_vec(),
            method: Arc::new(method),
        }
    }
}

impl std::fmt::Debug for MethodExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodExport")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Registered method metadata: declared signature plus stored implementation.
///
/// Immutable after creation.
#[derive(Clone)]
pub struct RegisteredMethod {
    params: Vec<ValueKind>,
    returns: Vec<ValueKind>,
    method: MethodFn,
}

impl RegisteredMethod {
    pub(crate) fn from_export(export: &MethodExport) -> Self {
        Self {
            params: export.params.clone(),
            returns: export.returns.clone(),
            method: Arc::clone(&export.method),
        }
    }

    /// Declared parameter kinds, receiver slot included.
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Declared return kinds.
    pub fn returns(&self) -> &[ValueKind] {
        &self.returns
    }

    /// Number of wire arguments the engine must supply: the declared
    /// parameters minus the implicit receiver slot.
    pub fn wire_arg_count(&self) -> usize {
        self.params.len().saturating_sub(1)
    }

    pub(crate) fn method(&self) -> &MethodFn {
        &self.method
    }
}

impl std::fmt::Debug for RegisteredMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredMethod")
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Registered class metadata: base class plus the method table keyed by host
/// method name.
///
/// Built once during auto-registration, immutable afterwards, lives for the
/// process lifetime.
#[derive(Debug)]
pub struct RegisteredClass {
    name: String,
    base_class: String,
    methods: FxHashMap<String, RegisteredMethod>,
}

impl RegisteredClass {
    pub(crate) fn new(name: impl Into<String>, base_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_class: base_class.into(),
            methods: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_class(&self) -> &str {
        &self.base_class
    }

    pub fn method(&self, host_name: &str) -> Option<&RegisteredMethod> {
        self.methods.get(host_name)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Returns false if a method with this name was already present.
    pub(crate) fn add_method(&mut self, host_name: &str, method: RegisteredMethod) -> bool {
        self.methods.insert(host_name.to_owned(), method).is_none()
    }
}

/// Type-erased constructor for a registrable class.
pub type ClassConstructor = Arc<dyn Fn() -> Box<dyn ScriptClass> + Send + Sync>;

/// One unit of registration work for the auto-registration driver: a factory
/// plus the export table snapshot, with the class name derived from the
/// concrete type name.
#[derive(Clone)]
pub struct ClassEntry {
    name: String,
    constructor: ClassConstructor,
    exports: Vec<MethodExport>,
}

impl ClassEntry {
    /// Build an entry for `T` from its constructor function.
    pub fn of<T: ScriptExports + 'static>(constructor: fn() -> T) -> Self {
        Self {
            name: naming::short_type_name(std::any::type_name::<T>()).to_owned(),
            constructor: Arc::new(move || Box::new(constructor()) as Box<dyn ScriptClass>),
            exports: T::exported_methods(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> &ClassConstructor {
        &self.constructor
    }

    pub fn exports(&self) -> &[MethodExport] {
        &self.exports
    }
}

impl std::fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassEntry")
            .field("name", &self.name)
            .field("exports", &self.exports)
            .finish_non_exhaustive()
    }
}
