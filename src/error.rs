//! Error types for the binding layer.
//!
//! Errors split by phase: [`RegistrationError`] covers the one-shot
//! auto-registration pass (any failure there aborts plugin initialization),
//! while [`DispatchError`] covers per-call failures raised by the construct,
//! destroy, and invoke trampolines. Dispatch errors indicate a registration
//! or implementation bug, not a runtime condition to recover from; the call
//! path logs them with full context and aborts.

use thiserror::Error;

use crate::registry::InstanceId;

/// Result alias for crate-level fallible operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Umbrella error covering both phases of the binding layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Errors raised while building class registrations at plugin load.
///
/// There is no partial-success mode: the driver stops at the first error and
/// the plugin fails to initialize.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// A class entry carried an empty registered name
    #[error("class registration has an empty class name")]
    EmptyClassName,

    /// An exported method name failed validation
    #[error("invalid exported method name {method:?} on class {class}: {reason}")]
    InvalidMethodName {
        class: String,
        method: String,
        reason: &'static str,
    },

    /// An exported method declared no parameters at all
    #[error("method {class}::{method} declares an empty parameter list")]
    EmptyParameterList { class: String, method: String },

    /// The first declared parameter of a method must be the receiver slot
    #[error("method {class}::{method} does not declare the receiver as its first parameter")]
    MissingReceiverSlot { class: String, method: String },

    /// Two exports on the same class share a method name
    #[error("method {class}::{method} is exported more than once")]
    DuplicateMethod { class: String, method: String },
}

/// Errors raised on the engine-driven call path.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invoke label did not split into `Class::method`
    #[error("malformed class/method label {label:?}")]
    MalformedLabel { label: String },

    /// Class absent from the class registry at dispatch time
    #[error("class {class} has not been registered (method {method})")]
    ClassNotRegistered { class: String, method: String },

    /// Method absent from the class's method table
    #[error("method {method} is not registered on class {class}")]
    MethodNotRegistered { class: String, method: String },

    /// Engine-supplied argument count disagrees with the declared parameters
    #[error(
        "invalid number of arguments for {class}::{method}: expected {expected}, got {actual}"
    )]
    ArgumentCountMismatch {
        class: String,
        method: String,
        expected: usize,
        actual: usize,
    },

    /// No live instance under the given identifier
    #[error("no live instance with id {id}")]
    InstanceNotFound { id: InstanceId },

    /// Raw wire tag outside the closed variant set
    #[error("unknown variant tag {raw}")]
    UnknownVariantTag { raw: u32 },

    /// Declared return kind is not one of the supported native kinds
    #[error("unsupported declared return kind {kind} for {class}::{method}")]
    UnsupportedReturnKind {
        class: String,
        method: String,
        kind: &'static str,
    },

    /// Produced return value does not match the declared return kind
    #[error("return value mismatch: declared {declared}, produced {produced}")]
    ReturnValueMismatch {
        declared: &'static str,
        produced: &'static str,
    },

    /// Stored method closure could not downcast its receiver
    #[error("receiver type mismatch: expected {expected}")]
    ReceiverTypeMismatch { expected: &'static str },

    /// Positional argument could not convert to the requested native type
    #[error("argument {index} conversion failed: expected {expected}, got {actual}")]
    ArgumentConversion {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Argument index past the supplied argument list
    #[error("argument index {index} out of bounds ({count} arguments supplied)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },
}
