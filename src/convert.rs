//! Conversion between engine tagged values and host native values.
//!
//! Decoding ([`from_variant`]) is a total function over the closed tag set:
//! integers widen to `i64`, reals to `f64`, every composite kind carries its
//! payload through unchanged. Encoding ([`to_variant`]) runs the other way
//! and is driven by the *declared* return kind of the method being called,
//! not by inspecting the value alone, because several native numeric widths
//! collapse onto the engine's single integer and real tags.

use crate::core_types::{
    Aabb, Basis, Color, NodePath, Object, Plane, Quat, Rect2, Rid, Transform, Transform2D,
    Vector2, Vector3,
};
use crate::error::DispatchError;
use crate::variant::{Dictionary, Variant};

/// Declared semantic type of a method parameter or return value.
///
/// `Receiver` occupies the first declared parameter slot of every exported
/// method and is never counted against the engine-supplied wire arguments.
/// `Variant` declares a value passed or returned in already-tagged form,
/// which also covers every builtin composite kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Receiver,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Variant,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Receiver => "receiver",
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Str => "string",
            ValueKind::Variant => "variant",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-side native value.
///
/// The decode direction produces one variant per wire tag; the encode
/// direction additionally accepts every integer and float width so the
/// declared return kind can direct the narrowing, plus `Variant` for methods
/// that produce an already-tagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Vector2(Vector2),
    Rect2(Rect2),
    Vector3(Vector3),
    Transform2D(Transform2D),
    Plane(Plane),
    Quat(Quat),
    Aabb(Aabb),
    Basis(Basis),
    Transform(Transform),
    Color(Color),
    NodePath(NodePath),
    Rid(Rid),
    Object(Object),
    Dictionary(Dictionary),
    Array(Vec<Variant>),
    PoolByteArray(Vec<u8>),
    PoolIntArray(Vec<i32>),
    PoolRealArray(Vec<f32>),
    PoolStringArray(Vec<String>),
    PoolVector2Array(Vec<Vector2>),
    PoolVector3Array(Vec<Vector3>),
    PoolColorArray(Vec<Color>),
    Variant(Variant),
}

impl NativeValue {
    /// Human-readable name of this value's kind, for error context.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeValue::Nil => "nil",
            NativeValue::Bool(_) => "bool",
            NativeValue::I8(_) => "i8",
            NativeValue::I16(_) => "i16",
            NativeValue::I32(_) => "i32",
            NativeValue::I64(_) => "i64",
            NativeValue::U8(_) => "u8",
            NativeValue::U16(_) => "u16",
            NativeValue::U32(_) => "u32",
            NativeValue::U64(_) => "u64",
            NativeValue::F32(_) => "f32",
            NativeValue::F64(_) => "f64",
            NativeValue::Str(_) => "string",
            NativeValue::Vector2(_) => "vector2",
            NativeValue::Rect2(_) => "rect2",
            NativeValue::Vector3(_) => "vector3",
            NativeValue::Transform2D(_) => "transform2d",
            NativeValue::Plane(_) => "plane",
            NativeValue::Quat(_) => "quat",
            NativeValue::Aabb(_) => "aabb",
            NativeValue::Basis(_) => "basis",
            NativeValue::Transform(_) => "transform",
            NativeValue::Color(_) => "color",
            NativeValue::NodePath(_) => "node_path",
            NativeValue::Rid(_) => "rid",
            NativeValue::Object(_) => "object",
            NativeValue::Dictionary(_) => "dictionary",
            NativeValue::Array(_) => "array",
            NativeValue::PoolByteArray(_) => "pool_byte_array",
            NativeValue::PoolIntArray(_) => "pool_int_array",
            NativeValue::PoolRealArray(_) => "pool_real_array",
            NativeValue::PoolStringArray(_) => "pool_string_array",
            NativeValue::PoolVector2Array(_) => "pool_vector2_array",
            NativeValue::PoolVector3Array(_) => "pool_vector3_array",
            NativeValue::PoolColorArray(_) => "pool_color_array",
            NativeValue::Variant(_) => "variant",
        }
    }

    /// Re-tag this value in its natural wire form.
    ///
    /// Total: every native kind has exactly one obvious tag (integer widths
    /// widen onto the integer tag, float widths onto the real tag).
    pub fn into_variant(self) -> Variant {
        match self {
            NativeValue::Nil => Variant::Nil,
            NativeValue::Bool(v) => Variant::Bool(v),
            NativeValue::I8(v) => Variant::Int(v as i64),
            NativeValue::I16(v) => Variant::Int(v as i64),
            NativeValue::I32(v) => Variant::Int(v as i64),
            NativeValue::I64(v) => Variant::Int(v),
            NativeValue::U8(v) => Variant::Int(v as i64),
            NativeValue::U16(v) => Variant::Int(v as i64),
            NativeValue::U32(v) => Variant::Int(v as i64),
            NativeValue::U64(v) => Variant::Int(v as i64),
            NativeValue::F32(v) => Variant::Real(v as f64),
            NativeValue::F64(v) => Variant::Real(v),
            NativeValue::Str(v) => Variant::String(v),
            NativeValue::Vector2(v) => Variant::Vector2(v),
            NativeValue::Rect2(v) => Variant::Rect2(v),
            NativeValue::Vector3(v) => Variant::Vector3(v),
            NativeValue::Transform2D(v) => Variant::Transform2D(v),
            NativeValue::Plane(v) => Variant::Plane(v),
            NativeValue::Quat(v) => Variant::Quat(v),
            NativeValue::Aabb(v) => Variant::Aabb(v),
            NativeValue::Basis(v) => Variant::Basis(v),
            NativeValue::Transform(v) => Variant::Transform(v),
            NativeValue::Color(v) => Variant::Color(v),
            NativeValue::NodePath(v) => Variant::NodePath(v),
            NativeValue::Rid(v) => Variant::Rid(v),
            NativeValue::Object(v) => Variant::Object(v),
            NativeValue::Dictionary(v) => Variant::Dictionary(v),
            NativeValue::Array(v) => Variant::Array(v),
            NativeValue::PoolByteArray(v) => Variant::PoolByteArray(v),
            NativeValue::PoolIntArray(v) => Variant::PoolIntArray(v),
            NativeValue::PoolRealArray(v) => Variant::PoolRealArray(v),
            NativeValue::PoolStringArray(v) => Variant::PoolStringArray(v),
            NativeValue::PoolVector2Array(v) => Variant::PoolVector2Array(v),
            NativeValue::PoolVector3Array(v) => Variant::PoolVector3Array(v),
            NativeValue::PoolColorArray(v) => Variant::PoolColorArray(v),
            NativeValue::Variant(v) => v,
        }
    }
}

/// Decode a tagged value into its host native form.
///
/// Total over every tag in the closed set; the engine boundary guarantees no
/// other tags arrive (a raw tag outside the set is rejected earlier, at
/// [`crate::variant::VariantType::from_raw`]).
pub fn from_variant(variant: &Variant) -> NativeValue {
    match variant {
        Variant::Nil => NativeValue::Nil,
        Variant::Bool(v) => NativeValue::Bool(*v),
        Variant::Int(v) => NativeValue::I64(*v),
        Variant::Real(v) => NativeValue::F64(*v),
        Variant::String(v) => NativeValue::Str(v.clone()),
        Variant::Vector2(v) => NativeValue::Vector2(*v),
        Variant::Rect2(v) => NativeValue::Rect2(*v),
        Variant::Vector3(v) => NativeValue::Vector3(*v),
        Variant::Transform2D(v) => NativeValue::Transform2D(*v),
        Variant::Plane(v) => NativeValue::Plane(*v),
        Variant::Quat(v) => NativeValue::Quat(*v),
        Variant::Aabb(v) => NativeValue::Aabb(*v),
        Variant::Basis(v) => NativeValue::Basis(*v),
        Variant::Transform(v) => NativeValue::Transform(*v),
        Variant::Color(v) => NativeValue::Color(*v),
        Variant::NodePath(v) => NativeValue::NodePath(v.clone()),
        Variant::Rid(v) => NativeValue::Rid(*v),
        Variant::Object(v) => NativeValue::Object(*v),
        Variant::Dictionary(v) => NativeValue::Dictionary(v.clone()),
        Variant::Array(v) => NativeValue::Array(v.clone()),
        Variant::PoolByteArray(v) => NativeValue::PoolByteArray(v.clone()),
        Variant::PoolIntArray(v) => NativeValue::PoolIntArray(v.clone()),
        Variant::PoolRealArray(v) => NativeValue::PoolRealArray(v.clone()),
        Variant::PoolStringArray(v) => NativeValue::PoolStringArray(v.clone()),
        Variant::PoolVector2Array(v) => NativeValue::PoolVector2Array(v.clone()),
        Variant::PoolVector3Array(v) => NativeValue::PoolVector3Array(v.clone()),
        Variant::PoolColorArray(v) => NativeValue::PoolColorArray(v.clone()),
    }
}

/// Encode a native value under the method's declared return kind.
///
/// Supported declared kinds are bool, the signed and unsigned integer widths,
/// the float widths, string, and already-tagged variant. Declaring anything
/// else for a return slot is a configuration error; so is producing a value
/// whose kind disagrees with the declaration.
pub fn to_variant(value: NativeValue, declared: ValueKind) -> Result<Variant, DispatchError> {
    let mismatch = |value: &NativeValue| DispatchError::ReturnValueMismatch {
        declared: declared.name(),
        produced: value.kind_name(),
    };

    match (declared, value) {
        (ValueKind::Bool, NativeValue::Bool(v)) => Ok(Variant::Bool(v)),
        (ValueKind::I8, NativeValue::I8(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::I16, NativeValue::I16(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::I32, NativeValue::I32(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::I64, NativeValue::I64(v)) => Ok(Variant::Int(v)),
        (ValueKind::U8, NativeValue::U8(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::U16, NativeValue::U16(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::U32, NativeValue::U32(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::U64, NativeValue::U64(v)) => Ok(Variant::Int(v as i64)),
        (ValueKind::F32, NativeValue::F32(v)) => Ok(Variant::Real(v as f64)),
        (ValueKind::F64, NativeValue::F64(v)) => Ok(Variant::Real(v)),
        (ValueKind::Str, NativeValue::Str(v)) => Ok(Variant::String(v)),
        (ValueKind::Variant, v) => Ok(v.into_variant()),
        (ValueKind::Receiver, v) => Err(mismatch(&v)),
        (_, v) => Err(mismatch(&v)),
    }
}

/// Conversion from a decoded native value to a concrete Rust type.
///
/// Bound method closures use this through [`crate::class::MethodArgs`] to
/// pull typed positional arguments. Integer widths narrow with overflow
/// checks since the wire carries a single widened integer kind.
pub trait FromNative: Sized {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure>;
}

/// Kind-level description of a failed [`FromNative`] conversion.
///
/// Carries no positional context; [`crate::class::MethodArgs`] adds the
/// argument index when it surfaces the failure as a dispatch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionFailure {
    pub expected: &'static str,
    pub actual: &'static str,
}

macro_rules! impl_from_native_int {
    ($ty:ty, $name:literal) => {
        impl FromNative for $ty {
            fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
                match value {
                    NativeValue::I64(v) => <$ty>::try_from(v).map_err(|_| ConversionFailure {
                        expected: $name,
                        actual: "i64 (out of range)",
                    }),
                    other => Err(ConversionFailure {
                        expected: $name,
                        actual: other.kind_name(),
                    }),
                }
            }
        }
    };
}

impl_from_native_int!(i8, "i8");
impl_from_native_int!(i16, "i16");
impl_from_native_int!(i32, "i32");
impl_from_native_int!(u8, "u8");
impl_from_native_int!(u16, "u16");
impl_from_native_int!(u32, "u32");
impl_from_native_int!(u64, "u64");

impl FromNative for i64 {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
        match value {
            NativeValue::I64(v) => Ok(v),
            other => Err(ConversionFailure {
                expected: "i64",
                actual: other.kind_name(),
            }),
        }
    }
}

impl FromNative for bool {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
        match value {
            NativeValue::Bool(v) => Ok(v),
            other => Err(ConversionFailure {
                expected: "bool",
                actual: other.kind_name(),
            }),
        }
    }
}

impl FromNative for f32 {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
        match value {
            NativeValue::F64(v) => Ok(v as f32),
            other => Err(ConversionFailure {
                expected: "f32",
                actual: other.kind_name(),
            }),
        }
    }
}

impl FromNative for f64 {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
        match value {
            NativeValue::F64(v) => Ok(v),
            other => Err(ConversionFailure {
                expected: "f64",
                actual: other.kind_name(),
            }),
        }
    }
}

impl FromNative for String {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
        match value {
            NativeValue::Str(v) => Ok(v),
            other => Err(ConversionFailure {
                expected: "string",
                actual: other.kind_name(),
            }),
        }
    }
}

macro_rules! impl_from_native_payload {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl FromNative for $ty {
            fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
                match value {
                    NativeValue::$variant(v) => Ok(v),
                    other => Err(ConversionFailure {
                        expected: $name,
                        actual: other.kind_name(),
                    }),
                }
            }
        }
    };
}

impl_from_native_payload!(Vector2, Vector2, "vector2");
impl_from_native_payload!(Vector3, Vector3, "vector3");
impl_from_native_payload!(Rect2, Rect2, "rect2");
impl_from_native_payload!(Transform2D, Transform2D, "transform2d");
impl_from_native_payload!(Plane, Plane, "plane");
impl_from_native_payload!(Quat, Quat, "quat");
impl_from_native_payload!(Aabb, Aabb, "aabb");
impl_from_native_payload!(Basis, Basis, "basis");
impl_from_native_payload!(Transform, Transform, "transform");
impl_from_native_payload!(Color, Color, "color");
impl_from_native_payload!(NodePath, NodePath, "node_path");
impl_from_native_payload!(Rid, Rid, "rid");
impl_from_native_payload!(Object, Object, "object");
impl_from_native_payload!(Dictionary, Dictionary, "dictionary");

impl FromNative for Variant {
    fn from_native(value: NativeValue) -> Result<Self, ConversionFailure> {
        Ok(value.into_variant())
    }
}
