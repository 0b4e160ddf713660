//! Tagged wire values exchanged at the engine boundary.
//!
//! [`Variant`] is the engine's discriminated value representation: a closed
//! set of primitive and builtin composite kinds, with one tag per kind. All
//! values crossing the plugin boundary do so in this form. The representation
//! is given by the engine ABI and is not redesigned here; this module models
//! it with one payload per tag, a [`Variant::get_type`] accessor, and one
//! conversion accessor per kind.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::core_types::{
    Aabb, Basis, Color, NodePath, Object, Plane, Quat, Rect2, Rid, Transform, Transform2D,
    Vector2, Vector3,
};
use crate::error::DispatchError;

/// Wire-level type tag. Numbering follows the engine ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum VariantType {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Real = 3,
    String = 4,
    Vector2 = 5,
    Rect2 = 6,
    Vector3 = 7,
    Transform2D = 8,
    Plane = 9,
    Quat = 10,
    Aabb = 11,
    Basis = 12,
    Transform = 13,
    Color = 14,
    NodePath = 15,
    Rid = 16,
    Object = 17,
    Dictionary = 18,
    Array = 19,
    PoolByteArray = 20,
    PoolIntArray = 21,
    PoolRealArray = 22,
    PoolStringArray = 23,
    PoolVector2Array = 24,
    PoolVector3Array = 25,
    PoolColorArray = 26,
}

impl VariantType {
    /// Decode a raw wire tag.
    ///
    /// A tag outside the closed set is a boundary contract violation; the
    /// engine guarantees it only emits known tags, so failure here is fatal
    /// to the call that carried it.
    pub fn from_raw(raw: u32) -> Result<Self, DispatchError> {
        Self::try_from(raw).map_err(|_| DispatchError::UnknownVariantTag { raw })
    }
}

/// Insertion-ordered associative map keyed by variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(Variant, Variant)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing an existing entry with an equal key.
    pub fn insert(&mut self, key: Variant, value: Variant) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Variant) -> Option<&Variant> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Variant, Variant)> {
        self.entries.iter()
    }
}

/// Engine tagged value: one payload per tag in the closed set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
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
}

impl Variant {
    /// The wire tag of this value.
    pub fn get_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Real(_) => VariantType::Real,
            Variant::String(_) => VariantType::String,
            Variant::Vector2(_) => VariantType::Vector2,
            Variant::Rect2(_) => VariantType::Rect2,
            Variant::Vector3(_) => VariantType::Vector3,
            Variant::Transform2D(_) => VariantType::Transform2D,
            Variant::Plane(_) => VariantType::Plane,
            Variant::Quat(_) => VariantType::Quat,
            Variant::Aabb(_) => VariantType::Aabb,
            Variant::Basis(_) => VariantType::Basis,
            Variant::Transform(_) => VariantType::Transform,
            Variant::Color(_) => VariantType::Color,
            Variant::NodePath(_) => VariantType::NodePath,
            Variant::Rid(_) => VariantType::Rid,
            Variant::Object(_) => VariantType::Object,
            Variant::Dictionary(_) => VariantType::Dictionary,
            Variant::Array(_) => VariantType::Array,
            Variant::PoolByteArray(_) => VariantType::PoolByteArray,
            Variant::PoolIntArray(_) => VariantType::PoolIntArray,
            Variant::PoolRealArray(_) => VariantType::PoolRealArray,
            Variant::PoolStringArray(_) => VariantType::PoolStringArray,
            Variant::PoolVector2Array(_) => VariantType::PoolVector2Array,
            Variant::PoolVector3Array(_) => VariantType::PoolVector3Array,
            Variant::PoolColorArray(_) => VariantType::PoolColorArray,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<Vector2> {
        match self {
            Variant::Vector2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<Vector3> {
        match self {
            Variant::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Variant::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<Object> {
        match self {
            Variant::Object(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Variant::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Variant]> {
        match self {
            Variant::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Variant::Int(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Real(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_owned())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::String(v)
    }
}

impl From<Vector2> for Variant {
    fn from(v: Vector2) -> Self {
        Variant::Vector2(v)
    }
}

impl From<Vector3> for Variant {
    fn from(v: Vector3) -> Self {
        Variant::Vector3(v)
    }
}

impl From<Color> for Variant {
    fn from(v: Color) -> Self {
        Variant::Color(v)
    }
}

impl From<Object> for Variant {
    fn from(v: Object) -> Self {
        Variant::Object(v)
    }
}
