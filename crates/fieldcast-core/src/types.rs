//! Core value and entity types
//!
//! Entities expose their fields through the small [`Entity`] capability
//! interface instead of runtime reflection. Field contents travel as
//! [`Value`]s, and nested entities are shared through [`ObjectRef`] handles so
//! that an intermediate object materialised on a target path stays attached
//! to its owner.
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::error::FieldAccessError;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Declared or runtime type of a field value
///
/// Rust has no primitive/boxed split, so the type used for transformer
/// lookup is always the declared variant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Assignable from every type
    Any,
    Boolean,
    Char,
    /// Assignable from every numeric type
    Number,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Date,
    List,
    /// A registered entity type, by name
    Entity(&'static str),
}

impl ValueType {
    /// Whether this is one of the concrete numeric types
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Short | ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double
        )
    }

    /// Display name of the type
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Any => "Any",
            ValueType::Boolean => "Boolean",
            ValueType::Char => "Char",
            ValueType::Number => "Number",
            ValueType::Short => "Short",
            ValueType::Int => "Int",
            ValueType::Long => "Long",
            ValueType::Float => "Float",
            ValueType::Double => "Double",
            ValueType::String => "String",
            ValueType::Date => "Date",
            ValueType::List => "List",
            ValueType::Entity(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    Boolean(bool),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(DateTime<Utc>),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value, `None` for [`Value::Null`]
    pub fn value_type(&self) -> Option<ValueType> {
        let ty = match self {
            Value::Null => return None,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Char(_) => ValueType::Char,
            Value::Short(_) => ValueType::Short,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Date(_) => ValueType::Date,
            Value::List(_) => ValueType::List,
            Value::Object(object) => ValueType::Entity(object.type_name()),
        };
        Some(ty)
    }

    /// Type name used in diagnostics
    pub fn type_label(&self) -> &'static str {
        self.value_type().map_or("null", |ty| ty.name())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral view of any numeric value; floating values are truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Short(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            Value::Float(n) => Some(*n as i64),
            Value::Double(n) => Some(*n as i64),
            _ => None,
        }
    }

    /// Floating view of any numeric value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Short(n) => Some(f64::from(*n)),
            Value::Int(n) => Some(f64::from(*n)),
            Value::Long(n) => Some(*n as f64),
            Value::Float(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert into a Rust field type, naming `field` on mismatch
    ///
    /// This is the helper entity setters use:
    ///
    /// ```
    /// use fieldcast_core::Value;
    ///
    /// let name: String = Value::from("Ada").extract("name").unwrap();
    /// assert_eq!(name, "Ada");
    /// assert!(Value::Int(3).extract::<String>("name").is_err());
    /// ```
    pub fn extract<T: FromValue>(self, field: &str) -> Result<T, FieldAccessError> {
        let found = self.type_label();
        T::from_value(self).ok_or_else(|| FieldAccessError::TypeMismatch {
            field: field.to_string(),
            expected: T::EXPECTED.to_string(),
            found: found.to_string(),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(object) => write!(f, "{}", object.type_name()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    DateTime<Utc> => Date,
    ObjectRef => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a [`Value`] into a Rust field type
pub trait FromValue: Sized {
    /// Type name reported when the conversion fails
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = stringify!($variant);

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_value! {
    bool => Boolean,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    DateTime<Utc> => Date,
}

impl FromValue for ObjectRef {
    const EXPECTED: &'static str = "Object";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "Any";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "List";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// Downcasting support for entities
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Field access capability implemented by every mappable type
///
/// `get_field` returns `None` only for names the type does not have; a
/// field that is present but empty reads as `Some(Value::Null)`.
pub trait Entity: AsAny + Send + Sync {
    /// Registered type name, matching the type's `EntitySchema`
    fn type_name(&self) -> &'static str;

    fn get_field(&self, name: &str) -> Option<Value>;

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError>;
}

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.type_name())
    }
}

/// An entity whose type name is known statically
pub trait TypedEntity: Entity + Sized {
    const TYPE_NAME: &'static str;
}

/// Shared handle to a nested entity
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Box<dyn Entity>>>);

impl ObjectRef {
    pub fn new<E: Entity>(entity: E) -> Self {
        Self::from_boxed(Box::new(entity))
    }

    pub fn from_boxed(entity: Box<dyn Entity>) -> Self {
        ObjectRef(Arc::new(RwLock::new(entity)))
    }

    /// Lock for reading; a poisoned lock still yields the entity
    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn Entity>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock for writing; a poisoned lock still yields the entity
    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Entity>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn type_name(&self) -> &'static str {
        self.read().type_name()
    }

    /// Read one field of the referenced entity
    pub fn get(&self, field: &str) -> Option<Value> {
        self.read().get_field(field)
    }

    /// Run `f` against the referenced entity downcast to `E`
    pub fn with<E: Entity, R>(&self, f: impl FnOnce(&E) -> R) -> Option<R> {
        let guard = self.read();
        let entity: &dyn Entity = &**guard;
        entity.as_any().downcast_ref::<E>().map(f)
    }

    /// Whether both handles point at the same entity
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Ok(guard) => write!(f, "ObjectRef({})", guard.type_name()),
            Err(_) => f.write_str("ObjectRef(<locked>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Point {
        x: i32,
        label: Option<String>,
    }

    impl Entity for Point {
        fn type_name(&self) -> &'static str {
            "Point"
        }

        fn get_field(&self, name: &str) -> Option<Value> {
            match name {
                "x" => Some(self.x.into()),
                "label" => Some(self.label.clone().into()),
                _ => None,
            }
        }

        fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldAccessError> {
            match name {
                "x" => self.x = value.extract(name)?,
                "label" => self.label = value.extract(name)?,
                _ => return Err(FieldAccessError::UnknownField(name.to_string())),
            }
            Ok(())
        }
    }

    #[test]
    fn test_value_types() {
        assert_eq!(Value::Null.value_type(), None);
        assert_eq!(Value::from(1i64).value_type(), Some(ValueType::Long));
        assert_eq!(Value::from("a").value_type(), Some(ValueType::String));
        let object = ObjectRef::new(Point::default());
        assert_eq!(
            Value::Object(object).value_type(),
            Some(ValueType::Entity("Point"))
        );
    }

    #[test]
    fn test_extract_reports_mismatch() {
        let err = Value::from("seven").extract::<i32>("x").unwrap_err();
        assert_eq!(
            err,
            FieldAccessError::TypeMismatch {
                field: "x".to_string(),
                expected: "Int".to_string(),
                found: "String".to_string(),
            }
        );
    }

    #[test]
    fn test_optional_and_list_extraction() {
        let none: Option<String> = Value::Null.extract("label").unwrap();
        assert_eq!(none, None);

        let tags: Vec<String> = Value::from(vec!["x", "y"]).extract("tags").unwrap();
        assert_eq!(tags, vec!["x".to_string(), "y".to_string()]);

        assert!(Value::List(vec![Value::Int(1)]).extract::<Vec<String>>("tags").is_err());
    }

    #[test]
    fn test_object_ref_shares_state() {
        let object = ObjectRef::new(Point::default());
        let alias = object.clone();
        alias.write().set_field("x", Value::Int(4)).unwrap();

        assert_eq!(object.get("x"), Some(Value::Int(4)));
        assert_eq!(object.with(|p: &Point| p.x), Some(4));
        assert!(object.ptr_eq(&alias));
        assert_ne!(object, ObjectRef::new(Point::default()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec![1i32, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(ValueType::Entity("Point").to_string(), "Point");
    }

    #[test]
    fn test_boxed_entity_debug() {
        let boxed: Box<dyn Entity> = Box::new(Point::default());
        assert_eq!(format!("{:?}", boxed), "Entity(Point)");

        let failed: std::result::Result<Box<dyn Entity>, &str> = Err("nope");
        assert_eq!(failed.unwrap_err(), "nope");
    }
}
