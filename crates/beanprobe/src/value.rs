// Value Model
//
// Every property value crosses the accessor/mutator boundary as a `Value`.
// Field types opt in through `PropertyType`, which also reports the field's
// `TypeDescriptor` so the synthesizer can pick a construction strategy without
// inspecting the concrete type.

use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dashmap::DashMap;

use crate::bean::BeanValue;
use crate::error::{PropertyFault, Result};
use crate::logging::Logger;
use crate::synthesizer::ValueSynthesizer;

/// A dynamically typed property value
#[derive(Debug, Clone)]
pub enum Value {
    /// No value; the `None` of a nullable property
    Absent,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    Float(f32),
    Character(char),
    Byte(i8),
    Text(String),
    Array(Vec<Value>),
    Sequence(Vec<Value>),
    Mapping(Vec<(Value, Value)>),
    ConcurrentMapping(Vec<(Value, Value)>),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    LocalDateTime(NaiveDateTime),
    Enumerated {
        type_name: &'static str,
        variant: &'static str,
    },
    Logger(Logger),
    Bean(BeanValue),
    /// A value of a type the synthesizer never builds, carried as-is
    Opaque(BeanValue),
}

impl Value {
    /// Name of the variant, used in mismatch reports
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Absent => "Absent",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Long(_) => "Long",
            Value::Double(_) => "Double",
            Value::Float(_) => "Float",
            Value::Character(_) => "Character",
            Value::Byte(_) => "Byte",
            Value::Text(_) => "Text",
            Value::Array(_) => "Array",
            Value::Sequence(_) => "Sequence",
            Value::Mapping(_) => "Mapping",
            Value::ConcurrentMapping(_) => "ConcurrentMapping",
            Value::DateTime(_) => "DateTime",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::LocalDateTime(_) => "LocalDateTime",
            Value::Enumerated { .. } => "Enumerated",
            Value::Logger(_) => "Logger",
            Value::Bean(_) => "Bean",
            Value::Opaque(_) => "Opaque",
        }
    }
}

// Floating point values compare by bit pattern, so a NaN read back from a
// property still matches the NaN that was written.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Character(a), Value::Character(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => same_entries(a, b),
            (Value::ConcurrentMapping(a), Value::ConcurrentMapping(b)) => same_entries(a, b),
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::LocalDateTime(a), Value::LocalDateTime(b)) => a == b,
            (
                Value::Enumerated {
                    type_name: ta,
                    variant: va,
                },
                Value::Enumerated {
                    type_name: tb,
                    variant: vb,
                },
            ) => ta == tb && va == vb,
            (Value::Logger(a), Value::Logger(b)) => a == b,
            (Value::Bean(a), Value::Bean(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

// Map iteration order is unspecified, so entries match irrespective of order.
fn same_entries(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    a.len() == b.len() && a.iter().all(|entry| b.contains(entry))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Character(v) => write!(f, "{:?}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::Array(items) | Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Mapping(entries) | Value::ConcurrentMapping(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::LocalDateTime(v) => write!(f, "{}", v),
            Value::Enumerated { variant, .. } => write!(f, "{}", variant),
            Value::Logger(logger) => write!(f, "Logger({})", logger.target()),
            Value::Bean(bean) => write!(f, "{:?}", bean),
            Value::Opaque(inner) => write!(f, "{:?}", inner),
        }
    }
}

/// Temporal value categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    DateTime,
    Date,
    Time,
    LocalDateTime,
}

/// How a nested bean type is built
#[derive(Debug, Clone, Copy)]
pub struct BeanShape {
    /// Whether a non-deprecated zero-argument construction path exists
    pub zero_argument: fn() -> bool,
    /// Construct (and, when the synthesizer says so, populate) an instance
    pub nested: fn(&ValueSynthesizer) -> Result<Value>,
}

/// Closed classification of value types
#[derive(Debug, Clone)]
pub enum ValueKind {
    Boolean,
    Integer,
    Long,
    Double,
    Float,
    Character,
    Byte,
    Text,
    /// Fixed-size array of the component type
    Array(Box<TypeDescriptor>),
    Sequence,
    Mapping,
    ConcurrentMapping,
    Temporal(TemporalKind),
    /// Fieldless enum; `first` yields the first declared variant
    Enumerated { first: fn() -> Value },
    Logger,
    Bean(BeanShape),
    /// Anything else; values are never synthesized for it
    Opaque,
}

/// Describes the declared type of a property value
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub id: TypeId,
    /// `true` for `Option<T>`: absent is representable
    pub nullable: bool,
    pub kind: ValueKind,
}

impl TypeDescriptor {
    /// Describe `T` with the given kind
    pub fn of<T: 'static>(kind: ValueKind) -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
            nullable: false,
            kind,
        }
    }

    /// Describe `T` as a type no value can be synthesized for
    pub fn opaque<T: 'static>() -> Self {
        Self::of::<T>(ValueKind::Opaque)
    }

    /// Whether values of this type describe the same declared type
    pub fn same_type(&self, other: &TypeDescriptor) -> bool {
        self.id == other.id
    }
}

/// Conversion between a field type and `Value`
pub trait PropertyType: Sized + 'static {
    /// Descriptor for the declared type
    fn descriptor() -> TypeDescriptor;

    /// Read the current value
    fn to_value(&self) -> Value;

    /// Convert a value into the declared type
    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault>;
}

fn mismatch<T>(found: &Value) -> PropertyFault {
    PropertyFault::mismatch(type_name::<T>(), found.variant_name())
}

macro_rules! scalar_property_type {
    ($ty:ty, $kind:expr, $variant:ident) => {
        impl PropertyType for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::of::<$ty>($kind)
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(mismatch::<$ty>(&other)),
                }
            }
        }
    };
}

scalar_property_type!(bool, ValueKind::Boolean, Boolean);
scalar_property_type!(i32, ValueKind::Integer, Integer);
scalar_property_type!(i64, ValueKind::Long, Long);
scalar_property_type!(f64, ValueKind::Double, Double);
scalar_property_type!(f32, ValueKind::Float, Float);
scalar_property_type!(char, ValueKind::Character, Character);
scalar_property_type!(i8, ValueKind::Byte, Byte);
scalar_property_type!(String, ValueKind::Text, Text);
scalar_property_type!(
    DateTime<Utc>,
    ValueKind::Temporal(TemporalKind::DateTime),
    DateTime
);
scalar_property_type!(NaiveDate, ValueKind::Temporal(TemporalKind::Date), Date);
scalar_property_type!(NaiveTime, ValueKind::Temporal(TemporalKind::Time), Time);
scalar_property_type!(
    NaiveDateTime,
    ValueKind::Temporal(TemporalKind::LocalDateTime),
    LocalDateTime
);
scalar_property_type!(Logger, ValueKind::Logger, Logger);

// Integer widths outside the supported numeric set. They still register as
// properties, but the synthesizer has no value for them.
macro_rules! opaque_property_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PropertyType for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::opaque::<$ty>()
                }

                fn to_value(&self) -> Value {
                    Value::Opaque(BeanValue::new(*self))
                }

                fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
                    match value {
                        Value::Opaque(inner) => inner.downcast::<$ty>(),
                        other => Err(mismatch::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

opaque_property_type!(u8, u16, u32, u64, u128, usize, i16, i128, isize);

impl<T: PropertyType> PropertyType for Option<T> {
    fn descriptor() -> TypeDescriptor {
        let inner = T::descriptor();
        TypeDescriptor {
            name: type_name::<Self>(),
            id: TypeId::of::<Self>(),
            nullable: true,
            kind: inner.kind,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Absent,
        }
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        match value {
            Value::Absent => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: PropertyType> PropertyType for Box<T> {
    fn descriptor() -> TypeDescriptor {
        let inner = T::descriptor();
        TypeDescriptor {
            name: type_name::<Self>(),
            id: TypeId::of::<Self>(),
            nullable: inner.nullable,
            kind: inner.kind,
        }
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: PropertyType> PropertyType for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(ValueKind::Array(Box::new(T::descriptor())))
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(PropertyType::to_value).collect())
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(T::from_value)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Vec::into_boxed_slice),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: PropertyType> PropertyType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(ValueKind::Sequence)
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(PropertyType::to_value).collect())
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

fn entries_from<K: PropertyType, V: PropertyType>(
    entries: Vec<(Value, Value)>,
) -> impl Iterator<Item = std::result::Result<(K, V), PropertyFault>> {
    entries
        .into_iter()
        .map(|(key, value)| Ok((K::from_value(key)?, V::from_value(value)?)))
}

impl<K, V> PropertyType for HashMap<K, V>
where
    K: PropertyType + Eq + Hash,
    V: PropertyType,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(ValueKind::Mapping)
    }

    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(key, value)| (key.to_value(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        match value {
            Value::Mapping(entries) => entries_from(entries).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K, V> PropertyType for BTreeMap<K, V>
where
    K: PropertyType + Ord,
    V: PropertyType,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(ValueKind::Mapping)
    }

    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(key, value)| (key.to_value(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        match value {
            Value::Mapping(entries) => entries_from(entries).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K, V> PropertyType for DashMap<K, V>
where
    K: PropertyType + Eq + Hash,
    V: PropertyType,
{
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(ValueKind::ConcurrentMapping)
    }

    fn to_value(&self) -> Value {
        Value::ConcurrentMapping(
            self.iter()
                .map(|entry| (entry.key().to_value(), entry.value().to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> std::result::Result<Self, PropertyFault> {
        match value {
            Value::ConcurrentMapping(entries) => {
                let map = DashMap::new();
                for entry in entries_from::<K, V>(entries) {
                    let (key, value) = entry?;
                    map.insert(key, value);
                }
                Ok(map)
            }
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_option_is_nullable_form() {
        let plain = <bool as PropertyType>::descriptor();
        let boxed = <Option<bool> as PropertyType>::descriptor();

        assert!(!plain.nullable);
        assert!(boxed.nullable);
        assert!(matches!(boxed.kind, ValueKind::Boolean));
        assert!(!plain.same_type(&boxed));

        assert_eq!(Option::<bool>::from_value(Value::Absent), Ok(None));
        assert_eq!(None::<bool>.to_value(), Value::Absent);
        assert_eq!(
            bool::from_value(Value::Absent),
            Err(PropertyFault::mismatch("bool", "Absent"))
        );
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let a = Value::Mapping(vec![
            (Value::Text("a".into()), Value::Integer(1)),
            (Value::Text("b".into()), Value::Integer(2)),
        ]);
        let b = Value::Mapping(vec![
            (Value::Text("b".into()), Value::Integer(2)),
            (Value::Text("a".into()), Value::Integer(1)),
        ]);
        assert_eq!(a, b);
        assert_ne!(a, Value::ConcurrentMapping(vec![]));
    }

    #[test]
    fn test_nan_matches_itself() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_containers_convert_elementwise() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), Some(3_i64));
        let value = map.to_value();
        let back = HashMap::<String, Option<i64>>::from_value(value).unwrap();
        assert_eq!(back, map);

        let concurrent: DashMap<String, String> = DashMap::new();
        concurrent.insert("x".into(), "y".into());
        let back = DashMap::<String, String>::from_value(concurrent.to_value()).unwrap();
        assert_eq!(back.get("x").map(|v| v.clone()), Some("y".to_string()));

        let array: Box<[i8]> = vec![1, 2].into_boxed_slice();
        assert!(matches!(
            <Box<[i8]> as PropertyType>::descriptor().kind,
            ValueKind::Array(ref component) if matches!(component.kind, ValueKind::Byte)
        ));
        assert_eq!(Box::<[i8]>::from_value(array.to_value()).unwrap(), array);
    }

    #[test]
    fn test_wrong_variant_is_type_mismatch() {
        let fault = Vec::<String>::from_value(Value::Text("nope".into())).unwrap_err();
        assert!(matches!(fault, PropertyFault::TypeMismatch { found: "Text", .. }));
    }

    #[test]
    fn test_other_integer_widths_are_opaque() {
        assert!(matches!(<u32 as PropertyType>::descriptor().kind, ValueKind::Opaque));
        assert!(<Option<u64> as PropertyType>::descriptor().nullable);

        let value = 7_u32.to_value();
        assert_eq!(value.variant_name(), "Opaque");
        assert_eq!(u32::from_value(value.clone()), Ok(7));
        assert_ne!(value, 7_u64.to_value());
        assert_eq!(
            u64::from_value(value),
            Err(PropertyFault::mismatch("u64", "u32"))
        );
    }

    proptest! {
        #[test]
        fn prop_text_survives_conversion(text in ".*") {
            let value = text.to_value();
            prop_assert_eq!(String::from_value(value.clone()).unwrap(), text);
            prop_assert_eq!(value.clone(), value);
        }

        #[test]
        fn prop_sequences_survive_conversion(items in proptest::collection::vec(any::<i32>(), 0..16)) {
            let back = Vec::<i32>::from_value(items.to_value()).unwrap();
            prop_assert_eq!(back, items);
        }
    }
}
