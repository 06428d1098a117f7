// Shared bean fixtures for the integration tests
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use beanprobe::{
    Bean, BeanEnum, ConstructionPath, Logger, PropertyDescriptor, PropertyType,
    SerializationCapability, TypeDescriptor,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

//-----------------------------------------------------------------------------
// Sample beans
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Bean)]
#[bean(default)]
pub struct EmptyBean;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, BeanEnum)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Bean)]
#[bean(default)]
pub struct SampleDepthBean {
    pub list: Option<Vec<String>>,
    pub map: Option<BTreeMap<String, String>>,
    pub string: Option<String>,
    pub string_array: Option<Box<[String]>>,
    pub boolean_wrapper: Option<bool>,
    pub int_wrapper: Option<i32>,
    pub long_wrapper: Option<i64>,
    pub double_wrapper: Option<f64>,
    pub float_wrapper: Option<f32>,
    pub character_wrapper: Option<char>,
    pub byte_wrapper: Option<i8>,
    pub byte_array: Option<Box<[Option<i8>]>>,
    pub boolean_primitive: bool,
    pub int_primitive: i32,
    pub long_primitive: i64,
    pub double_primitive: f64,
    pub float_primitive: f32,
    pub char_primitive: char,
    pub byte_primitive: i8,
    pub date: Option<DateTime<Utc>>,
}

impl Hash for SampleDepthBean {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.list.hash(state);
        self.map.hash(state);
        self.string.hash(state);
        self.string_array.hash(state);
        self.boolean_wrapper.hash(state);
        self.int_wrapper.hash(state);
        self.long_wrapper.hash(state);
        self.double_wrapper.map(f64::to_bits).hash(state);
        self.float_wrapper.map(f32::to_bits).hash(state);
        self.character_wrapper.hash(state);
        self.byte_wrapper.hash(state);
        self.byte_array.hash(state);
        self.boolean_primitive.hash(state);
        self.int_primitive.hash(state);
        self.long_primitive.hash(state);
        self.double_primitive.to_bits().hash(state);
        self.float_primitive.to_bits().hash(state);
        self.char_primitive.hash(state);
        self.byte_primitive.hash(state);
        self.date.hash(state);
    }
}

/// Every supported value kind, reachable only through a one-argument constructor
#[derive(Debug, Clone, Default, PartialEq, Bean)]
#[bean(constructor(new, Option<String>), clear = "clear")]
pub struct SampleBean {
    pub logger: Option<Logger>,
    pub empty_bean: Option<EmptyBean>,
    pub sample_depth_bean: Option<SampleDepthBean>,
    pub list: Option<Vec<String>>,
    pub map: Option<BTreeMap<String, String>>,
    pub string: Option<String>,
    pub string_array: Option<Box<[String]>>,
    pub boolean_wrapper: Option<bool>,
    pub int_wrapper: Option<i32>,
    pub long_wrapper: Option<i64>,
    pub double_wrapper: Option<f64>,
    pub float_wrapper: Option<f32>,
    pub character_wrapper: Option<char>,
    pub byte_wrapper: Option<i8>,
    pub byte_array: Option<Box<[Option<i8>]>>,
    pub boolean_primitive: bool,
    pub int_primitive: i32,
    pub long_primitive: i64,
    pub double_primitive: f64,
    pub float_primitive: f32,
    pub char_primitive: char,
    pub byte_primitive: i8,
    pub date: Option<DateTime<Utc>>,
    pub local_date: Option<NaiveDate>,
    pub local_date_time: Option<NaiveDateTime>,
    pub local_time: Option<NaiveTime>,
    pub zoned_date_time: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    #[bean(get = "is_boolean_wrapper_is_setter")]
    boolean_wrapper_is_setter: Option<bool>,
}

impl SampleBean {
    pub fn new(string: Option<String>) -> Self {
        Self {
            string,
            ..Self::default()
        }
    }

    // Nothing to reset; the instance is already in its constructed state.
    pub fn clear(&mut self) {}

    pub fn is_boolean_wrapper_is_setter(&self) -> Option<bool> {
        self.boolean_wrapper_is_setter
    }
}

impl Hash for SampleBean {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.logger.hash(state);
        self.empty_bean.hash(state);
        self.sample_depth_bean.hash(state);
        self.list.hash(state);
        self.map.hash(state);
        self.string.hash(state);
        self.string_array.hash(state);
        self.boolean_wrapper.hash(state);
        self.int_wrapper.hash(state);
        self.long_wrapper.hash(state);
        self.double_wrapper.map(f64::to_bits).hash(state);
        self.float_wrapper.map(f32::to_bits).hash(state);
        self.character_wrapper.hash(state);
        self.byte_wrapper.hash(state);
        self.byte_array.hash(state);
        self.boolean_primitive.hash(state);
        self.int_primitive.hash(state);
        self.long_primitive.hash(state);
        self.double_primitive.to_bits().hash(state);
        self.float_primitive.to_bits().hash(state);
        self.char_primitive.hash(state);
        self.byte_primitive.hash(state);
        self.date.hash(state);
        self.local_date.hash(state);
        self.local_date_time.hash(state);
        self.local_time.hash(state);
        self.zoned_date_time.hash(state);
        self.priority.hash(state);
        self.boolean_wrapper_is_setter.hash(state);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(constructor(new, Option<String>))]
pub struct SampleExtensionBean {
    pub string: Option<String>,
    pub int_wrapper: Option<i32>,
    pub extension: Option<String>,
}

impl SampleExtensionBean {
    pub fn new(string: Option<String>) -> Self {
        Self {
            string,
            ..Self::default()
        }
    }
}

/// Immutable: every property is read-only and set through the constructor
#[derive(Debug, Clone, PartialEq, Hash, Bean)]
#[bean(constructor(new, Option<EmptyBean>, Option<String>, i32, Option<Box<[String]>>))]
pub struct SampleValueObject {
    #[bean(read_only)]
    empty_bean: Option<EmptyBean>,
    #[bean(read_only)]
    string: Option<String>,
    #[bean(read_only)]
    int_primitive: i32,
    #[bean(read_only)]
    string_array: Option<Box<[String]>>,
}

impl SampleValueObject {
    pub fn new(
        empty_bean: Option<EmptyBean>,
        string: Option<String>,
        int_primitive: i32,
        string_array: Option<Box<[String]>>,
    ) -> Self {
        Self {
            empty_bean,
            string,
            int_primitive,
            string_array,
        }
    }

    pub fn string(&self) -> Option<&str> {
        self.string.as_deref()
    }

    pub fn empty_bean(&self) -> Option<&EmptyBean> {
        self.empty_bean.as_ref()
    }
}

//-----------------------------------------------------------------------------
// Nesting
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default)]
pub struct Inner {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default)]
pub struct Middle {
    pub label: Option<String>,
    pub inner: Option<Inner>,
}

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default)]
pub struct Outer {
    pub label: Option<String>,
    pub middle: Option<Middle>,
}

/// A bean holding a property of its own type
#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default)]
pub struct Node {
    pub value: Option<i32>,
    pub next: Option<Box<Node>>,
}

//-----------------------------------------------------------------------------
// Serialization, clear and constructors
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Bean)]
#[bean(
    default,
    constructor(named, Option<String>),
    serializable,
    clear = "clear",
    post_construct = "normalize"
)]
pub struct SerializableBean {
    pub name: Option<String>,
    pub count: i32,
    pub tags: Vec<String>,
}

impl SerializableBean {
    pub fn named(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn normalize(&mut self) {
        self.tags.sort();
    }
}

/// Loses its nested bean on every serialization round trip
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Bean)]
#[bean(constructor(new), serializable)]
pub struct NonSerializableBean {
    #[serde(skip)]
    pub empty_bean: Option<EmptyBean>,
}

impl NonSerializableBean {
    pub fn new() -> Self {
        Self {
            empty_bean: Some(EmptyBean),
        }
    }
}

/// Serializes, but can never be read back
#[derive(Debug, Clone, Default, PartialEq, Hash)]
pub struct NonDeserializableBean {
    pub list: Vec<String>,
}

impl Bean for NonDeserializableBean {
    fn properties() -> Vec<PropertyDescriptor<Self>> {
        vec![PropertyDescriptor::read_write::<Vec<String>>(
            "list",
            |bean| bean.list.to_value(),
            |bean, value| {
                bean.list = PropertyType::from_value(value)?;
                Ok(())
            },
        )]
    }

    fn construction_paths() -> Vec<ConstructionPath<Self>> {
        vec![ConstructionPath::default_path()]
    }

    fn serialization() -> Option<SerializationCapability<Self>> {
        Some(SerializationCapability::new(
            |bean| Ok(bean.list.join(",").into_bytes()),
            |_| Err("list elements cannot be restored".to_string()),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default, clear = "reset")]
pub struct BrokenClearBean {
    pub count: i32,
}

impl BrokenClearBean {
    pub fn reset(&mut self) {
        self.count = 7;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default, constructor(with_limit, i32), deprecated_constructor(legacy))]
pub struct FaultyConstructorBean {
    pub limit: i32,
}

impl FaultyConstructorBean {
    pub fn with_limit(limit: i32) -> Self {
        assert!(limit <= 0, "limit must not be positive");
        Self { limit }
    }

    pub fn legacy() -> Self {
        panic!("legacy construction is gone")
    }
}

//-----------------------------------------------------------------------------
// Accessor and mutator variations
//-----------------------------------------------------------------------------

/// Rejects or panics on some writes
#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default)]
pub struct GuardedBean {
    pub name: Option<String>,
    #[bean(set = "set_level")]
    pub level: i32,
    #[bean(try_set = "set_code")]
    pub code: Option<String>,
    pub enabled: bool,
}

impl GuardedBean {
    pub fn set_level(&mut self, _level: i32) {
        panic!("level is fixed")
    }

    pub fn set_code(&mut self, code: Option<String>) -> Result<(), String> {
        match code {
            Some(code) if code.len() > 4 => Err(format!("code {code} is longer than 4 characters")),
            code => {
                self.code = code;
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Hash, Bean)]
#[bean(default, post_construct = "open")]
pub struct AccountBean {
    #[bean(rename = "owner")]
    pub owner_name: Option<String>,
    #[bean(write_only)]
    pub secret: Option<String>,
    #[bean(skip)]
    pub internal: i64,
    #[bean(read_only)]
    pub created: bool,
    pub balance: i64,
}

impl AccountBean {
    pub fn open(&mut self) {
        self.created = true;
    }
}

/// Hand-written table with a property whose accessor and mutator disagree
#[derive(Debug, Clone, Default, PartialEq, Hash)]
pub struct MismatchedBean {
    pub label: Option<String>,
    pub count: i32,
}

impl Bean for MismatchedBean {
    fn properties() -> Vec<PropertyDescriptor<Self>> {
        vec![
            PropertyDescriptor::read_write::<Option<String>>(
                "label",
                |bean| bean.label.to_value(),
                |bean, value| {
                    bean.label = PropertyType::from_value(value)?;
                    Ok(())
                },
            ),
            PropertyDescriptor::<Self>::new("count")
                .with_accessor(i32::descriptor(), |bean| bean.count.to_value())
                .with_mutator(i64::descriptor(), |bean, value| {
                    bean.count = i64::from_value(value)? as i32;
                    Ok(())
                }),
            PropertyDescriptor::<Self>::new("elapsed")
                .with_accessor(TypeDescriptor::opaque::<std::time::Duration>(), |_| {
                    beanprobe::Value::Absent
                }),
        ]
    }

    fn construction_paths() -> Vec<ConstructionPath<Self>> {
        vec![ConstructionPath::default_path()]
    }
}

/// Equality looks at the name only, but the hash covers the note as well
#[derive(Debug, Clone, Default, Bean)]
#[bean(default)]
pub struct InconsistentBean {
    pub name: Option<String>,
    pub note: Option<String>,
}

impl PartialEq for InconsistentBean {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for InconsistentBean {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.note.hash(state);
    }
}

/// Map-valued properties, including a concurrent map
#[derive(Debug, Clone, Default, Bean)]
#[bean(default)]
pub struct ConcurrentBean {
    pub label: Option<String>,
    pub hash_map: HashMap<String, i64>,
    pub concurrent_map: Option<DashMap<String, String>>,
}

impl PartialEq for ConcurrentBean {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.hash_map == other.hash_map
            && entries(&self.concurrent_map) == entries(&other.concurrent_map)
    }
}

fn entries(map: &Option<DashMap<String, String>>) -> Option<BTreeMap<String, String>> {
    map.as_ref().map(|map| {
        map.iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    })
}

/// Counters in integer widths that get no synthesized value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Bean)]
#[bean(default)]
pub struct TallyBean {
    pub count: u32,
    pub total: Option<u64>,
}
