//! Bean registration.
//!
//! A bean publishes its property table, construction paths and optional
//! capabilities through the [`Bean`] trait. `#[derive(Bean)]` writes the
//! implementation; hand-written implementations are equally valid.

use std::any::{type_name, Any};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PropertyFault;
use crate::synthesizer::nested_value;
use crate::value::{BeanShape, PropertyType, TypeDescriptor, Value, ValueKind};

/// Reads a property value
pub type Getter<T> = fn(&T) -> Value;

/// Writes a property value
pub type Setter<T> = fn(&mut T, Value) -> Result<(), PropertyFault>;

/// Produces an instance from synthesized arguments
pub type Constructor<T> = fn(Vec<Value>) -> Result<T, PropertyFault>;

/// A data-holder type exposing properties through accessor/mutator pairs
pub trait Bean: Sized + 'static {
    /// The property table, in declaration order
    fn properties() -> Vec<PropertyDescriptor<Self>>;

    /// Ways to produce an instance, in declaration order
    fn construction_paths() -> Vec<ConstructionPath<Self>> {
        Vec::new()
    }

    /// Zero-argument "reset to default" operation
    fn clear_hook() -> Option<fn(&mut Self)> {
        None
    }

    /// Zero-argument hooks to run after construction
    fn post_construct_hooks() -> Vec<fn(&mut Self)> {
        Vec::new()
    }

    /// Byte-oriented serialization, when the type participates in it
    fn serialization() -> Option<SerializationCapability<Self>> {
        None
    }

    fn bean_name() -> &'static str {
        type_name::<Self>()
    }
}

/// Whether `B` has a non-deprecated zero-argument construction path
pub fn has_zero_argument_path<B: Bean>() -> bool {
    B::construction_paths()
        .iter()
        .any(|path| !path.deprecated && path.is_zero_argument())
}

//-----------------------------------------------------------------------------
// Property descriptors
//-----------------------------------------------------------------------------

/// Read side of a property
pub struct Accessor<T> {
    pub value_type: TypeDescriptor,
    get: Getter<T>,
}

/// Write side of a property
pub struct Mutator<T> {
    pub value_type: TypeDescriptor,
    set: Setter<T>,
}

/// A named property with its optional accessor and mutator
pub struct PropertyDescriptor<T> {
    pub name: &'static str,
    pub accessor: Option<Accessor<T>>,
    pub mutator: Option<Mutator<T>>,
}

impl<T> PropertyDescriptor<T> {
    /// A property with neither side; add them with `with_accessor`/`with_mutator`
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            accessor: None,
            mutator: None,
        }
    }

    /// A readable and writable property of type `V`
    pub fn read_write<V: PropertyType>(name: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        Self::new(name)
            .with_accessor(V::descriptor(), get)
            .with_mutator(V::descriptor(), set)
    }

    /// A property of type `V` without a mutator
    pub fn read_only<V: PropertyType>(name: &'static str, get: Getter<T>) -> Self {
        Self::new(name).with_accessor(V::descriptor(), get)
    }

    /// A property of type `V` without an accessor
    pub fn write_only<V: PropertyType>(name: &'static str, set: Setter<T>) -> Self {
        Self::new(name).with_mutator(V::descriptor(), set)
    }

    pub fn with_accessor(mut self, value_type: TypeDescriptor, get: Getter<T>) -> Self {
        self.accessor = Some(Accessor { value_type, get });
        self
    }

    pub fn with_mutator(mut self, value_type: TypeDescriptor, set: Setter<T>) -> Self {
        self.mutator = Some(Mutator { value_type, set });
        self
    }

    /// Both sides exist and the mutator takes exactly what the accessor returns
    pub fn is_testable(&self) -> bool {
        match (&self.accessor, &self.mutator) {
            (Some(accessor), Some(mutator)) => accessor.value_type.same_type(&mutator.value_type),
            _ => false,
        }
    }

    /// Declared value type, taken from the accessor when present
    pub fn value_type(&self) -> Option<&TypeDescriptor> {
        self.accessor
            .as_ref()
            .map(|accessor| &accessor.value_type)
            .or_else(|| self.mutator.as_ref().map(|mutator| &mutator.value_type))
    }

    /// Invoke the accessor
    pub fn read(&self, bean: &T) -> Result<Value, PropertyFault> {
        let accessor = self.accessor.as_ref().ok_or(PropertyFault::NotReadable)?;
        catch_unwind(AssertUnwindSafe(|| (accessor.get)(bean))).map_err(PropertyFault::from_panic)
    }

    /// Invoke the mutator
    pub fn write(&self, bean: &mut T, value: Value) -> Result<(), PropertyFault> {
        let mutator = self.mutator.as_ref().ok_or(PropertyFault::NotWritable)?;
        catch_unwind(AssertUnwindSafe(|| (mutator.set)(bean, value)))
            .map_err(PropertyFault::from_panic)?
    }
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            accessor: self.accessor.as_ref().map(|accessor| Accessor {
                value_type: accessor.value_type.clone(),
                get: accessor.get,
            }),
            mutator: self.mutator.as_ref().map(|mutator| Mutator {
                value_type: mutator.value_type.clone(),
                set: mutator.set,
            }),
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("accessor", &self.accessor.as_ref().map(|a| a.value_type.name))
            .field("mutator", &self.mutator.as_ref().map(|m| m.value_type.name))
            .finish()
    }
}

//-----------------------------------------------------------------------------
// Construction paths
//-----------------------------------------------------------------------------

/// One way of producing an instance
pub struct ConstructionPath<T> {
    pub name: &'static str,
    pub parameters: Vec<TypeDescriptor>,
    pub deprecated: bool,
    invoke: Constructor<T>,
}

impl<T> ConstructionPath<T> {
    pub fn new(name: &'static str, parameters: Vec<TypeDescriptor>, invoke: Constructor<T>) -> Self {
        Self {
            name,
            parameters,
            deprecated: false,
            invoke,
        }
    }

    /// Zero-argument path through `Default`
    pub fn default_path() -> Self
    where
        T: Default,
    {
        Self::new("default", Vec::new(), |_| Ok(T::default()))
    }

    /// Mark the path deprecated; the factory and constructor checks skip it
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn is_zero_argument(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Run the path with the given arguments
    pub fn invoke(&self, arguments: Vec<Value>) -> Result<T, PropertyFault> {
        if arguments.len() != self.parameters.len() {
            return Err(PropertyFault::Rejected(format!(
                "expected {} argument(s), got {}",
                self.parameters.len(),
                arguments.len()
            )));
        }
        catch_unwind(AssertUnwindSafe(|| (self.invoke)(arguments))).map_err(PropertyFault::from_panic)?
    }
}

impl<T> fmt::Debug for ConstructionPath<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionPath")
            .field("name", &self.name)
            .field(
                "parameters",
                &self.parameters.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

//-----------------------------------------------------------------------------
// Serialization capability
//-----------------------------------------------------------------------------

/// Byte-oriented serialize/deserialize pair
pub struct SerializationCapability<T> {
    serialize: fn(&T) -> Result<Vec<u8>, String>,
    deserialize: fn(&[u8]) -> Result<T, String>,
}

impl<T> SerializationCapability<T> {
    pub fn new(
        serialize: fn(&T) -> Result<Vec<u8>, String>,
        deserialize: fn(&[u8]) -> Result<T, String>,
    ) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }

    /// Capability backed by `bincode`
    pub fn bincode() -> Self
    where
        T: Serialize + DeserializeOwned,
    {
        Self::new(
            |bean| bincode::serialize(bean).map_err(|e| e.to_string()),
            |bytes| bincode::deserialize(bytes).map_err(|e| e.to_string()),
        )
    }

    pub fn serialize(&self, bean: &T) -> Result<Vec<u8>, String> {
        (self.serialize)(bean)
    }

    pub fn deserialize(&self, bytes: &[u8]) -> Result<T, String> {
        (self.deserialize)(bytes)
    }
}

//-----------------------------------------------------------------------------
// Nested bean values
//-----------------------------------------------------------------------------

/// Object-safe view of a bean stored inside a `Value`
pub trait AnyBean: Any + fmt::Debug {
    fn clone_boxed(&self) -> Box<dyn AnyBean>;
    fn eq_dyn(&self, other: &dyn AnyBean) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn bean_type_name(&self) -> &'static str;
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> AnyBean for T {
    fn clone_boxed(&self) -> Box<dyn AnyBean> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn AnyBean) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn bean_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A type-erased value carried by `Value::Bean` or `Value::Opaque`
pub struct BeanValue(Box<dyn AnyBean>);

impl BeanValue {
    pub fn new<B: Clone + PartialEq + fmt::Debug + 'static>(bean: B) -> Self {
        Self(Box::new(bean))
    }

    pub fn type_name(&self) -> &'static str {
        (*self.0).bean_type_name()
    }

    pub fn downcast_ref<B: 'static>(&self) -> Option<&B> {
        (*self.0).as_any().downcast_ref::<B>()
    }

    /// Take the bean out as `B`
    pub fn downcast<B: 'static>(self) -> Result<B, PropertyFault> {
        let found = self.type_name();
        self.0
            .into_any()
            .downcast::<B>()
            .map(|bean| *bean)
            .map_err(|_| PropertyFault::mismatch(type_name::<B>(), found))
    }
}

impl Clone for BeanValue {
    fn clone(&self) -> Self {
        Self((*self.0).clone_boxed())
    }
}

impl PartialEq for BeanValue {
    fn eq(&self, other: &Self) -> bool {
        (*self.0).eq_dyn(&*other.0)
    }
}

impl fmt::Debug for BeanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Descriptor of a bean used as a property value type
pub fn bean_descriptor<B>() -> TypeDescriptor
where
    B: Bean + Clone + PartialEq + fmt::Debug,
{
    TypeDescriptor::of::<B>(ValueKind::Bean(BeanShape {
        zero_argument: has_zero_argument_path::<B>,
        nested: nested_value::<B>,
    }))
}

/// Convert a bean read from a property
pub fn bean_to_value<B>(bean: &B) -> Value
where
    B: Clone + PartialEq + fmt::Debug + 'static,
{
    Value::Bean(BeanValue::new(bean.clone()))
}

/// Convert a value handed to a bean-typed mutator
pub fn bean_from_value<B: 'static>(value: Value) -> Result<B, PropertyFault> {
    match value {
        Value::Bean(bean) => bean.downcast::<B>(),
        other => Err(PropertyFault::mismatch(type_name::<B>(), other.variant_name())),
    }
}

//-----------------------------------------------------------------------------
// Equivalence contract
//-----------------------------------------------------------------------------

/// Equality, hash and string representation as seen by the contract checks
pub trait Equivalence: Any + fmt::Debug {
    /// Equal to `other`; a different concrete type or absent is never equal
    fn equals_any(&self, other: Option<&dyn Any>) -> bool;

    /// The type's own `Hash`, folded through `DefaultHasher`
    fn contract_hash(&self) -> u64;

    /// String representation
    fn render(&self) -> String;
}

impl<T: PartialEq + Hash + fmt::Debug + 'static> Equivalence for T {
    fn equals_any(&self, other: Option<&dyn Any>) -> bool {
        other
            .and_then(|other| other.downcast_ref::<T>())
            .map_or(false, |other| self == other)
    }

    fn contract_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn render(&self) -> String {
        format!("{:?}", self)
    }
}

/// `a == b` under the contract, for any pair of types
pub fn equivalent<A: Equivalence, B: Any>(a: &A, b: &B) -> bool {
    a.equals_any(Some(b as &dyn Any))
}
