//! Value synthesis.
//!
//! Classifies a [`TypeDescriptor`] into a construction strategy and produces
//! the standard, alternate or null representative for it. Scalars and text
//! come from fixed canonical tuples so every run writes the same values;
//! container, temporal, enum and logger types fall back to structural
//! defaults; nested beans are constructed (and populated one level deep when
//! nested loading is on).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::bean::{bean_to_value, Bean};
use crate::config::TestConfiguration;
use crate::error::Result;
use crate::factory::InstanceFactory;
use crate::logging::Logger;
use crate::round_trip::RoundTripVerifier;
use crate::value::{TemporalKind, TypeDescriptor, Value, ValueKind};

/// Marker written to text properties for standard loads
pub const STANDARD_TEXT: &str = "TEST_VALUE";

/// Marker written to text properties for alternate loads
pub const ALTERNATE_TEXT: &str = "ALT_VALUE";

/// Nested beans deeper than this are constructed but never populated
const MAX_POPULATED_DEPTH: usize = 1;

/// Which canonical value set to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadType {
    Standard,
    Alternate,
    Null,
}

/// Outcome of synthesizing a value
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    /// A canonical scalar or structural value
    Canonical(Value),
    /// A freshly constructed nested bean rather than a scalar value
    Nested(Value),
    /// Nothing can be built for this type; callers skip it
    NoValue,
}

impl Synthesis {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Synthesis::Canonical(value) | Synthesis::Nested(value) => Some(value),
            Synthesis::NoValue => None,
        }
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, Synthesis::NoValue)
    }
}

/// One canonical tuple, keyed by scalar kind
struct CanonicalSet {
    text: &'static str,
    boolean: bool,
    integer: i32,
    long: i64,
    double: f64,
    float: f32,
    character: char,
    byte: i8,
}

const STANDARD: CanonicalSet = CanonicalSet {
    text: STANDARD_TEXT,
    boolean: true,
    integer: 1,
    long: 1,
    double: 1.0,
    float: 1.0,
    character: 'Y',
    byte: 1,
};

const ALTERNATE: CanonicalSet = CanonicalSet {
    text: ALTERNATE_TEXT,
    boolean: false,
    integer: 2,
    long: 2,
    double: 2.0,
    float: 2.0,
    character: 'N',
    byte: 2,
};

// Null load on a non-nullable scalar: absent is not representable.
const UNSET: CanonicalSet = CanonicalSet {
    text: "",
    boolean: false,
    integer: -1,
    long: -1,
    double: -1.0,
    float: -1.0,
    character: '\0',
    byte: -1,
};

/// Produces representative values for property types
#[derive(Clone, Copy)]
pub struct ValueSynthesizer {
    load_nested: bool,
    depth: usize,
    anchor: DateTime<Utc>,
}

impl ValueSynthesizer {
    /// Create a synthesizer; temporal values use the current time, captured once
    pub fn new(load_nested: bool) -> Self {
        Self {
            load_nested,
            depth: 0,
            anchor: Utc::now(),
        }
    }

    pub fn from_config(config: &TestConfiguration) -> Self {
        Self::new(config.load_nested_data)
    }

    /// Use a fixed timestamp for temporal values
    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Whether a nested bean built at this level gets its properties populated
    pub fn populates_nested(&self) -> bool {
        self.load_nested && self.depth < MAX_POPULATED_DEPTH
    }

    /// The synthesizer used for the properties of a nested bean
    pub fn descend(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    /// Synthesize a value of `ty` from the `load` tuple
    pub fn synthesize(&self, ty: &TypeDescriptor, load: LoadType) -> Result<Synthesis> {
        if let ValueKind::Bean(shape) = &ty.kind {
            if (shape.zero_argument)() {
                trace!(value_type = ty.name, depth = self.depth, "building nested bean");
                return (shape.nested)(self).map(Synthesis::Nested);
            }
        }

        if let Some(value) = canonical(ty, load) {
            return Ok(Synthesis::Canonical(value));
        }

        if load == LoadType::Null {
            return Ok(if ty.nullable {
                Synthesis::Canonical(Value::Absent)
            } else {
                Synthesis::NoValue
            });
        }

        let fallback = match &ty.kind {
            ValueKind::Sequence => Some(Value::Sequence(Vec::new())),
            ValueKind::Mapping => Some(Value::Mapping(Vec::new())),
            ValueKind::ConcurrentMapping => Some(Value::ConcurrentMapping(Vec::new())),
            ValueKind::Temporal(kind) => Some(self.temporal(*kind)),
            ValueKind::Enumerated { first } => Some(first()),
            ValueKind::Logger => Some(Value::Logger(Logger::for_type::<Logger>())),
            _ => None,
        };

        Ok(match fallback {
            Some(value) => Synthesis::Canonical(value),
            None => {
                trace!(value_type = ty.name, "no value can be synthesized");
                Synthesis::NoValue
            }
        })
    }

    fn temporal(&self, kind: TemporalKind) -> Value {
        match kind {
            TemporalKind::DateTime => Value::DateTime(self.anchor),
            TemporalKind::Date => Value::Date(self.anchor.date_naive()),
            TemporalKind::Time => Value::Time(self.anchor.time()),
            TemporalKind::LocalDateTime => Value::LocalDateTime(self.anchor.naive_utc()),
        }
    }
}

impl fmt::Debug for ValueSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSynthesizer")
            .field("load_nested", &self.load_nested)
            .field("depth", &self.depth)
            .finish()
    }
}

fn canonical(ty: &TypeDescriptor, load: LoadType) -> Option<Value> {
    let set = match load {
        LoadType::Standard => &STANDARD,
        LoadType::Alternate => &ALTERNATE,
        LoadType::Null if ty.nullable => {
            return match ty.kind {
                ValueKind::Array(_) => Some(Value::Array(Vec::new())),
                _ => None,
            }
        }
        LoadType::Null => &UNSET,
    };

    match ty.kind {
        ValueKind::Text => Some(Value::Text(set.text.to_string())),
        ValueKind::Boolean => Some(Value::Boolean(set.boolean)),
        ValueKind::Integer => Some(Value::Integer(set.integer)),
        ValueKind::Long => Some(Value::Long(set.long)),
        ValueKind::Double => Some(Value::Double(set.double)),
        ValueKind::Float => Some(Value::Float(set.float)),
        ValueKind::Character => Some(Value::Character(set.character)),
        ValueKind::Byte => Some(Value::Byte(set.byte)),
        ValueKind::Array(_) => Some(Value::Array(Vec::new())),
        _ => None,
    }
}

/// Build a nested bean value of type `B`.
///
/// At the top level with nested loading on, the instance is run through the
/// round-trip verifier before it is returned; deeper levels only construct.
pub fn nested_value<B>(synthesizer: &ValueSynthesizer) -> Result<Value>
where
    B: Bean + Clone + PartialEq + fmt::Debug,
{
    let nested = synthesizer.descend();
    let mut instance = InstanceFactory::new(&nested).new_instance::<B>()?;
    if synthesizer.populates_nested() {
        let excluded = BTreeSet::new();
        RoundTripVerifier::new(&nested, &excluded).verify(&mut instance)?;
    }
    Ok(bean_to_value(&instance))
}
