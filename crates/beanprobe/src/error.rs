// Verification Error Types
//
// This module provides the error types raised while probing a bean. Invocation
// level problems (a mutator rejecting a value, a constructor panicking) are
// `PropertyFault`s; everything a verifier reports to its caller is a
// `VerificationError`.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A fault raised while invoking an accessor, mutator or construction path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyFault {
    /// The value handed over does not convert to the declared type
    #[error("argument type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The mutator refused the value
    #[error("value rejected: {0}")]
    Rejected(String),

    /// User code panicked during the invocation
    #[error("panicked: {0}")]
    Panicked(String),

    /// The property has no accessor
    #[error("property is not readable")]
    NotReadable,

    /// The property has no mutator
    #[error("property is not writable")]
    NotWritable,
}

impl PropertyFault {
    /// Create a type mismatch fault
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Create a rejection fault from any displayable reason
    pub fn rejected(reason: impl fmt::Display) -> Self {
        Self::Rejected(reason.to_string())
    }

    /// Build a fault from a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Errors reported by the verifiers
#[derive(Error, Debug)]
pub enum VerificationError {
    /// The accessor did not return what the mutator was given
    #[error("failed while testing property {property} of {type_name}: expected {expected}, got {actual}")]
    RoundTripMismatch {
        type_name: &'static str,
        property: &'static str,
        expected: String,
        actual: String,
    },

    /// Invoking an accessor or mutator raised a fault
    #[error("an exception was thrown while testing the property {property}: {fault}")]
    Property {
        property: &'static str,
        fault: PropertyFault,
    },

    /// Synthesizing a nested bean for a property failed
    #[error("could not populate nested bean for property {property}: {source}")]
    Nested {
        property: &'static str,
        #[source]
        source: Box<VerificationError>,
    },

    /// One or more properties failed; every property was still attempted
    #[error("{} property check(s) failed for {type_name}: {}", .failures.len(), render_failures(.failures))]
    PropertyFailures {
        type_name: &'static str,
        failures: Vec<VerificationError>,
    },

    /// A construction path raised a fault
    #[error("an exception was thrown while testing the class (new instance) '{path}' of {type_name} with '[{arguments}]': '{fault}'")]
    ConstructionFailed {
        type_name: &'static str,
        path: &'static str,
        arguments: String,
        fault: PropertyFault,
    },

    /// The type declares no usable construction path
    #[error("no usable construction path for {type_name}")]
    NoConstructionPath { type_name: &'static str },

    /// An equals/hash/string assertion did not hold
    #[error("equivalence contract violated for {type_name}: {message}")]
    Equivalence {
        type_name: &'static str,
        message: String,
    },

    /// Serialization round trip failed
    #[error("serialization check failed for {type_name}: {message}")]
    Serialization {
        type_name: &'static str,
        message: String,
    },

    /// Reset operation did not restore the default state
    #[error("clear check failed for {type_name}: {message}")]
    Clear {
        type_name: &'static str,
        message: String,
    },

    /// The configuration could not be loaded
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Convenient type alias for verifier results
pub type Result<T> = std::result::Result<T, VerificationError>;

impl VerificationError {
    /// Create a new equivalence error
    pub fn equivalence(type_name: &'static str, message: impl Into<String>) -> Self {
        Self::Equivalence {
            type_name,
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(type_name: &'static str, message: impl Into<String>) -> Self {
        Self::Serialization {
            type_name,
            message: message.into(),
        }
    }

    /// Create a new clear error
    pub fn clear(type_name: &'static str, message: impl Into<String>) -> Self {
        Self::Clear {
            type_name,
            message: message.into(),
        }
    }

    /// Create a new property fault error
    pub fn property(property: &'static str, fault: PropertyFault) -> Self {
        Self::Property { property, fault }
    }

    /// Property names this error is about, if any
    pub fn properties(&self) -> Vec<&'static str> {
        match self {
            Self::RoundTripMismatch { property, .. }
            | Self::Property { property, .. }
            | Self::Nested { property, .. } => vec![property],
            Self::PropertyFailures { failures, .. } => {
                failures.iter().flat_map(|failure| failure.properties()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn render_failures(failures: &[VerificationError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
