// Configuration for a bean test run
//
// This module provides the flags that select which verifiers run and how
// values are loaded. A configuration is assembled up front and only borrowed
// once verification starts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerificationError};

/// Configuration for one bean test invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfiguration {
    /// Populate nested bean properties one level deep
    pub load_nested_data: bool,

    /// Run the equals/hash/string contract checks
    pub check_equivalence: bool,

    /// `Some(false)` skips serialization entirely; `Some(true)` also fails
    /// types that do not declare the capability
    pub check_serialization: Option<bool>,

    /// Run the reset-to-default check
    pub check_clear: bool,

    /// Invoke every non-deprecated construction path
    pub check_constructors: bool,

    /// Expect a serialization round trip to produce an unequal instance
    pub skip_strict_serialization: bool,

    /// Property names left out of round-trip and equivalence testing
    pub excluded_properties: BTreeSet<String>,
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self {
            load_nested_data: false,
            check_equivalence: false,
            check_serialization: None,
            check_clear: false,
            check_constructors: false,
            skip_strict_serialization: false,
            excluded_properties: BTreeSet::new(),
        }
    }
}

impl TestConfiguration {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration profile from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| VerificationError::Configuration(e.to_string()))
    }

    /// Enable or disable nested loading
    pub fn with_load_nested_data(mut self, enable: bool) -> Self {
        self.load_nested_data = enable;
        self
    }

    /// Enable or disable the equivalence contract checks
    pub fn with_check_equivalence(mut self, enable: bool) -> Self {
        self.check_equivalence = enable;
        self
    }

    /// Explicitly request or suppress the serialization check
    pub fn with_check_serialization(mut self, enable: bool) -> Self {
        self.check_serialization = Some(enable);
        self
    }

    /// Enable or disable the clear check
    pub fn with_check_clear(mut self, enable: bool) -> Self {
        self.check_clear = enable;
        self
    }

    /// Enable or disable the constructor check
    pub fn with_check_constructors(mut self, enable: bool) -> Self {
        self.check_constructors = enable;
        self
    }

    /// Relax the serialization round trip to expect inequality
    pub fn with_skip_strict_serialization(mut self, enable: bool) -> Self {
        self.skip_strict_serialization = enable;
        self
    }

    /// Exclude properties by name
    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_properties
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_properties.contains(name)
    }

    /// Whether the serialization verifier runs at all
    pub fn runs_serialization(&self) -> bool {
        self.check_serialization != Some(false)
    }

    /// Whether a type without the serialization capability is a failure
    pub fn requires_serialization(&self) -> bool {
        self.check_serialization == Some(true)
    }
}
