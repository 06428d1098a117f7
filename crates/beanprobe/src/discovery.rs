//! Property discovery.

use std::collections::BTreeSet;

use tracing::debug;

use crate::bean::{Bean, PropertyDescriptor};

/// Selects the testable properties of a bean type
#[derive(Debug, Clone, Copy)]
pub struct PropertyDiscovery<'a> {
    excluded: &'a BTreeSet<String>,
}

impl<'a> PropertyDiscovery<'a> {
    pub fn new(excluded: &'a BTreeSet<String>) -> Self {
        Self { excluded }
    }

    /// Testable properties of `T` in declaration order, minus exclusions
    pub fn discover<T: Bean>(&self) -> Vec<PropertyDescriptor<T>> {
        T::properties()
            .into_iter()
            .filter(|property| {
                if self.excluded.contains(property.name) {
                    debug!(bean = T::bean_name(), property = property.name, "property excluded");
                    return false;
                }
                if !property.is_testable() {
                    debug!(
                        bean = T::bean_name(),
                        property = property.name,
                        "no matching accessor/mutator pair; property dropped"
                    );
                    return false;
                }
                true
            })
            .collect()
    }
}
