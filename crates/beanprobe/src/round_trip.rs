//! Round-trip verification.
//!
//! Writes a Standard value through each property's mutator and checks that
//! the accessor hands the same value back. Every property is attempted;
//! failures are collected and reported together.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::bean::{Bean, PropertyDescriptor};
use crate::discovery::PropertyDiscovery;
use crate::error::{Result, VerificationError};
use crate::synthesizer::{LoadType, Synthesis, ValueSynthesizer};

/// Outcome of a successful round-trip pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundTripReport {
    pub type_name: &'static str,
    /// Properties whose value round-tripped
    pub tested: Vec<&'static str>,
    /// Properties with no synthesizable value
    pub skipped: Vec<&'static str>,
}

/// Verifies mutator/accessor pairs against synthesized values
#[derive(Debug, Clone, Copy)]
pub struct RoundTripVerifier<'a> {
    synthesizer: &'a ValueSynthesizer,
    excluded: &'a BTreeSet<String>,
}

enum Outcome {
    Tested,
    Skipped,
}

impl<'a> RoundTripVerifier<'a> {
    pub fn new(synthesizer: &'a ValueSynthesizer, excluded: &'a BTreeSet<String>) -> Self {
        Self {
            synthesizer,
            excluded,
        }
    }

    /// Round-trip every testable property of `instance`, leaving it populated
    pub fn verify<T: Bean>(&self, instance: &mut T) -> Result<RoundTripReport> {
        let mut report = RoundTripReport {
            type_name: T::bean_name(),
            ..RoundTripReport::default()
        };
        let mut failures = Vec::new();

        for property in PropertyDiscovery::new(self.excluded).discover::<T>() {
            match self.verify_property(instance, &property) {
                Ok(Outcome::Tested) => report.tested.push(property.name),
                Ok(Outcome::Skipped) => report.skipped.push(property.name),
                Err(error) => {
                    debug!(bean = T::bean_name(), property = property.name, %error, "round trip failed");
                    failures.push(error);
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(VerificationError::PropertyFailures {
                type_name: T::bean_name(),
                failures,
            })
        }
    }

    fn verify_property<T: Bean>(
        &self,
        instance: &mut T,
        property: &PropertyDescriptor<T>,
    ) -> Result<Outcome> {
        let Some(value_type) = property.value_type() else {
            return Ok(Outcome::Skipped);
        };

        let synthesis = self
            .synthesizer
            .synthesize(value_type, LoadType::Standard)
            .map_err(|source| VerificationError::Nested {
                property: property.name,
                source: Box::new(source),
            })?;

        let expected = match synthesis {
            Synthesis::Canonical(value) | Synthesis::Nested(value) => value,
            Synthesis::NoValue => {
                debug!(
                    bean = T::bean_name(),
                    property = property.name,
                    value_type = value_type.name,
                    "no value for property type; skipped"
                );
                return Ok(Outcome::Skipped);
            }
        };

        trace!(property = property.name, value = %expected, "writing");
        property
            .write(instance, expected.clone())
            .map_err(|fault| VerificationError::property(property.name, fault))?;

        let actual = property
            .read(instance)
            .map_err(|fault| VerificationError::property(property.name, fault))?;

        if actual != expected {
            return Err(VerificationError::RoundTripMismatch {
                type_name: T::bean_name(),
                property: property.name,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(Outcome::Tested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::ConstructionPath;
    use crate::error::PropertyFault;
    use crate::value::{PropertyType, Value};

    #[derive(Debug, Default)]
    struct Counter {
        label: Option<String>,
        hits: i32,
        doubled: i64,
        limit: i32,
    }

    impl Bean for Counter {
        fn properties() -> Vec<PropertyDescriptor<Self>> {
            vec![
                PropertyDescriptor::read_write::<Option<String>>(
                    "label",
                    |c| c.label.to_value(),
                    |c, v| {
                        c.label = PropertyType::from_value(v)?;
                        Ok(())
                    },
                ),
                PropertyDescriptor::read_write::<i32>(
                    "hits",
                    |c| c.hits.to_value(),
                    |_, _| panic!("hits is managed internally"),
                ),
                PropertyDescriptor::read_write::<i64>(
                    "doubled",
                    |c| c.doubled.to_value(),
                    |c, v| {
                        c.doubled = i64::from_value(v)? * 2;
                        Ok(())
                    },
                ),
                PropertyDescriptor::read_write::<i32>(
                    "limit",
                    |c| c.limit.to_value(),
                    |c, v| {
                        c.limit = PropertyType::from_value(v)?;
                        Ok(())
                    },
                ),
                PropertyDescriptor::<Self>::new("opaque")
                    .with_accessor(crate::value::TypeDescriptor::opaque::<std::time::Instant>(), |_| {
                        Value::Absent
                    })
                    .with_mutator(crate::value::TypeDescriptor::opaque::<std::time::Instant>(), |_, _| {
                        Ok(())
                    }),
            ]
        }

        fn construction_paths() -> Vec<ConstructionPath<Self>> {
            vec![ConstructionPath::default_path()]
        }
    }

    #[test]
    fn test_every_property_attempted_and_failures_aggregated() {
        let synthesizer = ValueSynthesizer::new(false);
        let excluded = BTreeSet::new();
        let mut counter = Counter::default();

        let error = RoundTripVerifier::new(&synthesizer, &excluded)
            .verify(&mut counter)
            .unwrap_err();

        assert_eq!(error.properties(), vec!["hits", "doubled"]);
        let VerificationError::PropertyFailures { failures, .. } = error else {
            panic!("expected aggregated failures");
        };
        assert!(matches!(
            &failures[0],
            VerificationError::Property {
                fault: PropertyFault::Panicked(_),
                ..
            }
        ));
        assert!(matches!(&failures[1], VerificationError::RoundTripMismatch { expected, actual, .. }
            if expected == "1" && actual == "2"));

        // Properties after the failing ones were still written.
        assert_eq!(counter.label.as_deref(), Some("TEST_VALUE"));
        assert_eq!(counter.limit, 1);
    }

    #[test]
    fn test_report_lists_tested_and_skipped() {
        let synthesizer = ValueSynthesizer::new(false);
        let excluded: BTreeSet<String> = ["hits", "doubled"].iter().map(|s| s.to_string()).collect();
        let mut counter = Counter::default();

        let report = RoundTripVerifier::new(&synthesizer, &excluded)
            .verify(&mut counter)
            .unwrap();

        assert_eq!(report.tested, vec!["label", "limit"]);
        assert_eq!(report.skipped, vec!["opaque"]);
        assert!(report.type_name.ends_with("Counter"));
    }
}
