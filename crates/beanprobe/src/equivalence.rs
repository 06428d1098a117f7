//! Equivalence-contract verification.
//!
//! Checks that equality, hashing and the string representation of a bean
//! track mutations of its properties, with a second unrelated type taking
//! part in the comparisons. Stages run in a fixed order and the first broken
//! assertion ends the check.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::bean::{equivalent, Bean, Equivalence, PropertyDescriptor};
use crate::config::TestConfiguration;
use crate::discovery::PropertyDiscovery;
use crate::error::{Result, VerificationError};
use crate::factory::InstanceFactory;
use crate::round_trip::{RoundTripReport, RoundTripVerifier};
use crate::synthesizer::{LoadType, ValueSynthesizer};
use crate::value::Value;

/// Verifies the equals/hash/string contract of `T` against extension type `E`
pub struct EquivalenceVerifier<'a> {
    config: &'a TestConfiguration,
    synthesizer: ValueSynthesizer,
}

impl<'a> EquivalenceVerifier<'a> {
    pub fn new(config: &'a TestConfiguration) -> Self {
        Self {
            config,
            synthesizer: ValueSynthesizer::from_config(config),
        }
    }

    /// Use an explicit synthesizer, e.g. one with a fixed temporal anchor
    pub fn with_synthesizer(mut self, synthesizer: ValueSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn verify<T, E>(&self) -> Result<()>
    where
        T: Bean + Equivalence,
        E: Bean + Equivalence,
    {
        let name = T::bean_name();
        let factory = InstanceFactory::new(&self.synthesizer);

        // Fresh instances.
        let mut x = factory.new_instance::<T>()?;
        let mut y = factory.new_instance::<T>()?;
        let mut ext = factory.new_instance::<E>()?;

        // Fresh instances of the same type are indistinguishable.
        ensure(equivalent(&x, &y), name, "x != y for fresh instances")?;
        ensure(
            x.contract_hash() == y.contract_hash(),
            name,
            "fresh instances have different hash codes",
        )?;
        ensure(
            x.render() == y.render(),
            name,
            "fresh instances have different string representations",
        )?;

        // The extension type never equals the bean.
        ensure(!equivalent(&ext, &y), name, "extension instance equals y")?;
        ensure(
            ext.contract_hash() != y.contract_hash(),
            name,
            "extension instance shares y's hash code",
        )?;

        // Absent and reflexivity.
        ensure(!x.equals_any(None), name, "x equals absent")?;
        ensure(equivalent(&x, &x), name, "x != x")?;
        ensure(!ext.equals_any(None), name, "extension instance equals absent")?;
        ensure(equivalent(&ext, &ext), name, "extension instance != itself")?;

        // Population only counts when at least one property took a value.
        let populated = self.populate(&mut x)?;
        if !populated.tested.is_empty() {
            self.populate(&mut ext)?;

            ensure(!equivalent(&y, &x), name, "y == x after populating x")?;
            ensure(
                !equivalent(&y, &ext),
                name,
                "y == extension instance after populating it",
            )?;

            if self.config.load_nested_data {
                self.populate(&mut y)?;
                ensure(equivalent(&x, &y), name, "x != y after populating both")?;
                ensure(
                    x.contract_hash() == y.contract_hash(),
                    name,
                    "populated instances have different hash codes",
                )?;
            } else {
                ensure(!equivalent(&x, &y), name, "x == y with only x populated")?;
                ensure(
                    x.contract_hash() != y.contract_hash(),
                    name,
                    "populated x shares the unpopulated y's hash code",
                )?;
            }

            ensure(
                !equivalent(&ext, &y),
                name,
                "extension instance equals y after population",
            )?;
            ensure(
                ext.contract_hash() != y.contract_hash(),
                name,
                "extension instance shares y's hash code after population",
            )?;
            ensure(
                ext.render() != y.render(),
                name,
                "extension instance renders like y",
            )?;
        } else {
            debug!(
                bean = name,
                skipped = ?populated.skipped,
                "no property could be populated; population stage skipped"
            );
        }

        self.check_copy(&x, factory)?;
        self.check_copy(&ext, factory)?;

        Ok(())
    }

    fn populate<B: Bean>(&self, instance: &mut B) -> Result<RoundTripReport> {
        RoundTripVerifier::new(&self.synthesizer, &self.config.excluded_properties).verify(instance)
    }

    // Copy every testable property into a fresh instance; faults abandon the
    // copy without failing the check.
    fn check_copy<B: Bean + Equivalence>(&self, source: &B, factory: InstanceFactory<'_>) -> Result<()> {
        let mut copy = match factory.new_instance::<B>() {
            Ok(copy) => copy,
            Err(error) => {
                trace!(bean = B::bean_name(), %error, "copy target could not be built");
                return Ok(());
            }
        };

        let everything = BTreeSet::new();
        for property in PropertyDiscovery::new(&everything).discover::<B>() {
            let copied = property
                .read(source)
                .and_then(|value| property.write(&mut copy, value));
            if let Err(fault) = copied {
                trace!(bean = B::bean_name(), property = property.name, %fault, "property copy abandoned");
                return Ok(());
            }
        }

        ensure(
            equivalent(&copy, source),
            B::bean_name(),
            "property-wise copy is not equal to its source",
        )
    }
}

fn ensure(condition: bool, type_name: &'static str, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(VerificationError::equivalence(type_name, message))
    }
}

/// Per-property equality traversal.
///
/// For each testable property of `instance`, writes the Alternate and then the
/// Null value, checking after each write that equality with `expected` is
/// symmetric and that equal instances hash alike. The original value is put
/// back and must read back unchanged.
pub fn check_equals<T>(instance: &mut T, expected: &T, config: &TestConfiguration) -> Result<()>
where
    T: Bean + Equivalence,
{
    let synthesizer = ValueSynthesizer::from_config(config);
    for property in PropertyDiscovery::new(&config.excluded_properties).discover::<T>() {
        check_property_equals(&synthesizer, instance, expected, &property)?;
    }
    Ok(())
}

fn check_property_equals<T>(
    synthesizer: &ValueSynthesizer,
    instance: &mut T,
    expected: &T,
    property: &PropertyDescriptor<T>,
) -> Result<()>
where
    T: Bean + Equivalence,
{
    let Some(value_type) = property.value_type() else {
        return Ok(());
    };
    let fault = |fault| VerificationError::property(property.name, fault);

    let original = property.read(instance).map_err(fault)?;

    for load in [LoadType::Alternate, LoadType::Null] {
        let Some(value) = synthesizer
            .synthesize(value_type, load)
            .map_err(|source| VerificationError::Nested {
                property: property.name,
                source: Box::new(source),
            })?
            .into_value()
        else {
            trace!(property = property.name, ?load, "no value; equality step skipped");
            continue;
        };

        property.write(instance, value).map_err(fault)?;
        assert_symmetric(instance, expected, property.name)?;
    }

    property.write(instance, original.clone()).map_err(fault)?;
    let restored: Value = property.read(instance).map_err(fault)?;
    if restored != original {
        return Err(VerificationError::RoundTripMismatch {
            type_name: T::bean_name(),
            property: property.name,
            expected: original.to_string(),
            actual: restored.to_string(),
        });
    }
    Ok(())
}

fn assert_symmetric<T: Bean + Equivalence>(instance: &T, expected: &T, property: &str) -> Result<()> {
    let forward = equivalent(instance, expected);
    let backward = equivalent(expected, instance);
    if forward != backward {
        return Err(VerificationError::equivalence(
            T::bean_name(),
            format!("equality is not symmetric after changing {property}"),
        ));
    }
    if forward && instance.contract_hash() != expected.contract_hash() {
        return Err(VerificationError::equivalence(
            T::bean_name(),
            format!("equal instances hash differently after changing {property}"),
        ));
    }
    Ok(())
}
