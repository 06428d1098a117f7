//! Test orchestration and the fluent builder.

use std::marker::PhantomData;

use tracing::info;

use crate::auxiliary::{verify_clear, verify_constructors, verify_serialization};
use crate::bean::{Bean, Equivalence};
use crate::config::TestConfiguration;
use crate::equivalence::{check_equals, EquivalenceVerifier};
use crate::error::Result;
use crate::extension::Unrelated;
use crate::factory::InstanceFactory;
use crate::round_trip::{RoundTripReport, RoundTripVerifier};
use crate::synthesizer::ValueSynthesizer;

/// Run every enabled check against `T`, with `E` as the extension type.
///
/// Order: round trip on a factory-built instance, clear, constructors,
/// serialization, then the equivalence contract when enabled.
pub fn test<T, E>(config: &TestConfiguration) -> Result<RoundTripReport>
where
    T: Bean + Equivalence,
    E: Bean + Equivalence,
{
    let bean = T::bean_name();
    info!(bean, extension = E::bean_name(), "testing bean");

    let synthesizer = ValueSynthesizer::from_config(config);
    let mut instance = InstanceFactory::new(&synthesizer).new_instance::<T>()?;
    let report =
        RoundTripVerifier::new(&synthesizer, &config.excluded_properties).verify(&mut instance)?;

    verify_clear::<T>(config, &synthesizer)?;
    verify_constructors::<T>(config, &synthesizer)?;
    verify_serialization::<T>(config, &synthesizer)?;

    if config.check_equivalence {
        EquivalenceVerifier::new(config)
            .with_synthesizer(synthesizer)
            .verify::<T, E>()?;
    }

    info!(
        bean,
        tested = report.tested.len(),
        skipped = report.skipped.len(),
        "bean passed"
    );
    Ok(report)
}

/// Round-trip every testable property of a caller-supplied instance
pub fn verify_round_trip<T: Bean>(instance: &mut T, config: &TestConfiguration) -> Result<RoundTripReport> {
    let synthesizer = ValueSynthesizer::from_config(config);
    RoundTripVerifier::new(&synthesizer, &config.excluded_properties).verify(instance)
}

/// Check the equals/hash/string contract of `T` against `E`
pub fn verify_symmetric_equivalence<T, E>(config: &TestConfiguration) -> Result<()>
where
    T: Bean + Equivalence,
    E: Bean + Equivalence,
{
    EquivalenceVerifier::new(config).verify::<T, E>()
}

/// Walk the properties of `instance`, checking equality with `expected` after
/// each change
pub fn verify_equals<T>(instance: &mut T, expected: &T, config: &TestConfiguration) -> Result<()>
where
    T: Bean + Equivalence,
{
    check_equals(instance, expected, config)
}

/// Entry point for the fluent interface
pub struct BeanTester;

impl BeanTester {
    /// Start configuring a test of `T` with `Unrelated` as the extension type
    pub fn builder<T>() -> BeanTesterBuilder<T, Unrelated>
    where
        T: Bean + Equivalence,
    {
        BeanTesterBuilder::new()
    }

    /// Start configuring a test of `T` with a caller-supplied extension type
    pub fn builder_with_extension<T, E>() -> BeanTesterBuilder<T, E>
    where
        T: Bean + Equivalence,
        E: Bean + Equivalence,
    {
        BeanTesterBuilder::new()
    }
}

/// Fluent configuration of a bean test
pub struct BeanTesterBuilder<T, E = Unrelated> {
    config: TestConfiguration,
    _types: PhantomData<fn() -> (T, E)>,
}

impl<T, E> BeanTesterBuilder<T, E>
where
    T: Bean + Equivalence,
    E: Bean + Equivalence,
{
    fn new() -> Self {
        Self::with_config(TestConfiguration::default())
    }

    /// Start from an existing configuration, e.g. one loaded from TOML
    pub fn with_config(config: TestConfiguration) -> Self {
        Self {
            config,
            _types: PhantomData,
        }
    }

    pub fn load_data(mut self, enable: bool) -> Self {
        self.config.load_nested_data = enable;
        self
    }

    pub fn check_equals(mut self, enable: bool) -> Self {
        self.config.check_equivalence = enable;
        self
    }

    pub fn check_serializable(mut self, enable: bool) -> Self {
        self.config.check_serialization = Some(enable);
        self
    }

    pub fn check_clear(mut self, enable: bool) -> Self {
        self.config.check_clear = enable;
        self
    }

    pub fn check_constructor(mut self, enable: bool) -> Self {
        self.config.check_constructors = enable;
        self
    }

    /// Expect the serialization round trip to lose information
    pub fn skip_strict_serializable(mut self) -> Self {
        self.config.skip_strict_serialization = true;
        self
    }

    /// Leave the named properties out of testing
    pub fn skip<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.with_excluded(names);
        self
    }

    pub fn config(&self) -> &TestConfiguration {
        &self.config
    }

    /// Run the full test
    pub fn test(&self) -> Result<RoundTripReport> {
        test::<T, E>(&self.config)
    }

    /// Round-trip the properties of `instance` only
    pub fn test_instance(&self, instance: &mut T) -> Result<RoundTripReport> {
        verify_round_trip(instance, &self.config)
    }

    /// Check the equals/hash/string contract only
    pub fn test_object_methods(&self) -> Result<()> {
        verify_symmetric_equivalence::<T, E>(&self.config)
    }

    /// Per-property equality traversal of `instance` against `expected`
    pub fn test_equals(&self, instance: &mut T, expected: &T) -> Result<()> {
        verify_equals(instance, expected, &self.config)
    }
}
