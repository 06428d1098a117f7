//! Serialization, clear and constructor checks.
//!
//! Each check reads its switch from the configuration and returns `Ok(())`
//! without doing anything when it is turned off.

use tracing::debug;

use crate::bean::{equivalent, Bean, Equivalence};
use crate::config::TestConfiguration;
use crate::error::{Result, VerificationError};
use crate::factory::InstanceFactory;
use crate::synthesizer::ValueSynthesizer;

/// Serialize a fresh instance and deserialize it again.
///
/// The result must equal the original, or differ from it when strict
/// serialization is skipped. A type without the capability passes unless
/// serialization was explicitly requested.
pub fn verify_serialization<T>(config: &TestConfiguration, synthesizer: &ValueSynthesizer) -> Result<()>
where
    T: Bean + Equivalence,
{
    if !config.runs_serialization() {
        return Ok(());
    }

    let name = T::bean_name();
    let Some(capability) = T::serialization() else {
        if config.requires_serialization() {
            return Err(VerificationError::serialization(
                name,
                "type does not declare a serialization capability",
            ));
        }
        debug!(bean = name, "not serializable; serialization check skipped");
        return Ok(());
    };

    let instance = InstanceFactory::new(synthesizer).new_instance::<T>()?;
    let bytes = capability
        .serialize(&instance)
        .map_err(|e| VerificationError::serialization(name, format!("serialize failed: {e}")))?;
    let restored = capability
        .deserialize(&bytes)
        .map_err(|e| VerificationError::serialization(name, format!("deserialize failed: {e}")))?;

    let same = equivalent(&restored, &instance);
    if config.skip_strict_serialization {
        if same {
            return Err(VerificationError::serialization(
                name,
                "round trip produced an equal instance but a lossy one was expected",
            ));
        }
    } else if !same {
        return Err(VerificationError::serialization(
            name,
            format!(
                "round trip changed the instance: {} became {}",
                instance.render(),
                restored.render()
            ),
        ));
    }
    Ok(())
}

/// Reset one of two freshly built instances and compare them
pub fn verify_clear<T>(config: &TestConfiguration, synthesizer: &ValueSynthesizer) -> Result<()>
where
    T: Bean + Equivalence,
{
    if !config.check_clear {
        return Ok(());
    }
    let Some(clear) = T::clear_hook() else {
        debug!(bean = T::bean_name(), "no clear operation; check skipped");
        return Ok(());
    };

    let factory = InstanceFactory::new(synthesizer);
    let mut expected = factory.new_instance::<T>()?;
    let mut actual = factory.new_instance::<T>()?;
    for hook in T::post_construct_hooks() {
        hook(&mut expected);
        hook(&mut actual);
    }

    clear(&mut actual);

    if !equivalent(&actual, &expected) {
        return Err(VerificationError::clear(
            T::bean_name(),
            format!(
                "expected {} after clear, got {}",
                expected.render(),
                actual.render()
            ),
        ));
    }
    Ok(())
}

/// Invoke every non-deprecated construction path with Standard arguments.
///
/// Only construction itself is checked; the built instance is discarded.
pub fn verify_constructors<T: Bean>(config: &TestConfiguration, synthesizer: &ValueSynthesizer) -> Result<()> {
    if !config.check_constructors {
        return Ok(());
    }

    let factory = InstanceFactory::new(synthesizer);
    for path in T::construction_paths().iter().filter(|path| !path.deprecated) {
        debug!(bean = T::bean_name(), path = path.name, "checking construction path");
        factory.invoke(path)?;
    }
    Ok(())
}
