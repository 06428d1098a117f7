//! Instance construction.
//!
//! Picks a construction path for a bean type and invokes it with synthesized
//! arguments.

use tracing::trace;

use crate::bean::{Bean, ConstructionPath};
use crate::error::{Result, VerificationError};
use crate::synthesizer::{LoadType, ValueSynthesizer};
use crate::value::Value;

/// Builds bean instances through their registered construction paths
#[derive(Debug, Clone, Copy)]
pub struct InstanceFactory<'a> {
    synthesizer: &'a ValueSynthesizer,
}

impl<'a> InstanceFactory<'a> {
    pub fn new(synthesizer: &'a ValueSynthesizer) -> Self {
        Self { synthesizer }
    }

    /// Create an instance of `T`.
    ///
    /// A non-deprecated zero-argument path wins; otherwise the first
    /// non-deprecated path in declaration order is used. A failing path is
    /// reported, not retried on another one.
    pub fn new_instance<T: Bean>(&self) -> Result<T> {
        let paths = T::construction_paths();
        let chosen = paths
            .iter()
            .filter(|path| !path.deprecated)
            .find(|path| path.is_zero_argument())
            .or_else(|| paths.iter().find(|path| !path.deprecated))
            .ok_or(VerificationError::NoConstructionPath {
                type_name: T::bean_name(),
            })?;

        self.invoke(chosen)
    }

    /// Invoke `path` with one Standard value per parameter
    pub fn invoke<T: Bean>(&self, path: &ConstructionPath<T>) -> Result<T> {
        let arguments = self.arguments(path)?;
        let rendered = render_arguments(&arguments);
        trace!(
            bean = T::bean_name(),
            path = path.name,
            arguments = %rendered,
            "invoking construction path"
        );

        path.invoke(arguments)
            .map_err(|fault| VerificationError::ConstructionFailed {
                type_name: T::bean_name(),
                path: path.name,
                arguments: rendered,
                fault,
            })
    }

    fn arguments<T>(&self, path: &ConstructionPath<T>) -> Result<Vec<Value>> {
        path.parameters
            .iter()
            .map(|parameter| {
                let synthesis = self.synthesizer.synthesize(parameter, LoadType::Standard)?;
                Ok(synthesis.into_value().unwrap_or(Value::Absent))
            })
            .collect()
    }
}

fn render_arguments(arguments: &[Value]) -> String {
    arguments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
