// Logging setup and the logging-facility value type

use std::any::type_name;
use std::sync::Once;

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static TEST_INIT: Once = Once::new();

//-----------------------------------------------------------------------------
// Tracing Initialization
//-----------------------------------------------------------------------------

/// Initializes the tracing subscriber with configurable log level and output format.
///
/// # Arguments
///
/// * `log_level`: An optional directive string. Defaults to "info". Module
///   directives such as "beanprobe=trace,info" are accepted. `RUST_LOG` wins
///   when set.
/// * `json_output`: Emit JSON lines instead of the pretty format. Defaults to `false`.
pub fn init_tracing(log_level: Option<&str>, json_output: Option<bool>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))?;

    let subscriber = Registry::default().with(env_filter);

    if json_output.unwrap_or(false) {
        let json_layer = fmt::layer().json().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(json_layer))?;
    } else {
        let fmt_layer = fmt::layer().pretty().with_target(true).with_level(true);
        tracing::subscriber::set_global_default(subscriber.with(fmt_layer))?;
    }

    Ok(())
}

/// Initialize test logging (called once per test binary)
///
/// Output goes through the test writer so it is captured per test.
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beanprobe=debug"));
        let subscriber = Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_test_writer());
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

//-----------------------------------------------------------------------------
// Logger facility
//-----------------------------------------------------------------------------

/// A named logging facility, usable as a bean property.
///
/// Events are emitted through `tracing` with the logger name attached as the
/// `logger` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Logger {
    target: String,
}

impl Logger {
    /// Create a logger with an explicit name
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Create a logger bound to a type
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(type_name::<T>())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(logger = %self.target, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(logger = %self.target, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(logger = %self.target, "{}", message);
    }
}
