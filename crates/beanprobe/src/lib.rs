// Beanprobe: property round-trip and equivalence-contract testing for
// data-holder types

// The derive macros refer to `::beanprobe`, including from inside this crate.
extern crate self as beanprobe;

// Module structure
pub mod auxiliary;
pub mod bean;
pub mod config;
pub mod discovery;
pub mod equivalence;
pub mod error;
pub mod extension;
pub mod factory;
pub mod logging;
pub mod round_trip;
pub mod synthesizer;
pub mod tester;
pub mod value;

// Public exports
pub use bean::{
    Bean, BeanValue, ConstructionPath, Equivalence, PropertyDescriptor, SerializationCapability,
};
pub use beanprobe_derive::{Bean, BeanEnum};
pub use config::TestConfiguration;
pub use error::{PropertyFault, Result, VerificationError};
pub use extension::Unrelated;
pub use logging::{init_test_logging, init_tracing, Logger};
pub use round_trip::RoundTripReport;
pub use synthesizer::{LoadType, Synthesis, ValueSynthesizer, ALTERNATE_TEXT, STANDARD_TEXT};
pub use tester::{
    test, verify_equals, verify_round_trip, verify_symmetric_equivalence, BeanTester,
    BeanTesterBuilder,
};
pub use value::{PropertyType, TemporalKind, TypeDescriptor, Value, ValueKind};
