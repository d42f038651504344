#![warn(missing_docs)]
//! Reporting plumbing shared by the headless worldtests: a standardized
//! metrics schema plus JSON sinks for CI artifacts.

mod metrics;

pub use metrics::*;
