//! Configuration and dependency wiring for the bulk submitter.

mod dependencies;

pub use dependencies::{BulkSettings, Dependencies};
