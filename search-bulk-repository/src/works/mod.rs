//! Concrete bulkable works.
//!
//! [`SimpleBulkableWork`] covers the four actions of the bulk API:
//! `index`, `create`, `update` and `delete`.

mod simple;

pub use simple::{BulkAction, SimpleBulkableWork, VersionType, WorkTarget};
