//! Bulkable work trait definition.

use std::fmt::Debug;

use search_bulk_shared::IndexMutation;
use serde_json::Value;

use super::WorkExecutionContext;
use crate::errors::WorkError;

/// A single unit of work that can be submitted as part of a bulk request.
///
/// A work renders its own action line and optional source line, and it
/// interprets its own item of the bulk response. The wire format of each
/// action belongs to the work, not to the bulk executor.
pub trait BulkableWork: Debug + Send + Sync {
    /// The action metadata line, e.g. `{"delete": {"_index": "...", "_id": "..."}}`.
    fn action_metadata(&self) -> Result<Value, WorkError>;

    /// The line following the metadata, or `None` for metadata-only actions.
    fn action_body(&self) -> Result<Option<Value>, WorkError>;

    /// Interpret this work's item of the bulk response.
    ///
    /// `result_item` is `None` when the response had no `items` array. The
    /// work decides whether it can still classify itself; returning
    /// `Ok(false)` marks it failed.
    ///
    /// Returns `Ok(true)` if the work succeeded.
    fn handle_bulk_result(
        &self,
        context: &dyn WorkExecutionContext,
        result_item: Option<&Value>,
    ) -> Result<bool, WorkError>;

    /// The index mutations this work represents.
    fn mutations(&self) -> Vec<IndexMutation>;
}
