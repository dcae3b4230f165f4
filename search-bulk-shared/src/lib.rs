//! # Search Bulk Shared
//!
//! Types shared between the bulk executor and the code that feeds it.
//!
//! An [`IndexMutation`] is the lowest-level record of a change to the search
//! index. Bulkable works expose the mutations they represent so callers can
//! audit what a bulk request actually touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of change a mutation applies to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// A document is added or fully replaced.
    Add,
    /// Some fields of a document are changed.
    Update,
    /// A document is removed.
    Delete,
}

/// A single recorded change to a document in a search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMutation {
    /// Unique identifier of this record.
    pub id: Uuid,
    /// What the mutation does.
    pub kind: MutationKind,
    /// Name of the target index.
    pub index: String,
    /// Identifier of the target document.
    pub document_id: String,
    /// When the mutation was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl IndexMutation {
    /// Record a new mutation against the given index and document.
    pub fn new(kind: MutationKind, index: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            index: index.into(),
            document_id: document_id.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Whether this mutation removes the document.
    pub fn is_delete(&self) -> bool {
        self.kind == MutationKind::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mutation() {
        let mutation = IndexMutation::new(MutationKind::Add, "entities", "doc-1");

        assert_eq!(mutation.kind, MutationKind::Add);
        assert_eq!(mutation.index, "entities");
        assert_eq!(mutation.document_id, "doc-1");
        assert!(!mutation.is_delete());
    }

    #[test]
    fn test_mutation_ids_are_unique() {
        let first = IndexMutation::new(MutationKind::Delete, "entities", "doc-1");
        let second = IndexMutation::new(MutationKind::Delete, "entities", "doc-1");

        assert_ne!(first.id, second.id);
        assert!(first.is_delete());
    }

    #[test]
    fn test_kind_serializes_as_snake_case() {
        let value = serde_json::to_value(MutationKind::Update).unwrap();
        assert_eq!(value, serde_json::json!("update"));
    }
}
