//! Single-document bulk actions.

use std::collections::BTreeSet;
use std::fmt;

use search_bulk_shared::{IndexMutation, MutationKind};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::WorkError;
use crate::interfaces::{BulkableWork, WorkExecutionContext};

/// HTTP status returned when a document does not exist.
const STATUS_NOT_FOUND: u16 = 404;

/// An action of the bulk API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    /// Add or replace a document.
    Index,
    /// Add a document, failing if it already exists.
    Create,
    /// Partially update a document.
    Update,
    /// Remove a document.
    Delete,
}

impl BulkAction {
    /// The action name used as key in the metadata line and in response items.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn mutation_kind(self) -> MutationKind {
        match self {
            Self::Index | Self::Create => MutationKind::Add,
            Self::Update => MutationKind::Update,
            Self::Delete => MutationKind::Delete,
        }
    }

    fn adds_document(self) -> bool {
        matches!(self, Self::Index | Self::Create)
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the engine compares a supplied version with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionType {
    /// Accept the write only if the supplied version is greater.
    External,
    /// Accept the write if the supplied version is greater or equal.
    ExternalGte,
}

impl VersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::ExternalGte => "external_gte",
        }
    }
}

/// The document a work applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTarget {
    /// Name of the index.
    pub index: String,
    /// Document identifier.
    pub id: String,
    /// Optional shard routing key.
    pub routing: Option<String>,
    /// Optional optimistic concurrency control.
    pub version: Option<(u64, VersionType)>,
}

impl WorkTarget {
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            routing: None,
            version: None,
        }
    }

    /// Set the routing key.
    pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Set an external version the engine checks before writing.
    pub fn with_version(mut self, version: u64, version_type: VersionType) -> Self {
        self.version = Some((version, version_type));
        self
    }

    fn validate(&self) -> Result<(), WorkError> {
        if self.index.is_empty() {
            return Err(WorkError::invalid_target("index is required"));
        }
        if self.id.is_empty() {
            return Err(WorkError::invalid_target(format!(
                "document id is required (index {})",
                self.index
            )));
        }
        Ok(())
    }
}

/// A bulkable work acting on a single document.
///
/// On success the work marks its index dirty, unless built with
/// [`without_index_dirty`](Self::without_index_dirty), and `index`/`create`
/// works report one added document to the indexing monitor.
#[derive(Debug, Clone)]
pub struct SimpleBulkableWork {
    action: BulkAction,
    target: WorkTarget,
    body: Option<Value>,
    retry_on_conflict: Option<u32>,
    ignored_error_statuses: BTreeSet<u16>,
    mark_index_dirty: bool,
    mutation: IndexMutation,
}

impl SimpleBulkableWork {
    fn new(action: BulkAction, target: WorkTarget, body: Option<Value>) -> Self {
        let mutation = IndexMutation::new(action.mutation_kind(), &target.index, &target.id);
        Self {
            action,
            target,
            body,
            retry_on_conflict: None,
            ignored_error_statuses: BTreeSet::new(),
            mark_index_dirty: true,
            mutation,
        }
    }

    /// Add or replace a document.
    pub fn index<T: Serialize>(target: WorkTarget, document: &T) -> Result<Self, WorkError> {
        let body = serde_json::to_value(document)?;
        Ok(Self::new(BulkAction::Index, target, Some(body)))
    }

    /// Add a document that must not exist yet.
    pub fn create<T: Serialize>(target: WorkTarget, document: &T) -> Result<Self, WorkError> {
        let body = serde_json::to_value(document)?;
        Ok(Self::new(BulkAction::Create, target, Some(body)))
    }

    /// Update the given fields of a document.
    ///
    /// With `upsert`, a missing document is created from the partial document.
    pub fn update<T: Serialize>(
        target: WorkTarget,
        partial: &T,
        upsert: bool,
    ) -> Result<Self, WorkError> {
        let doc = serde_json::to_value(partial)?;
        Ok(Self::new(
            BulkAction::Update,
            target,
            Some(json!({ "doc": doc, "doc_as_upsert": upsert })),
        ))
    }

    /// Delete a document. A missing document counts as deleted.
    pub fn delete(target: WorkTarget) -> Self {
        Self::new(BulkAction::Delete, target, None).ignore_error_status(STATUS_NOT_FOUND)
    }

    /// Let the engine retry an update this many times on version conflicts.
    pub fn with_retry_on_conflict(mut self, retries: u32) -> Self {
        self.retry_on_conflict = Some(retries);
        self
    }

    /// Treat the given error status as success.
    pub fn ignore_error_status(mut self, status: u16) -> Self {
        self.ignored_error_statuses.insert(status);
        self
    }

    /// Do not mark the index dirty when this work succeeds.
    pub fn without_index_dirty(mut self) -> Self {
        self.mark_index_dirty = false;
        self
    }

    pub fn action(&self) -> BulkAction {
        self.action
    }

    pub fn target(&self) -> &WorkTarget {
        &self.target
    }

    /// Read the status of this work's response item.
    ///
    /// An item is an object with a single key naming the action.
    fn result_status(&self, item: &Value) -> Result<u16, WorkError> {
        let entry = item
            .as_object()
            .filter(|object| object.len() == 1)
            .and_then(|object| object.get(self.action.as_str()))
            .ok_or_else(|| {
                WorkError::malformed_result_item(format!(
                    "expected a single '{}' entry for document {}, got {}",
                    self.action, self.target.id, item
                ))
            })?;

        let status = entry
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok())
            .ok_or_else(|| {
                WorkError::malformed_result_item(format!(
                    "missing or invalid status for document {}",
                    self.target.id
                ))
            })?;

        Ok(status)
    }

    fn is_success(&self, status: u16) -> bool {
        (200..300).contains(&status) || self.ignored_error_statuses.contains(&status)
    }

    fn after_success(&self, context: &dyn WorkExecutionContext) {
        if self.mark_index_dirty {
            context.set_index_dirty(&self.target.index);
        }
        if self.action.adds_document() {
            context.indexing_monitor().documents_added(1);
        }
    }
}

impl BulkableWork for SimpleBulkableWork {
    fn action_metadata(&self) -> Result<Value, WorkError> {
        self.target.validate()?;

        let mut metadata = Map::new();
        metadata.insert("_index".to_string(), json!(self.target.index));
        metadata.insert("_id".to_string(), json!(self.target.id));
        if let Some(ref routing) = self.target.routing {
            metadata.insert("routing".to_string(), json!(routing));
        }
        if let Some((version, version_type)) = self.target.version {
            metadata.insert("version".to_string(), json!(version));
            metadata.insert("version_type".to_string(), json!(version_type.as_str()));
        }
        if self.action == BulkAction::Update {
            if let Some(retries) = self.retry_on_conflict {
                metadata.insert("retry_on_conflict".to_string(), json!(retries));
            }
        }

        let mut action = Map::new();
        action.insert(self.action.as_str().to_string(), Value::Object(metadata));
        Ok(Value::Object(action))
    }

    fn action_body(&self) -> Result<Option<Value>, WorkError> {
        Ok(self.body.clone())
    }

    fn handle_bulk_result(
        &self,
        context: &dyn WorkExecutionContext,
        result_item: Option<&Value>,
    ) -> Result<bool, WorkError> {
        let Some(item) = result_item else {
            return Ok(false);
        };

        let success = self.is_success(self.result_status(item)?);
        if success {
            self.after_success(context);
        }
        Ok(success)
    }

    fn mutations(&self) -> Vec<IndexMutation> {
        vec![self.mutation.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CountingIndexingMonitor, DefaultWorkExecutionContext};
    use crate::errors::ClientError;
    use crate::interfaces::SearchTransport;
    use crate::request::{RawResponse, SearchRequest};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopTransport;

    #[async_trait]
    impl SearchTransport for NoopTransport {
        async fn execute(&self, _request: &SearchRequest) -> Result<RawResponse, ClientError> {
            Ok(RawResponse::new(200, "{}"))
        }
    }

    fn create_test_context() -> (DefaultWorkExecutionContext, Arc<CountingIndexingMonitor>) {
        let monitor = Arc::new(CountingIndexingMonitor::new());
        let context = DefaultWorkExecutionContext::with_monitor(Arc::new(NoopTransport), monitor.clone());
        (context, monitor)
    }

    #[test]
    fn test_index_metadata_and_body() {
        let target = WorkTarget::new("entities", "e1")
            .with_routing("space-1")
            .with_version(7, VersionType::External);
        let work = SimpleBulkableWork::index(target, &json!({"name": "Entity"})).unwrap();

        assert_eq!(
            work.action_metadata().unwrap(),
            json!({"index": {
                "_index": "entities",
                "_id": "e1",
                "routing": "space-1",
                "version": 7,
                "version_type": "external"
            }})
        );
        assert_eq!(work.action_body().unwrap(), Some(json!({"name": "Entity"})));
    }

    #[test]
    fn test_delete_has_no_body() {
        let work = SimpleBulkableWork::delete(WorkTarget::new("entities", "e1"));

        assert_eq!(
            work.action_metadata().unwrap(),
            json!({"delete": {"_index": "entities", "_id": "e1"}})
        );
        assert_eq!(work.action_body().unwrap(), None);
    }

    #[test]
    fn test_update_body_and_retry_on_conflict() {
        let work = SimpleBulkableWork::update(
            WorkTarget::new("entities", "e1"),
            &json!({"description": "New"}),
            true,
        )
        .unwrap()
        .with_retry_on_conflict(3);

        assert_eq!(
            work.action_metadata().unwrap(),
            json!({"update": {"_index": "entities", "_id": "e1", "retry_on_conflict": 3}})
        );
        assert_eq!(
            work.action_body().unwrap(),
            Some(json!({"doc": {"description": "New"}, "doc_as_upsert": true}))
        );
    }

    #[test]
    fn test_metadata_rejects_empty_id() {
        let work = SimpleBulkableWork::delete(WorkTarget::new("entities", ""));
        let err = work.action_metadata().unwrap_err();
        assert!(matches!(err, WorkError::InvalidTarget(_)));
    }

    #[test]
    fn test_successful_index_marks_dirty_and_counts_document() {
        let (context, monitor) = create_test_context();
        let work = SimpleBulkableWork::index(WorkTarget::new("entities", "e1"), &json!({})).unwrap();

        let item = json!({"index": {"_id": "e1", "status": 201}});
        assert!(work.handle_bulk_result(&context, Some(&item)).unwrap());

        assert_eq!(context.dirty_indexes(), vec!["entities"]);
        assert_eq!(monitor.documents_added_count(), 1);
    }

    #[test]
    fn test_without_index_dirty() {
        let (context, _) = create_test_context();
        let work = SimpleBulkableWork::update(WorkTarget::new("entities", "e1"), &json!({}), false)
            .unwrap()
            .without_index_dirty();

        let item = json!({"update": {"_id": "e1", "status": 200}});
        assert!(work.handle_bulk_result(&context, Some(&item)).unwrap());
        assert!(context.dirty_indexes().is_empty());
    }

    #[test]
    fn test_delete_not_found_is_success() {
        let (context, monitor) = create_test_context();
        let work = SimpleBulkableWork::delete(WorkTarget::new("entities", "e1"));

        let item = json!({"delete": {"_id": "e1", "status": 404, "result": "not_found"}});
        assert!(work.handle_bulk_result(&context, Some(&item)).unwrap());
        assert_eq!(monitor.documents_added_count(), 0);
    }

    #[test]
    fn test_version_conflict_is_failure() {
        let (context, _) = create_test_context();
        let work = SimpleBulkableWork::delete(
            WorkTarget::new("entities", "e1").with_version(3, VersionType::External),
        );

        let item = json!({"delete": {
            "_id": "e1",
            "status": 409,
            "error": {"type": "version_conflict_engine_exception"}
        }});
        assert!(!work.handle_bulk_result(&context, Some(&item)).unwrap());
        assert!(context.dirty_indexes().is_empty());
    }

    #[test]
    fn test_missing_result_item_is_failure() {
        let (context, _) = create_test_context();
        let work = SimpleBulkableWork::create(WorkTarget::new("entities", "e1"), &json!({})).unwrap();

        assert!(!work.handle_bulk_result(&context, None).unwrap());
    }

    #[test]
    fn test_mismatched_action_is_malformed() {
        let (context, _) = create_test_context();
        let work = SimpleBulkableWork::create(WorkTarget::new("entities", "e1"), &json!({})).unwrap();

        let item = json!({"index": {"_id": "e1", "status": 201}});
        let err = work.handle_bulk_result(&context, Some(&item)).unwrap_err();
        assert!(matches!(err, WorkError::MalformedResultItem(_)));
    }

    #[test]
    fn test_missing_status_is_malformed() {
        let (context, _) = create_test_context();
        let work = SimpleBulkableWork::delete(WorkTarget::new("entities", "e1"));

        let item = json!({"delete": {"_id": "e1"}});
        let err = work.handle_bulk_result(&context, Some(&item)).unwrap_err();
        assert!(matches!(err, WorkError::MalformedResultItem(_)));
    }

    #[test]
    fn test_mutations() {
        let work = SimpleBulkableWork::update(WorkTarget::new("entities", "e1"), &json!({}), true).unwrap();
        let mutations = work.mutations();

        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].kind, MutationKind::Update);
        assert_eq!(mutations[0].index, "entities");
        assert_eq!(mutations[0].document_id, "e1");
    }
}
