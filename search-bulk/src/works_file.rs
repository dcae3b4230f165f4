//! Loading works from a JSON file.
//!
//! The file holds an array of works in submission order:
//!
//! ```json
//! [
//!   {"action": "index", "index": "entities", "id": "e1", "document": {"name": "Entity"}},
//!   {"action": "update", "index": "entities", "id": "e2", "document": {"name": "New"}, "upsert": true},
//!   {"action": "delete", "index": "entities", "id": "e3", "version": 4}
//! ]
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::IndexingError;
use search_bulk_repository::{BulkableWork, SimpleBulkableWork, VersionType, WorkTarget};

/// Version check requested for a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionTypeSpec {
    External,
    ExternalGte,
}

impl From<VersionTypeSpec> for VersionType {
    fn from(spec: VersionTypeSpec) -> Self {
        match spec {
            VersionTypeSpec::External => VersionType::External,
            VersionTypeSpec::ExternalGte => VersionType::ExternalGte,
        }
    }
}

/// The document a work in the file applies to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetSpec {
    pub index: String,
    pub id: String,
    #[serde(default)]
    pub routing: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub version_type: Option<VersionTypeSpec>,
}

impl From<TargetSpec> for WorkTarget {
    fn from(spec: TargetSpec) -> Self {
        let mut target = WorkTarget::new(spec.index, spec.id);
        if let Some(routing) = spec.routing {
            target = target.with_routing(routing);
        }
        if let Some(version) = spec.version {
            let version_type = spec.version_type.unwrap_or(VersionTypeSpec::External);
            target = target.with_version(version, version_type.into());
        }
        target
    }
}

/// One entry of the works file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkSpec {
    Index {
        #[serde(flatten)]
        target: TargetSpec,
        document: Value,
    },
    Create {
        #[serde(flatten)]
        target: TargetSpec,
        document: Value,
    },
    Update {
        #[serde(flatten)]
        target: TargetSpec,
        document: Value,
        #[serde(default)]
        upsert: bool,
        #[serde(default)]
        retry_on_conflict: Option<u32>,
    },
    Delete {
        #[serde(flatten)]
        target: TargetSpec,
    },
}

impl WorkSpec {
    /// Build the bulkable work described by this entry.
    pub fn into_work(self) -> Result<Box<dyn BulkableWork>, IndexingError> {
        let work = match self {
            Self::Index { target, document } => SimpleBulkableWork::index(target.into(), &document)?,
            Self::Create { target, document } => {
                SimpleBulkableWork::create(target.into(), &document)?
            }
            Self::Update {
                target,
                document,
                upsert,
                retry_on_conflict,
            } => {
                let work = SimpleBulkableWork::update(target.into(), &document, upsert)?;
                match retry_on_conflict {
                    Some(retries) => work.with_retry_on_conflict(retries),
                    None => work,
                }
            }
            Self::Delete { target } => SimpleBulkableWork::delete(target.into()),
        };
        Ok(Box::new(work))
    }
}

/// Parse works from the JSON text of a works file.
pub fn parse_works(content: &str) -> Result<Vec<Box<dyn BulkableWork>>, IndexingError> {
    let specs: Vec<WorkSpec> = serde_json::from_str(content)?;
    specs.into_iter().map(WorkSpec::into_work).collect()
}

/// Read and parse a works file.
pub async fn load_works(path: &Path) -> Result<Vec<Box<dyn BulkableWork>>, IndexingError> {
    let content = tokio::fs::read_to_string(path).await?;
    let works = parse_works(&content)?;
    debug!(path = %path.display(), count = works.len(), "Loaded works file");
    Ok(works)
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_bulk_shared::MutationKind;
    use serde_json::json;

    #[test]
    fn test_parse_spec_variants() {
        let spec: WorkSpec = serde_json::from_value(json!({
            "action": "update",
            "index": "entities",
            "id": "e1",
            "routing": "space-1",
            "document": {"name": "New"},
            "upsert": true,
            "retry_on_conflict": 2
        }))
        .unwrap();

        assert_eq!(
            spec,
            WorkSpec::Update {
                target: TargetSpec {
                    index: "entities".to_string(),
                    id: "e1".to_string(),
                    routing: Some("space-1".to_string()),
                    version: None,
                    version_type: None,
                },
                document: json!({"name": "New"}),
                upsert: true,
                retry_on_conflict: Some(2),
            }
        );
    }

    #[test]
    fn test_version_defaults_to_external() {
        let target: WorkTarget = TargetSpec {
            index: "entities".to_string(),
            id: "e1".to_string(),
            routing: None,
            version: Some(4),
            version_type: None,
        }
        .into();

        assert_eq!(target.version, Some((4, VersionType::External)));
    }

    #[test]
    fn test_parse_works_keeps_order() {
        let content = json!([
            {"action": "index", "index": "entities", "id": "e1", "document": {"name": "One"}},
            {"action": "delete", "index": "entities", "id": "e2", "version": 3, "version_type": "external_gte"},
            {"action": "create", "index": "entities", "id": "e3", "document": {"name": "Three"}}
        ])
        .to_string();

        let works = parse_works(&content).unwrap();

        let kinds: Vec<(MutationKind, String)> = works
            .iter()
            .flat_map(|work| work.mutations())
            .map(|m| (m.kind, m.document_id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (MutationKind::Add, "e1".to_string()),
                (MutationKind::Delete, "e2".to_string()),
                (MutationKind::Add, "e3".to_string()),
            ]
        );
        assert_eq!(
            works[1].action_metadata().unwrap(),
            json!({"delete": {"_index": "entities", "_id": "e2", "version": 3, "version_type": "external_gte"}})
        );
    }

    #[test]
    fn test_parse_works_rejects_unknown_action() {
        let content = r#"[{"action": "upsert", "index": "entities", "id": "e1"}]"#;
        let result = parse_works(content);
        assert!(matches!(result, Err(IndexingError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_load_works_missing_file() {
        let result = load_works(Path::new("/nonexistent/works.json")).await;
        assert!(matches!(result, Err(IndexingError::IoError(_))));
    }
}
