/// File-backed mapping store.
///
/// The mappings document is re-read on every fetch so edits are picked up without a
/// restart. Accepts either a bare JSON array of mappings or `{"mappings": [...]}`;
/// individual mappings that cannot be read are skipped.
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use unified_core::error::CoreError;
use unified_core::framework::SelectedFrameworks;
use unified_core::model::CategoryMapping;
use unified_core::pipeline::MappingSource;

#[derive(Deserialize)]
#[serde(untagged)]
enum MappingDocument {
    List(Vec<Value>),
    Wrapped { mappings: Vec<Value> },
}

pub struct FileMappingStore {
    path: PathBuf,
}

impl FileMappingStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MappingSource for FileMappingStore {
    fn get_mappings(
        &self,
        selected: &SelectedFrameworks,
    ) -> Result<Vec<CategoryMapping>, CoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CoreError::Upstream(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let raw = match serde_json::from_str::<MappingDocument>(&content)? {
            MappingDocument::List(mappings) | MappingDocument::Wrapped { mappings } => mappings,
        };
        let total = raw.len();
        let mappings: Vec<CategoryMapping> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<CategoryMapping>(value) {
                Ok(mapping) => Some(mapping.restrict_to(selected)),
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable category mapping");
                    None
                }
            })
            .collect();
        debug!(
            path = %self.path.display(),
            mappings = mappings.len(),
            skipped = total - mappings.len(),
            "loaded category mappings"
        );
        Ok(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_core::framework::{CisLevel, Framework};

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "unified-guidance-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, content).expect("write temp mappings");
        path
    }

    #[test]
    fn reads_wrapped_document_and_applies_selection() {
        let path = write_temp(
            "wrapped",
            r#"{"mappings": [{
                "category": "3. Access Control",
                "frameworks": {
                    "iso27001": [{"code": "A.5.15", "description": "Rules to control access are established."}],
                    "cisControls": [
                        {"code": "6.1", "description": "Establish an access granting process.", "ig": "ig1"},
                        {"code": "6.8", "description": "Define and maintain role-based access control.", "ig": "ig3"}
                    ]
                },
                "auditReadyUnified": {"subRequirements": ["Access is granted on least privilege."]}
            }]}"#,
        );
        let store = FileMappingStore::new(path.clone());
        let mappings = store
            .get_mappings(&SelectedFrameworks::all(Some(CisLevel::Ig2)))
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].category, "3. Access Control");
        let cis = mappings[0].frameworks.fragments(Framework::CisControls);
        assert_eq!(cis.len(), 1);
        assert_eq!(cis[0].code, "6.1");
        assert_eq!(mappings[0].audit_ready_unified.sub_requirements.len(), 1);
    }

    #[test]
    fn reads_bare_array() {
        let path = write_temp("array", r#"[{"category": "Risk Management"}]"#);
        let mappings = FileMappingStore::new(path.clone())
            .get_mappings(&SelectedFrameworks::default())
            .unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(mappings.len(), 1);
        assert!(mappings[0].frameworks.is_empty());
    }

    #[test]
    fn unreadable_mapping_does_not_hide_the_rest() {
        let path = write_temp(
            "partial",
            r#"[
                {"frameworks": {"iso27001": []}},
                "not a mapping",
                {"category": "Incident Response", "auditReadyUnified": null},
                {"category": "Asset Management", "frameworks": {"notes": "free text", "cisControls": [{"code": 1}]}}
            ]"#,
        );
        let mappings = FileMappingStore::new(path.clone())
            .get_mappings(&SelectedFrameworks::default())
            .unwrap();
        std::fs::remove_file(&path).ok();

        let names: Vec<&str> = mappings.iter().map(|m| m.category.as_str()).collect();
        assert_eq!(names, vec!["Incident Response", "Asset Management"]);
        assert_eq!(mappings[1].frameworks.fragments(Framework::CisControls)[0].code, "1");
    }

    #[test]
    fn missing_file_is_upstream_failure() {
        let store = FileMappingStore::new(PathBuf::from("/nonexistent/unified/mappings.json"));
        let err = store.get_mappings(&SelectedFrameworks::default()).unwrap_err();
        assert!(matches!(err, CoreError::Upstream(_)));
    }

    #[test]
    fn malformed_document_is_json_error() {
        let path = write_temp("malformed", "{not json");
        let err = FileMappingStore::new(path.clone())
            .get_mappings(&SelectedFrameworks::default())
            .unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, CoreError::Json(_)));
    }
}
