/// MCP server exposing the unified requirements reconciliation pipeline.
///
/// Tools:
/// - `load_existing_sub_requirements`: resolve a category and return its mapping,
///   sub-requirements and unified requirements
/// - `generate_unified_guidance`: labelled sub-guidance items for a category
/// - `convert_sub_requirements`: convert caller-supplied raw entries
/// - `generate_category_guidance`: template guidance prose for a category
/// - `list_categories`: every category in the mapping store
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use unified_core::error::CoreError;
use unified_core::framework::SelectedFrameworks;
use unified_core::mcp_api::{
    CategoryGuidanceResponse, CategoryListResponse, CategoryParams, ConvertSubRequirementsParams,
    ListCategoriesParams, LoadSubRequirementsResponse, SubGuidanceResponse,
};
use unified_core::model::SubRequirementEntry;
use unified_core::pipeline::Reconciler;

use crate::store::FileMappingStore;

#[derive(Clone)]
pub struct UnifiedGuidanceServer {
    reconciler: Arc<Reconciler<FileMappingStore>>,
    default_frameworks: SelectedFrameworks,
    tool_router: ToolRouter<UnifiedGuidanceServer>,
}

impl UnifiedGuidanceServer {
    pub fn new(store: FileMappingStore, default_frameworks: SelectedFrameworks) -> Self {
        Self {
            reconciler: Arc::new(Reconciler::new(store)),
            default_frameworks,
            tool_router: Self::tool_router(),
        }
    }

    fn frameworks(&self, requested: Option<SelectedFrameworks>) -> SelectedFrameworks {
        requested.unwrap_or_else(|| self.default_frameworks.clone())
    }

    /// Run a reconciler call that reads the mapping document on the blocking pool.
    async fn with_reconciler<T, F>(&self, context: &str, job: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Reconciler<FileMappingStore>) -> Result<T, CoreError> + Send + 'static,
    {
        let reconciler = Arc::clone(&self.reconciler);
        tokio::task::spawn_blocking(move || job(&reconciler))
            .await
            .map_err(|e| format!("{context}: task failed: {e}"))?
            .map_err(|e| format!("{context}: {e}"))
    }
}

fn require_category(raw: &str) -> Result<String, String> {
    let category = raw.trim().to_string();
    if category.is_empty() {
        return Err("category must not be empty".to_string());
    }
    Ok(category)
}

#[tool_router]
impl UnifiedGuidanceServer {
    #[tool(description = "Resolve a compliance category against the framework mappings and return the matched mapping, its sub-requirements (curated for Governance & Leadership) and the deduplicated unified requirements.")]
    async fn load_existing_sub_requirements(
        &self,
        Parameters(params): Parameters<CategoryParams>,
    ) -> Result<Json<LoadSubRequirementsResponse>, String> {
        let category = require_category(&params.category)?;
        let selected = self.frameworks(params.frameworks);

        let lookup = category.clone();
        let loaded = self
            .with_reconciler("load failed", move |reconciler| {
                reconciler.load_existing_sub_requirements(&lookup, &selected)
            })
            .await?;

        let Some(loaded) = loaded else {
            return Ok(Json(LoadSubRequirementsResponse {
                found: false,
                category: None,
                mapping: None,
                sub_requirements: Vec::new(),
                requirements: Vec::new(),
            }));
        };

        let mapping = serde_json::to_value(&loaded.mapping)
            .map_err(|e| format!("failed to serialize mapping: {e}"))?;
        let sub_requirements = loaded
            .sub_requirements
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("failed to serialize sub-requirements: {e}"))?;

        Ok(Json(LoadSubRequirementsResponse {
            found: true,
            category: Some(loaded.category),
            mapping: Some(mapping),
            sub_requirements,
            requirements: loaded.requirements,
        }))
    }

    #[tool(description = "Generate labelled (a), b), c)...) sub-guidance items for a compliance category from its existing unified sub-requirements. Returns an empty list when the category has no mapping.")]
    async fn generate_unified_guidance(
        &self,
        Parameters(params): Parameters<CategoryParams>,
    ) -> Result<Json<SubGuidanceResponse>, String> {
        let category = require_category(&params.category)?;
        let selected = self.frameworks(params.frameworks);

        let lookup = category.clone();
        let items = self
            .with_reconciler("guidance generation failed", move |reconciler| {
                reconciler.generate_real_unified_guidance(&lookup, &selected)
            })
            .await?;

        Ok(Json(SubGuidanceResponse { category, items }))
    }

    #[tool(description = "Convert raw sub-requirement entries (strings or objects with content/text/requirement/description/guidance/details) into labelled, cleaned sub-guidance items.")]
    async fn convert_sub_requirements(
        &self,
        Parameters(params): Parameters<ConvertSubRequirementsParams>,
    ) -> Result<Json<SubGuidanceResponse>, String> {
        let category = require_category(&params.category)?;
        let entries: Vec<SubRequirementEntry> = params
            .sub_requirements
            .into_iter()
            .map(SubRequirementEntry::from_value)
            .collect();

        let items = self
            .reconciler
            .convert_sub_requirements_to_sub_guidance(&entries, &category);
        Ok(Json(SubGuidanceResponse { category, items }))
    }

    #[tool(description = "Generate template-driven implementation guidance (foundation text, steps, tools, audit evidence, cross references) from a category's unified requirements.")]
    async fn generate_category_guidance(
        &self,
        Parameters(params): Parameters<CategoryParams>,
    ) -> Result<Json<CategoryGuidanceResponse>, String> {
        let category = require_category(&params.category)?;
        let selected = self.frameworks(params.frameworks);

        let lookup = category.clone();
        let guidance = self
            .with_reconciler("guidance generation failed", move |reconciler| {
                reconciler.generate_category_guidance(&lookup, &selected)
            })
            .await?;

        Ok(Json(CategoryGuidanceResponse {
            found: guidance.is_some(),
            category,
            guidance,
        }))
    }

    #[tool(description = "List every compliance category in the mapping store with fragment and sub-requirement counts.")]
    async fn list_categories(
        &self,
        Parameters(params): Parameters<ListCategoriesParams>,
    ) -> Result<Json<CategoryListResponse>, String> {
        let selected = self.frameworks(params.frameworks);
        let categories = self
            .with_reconciler("list failed", move |reconciler| {
                reconciler.list_categories(&selected)
            })
            .await?;
        info!(categories = categories.len(), "categories listed");
        Ok(Json(CategoryListResponse { categories }))
    }
}

#[tool_handler]
impl ServerHandler for UnifiedGuidanceServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "unified-guidance".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Unified compliance requirements MCP server. Merges ISO 27001, ISO 27002, \
                 CIS Controls, GDPR and NIS2 mappings per category. Use list_categories to \
                 browse, load_existing_sub_requirements for the raw reconciled data, \
                 generate_unified_guidance for labelled sub-guidance, \
                 generate_category_guidance for guidance prose, and convert_sub_requirements \
                 to format entries supplied by the caller."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = UnifiedGuidanceServer::tool_router().list_all();
        for name in [
            "load_existing_sub_requirements",
            "generate_unified_guidance",
            "convert_sub_requirements",
            "generate_category_guidance",
            "list_categories",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    fn server_for(name: &str, content: &str) -> (UnifiedGuidanceServer, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "unified-guidance-server-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, content).expect("write temp mappings");
        let server =
            UnifiedGuidanceServer::new(FileMappingStore::new(path.clone()), SelectedFrameworks::default());
        (server, path)
    }

    #[tokio::test]
    async fn guidance_tool_reads_mappings_off_the_runtime() {
        let (server, path) = server_for(
            "guidance",
            r#"[{"category": "8. Asset Management",
                 "auditReadyUnified": {"subRequirements": ["Maintain an inventory of all assets."]}}]"#,
        );
        let Json(response) = server
            .generate_unified_guidance(Parameters(CategoryParams {
                category: "asset management".to_string(),
                frameworks: None,
            }))
            .await
            .unwrap();
        let Json(listing) = server
            .list_categories(Parameters(ListCategoriesParams { frameworks: None }))
            .await
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].id, "asset-management-sub-0");
        assert_eq!(listing.categories[0].name, "Asset Management");
    }

    #[tokio::test]
    async fn unreadable_document_is_a_tool_error() {
        let server = UnifiedGuidanceServer::new(
            FileMappingStore::new(PathBuf::from("/nonexistent/unified/mappings.json")),
            SelectedFrameworks::default(),
        );
        let Err(err) = server
            .generate_category_guidance(Parameters(CategoryParams {
                category: "Asset Management".to_string(),
                frameworks: None,
            }))
            .await
        else {
            panic!("expected a tool error for an unreadable mapping document");
        };
        assert!(err.starts_with("guidance generation failed:"));
    }

    #[test]
    fn blank_category_is_rejected() {
        assert!(require_category("   ").is_err());
        assert_eq!(require_category(" Asset Management ").unwrap(), "Asset Management");
    }
}
