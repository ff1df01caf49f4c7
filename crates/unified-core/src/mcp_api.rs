use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::framework::SelectedFrameworks;
use crate::guidance::UnifiedGuidance;
use crate::model::{SubGuidanceItem, UnifiedRequirement};
use crate::pipeline::CategorySummary;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CategoryParams {
    /// Category name, e.g. "Governance & Leadership" or "8. Asset Management".
    pub category: String,
    /// Framework toggles. Defaults to every framework with CIS at the server's configured group.
    pub frameworks: Option<SelectedFrameworks>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConvertSubRequirementsParams {
    /// Category name used for item IDs and placeholder text.
    pub category: String,
    /// Raw entries: strings, or objects exposing content/text/requirement/description/guidance/details.
    pub sub_requirements: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListCategoriesParams {
    pub frameworks: Option<SelectedFrameworks>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadSubRequirementsResponse {
    pub found: bool,
    pub category: Option<String>,
    /// The matched mapping document as stored, restricted to the selected frameworks.
    pub mapping: Option<serde_json::Value>,
    pub sub_requirements: Vec<serde_json::Value>,
    pub requirements: Vec<UnifiedRequirement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubGuidanceResponse {
    pub category: String,
    pub items: Vec<SubGuidanceItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryGuidanceResponse {
    pub found: bool,
    pub category: String,
    pub guidance: Option<UnifiedGuidance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
}
