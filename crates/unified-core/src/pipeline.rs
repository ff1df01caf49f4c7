/// Reconciliation pipeline: resolve a category against freshly fetched mappings, apply
/// the governance override, extract unified requirements and format sub-guidance.
///
/// Every call fetches mappings once from the [`MappingSource`]; nothing is cached and
/// nothing is mutated between calls. Only fetch failures surface as errors.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::convert::convert_sub_requirements;
use crate::error::CoreError;
use crate::extract::extract_unified_requirements;
use crate::framework::SelectedFrameworks;
use crate::governance::{corrected_structure, is_governance_category, restructured_entries};
use crate::guidance::{generate_guidance, UnifiedGuidance};
use crate::model::{CategoryMapping, SubGuidanceItem, SubRequirementEntry, UnifiedRequirement};
use crate::normalize::{find_mapping, normalize_category};

/// The Framework Mapping Store. Retry and backoff, if any, belong to implementations.
pub trait MappingSource {
    fn get_mappings(&self, selected: &SelectedFrameworks)
        -> Result<Vec<CategoryMapping>, CoreError>;
}

/// A category resolved against the mapping store.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCategory {
    /// The matched mapping's name, ordinal prefix stripped.
    pub category: String,
    pub mapping: CategoryMapping,
    /// The mapping's own sub-requirements, or the curated governance list.
    pub sub_requirements: Vec<SubRequirementEntry>,
    pub requirements: Vec<UnifiedRequirement>,
}

/// One row of the category listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub fragment_count: usize,
    pub sub_requirement_count: usize,
    pub governance_override: bool,
}

pub struct Reconciler<S> {
    source: S,
}

impl<S: MappingSource> Reconciler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Resolve `category_name` and gather its sub-requirements and unified requirements.
    /// `Ok(None)` when no mapping matches.
    pub fn load_existing_sub_requirements(
        &self,
        category_name: &str,
        selected: &SelectedFrameworks,
    ) -> Result<Option<LoadedCategory>, CoreError> {
        let mappings = self.source.get_mappings(selected)?;
        let Some(mapping) = find_mapping(&mappings, category_name) else {
            warn!(
                category = category_name,
                mappings = mappings.len(),
                "no mapping found for category"
            );
            return Ok(None);
        };

        let category = normalize_category(mapping.category.trim());
        let sub_requirements = if is_governance_category(&category) {
            let entries = restructured_entries(&corrected_structure());
            info!(
                category = %category,
                replaced = mapping.audit_ready_unified.sub_requirements.len(),
                curated = entries.len(),
                "applying governance restructuring"
            );
            entries
        } else {
            mapping.audit_ready_unified.sub_requirements.clone()
        };

        let requirements = extract_unified_requirements(mapping);
        debug!(
            category = %category,
            sub_requirements = sub_requirements.len(),
            requirements = requirements.len(),
            "category loaded"
        );

        Ok(Some(LoadedCategory {
            category,
            mapping: mapping.clone(),
            sub_requirements,
            requirements,
        }))
    }

    /// Labelled sub-guidance for a category; empty when no mapping matches.
    pub fn generate_real_unified_guidance(
        &self,
        category_name: &str,
        selected: &SelectedFrameworks,
    ) -> Result<Vec<SubGuidanceItem>, CoreError> {
        let Some(loaded) = self.load_existing_sub_requirements(category_name, selected)? else {
            return Ok(Vec::new());
        };
        Ok(convert_sub_requirements(&loaded.sub_requirements, &loaded.category))
    }

    pub fn convert_sub_requirements_to_sub_guidance(
        &self,
        sub_requirements: &[SubRequirementEntry],
        category_name: &str,
    ) -> Vec<SubGuidanceItem> {
        convert_sub_requirements(sub_requirements, category_name)
    }

    /// Template guidance for a category; `Ok(None)` when no mapping matches.
    pub fn generate_category_guidance(
        &self,
        category_name: &str,
        selected: &SelectedFrameworks,
    ) -> Result<Option<UnifiedGuidance>, CoreError> {
        Ok(self
            .load_existing_sub_requirements(category_name, selected)?
            .map(|loaded| generate_guidance(&loaded.requirements)))
    }

    pub fn list_categories(
        &self,
        selected: &SelectedFrameworks,
    ) -> Result<Vec<CategorySummary>, CoreError> {
        let mappings = self.source.get_mappings(selected)?;
        Ok(mappings
            .iter()
            .map(|mapping| {
                let name = normalize_category(mapping.category.trim());
                let governance_override = is_governance_category(&name);
                let sub_requirement_count = if governance_override {
                    restructured_entries(&corrected_structure()).len()
                } else {
                    mapping.audit_ready_unified.sub_requirements.len()
                };
                CategorySummary {
                    fragment_count: mapping.frameworks.fragment_count(),
                    sub_requirement_count,
                    governance_override,
                    name,
                }
            })
            .collect())
    }
}
