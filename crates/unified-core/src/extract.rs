/// Unified requirement extraction: merge per-framework fragments of one mapping into a
/// deduplicated requirement list.
///
/// Exact string equality of the fragment statement is the only deduplication signal.
/// Near-duplicate wording across frameworks is kept as separate requirements.
use std::collections::HashMap;

use crate::model::{CategoryMapping, RequirementReference, UnifiedRequirement};

/// Produce the category's consolidated requirements in first-seen order.
///
/// Frameworks are walked in merge order (ISO 27001, ISO 27002, CIS Controls, GDPR,
/// NIS2) and fragments in list order. Blank fragments are skipped.
pub fn extract_unified_requirements(mapping: &CategoryMapping) -> Vec<UnifiedRequirement> {
    let mut requirements: Vec<UnifiedRequirement> = Vec::new();
    let mut index_by_text: HashMap<String, usize> = HashMap::new();

    for (framework, fragments) in mapping.frameworks.iter() {
        for fragment in fragments {
            let text = fragment.statement();
            if text.is_empty() {
                continue;
            }

            let idx = match index_by_text.get(text) {
                Some(&idx) => idx,
                None => {
                    requirements.push(UnifiedRequirement {
                        text: text.to_string(),
                        frameworks: Vec::new(),
                        references: Vec::new(),
                    });
                    index_by_text.insert(text.to_string(), requirements.len() - 1);
                    requirements.len() - 1
                }
            };

            let requirement = &mut requirements[idx];
            if !requirement.frameworks.contains(&framework) {
                requirement.frameworks.push(framework);
            }
            let code = fragment.code.trim();
            if !code.is_empty() {
                let reference = RequirementReference {
                    framework,
                    code: code.to_string(),
                };
                if !requirement.references.contains(&reference) {
                    requirement.references.push(reference);
                }
            }
        }
    }

    requirements
}
