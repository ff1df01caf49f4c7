use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::framework::{identify_standard, CisLevel, Framework, SelectedFrameworks};

/// One compliance category's cross-framework data, as supplied by the mapping store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMapping {
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Display name, possibly with a leading ordinal such as "8. ".
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub frameworks: FrameworkRequirements,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audit_ready_unified: AuditReadyUnified,
}

impl CategoryMapping {
    /// Copy of this mapping holding only the fragments admitted by `selected`.
    pub fn restrict_to(&self, selected: &SelectedFrameworks) -> CategoryMapping {
        let mut restricted = self.clone();
        restricted.frameworks.retain_selected(selected);
        restricted
    }
}

/// The candidate merged data attached to a mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReadyUnified {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
    /// Order is significant: it determines label assignment.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_requirements: Vec<SubRequirementEntry>,
}

/// A candidate sub-requirement. The store guarantees no schema for these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubRequirementEntry {
    /// A bare string.
    Text(String),
    /// An object exposing one of the recognised text fields (or none of them).
    Fields(Map<String, Value>),
    /// Anything else: numbers, arrays, null.
    Raw(Value),
}

impl SubRequirementEntry {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => SubRequirementEntry::Text(text),
            Value::Object(fields) => SubRequirementEntry::Fields(fields),
            other => SubRequirementEntry::Raw(other),
        }
    }
}

impl From<&str> for SubRequirementEntry {
    fn from(text: &str) -> Self {
        SubRequirementEntry::Text(text.to_string())
    }
}

/// A single framework-specific requirement fragment, e.g. ISO 27001 "5.1".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FragmentRepr")]
#[serde(rename_all = "camelCase")]
pub struct FrameworkRequirement {
    pub code: String,
    pub title: String,
    pub description: String,
    /// Only meaningful for CIS safeguards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_group: Option<CisLevel>,
}

impl FrameworkRequirement {
    pub fn new(code: &str, title: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            implementation_group: None,
        }
    }

    /// The text this fragment contributes: its description, or its title when the
    /// description is blank. Empty when both are blank.
    pub fn statement(&self) -> &str {
        let description = self.description.trim();
        if description.is_empty() {
            self.title.trim()
        } else {
            description
        }
    }
}

/// Mapping documents list fragments either as objects or as bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FragmentRepr {
    Text(String),
    Full {
        #[serde(
            default,
            alias = "controlId",
            alias = "control_id",
            deserialize_with = "lenient_string"
        )]
        code: String,
        #[serde(default, deserialize_with = "lenient_string")]
        title: String,
        #[serde(default, deserialize_with = "lenient_string")]
        description: String,
        #[serde(
            default,
            rename = "implementationGroup",
            alias = "implementation_group",
            alias = "ig",
            deserialize_with = "lenient_optional_string"
        )]
        implementation_group: Option<String>,
    },
}

/// Scalar text from an upstream field that may hold a string, a number or null.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Some(scalar_text(Value::deserialize(deserializer)?)).filter(|text| !text.is_empty()))
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// An explicit `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<FragmentRepr> for FrameworkRequirement {
    fn from(repr: FragmentRepr) -> Self {
        match repr {
            FragmentRepr::Text(description) => Self {
                description,
                ..Self::default()
            },
            FragmentRepr::Full {
                code,
                title,
                description,
                implementation_group,
            } => Self {
                code,
                title,
                description,
                implementation_group: implementation_group.as_deref().and_then(CisLevel::parse),
            },
        }
    }
}

/// Per-framework fragments of one mapping, keyed by framework.
///
/// Deserialises from an object whose keys are canonical toggles (`iso27001`,
/// `cisControls`, ...) or standard display names ("ISO/IEC 27002 2022",
/// "CIS Controls IG1"). Unrecognised keys, non-list values and fragments that are
/// neither strings nor objects are dropped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Value>",
    into = "BTreeMap<Framework, Vec<FrameworkRequirement>>"
)]
pub struct FrameworkRequirements {
    by_framework: BTreeMap<Framework, Vec<FrameworkRequirement>>,
}

impl FrameworkRequirements {
    pub fn push(&mut self, framework: Framework, fragment: FrameworkRequirement) {
        self.by_framework.entry(framework).or_default().push(fragment);
    }

    pub fn fragments(&self, framework: Framework) -> &[FrameworkRequirement] {
        self.by_framework
            .get(&framework)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fragments grouped by framework, in merge order.
    pub fn iter(&self) -> impl Iterator<Item = (Framework, &[FrameworkRequirement])> {
        self.by_framework
            .iter()
            .map(|(framework, fragments)| (*framework, fragments.as_slice()))
    }

    pub fn fragment_count(&self) -> usize {
        self.by_framework.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment_count() == 0
    }

    fn retain_selected(&mut self, selected: &SelectedFrameworks) {
        self.by_framework
            .retain(|framework, _| selected.includes(*framework));
        if let Some(cis) = self.by_framework.get_mut(&Framework::CisControls) {
            cis.retain(|fragment| selected.admits_cis_group(fragment.implementation_group));
        }
    }
}

impl From<BTreeMap<String, Value>> for FrameworkRequirements {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let mut requirements = FrameworkRequirements::default();
        for (key, value) in raw {
            let Some(standard) = identify_standard(&key) else {
                warn!(key, "unrecognized framework key in mapping, dropping fragments");
                continue;
            };
            let fragments = match value {
                Value::Array(fragments) => fragments,
                Value::Null => continue,
                other => {
                    warn!(key, value = %other, "framework fragments are not a list, dropping");
                    continue;
                }
            };
            for raw_fragment in fragments {
                if !(raw_fragment.is_string() || raw_fragment.is_object()) {
                    warn!(key, fragment = %raw_fragment, "malformed framework fragment, dropping");
                    continue;
                }
                let mut fragment = match serde_json::from_value::<FrameworkRequirement>(raw_fragment)
                {
                    Ok(fragment) => fragment,
                    Err(e) => {
                        warn!(key, error = %e, "malformed framework fragment, dropping");
                        continue;
                    }
                };
                if standard.framework == Framework::CisControls
                    && fragment.implementation_group.is_none()
                {
                    fragment.implementation_group = standard.implementation_group;
                }
                requirements.push(standard.framework, fragment);
            }
        }
        requirements
    }
}

impl From<FrameworkRequirements> for BTreeMap<Framework, Vec<FrameworkRequirement>> {
    fn from(requirements: FrameworkRequirements) -> Self {
        requirements.by_framework
    }
}

/// Where a unified requirement came from: one framework control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequirementReference {
    pub framework: Framework,
    pub code: String,
}

/// A single consolidated requirement merged from per-framework fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UnifiedRequirement {
    pub text: String,
    /// Contributing frameworks, first-seen order, no repeats.
    pub frameworks: Vec<Framework>,
    pub references: Vec<RequirementReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceStatus {
    Approved,
    Pending,
    Rejected,
}

/// One labelled, displayable unit of implementation guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubGuidanceItem {
    /// `<category-slug>-sub-<index>`; unique within one conversion run.
    pub id: String,
    /// e.g. "a)", "b)", ... "aa)".
    pub label: String,
    pub content: String,
    pub sources: Vec<String>,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub status: GuidanceStatus,
    /// Set when `content` is a placeholder that still needs real text.
    pub needs_enrichment: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_buckets_framework_keys() {
        let json = r#"{
            "category": "8. Network Security",
            "frameworks": {
                "ISO/IEC 27002 2022": [{"code": "8.20", "title": "Networks security", "description": "Networks shall be secured."}],
                "CIS Controls IG1": [{"code": "12.1", "description": "Ensure network infrastructure is up-to-date."}],
                "CIS Controls IG3": [{"code": "13.8", "description": "Deploy a network intrusion prevention solution."}],
                "gdpr": ["Ensure security of processing."],
                "SOC 2": [{"code": "CC6.6"}]
            },
            "auditReadyUnified": {"subRequirements": ["a", {"text": "b"}, 42]}
        }"#;
        let mapping: CategoryMapping = serde_json::from_str(json).unwrap();

        assert_eq!(mapping.frameworks.fragment_count(), 4);
        let cis = mapping.frameworks.fragments(Framework::CisControls);
        assert_eq!(cis.len(), 2);
        assert_eq!(cis[0].implementation_group, Some(CisLevel::Ig1));
        assert_eq!(cis[1].implementation_group, Some(CisLevel::Ig3));
        assert_eq!(
            mapping.frameworks.fragments(Framework::Gdpr)[0].statement(),
            "Ensure security of processing."
        );

        let entries = &mapping.audit_ready_unified.sub_requirements;
        assert!(matches!(entries[0], SubRequirementEntry::Text(_)));
        assert!(matches!(entries[1], SubRequirementEntry::Fields(_)));
        assert!(matches!(entries[2], SubRequirementEntry::Raw(_)));
    }

    #[test]
    fn null_sections_read_as_empty() {
        let mapping: CategoryMapping = serde_json::from_str(
            r#"{"category": "Risk Management", "frameworks": null, "auditReadyUnified": null}"#,
        )
        .unwrap();
        assert!(mapping.frameworks.is_empty());
        assert!(mapping.audit_ready_unified.sub_requirements.is_empty());

        let mapping: CategoryMapping = serde_json::from_str(
            r#"{"category": "Risk Management", "auditReadyUnified": {"title": null, "subRequirements": null}}"#,
        )
        .unwrap();
        assert_eq!(mapping.audit_ready_unified, AuditReadyUnified::default());
    }

    #[test]
    fn numeric_codes_and_ids_are_accepted() {
        let mapping: CategoryMapping = serde_json::from_str(
            r#"{
                "id": 17,
                "category": "Vulnerability Management",
                "frameworks": {
                    "cisControls": [{"code": 7, "title": "Continuous vulnerability management", "ig": "ig1"}],
                    "gdpr": [{"code": 32.1, "description": null, "title": "Security of processing"}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(mapping.id.as_deref(), Some("17"));
        let cis = mapping.frameworks.fragments(Framework::CisControls);
        assert_eq!(cis[0].code, "7");
        assert_eq!(cis[0].implementation_group, Some(CisLevel::Ig1));
        let gdpr = mapping.frameworks.fragments(Framework::Gdpr);
        assert_eq!(gdpr[0].code, "32.1");
        assert_eq!(gdpr[0].statement(), "Security of processing");
    }

    #[test]
    fn malformed_framework_values_are_dropped() {
        let mapping: CategoryMapping = serde_json::from_str(
            r#"{
                "category": "Access Control",
                "frameworks": {
                    "notes": "free text",
                    "iso27001": "A.5.15",
                    "nis2": null,
                    "iso27002": [42, {"code": "5.15", "description": "Access control rules are defined."}, ["nested"]]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(mapping.frameworks.fragment_count(), 1);
        assert!(mapping.frameworks.fragments(Framework::Iso27001).is_empty());
        assert_eq!(mapping.frameworks.fragments(Framework::Iso27002)[0].code, "5.15");
    }

    #[test]
    fn restrict_to_drops_unselected_fragments() {
        let mut frameworks = FrameworkRequirements::default();
        frameworks.push(Framework::Iso27001, FrameworkRequirement::new("5.1", "Leadership", ""));
        frameworks.push(Framework::Nis2, FrameworkRequirement::new("20", "Governance", ""));
        let mut ig3 = FrameworkRequirement::new("13.8", "IPS", "");
        ig3.implementation_group = Some(CisLevel::Ig3);
        frameworks.push(Framework::CisControls, ig3);
        frameworks.push(Framework::CisControls, FrameworkRequirement::new("1.1", "Inventory", ""));

        let mapping = CategoryMapping {
            id: None,
            category: "Governance & Leadership".to_string(),
            frameworks,
            audit_ready_unified: AuditReadyUnified::default(),
        };

        let mut selected = SelectedFrameworks::all(Some(CisLevel::Ig1));
        selected.nis2 = false;
        let restricted = mapping.restrict_to(&selected);

        assert_eq!(restricted.frameworks.fragments(Framework::Iso27001).len(), 1);
        assert!(restricted.frameworks.fragments(Framework::Nis2).is_empty());
        let cis = restricted.frameworks.fragments(Framework::CisControls);
        assert_eq!(cis.len(), 1);
        assert_eq!(cis[0].code, "1.1");
    }

    #[test]
    fn statement_prefers_description() {
        let fragment = FrameworkRequirement::new("A.5.1", "Policies", "  Define policies.  ");
        assert_eq!(fragment.statement(), "Define policies.");
        let fragment = FrameworkRequirement::new("A.5.1", " Policies ", "   ");
        assert_eq!(fragment.statement(), "Policies");
    }

    #[test]
    fn references_serialize_as_framework_and_code() {
        let requirement = UnifiedRequirement {
            text: "Maintain an asset inventory.".to_string(),
            frameworks: vec![Framework::Iso27001, Framework::CisControls],
            references: vec![
                RequirementReference { framework: Framework::Iso27001, code: "A.5.9".to_string() },
                RequirementReference { framework: Framework::CisControls, code: "1.1".to_string() },
            ],
        };
        assert_eq!(
            serde_json::to_value(&requirement).unwrap()["references"],
            serde_json::json!([
                {"framework": "iso27001", "code": "A.5.9"},
                {"framework": "cisControls", "code": "1.1"}
            ])
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(GuidanceStatus::Approved).unwrap(),
            serde_json::json!("approved")
        );
    }
}
