/// Template-driven category guidance generated from unified requirements.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::framework::Framework;
use crate::model::UnifiedRequirement;

/// Prose guidance for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedGuidance {
    pub foundation_content: String,
    pub implementation_steps: Vec<String>,
    pub practical_tools: Vec<String>,
    pub audit_evidence: Vec<String>,
    /// "<framework> <code>" for every contributing control, first-seen order.
    pub cross_references: Vec<String>,
}

pub const EMPTY_FOUNDATION: &str =
    "No unified requirements are available for this category yet. Select additional \
     frameworks or complete the category mapping to generate guidance.";

struct GuidanceTemplate {
    focus: &'static str,
    keywords: &'static [&'static str],
    step: &'static str,
    tool: &'static str,
    evidence: &'static str,
}

// First match wins, so more specific topics come before broad ones.
static TEMPLATES: &[GuidanceTemplate] = &[
    GuidanceTemplate {
        focus: "privacy and personal data",
        keywords: &["personal data", "privacy", "data subject", "processing"],
        step: "Maintain a record of processing activities and run a data protection impact assessment for high-risk processing.",
        tool: "Record of processing activities register and DPIA template",
        evidence: "Current ROPA, completed DPIAs and data subject request logs",
    },
    GuidanceTemplate {
        focus: "incident management",
        keywords: &["incident", "breach", "notification"],
        step: "Define incident classification, escalation paths and notification deadlines, and rehearse them at least annually.",
        tool: "Incident response playbooks and an on-call escalation matrix",
        evidence: "Incident register, post-incident reviews and tabletop exercise reports",
    },
    GuidanceTemplate {
        focus: "vulnerability management",
        keywords: &["vulnerab", "patch", "remediat"],
        step: "Scan assets on a fixed schedule and remediate findings within severity-based deadlines.",
        tool: "Authenticated vulnerability scanner and a patch management workflow",
        evidence: "Scan reports, remediation tickets and exception approvals",
    },
    GuidanceTemplate {
        focus: "access control",
        keywords: &["access", "privilege", "authenticat", "identity"],
        step: "Grant access on least privilege through a documented request and approval flow, and review rights periodically.",
        tool: "Identity provider with MFA and a quarterly access review checklist",
        evidence: "Access review sign-offs, joiner/mover/leaver tickets and MFA coverage reports",
    },
    GuidanceTemplate {
        focus: "cryptography",
        keywords: &["cryptograph", "encrypt", "key management"],
        step: "Set approved algorithms and key lengths, and manage key generation, rotation and revocation centrally.",
        tool: "Cryptography standard and a managed key vault",
        evidence: "Key inventory, rotation logs and encryption configuration exports",
    },
    GuidanceTemplate {
        focus: "business continuity",
        keywords: &["backup", "continuity", "recovery", "resilien"],
        step: "Define recovery objectives per critical service and test backups and recovery plans against them.",
        tool: "Business impact analysis worksheet and backup restore test schedule",
        evidence: "BIA results, restore test records and continuity exercise reports",
    },
    GuidanceTemplate {
        focus: "monitoring and logging",
        keywords: &["monitor", "logging", "log ", "logs", "audit trail"],
        step: "Centralise security-relevant logs, protect them from tampering and review alerts against defined use cases.",
        tool: "SIEM or central log platform with retention policies",
        evidence: "Log source inventory, alert review records and retention configuration",
    },
    GuidanceTemplate {
        focus: "supplier management",
        keywords: &["supplier", "third part", "vendor", "supply chain"],
        step: "Assess suppliers before onboarding, include security clauses in contracts and re-assess critical suppliers periodically.",
        tool: "Supplier security questionnaire and contract clause library",
        evidence: "Supplier inventory with risk ratings, signed agreements and assessment results",
    },
    GuidanceTemplate {
        focus: "asset management",
        keywords: &["asset", "inventory"],
        step: "Keep an inventory of information and associated assets with a named owner and classification for each.",
        tool: "Asset inventory or CMDB with ownership fields",
        evidence: "Asset register extract and ownership attestations",
    },
    GuidanceTemplate {
        focus: "awareness and training",
        keywords: &["training", "awareness", "education", "competen"],
        step: "Deliver role-based security awareness training at onboarding and at least annually, and track completion.",
        tool: "Learning management system with phishing simulations",
        evidence: "Training completion reports and simulation results",
    },
    GuidanceTemplate {
        focus: "risk management",
        keywords: &["risk"],
        step: "Run a documented risk assessment method, record treatment decisions and review the register at planned intervals.",
        tool: "Risk register with likelihood and impact scoring",
        evidence: "Risk assessment report, treatment plan and statement of applicability",
    },
    GuidanceTemplate {
        focus: "policy and governance",
        keywords: &["policy", "policies", "governance", "management review", "leadership", "responsibilit"],
        step: "Approve, publish and periodically review the policy set, and assign an owner to each policy.",
        tool: "Policy management register with review dates",
        evidence: "Approved policies with version history and management review minutes",
    },
];

/// Assemble category guidance from `requirements`. An empty slice produces the
/// minimal [`EMPTY_FOUNDATION`] guidance.
pub fn generate_guidance(requirements: &[UnifiedRequirement]) -> UnifiedGuidance {
    if requirements.is_empty() {
        return UnifiedGuidance {
            foundation_content: EMPTY_FOUNDATION.to_string(),
            ..UnifiedGuidance::default()
        };
    }

    let mut selected: Vec<&GuidanceTemplate> = Vec::new();
    let mut frameworks: Vec<Framework> = Vec::new();
    let mut guidance = UnifiedGuidance::default();

    for requirement in requirements {
        if let Some(template) = match_template(&requirement.text) {
            if !selected.iter().any(|t| t.focus == template.focus) {
                selected.push(template);
            }
        }
        for framework in &requirement.frameworks {
            if !frameworks.contains(framework) {
                frameworks.push(*framework);
            }
        }
        for reference in &requirement.references {
            let label = format!("{} {}", reference.framework.display_name(), reference.code);
            if !guidance.cross_references.contains(&label) {
                guidance.cross_references.push(label);
            }
        }
    }

    guidance.foundation_content = foundation_content(requirements.len(), &frameworks, &selected);
    for template in &selected {
        guidance.implementation_steps.push(template.step.to_string());
        guidance.practical_tools.push(template.tool.to_string());
        guidance.audit_evidence.push(template.evidence.to_string());
    }
    guidance
}

fn match_template(text: &str) -> Option<&'static GuidanceTemplate> {
    let lower = text.to_lowercase();
    TEMPLATES
        .iter()
        .find(|template| template.keywords.iter().any(|kw| lower.contains(kw)))
}

fn foundation_content(
    count: usize,
    frameworks: &[Framework],
    selected: &[&GuidanceTemplate],
) -> String {
    let noun = if count == 1 { "requirement" } else { "requirements" };
    let sources = frameworks
        .iter()
        .map(|f| f.display_name())
        .collect::<Vec<_>>()
        .join(", ");

    let mut text = format!(
        "This category consolidates {count} unified {noun} drawn from {sources}. \
         Implementing them once satisfies the overlapping obligations of each framework."
    );
    if !selected.is_empty() {
        let focus = selected.iter().map(|t| t.focus).collect::<Vec<_>>().join(", ");
        text.push_str(&format!(" Focus areas: {focus}."));
    }
    text
}
