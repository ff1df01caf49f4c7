/// Compliance frameworks covered by the unified mappings, and the toggle object
/// that selects which of them a mapping fetch should include.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A source framework. Declaration order is the order fragments are merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Framework {
    #[serde(rename = "iso27001")]
    Iso27001,
    #[serde(rename = "iso27002")]
    Iso27002,
    #[serde(rename = "cisControls")]
    CisControls,
    #[serde(rename = "gdpr")]
    Gdpr,
    #[serde(rename = "nis2")]
    Nis2,
}

impl Framework {
    pub const ALL: [Framework; 5] = [
        Framework::Iso27001,
        Framework::Iso27002,
        Framework::CisControls,
        Framework::Gdpr,
        Framework::Nis2,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Framework::Iso27001 => "ISO 27001",
            Framework::Iso27002 => "ISO 27002",
            Framework::CisControls => "CIS Controls",
            Framework::Gdpr => "GDPR",
            Framework::Nis2 => "NIS2",
        }
    }
}

/// CIS Controls implementation group. Groups are cumulative: IG2 contains IG1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CisLevel {
    Ig1,
    Ig2,
    Ig3,
}

impl CisLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ig1" => Some(CisLevel::Ig1),
            "ig2" => Some(CisLevel::Ig2),
            "ig3" => Some(CisLevel::Ig3),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CisLevel::Ig1 => "ig1",
            CisLevel::Ig2 => "ig2",
            CisLevel::Ig3 => "ig3",
        }
    }
}

/// A standard name resolved to a framework (and a CIS group, when the name carries one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardRef {
    pub framework: Framework,
    pub implementation_group: Option<CisLevel>,
}

/// Classify a standard's name, e.g. "ISO/IEC 27001 2022" or "CIS Controls IG2".
///
/// Keyword based: "iso" together with "27001"/"27002", "cis" optionally followed by an
/// implementation group, "gdpr", "nis2". Canonical toggle keys ("cisControls", ...) match too.
pub fn identify_standard(name: &str) -> Option<StandardRef> {
    let lower = name.to_lowercase();
    let framework = if lower.contains("iso") && lower.contains("27001") {
        Framework::Iso27001
    } else if lower.contains("iso") && lower.contains("27002") {
        Framework::Iso27002
    } else if lower.contains("cis") {
        let implementation_group = if lower.contains("ig1") {
            Some(CisLevel::Ig1)
        } else if lower.contains("ig2") {
            Some(CisLevel::Ig2)
        } else if lower.contains("ig3") {
            Some(CisLevel::Ig3)
        } else {
            None
        };
        return Some(StandardRef {
            framework: Framework::CisControls,
            implementation_group,
        });
    } else if lower.contains("gdpr") {
        Framework::Gdpr
    } else if lower.contains("nis2") || lower.contains("nis 2") {
        Framework::Nis2
    } else {
        return None;
    };

    Some(StandardRef {
        framework,
        implementation_group: None,
    })
}

/// Framework toggles passed explicitly into every mapping fetch.
///
/// `cis_controls` is `""` (CIS off) or one of `"ig1"`, `"ig2"`, `"ig3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFrameworks {
    #[serde(default)]
    pub iso27001: bool,
    #[serde(default)]
    pub iso27002: bool,
    #[serde(default)]
    pub cis_controls: String,
    #[serde(default)]
    pub gdpr: bool,
    #[serde(default)]
    pub nis2: bool,
}

impl Default for SelectedFrameworks {
    fn default() -> Self {
        Self::all(Some(CisLevel::Ig3))
    }
}

impl SelectedFrameworks {
    /// Every framework on, CIS at the given group (`None` disables CIS).
    pub fn all(cis: Option<CisLevel>) -> Self {
        Self {
            iso27001: true,
            iso27002: true,
            cis_controls: cis.map(|l| l.as_str().to_string()).unwrap_or_default(),
            gdpr: true,
            nis2: true,
        }
    }

    pub fn cis_level(&self) -> Option<CisLevel> {
        CisLevel::parse(&self.cis_controls)
    }

    pub fn includes(&self, framework: Framework) -> bool {
        match framework {
            Framework::Iso27001 => self.iso27001,
            Framework::Iso27002 => self.iso27002,
            Framework::CisControls => self.cis_level().is_some(),
            Framework::Gdpr => self.gdpr,
            Framework::Nis2 => self.nis2,
        }
    }

    /// Whether a CIS safeguard of the given group is in scope. Safeguards without a
    /// group are in scope whenever CIS is selected at all.
    pub fn admits_cis_group(&self, group: Option<CisLevel>) -> bool {
        match (self.cis_level(), group) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(selected), Some(group)) => group <= selected,
        }
    }
}
