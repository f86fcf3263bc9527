//! The normalized compliance verdict returned to callers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall creative verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Approved,
    Rejected,
    Warning,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Warning => "warning",
        }
    }
}

/// Per-network verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlatformStatus {
    Approved,
    Rejected,
    Limited,
}

impl PlatformStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Limited => "limited",
        }
    }
}

/// Verdict for one advertising network, with reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlatformVerdict {
    pub status: PlatformStatus,
    pub reasons: Vec<String>,
}

impl PlatformVerdict {
    /// Default verdict synthesized when the classifier omits a platform:
    /// limited, with no reasons.
    pub fn unknown() -> Self {
        Self {
            status: PlatformStatus::Limited,
            reasons: Vec::new(),
        }
    }
}

/// Per-platform verdicts. Both keys are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Platforms {
    pub google: PlatformVerdict,
    pub meta: PlatformVerdict,
}

/// Supporting detail for the verdict.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct VerdictDetails {
    #[serde(default)]
    pub visual_triggers: Vec<String>,
    #[serde(default)]
    pub audio_triggers: Vec<String>,
    #[serde(default)]
    pub overall_feedback: String,
}

/// The final structured verdict for one analysis invocation.
///
/// Created once per invocation and never mutated afterwards; ownership
/// passes to the caller and, independently, to the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub status: OverallStatus,
    /// Integer 0-100; higher is riskier.
    pub risk_score: u8,
    pub platforms: Platforms,
    pub details: VerdictDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_values() {
        assert_eq!(
            serde_json::to_value(OverallStatus::Warning).unwrap(),
            serde_json::json!("warning")
        );
        assert_eq!(
            serde_json::to_value(PlatformStatus::Limited).unwrap(),
            serde_json::json!("limited")
        );
    }

    #[test]
    fn test_result_round_trips() {
        let result = AnalysisResult {
            status: OverallStatus::Approved,
            risk_score: 12,
            platforms: Platforms {
                google: PlatformVerdict {
                    status: PlatformStatus::Approved,
                    reasons: vec![],
                },
                meta: PlatformVerdict::unknown(),
            },
            details: VerdictDetails::default(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["platforms"]["meta"]["status"], "limited");
        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
