//! Result schema validation.
//!
//! The classifier returns loosely-shaped JSON; nothing crosses this
//! boundary unvalidated. Validation is a pure projection: running it twice
//! over an already-valid result yields an identical result.

use serde_json::Value;
use thiserror::Error;

use crate::verdict::{
    AnalysisResult, OverallStatus, PlatformStatus, PlatformVerdict, Platforms, VerdictDetails,
};

/// Raised when classifier output cannot be coerced into the verdict shape.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("classifier output is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid status value: {0}")]
    InvalidStatus(String),

    #[error("risk_score is not numeric: {0}")]
    NonNumericRiskScore(String),
}

/// Validate raw classifier output into an [`AnalysisResult`].
///
/// Tolerant where the caller contract stays stable (missing platforms are
/// synthesized, unknown platform statuses coerce to `limited`, out-of-range
/// risk scores clamp to 0-100, detail fields default), strict where it does
/// not (unknown overall status or a non-numeric risk score reject the whole
/// output).
pub fn validate_verdict(raw: &Value) -> Result<AnalysisResult, ValidationError> {
    let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    let status = match obj.get("status").and_then(Value::as_str) {
        Some("approved") => OverallStatus::Approved,
        Some("rejected") => OverallStatus::Rejected,
        Some("warning") => OverallStatus::Warning,
        Some(other) => return Err(ValidationError::InvalidStatus(other.to_string())),
        None => return Err(ValidationError::MissingField("status")),
    };

    let risk_score = match obj.get("risk_score") {
        Some(v) if v.is_number() => clamp_risk_score(v.as_f64().unwrap_or(0.0)),
        Some(v) => return Err(ValidationError::NonNumericRiskScore(v.to_string())),
        None => return Err(ValidationError::MissingField("risk_score")),
    };

    let platforms_obj = obj.get("platforms");
    let platforms = Platforms {
        google: platform_verdict(platforms_obj.and_then(|p| p.get("google"))),
        meta: platform_verdict(platforms_obj.and_then(|p| p.get("meta"))),
    };

    let details_obj = obj.get("details");
    let details = VerdictDetails {
        visual_triggers: string_list(details_obj.and_then(|d| d.get("visual_triggers"))),
        audio_triggers: string_list(details_obj.and_then(|d| d.get("audio_triggers"))),
        overall_feedback: details_obj
            .and_then(|d| d.get("overall_feedback"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    };

    Ok(AnalysisResult {
        status,
        risk_score,
        platforms,
        details,
    })
}

/// Clamp to 0-100 rather than rejecting, to tolerate classifier overshoot.
fn clamp_risk_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).round() as u8
}

/// Coerce one platform entry; a missing or unrecognized entry becomes the
/// default "unknown/limited" verdict so both keys are always present.
fn platform_verdict(raw: Option<&Value>) -> PlatformVerdict {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return PlatformVerdict::unknown();
    };

    let status = match obj.get("status").and_then(Value::as_str) {
        Some("approved") => PlatformStatus::Approved,
        Some("rejected") => PlatformStatus::Rejected,
        _ => PlatformStatus::Limited,
    };

    PlatformVerdict {
        status,
        reasons: string_list(obj.get("reasons")),
    }
}

/// Collect the string members of a JSON array, dropping everything else.
fn string_list(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_raw() -> Value {
        json!({
            "status": "warning",
            "risk_score": 55,
            "platforms": {
                "google": { "status": "limited", "reasons": ["health claim"] },
                "meta": { "status": "approved", "reasons": [] }
            },
            "details": {
                "visual_triggers": ["before/after imagery"],
                "audio_triggers": [],
                "overall_feedback": "Tone down the claims."
            }
        })
    }

    #[test]
    fn test_valid_output_passes() {
        let result = validate_verdict(&valid_raw()).unwrap();
        assert_eq!(result.status, OverallStatus::Warning);
        assert_eq!(result.risk_score, 55);
        assert_eq!(result.platforms.google.status, PlatformStatus::Limited);
        assert_eq!(result.platforms.google.reasons, vec!["health claim"]);
        assert_eq!(result.details.overall_feedback, "Tone down the claims.");
    }

    #[test]
    fn test_unknown_overall_status_rejected() {
        let mut raw = valid_raw();
        raw["status"] = json!("maybe");
        assert!(matches!(
            validate_verdict(&raw),
            Err(ValidationError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_out_of_range_risk_score_clamped() {
        let mut raw = valid_raw();
        raw["risk_score"] = json!(142);
        assert_eq!(validate_verdict(&raw).unwrap().risk_score, 100);

        raw["risk_score"] = json!(-7);
        assert_eq!(validate_verdict(&raw).unwrap().risk_score, 0);
    }

    #[test]
    fn test_non_numeric_risk_score_rejected() {
        let mut raw = valid_raw();
        raw["risk_score"] = json!("high");
        assert!(matches!(
            validate_verdict(&raw),
            Err(ValidationError::NonNumericRiskScore(_))
        ));
    }

    #[test]
    fn test_missing_platform_synthesized() {
        let mut raw = valid_raw();
        raw["platforms"].as_object_mut().unwrap().remove("meta");
        let result = validate_verdict(&raw).unwrap();
        assert_eq!(result.platforms.meta, PlatformVerdict::unknown());
        // The present key is untouched
        assert_eq!(result.platforms.google.status, PlatformStatus::Limited);
    }

    #[test]
    fn test_missing_platforms_object_synthesizes_both() {
        let mut raw = valid_raw();
        raw.as_object_mut().unwrap().remove("platforms");
        let result = validate_verdict(&raw).unwrap();
        assert_eq!(result.platforms.google, PlatformVerdict::unknown());
        assert_eq!(result.platforms.meta, PlatformVerdict::unknown());
    }

    #[test]
    fn test_unknown_platform_status_coerced_to_limited() {
        let mut raw = valid_raw();
        raw["platforms"]["meta"]["status"] = json!("banned");
        let result = validate_verdict(&raw).unwrap();
        assert_eq!(result.platforms.meta.status, PlatformStatus::Limited);
    }

    #[test]
    fn test_missing_details_default() {
        let mut raw = valid_raw();
        raw.as_object_mut().unwrap().remove("details");
        let result = validate_verdict(&raw).unwrap();
        assert!(result.details.visual_triggers.is_empty());
        assert!(result.details.audio_triggers.is_empty());
        assert!(result.details.overall_feedback.is_empty());
    }

    #[test]
    fn test_non_string_reasons_dropped() {
        let mut raw = valid_raw();
        raw["platforms"]["google"]["reasons"] = json!(["ok", 42, null, "also ok"]);
        let result = validate_verdict(&raw).unwrap();
        assert_eq!(result.platforms.google.reasons, vec!["ok", "also ok"]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let first = validate_verdict(&valid_raw()).unwrap();
        let reserialized = serde_json::to_value(&first).unwrap();
        let second = validate_verdict(&reserialized).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            validate_verdict(&json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        ));
    }
}
