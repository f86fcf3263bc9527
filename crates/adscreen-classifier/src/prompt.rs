//! Prompt assembly for policy classification.

/// Task instructions for the policy classifier. The output-schema directive
/// mirrors the shape enforced by `adscreen_models::validate_verdict`.
pub const SYSTEM_PROMPT: &str = r#"
You are an expert Ad Policy Compliance Officer for Google Ads and Meta Ads.
Analyze the provided ad creative (frames + transcript).

Focus on:
1. **Personal Health**: Zooming in on body parts, before/after images, pointing to pain points, "cures".
2. **Sexual Content**: Nudity, suggestive poses, excessive skin.
3. **Misleading Claims**: "Easy money", "Instant weight loss", "Cure in X days".
4. **Shocking Content**: Graphic imagery, blood.
5. **Brand Assets**: Fake buttons.

Input provided:
- Audio Transcript (from Whisper)
- Visual Frames (sampled from video)

Return JSON:
{
  "status": "approved" | "rejected" | "warning",
  "risk_score": number (0-100),
  "platforms": {
    "google": { "status": "approved"|"rejected"|"limited", "reasons": [] },
    "meta": { "status": "approved"|"rejected"|"limited", "reasons": [] }
  },
  "details": {
    "visual_triggers": [],
    "audio_triggers": [],
    "overall_feedback": ""
  }
}
"#;

/// Build the user-turn text. The transcript is embedded as literal text;
/// when transcription was unavailable the caller passes the sentinel marker
/// rather than an empty string.
pub fn build_user_prompt(transcript_text: &str) -> String {
    format!("Analyze this ad.\n**Transcript**: {transcript_text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use adscreen_models::Transcript;

    #[test]
    fn test_user_prompt_embeds_transcript() {
        let prompt = build_user_prompt("Lose weight fast!");
        assert!(prompt.contains("Lose weight fast!"));
    }

    #[test]
    fn test_sentinel_is_visible_in_prompt() {
        let prompt = build_user_prompt(Transcript::Unavailable.as_prompt_text());
        assert!(prompt.contains("[Audio Transcription Failed or No Audio]"));
    }
}
