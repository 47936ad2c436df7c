// Analysis stage
//
// One model call that summarizes an incoming message, with recent history
// as context, into a constrained structure. Every failure path (call error,
// timeout, malformed output, out-of-range risk) degrades to a fixed neutral
// default; the caller never sees an error from this stage.

use std::time::Duration;

use serde::Deserialize;

use crate::message::{recent, Analysis, Message};
use crate::traits::{GenerateOptions, LanguageModel};

/// How many prior turns accompany the analysis prompt
pub const ANALYSIS_CONTEXT_TURNS: usize = 5;

/// The fixed analysis returned when the model call or parse fails
pub fn default_analysis() -> Analysis {
    Analysis {
        emotional_state: "neutral".to_string(),
        themes: vec!["general".to_string()],
        risk_level: 0,
        recommended_approach: "supportive".to_string(),
        progress_indicators: vec!["engaged in conversation".to_string()],
    }
}

fn analysis_prompt(text: &str) -> String {
    format!(
        "Analyze this support-conversation message and provide insights. Return ONLY a valid \
         JSON object with no markdown formatting or additional text.\n\
         Message: {text}\n\n\
         Required JSON structure:\n\
         {{\n\
         \"emotionalState\": \"string (e.g., anxious, depressed, hopeful, angry, neutral)\",\n\
         \"themes\": [\"string array of conversation themes\"],\n\
         \"riskLevel\": number (0-10, where 0 is no risk, 10 is high risk),\n\
         \"recommendedApproach\": \"string (CBT, mindfulness, validation, etc.)\",\n\
         \"progressIndicators\": [\"string array of positive/negative indicators\"]\n\
         }}"
    )
}

/// Shape the model is instructed to produce (camelCase on the wire)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    emotional_state: String,
    themes: Vec<String>,
    risk_level: serde_json::Value,
    recommended_approach: String,
    progress_indicators: Vec<String>,
}

/// Strip leading/trailing markdown code fences the model sometimes adds
/// despite the "no markdown" instruction.
fn strip_code_fences(raw: &str) -> &str {
    let s = raw.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

/// Parse the raw model output into an Analysis.
///
/// Returns None (triggering the default) when the JSON is malformed or
/// `riskLevel` is non-integer or outside 0..=10.
fn parse_analysis(raw: &str) -> Option<Analysis> {
    let cleaned = strip_code_fences(raw);
    let parsed: RawAnalysis = serde_json::from_str(cleaned).ok()?;

    let risk_level = parsed.risk_level.as_i64()?;
    if !(0..=10).contains(&risk_level) {
        return None;
    }

    Some(Analysis {
        emotional_state: parsed.emotional_state,
        themes: parsed.themes,
        risk_level: risk_level as u8,
        recommended_approach: parsed.recommended_approach,
        progress_indicators: parsed.progress_indicators,
    })
}

/// Run the analysis stage for one message.
///
/// A call that exceeds `call_timeout` is treated identically to a failed
/// call: the fixed default is substituted and the detail is logged.
pub async fn analyze(
    model: &dyn LanguageModel,
    text: &str,
    history: &[Message],
    call_timeout: Duration,
) -> Analysis {
    let prompt = analysis_prompt(text);
    let context = recent(history, ANALYSIS_CONTEXT_TURNS);

    let raw = match tokio::time::timeout(
        call_timeout,
        model.generate(&prompt, context, &GenerateOptions::default()),
    )
    .await
    {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "analysis call failed, using default");
            return default_analysis();
        }
        Err(_) => {
            tracing::warn!(timeout_ms = call_timeout.as_millis() as u64, "analysis call timed out, using default");
            return default_analysis();
        }
    };

    match parse_analysis(&raw) {
        Some(analysis) => analysis,
        None => {
            tracing::warn!("analysis output unparseable, using default");
            default_analysis()
        }
    }
}
