// Response stage
//
// One model call that turns the message, its analysis, and a short context
// window into a supportive reply. A failed or timed-out call substitutes
// the fixed safety fallback; the substitution is a success from the
// caller's point of view, with the failure detail kept for diagnostics.

use std::time::Duration;

use crate::message::{recent, Analysis, Message};
use crate::traits::{GenerateOptions, LanguageModel};

/// How many prior turns accompany the response prompt
pub const RESPONSE_CONTEXT_TURNS: usize = 3;

/// Fixed reply used when the model call fails. Points the user toward
/// professional and crisis resources instead of leaving them unanswered.
pub const FALLBACK_REPLY: &str = "I understand you're sharing something important with me. \
While I'm experiencing a technical issue right now, I want you to know that your feelings \
and experiences matter. If you're in crisis or need immediate support, please consider \
reaching out to a mental health professional or crisis hotline.";

fn response_prompt(text: &str, analysis: &Analysis) -> String {
    let analysis_json = serde_json::to_string(analysis).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are a supportive conversation assistant. Provide a supportive, empathetic \
         response that:\n\n\
         1. Acknowledges the user's feelings and validates their experience\n\
         2. Uses appropriate therapeutic techniques based on the analysis\n\
         3. Maintains professional boundaries while being warm and supportive\n\
         4. Considers safety and well-being\n\
         5. Encourages positive coping strategies\n\
         6. Does not diagnose or replace professional therapy\n\n\
         User's message: {text}\n\
         Analysis: {analysis_json}\n\n\
         Provide a thoughtful, professional response that helps the user process their \
         thoughts and feelings while maintaining appropriate boundaries."
    )
}

/// Run the response stage for one message.
///
/// Returns the reply plus the failure detail when the fallback was
/// substituted; the detail is for operator diagnostics only and must never
/// block the reply.
pub async fn respond(
    model: &dyn LanguageModel,
    text: &str,
    analysis: &Analysis,
    history: &[Message],
    call_timeout: Duration,
) -> (String, Option<String>) {
    let prompt = response_prompt(text, analysis);
    let context = recent(history, RESPONSE_CONTEXT_TURNS);

    match tokio::time::timeout(
        call_timeout,
        model.generate(&prompt, context, &GenerateOptions::default()),
    )
    .await
    {
        Ok(Ok(reply)) => {
            let reply = reply.trim().to_string();
            if reply.is_empty() {
                tracing::error!("model returned an empty reply, using fallback");
                (
                    FALLBACK_REPLY.to_string(),
                    Some("model returned an empty reply".to_string()),
                )
            } else {
                (reply, None)
            }
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "response generation failed, using fallback");
            (FALLBACK_REPLY.to_string(), Some(e.to_string()))
        }
        Err(_) => {
            tracing::error!(timeout_ms = call_timeout.as_millis() as u64, "response generation timed out, using fallback");
            (
                FALLBACK_REPLY.to_string(),
                Some("model call timed out".to_string()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::default_analysis;
    use crate::error::ChatError;
    use async_trait::async_trait;

    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn generate(
            &self,
            _prompt: &str,
            _history: &[Message],
            _options: &GenerateOptions,
        ) -> crate::error::Result<String> {
            Ok("  That sounds difficult. I'm here with you.  ".to_string())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(
            &self,
            _prompt: &str,
            _history: &[Message],
            _options: &GenerateOptions,
        ) -> crate::error::Result<String> {
            Err(ChatError::model("quota exceeded"))
        }
    }

    struct EmptyModel;

    #[async_trait]
    impl LanguageModel for EmptyModel {
        async fn generate(
            &self,
            _prompt: &str,
            _history: &[Message],
            _options: &GenerateOptions,
        ) -> crate::error::Result<String> {
            Ok("   ".to_string())
        }
    }

    #[tokio::test]
    async fn test_reply_is_trimmed() {
        let (reply, detail) = respond(
            &EchoModel,
            "hi",
            &default_analysis(),
            &[],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(reply, "That sounds difficult. I'm here with you.");
        assert!(detail.is_none());
    }

    #[tokio::test]
    async fn test_failure_substitutes_fallback_with_detail() {
        let (reply, detail) = respond(
            &FailingModel,
            "hi",
            &default_analysis(),
            &[],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(reply, FALLBACK_REPLY);
        assert!(detail.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_empty_reply_substitutes_fallback() {
        let (reply, detail) = respond(
            &EmptyModel,
            "hi",
            &default_analysis(),
            &[],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(reply, FALLBACK_REPLY);
        assert!(detail.is_some());
    }

    #[test]
    fn test_prompt_embeds_message_and_analysis() {
        let prompt = response_prompt("I had a rough week", &default_analysis());
        assert!(prompt.contains("I had a rough week"));
        assert!(prompt.contains("\"emotional_state\":\"neutral\""));
    }
}
