// Chat pipeline
//
// The orchestrator for one inbound message: validate, detect stress
// signals, analyze, respond, append both turns, notify. Appends for one
// session are serialized through a per-session lock; distinct sessions
// proceed fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::analyze::analyze;
use crate::error::{ChatError, Result};
use crate::message::{Analysis, MessageMetadata, NewMessage};
use crate::respond::respond;
use crate::stress::{detect, StressPrompt};
use crate::traits::{EventNotifier, LanguageModel, MessageProcessedEvent, SessionStore};

/// Default ceiling for one language-model call. An elapsed timeout is
/// treated identically to a failed call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one processing cycle
#[derive(Debug, Clone)]
pub enum ProcessedMessage {
    /// Normal cycle: a model-generated (or fallback) reply plus its analysis
    Replied {
        reply: String,
        analysis: Analysis,
        /// Failure detail when the fallback reply was substituted
        model_error: Option<String>,
    },
    /// Stress short-circuit: a calming-activity suggestion, no model calls,
    /// only the user turn appended
    ShortCircuited { reply: String, prompt: StressPrompt },
}

pub struct ChatPipeline {
    store: Arc<dyn SessionStore>,
    model: Arc<dyn LanguageModel>,
    notifier: Arc<dyn EventNotifier>,
    call_timeout: Duration,
    session_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ChatPipeline {
    pub fn new(
        store: Arc<dyn SessionStore>,
        model: Arc<dyn LanguageModel>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self {
            store,
            model,
            notifier,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Process one inbound message for `(session_id, owner_id)`.
    ///
    /// Exactly one session mutation per successful call: the user turn plus
    /// the assistant turn, appended together, or only the user turn when
    /// stress detection short-circuits the cycle.
    pub async fn process_message(
        &self,
        session_id: Uuid,
        owner_id: Uuid,
        text: &str,
    ) -> Result<ProcessedMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::invalid_input("message must not be empty"));
        }

        self.store
            .get(session_id, owner_id)
            .await?
            .ok_or(ChatError::SessionNotFound(session_id))?;

        if let Some(prompt) = detect(text, &mut rand::thread_rng()) {
            tracing::info!(
                session_id = %session_id,
                trigger = %prompt.trigger,
                "stress signal detected, short-circuiting reply"
            );

            {
                let lock = self.session_lock(session_id).await;
                let _guard = lock.lock().await;
                self.store
                    .append(session_id, owner_id, vec![NewMessage::user(text)])
                    .await?;
            }

            self.dispatch_event(MessageProcessedEvent {
                session_id,
                owner_id,
                risk_level: None,
                short_circuited: true,
            });

            let reply = suggestion_reply(&prompt);
            return Ok(ProcessedMessage::ShortCircuited { reply, prompt });
        }

        let history = self
            .store
            .history(session_id, owner_id)
            .await?
            .ok_or(ChatError::SessionNotFound(session_id))?;

        let analysis = analyze(self.model.as_ref(), text, &history, self.call_timeout).await;
        let (reply, model_error) = respond(
            self.model.as_ref(),
            text,
            &analysis,
            &history,
            self.call_timeout,
        )
        .await;

        let metadata = MessageMetadata::from_analysis(analysis.clone());
        {
            let lock = self.session_lock(session_id).await;
            let _guard = lock.lock().await;
            self.store
                .append(
                    session_id,
                    owner_id,
                    vec![
                        NewMessage::user(text),
                        NewMessage::assistant(&reply, metadata),
                    ],
                )
                .await?;
        }

        self.dispatch_event(MessageProcessedEvent {
            session_id,
            owner_id,
            risk_level: Some(analysis.risk_level),
            short_circuited: false,
        });

        Ok(ProcessedMessage::Replied {
            reply,
            analysis,
            model_error,
        })
    }

    /// Get or create the append lock for a session
    async fn session_lock(&self, session_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks.entry(session_id).or_default().clone()
    }

    /// Fire-and-forget: the caller never waits on, or fails because of,
    /// the notifier.
    fn dispatch_event(&self, event: MessageProcessedEvent) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(event).await {
                tracing::warn!(error = %e, "processing event notification failed");
            }
        });
    }
}

fn suggestion_reply(prompt: &StressPrompt) -> String {
    format!(
        "It sounds like things are weighing on you right now; I noticed you mentioned \
         \"{}\". Before we keep talking, a short calming activity can help: {}. {}. \
         Take whatever time you need, and I'll be here when you're ready to continue.",
        prompt.trigger, prompt.activity.title, prompt.activity.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::default_analysis;
    use crate::memory::InMemorySessionStore;
    use crate::message::MessageRole;
    use crate::respond::FALLBACK_REPLY;
    use crate::traits::{GenerateOptions, NoopNotifier};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Returns a canned analysis for analysis prompts and a canned reply
    /// for everything else.
    struct ScriptedModel;

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(
            &self,
            prompt: &str,
            _history: &[crate::message::Message],
            _options: &GenerateOptions,
        ) -> Result<String> {
            if prompt.contains("Required JSON structure") {
                Ok(r#"{
                    "emotionalState": "hopeful",
                    "themes": ["new beginnings"],
                    "riskLevel": 1,
                    "recommendedApproach": "validation",
                    "progressIndicators": ["engaged"]
                }"#
                .to_string())
            } else {
                Ok("Thank you for sharing that with me.".to_string())
            }
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(
            &self,
            _prompt: &str,
            _history: &[crate::message::Message],
            _options: &GenerateOptions,
        ) -> Result<String> {
            Err(ChatError::model("backend down"))
        }
    }

    /// Forwards events over a channel so tests can await them
    struct ChannelNotifier(mpsc::UnboundedSender<MessageProcessedEvent>);

    #[async_trait]
    impl EventNotifier for ChannelNotifier {
        async fn notify(&self, event: MessageProcessedEvent) -> Result<()> {
            self.0
                .send(event)
                .map_err(|e| ChatError::notify(e.to_string()))
        }
    }

    fn pipeline_with(model: Arc<dyn LanguageModel>) -> (ChatPipeline, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        let pipeline = ChatPipeline::new(store.clone(), model, Arc::new(NoopNotifier));
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_normal_cycle_appends_user_then_assistant() {
        let (pipeline, store) = pipeline_with(Arc::new(ScriptedModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        let outcome = pipeline
            .process_message(session.id, owner, "Hello")
            .await
            .unwrap();

        match outcome {
            ProcessedMessage::Replied {
                reply, analysis, ..
            } => {
                assert_eq!(reply, "Thank you for sharing that with me.");
                assert_eq!(analysis.emotional_state, "hopeful");
                assert!(analysis.risk_level <= 10);
            }
            other => panic!("expected Replied, got {other:?}"),
        }

        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "Hello");
        assert!(history[0].metadata.is_none());
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert!(history[1].metadata.is_some());
    }

    #[tokio::test]
    async fn test_n_cycles_append_two_n_messages() {
        let (pipeline, store) = pipeline_with(Arc::new(ScriptedModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        for i in 0..3 {
            pipeline
                .process_message(session.id, owner, &format!("message {i}"))
                .await
                .unwrap();
        }

        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert_eq!(history.len(), 6);
    }

    #[tokio::test]
    async fn test_stress_short_circuit_appends_only_user_turn() {
        let (pipeline, store) = pipeline_with(Arc::new(ScriptedModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        let outcome = pipeline
            .process_message(session.id, owner, "I feel overwhelmed today")
            .await
            .unwrap();

        match outcome {
            ProcessedMessage::ShortCircuited { reply, prompt } => {
                assert_eq!(prompt.trigger, "overwhelmed");
                assert!(reply.contains(&prompt.activity.title));
            }
            other => panic!("expected ShortCircuited, got {other:?}"),
        }

        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_model_failure_yields_fallback_and_default_analysis() {
        let (pipeline, store) = pipeline_with(Arc::new(FailingModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        let outcome = pipeline
            .process_message(session.id, owner, "Hello")
            .await
            .unwrap();

        match outcome {
            ProcessedMessage::Replied {
                reply,
                analysis,
                model_error,
            } => {
                assert_eq!(reply, FALLBACK_REPLY);
                assert_eq!(analysis, default_analysis());
                assert!(model_error.is_some());
            }
            other => panic!("expected Replied, got {other:?}"),
        }

        // Both turns are still appended under model outage
        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (pipeline, store) = pipeline_with(Arc::new(ScriptedModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        let err = pipeline
            .process_message(session.id, owner, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));

        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_owner_is_not_found() {
        let (pipeline, store) = pipeline_with(Arc::new(ScriptedModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        let err = pipeline
            .process_message(session.id, Uuid::now_v7(), "Hello")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_cycles_never_lose_appends() {
        let (pipeline, store) = pipeline_with(Arc::new(ScriptedModel));
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        let (a, b) = tokio::join!(
            pipeline.process_message(session.id, owner, "first message"),
            pipeline.process_message(session.id, owner, "second message"),
        );
        a.unwrap();
        b.unwrap();

        let history = store.history(session.id, owner).await.unwrap().unwrap();
        assert_eq!(history.len(), 4);

        // Each pair stays adjacent: user turn then assistant turn
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[2].role, MessageRole::User);
        assert_eq!(history[3].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_short_circuit_still_emits_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Arc::new(InMemorySessionStore::new());
        let pipeline = ChatPipeline::new(
            store.clone(),
            Arc::new(ScriptedModel),
            Arc::new(ChannelNotifier(tx)),
        );
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        pipeline
            .process_message(session.id, owner, "so much pressure lately")
            .await
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("notifier channel closed");
        assert!(event.short_circuited);
        assert_eq!(event.risk_level, None);
        assert_eq!(event.session_id, session.id);
    }

    #[tokio::test]
    async fn test_normal_cycle_event_carries_risk_level() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = Arc::new(InMemorySessionStore::new());
        let pipeline = ChatPipeline::new(
            store.clone(),
            Arc::new(ScriptedModel),
            Arc::new(ChannelNotifier(tx)),
        );
        let owner = Uuid::now_v7();
        let session = store.create(owner).await.unwrap();

        pipeline
            .process_message(session.id, owner, "Hello")
            .await
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("notifier channel closed");
        assert!(!event.short_circuited);
        assert_eq!(event.risk_level, Some(1));
    }
}
