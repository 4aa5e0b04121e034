//! Conversation sessions over the hosted agent.
//!
//! A [`ChatSession`] owns everything one conversation needs: the client, the
//! local tool registry, the agent id, a lazily-created thread id, and the
//! transcript shown by the UI. Control flow per turn is strictly linear:
//! post the user message, open a streamed run, relay events, append to the
//! transcript.
//!
//! Clearing a session discards the transcript and forgets the thread id; the
//! next turn starts a fresh server-side thread.

use chrono::{DateTime, Utc};

use crate::agent::AgentManager;
use crate::client::ProjectClient;
use crate::config::AgentChatConfig;
use crate::streaming::drive_run;
use crate::streaming::observer::ChatObserver;
use crate::thread;
use crate::tools::{ToolRegistry, Toolset};
use crate::types::MessageRole;
use crate::vector_store;
use crate::Result;

/// Example questions surfaced by the chat UI.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "When did the Perseverance rover launch, and on what vehicle?",
    "What did the Viking landers discover about the Martian surface?",
    "Give me a one-line summary of the Curiosity mission.",
];

/// One entry of the local transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub role: MessageRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// A live conversation with the Mars mission agent.
pub struct ChatSession {
    client: ProjectClient,
    registry: ToolRegistry,
    config: AgentChatConfig,
    agent_id: String,
    vector_store_id: Option<String>,
    thread_id: Option<String>,
    transcript: Vec<TranscriptEntry>,
}

impl ChatSession {
    /// Wire up a session: build the client, assemble the toolset (degrading
    /// where capabilities are unavailable), and ensure the named agent exists
    /// with the current instructions and tools.
    pub async fn connect(config: AgentChatConfig) -> Result<Self> {
        let client = ProjectClient::from_config(&config)?;
        let registry = ToolRegistry::with_builtin_tools();

        let toolset = Toolset::assemble(&client, &config, &registry).await?;
        let agent = AgentManager::new(client.clone())
            .ensure_agent(&config, &toolset.definitions)
            .await?;

        tracing::info!(agent = %agent.id, "chat session ready");

        Ok(Self {
            client,
            registry,
            config,
            agent_id: agent.id,
            vector_store_id: toolset.vector_store.map(|store| store.id),
            thread_id: None,
            transcript: Vec::new(),
        })
    }

    /// Id of the current server-side thread, if one has been created.
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Id of the server-side agent record.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The local transcript, oldest first.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Send one user message and stream the response through the observer.
    /// Returns the assistant's full reply, which is also appended to the
    /// transcript (failed runs appear there as inline error text).
    pub async fn send(&mut self, text: &str, observer: &dyn ChatObserver) -> Result<String> {
        let turn_id = uuid::Uuid::new_v4();
        tracing::debug!(%turn_id, chars = text.len(), "starting chat turn");

        let thread_id = match &self.thread_id {
            Some(id) => id.clone(),
            None => {
                let created = thread::create_thread(&self.client).await?;
                self.thread_id = Some(created.id.clone());
                created.id
            }
        };

        thread::post_user_message(&self.client, &thread_id, text).await?;
        self.transcript
            .push(TranscriptEntry::new(MessageRole::User, text));

        let reply = drive_run(
            &self.client,
            &self.registry,
            &thread_id,
            &self.agent_id,
            observer,
        )
        .await?;

        self.transcript
            .push(TranscriptEntry::new(MessageRole::Assistant, reply.clone()));
        Ok(reply)
    }

    /// Discard the transcript and forget the thread. The next [`send`]
    /// creates a fresh server-side conversation.
    ///
    /// [`send`]: ChatSession::send
    pub fn clear(&mut self) {
        tracing::info!(thread = ?self.thread_id, "clearing conversation");
        self.thread_id = None;
        self.transcript.clear();
    }

    /// Delete the records this session created on the service: the thread
    /// (when one exists), the agent, and the vector store (when one was
    /// built). Manual teardown path; never called implicitly.
    pub async fn teardown(self) -> Result<()> {
        if let Some(thread_id) = &self.thread_id {
            thread::delete_thread(&self.client, thread_id).await?;
        }
        AgentManager::new(self.client.clone())
            .delete_agent(&self.agent_id)
            .await?;
        if let Some(store_id) = &self.vector_store_id {
            vector_store::delete_vector_store(&self.client, store_id).await?;
        }
        tracing::info!(agent = %self.config.agent_name, "teardown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_session() -> ChatSession {
        // Building a client needs no network; only send() would.
        let config = AgentChatConfig {
            endpoint: "https://example.test/project".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let client = ProjectClient::from_config(&config).unwrap();
        ChatSession {
            client,
            registry: ToolRegistry::with_builtin_tools(),
            config,
            agent_id: "agent_1".to_string(),
            vector_store_id: None,
            thread_id: Some("thread_1".to_string()),
            transcript: vec![
                TranscriptEntry::new(MessageRole::User, "hello"),
                TranscriptEntry::new(MessageRole::Assistant, "hi"),
            ],
        }
    }

    #[test]
    fn test_clear_forgets_thread_and_transcript() {
        let mut session = offline_session();
        assert_eq!(session.thread_id(), Some("thread_1"));
        assert_eq!(session.transcript().len(), 2);

        session.clear();

        assert!(session.thread_id().is_none());
        assert!(session.transcript().is_empty());
        // Agent record survives a clear; only the conversation resets.
        assert_eq!(session.agent_id(), "agent_1");
    }

    #[test]
    fn test_example_prompts_are_distinct() {
        assert_eq!(EXAMPLE_PROMPTS.len(), 3);
        assert_ne!(EXAMPLE_PROMPTS[0], EXAMPLE_PROMPTS[1]);
        assert_ne!(EXAMPLE_PROMPTS[1], EXAMPLE_PROMPTS[2]);
    }
}
