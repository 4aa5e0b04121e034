//! Lookup-or-create management of the server-side agent record.
//!
//! The agent (model + instructions + tool set) is persisted by the service and
//! keyed by name: finding an existing record updates it in place with the
//! current instructions and toolset, otherwise a fresh one is created. Either
//! way the service owns the record; this module only returns its id.

use serde_json::json;

use crate::client::ProjectClient;
use crate::config::AgentChatConfig;
use crate::types::{AgentRecord, ListResponse, ToolDefinition};
use crate::Result;

/// System prompt the Mars mission agent is created with.
pub const MARS_AGENT_INSTRUCTIONS: &str = "\
You are a knowledgeable assistant for questions about NASA Mars missions: \
orbiters, landers, rovers, and helicopters. Ground your answers in the \
provided mission documents and web search when available. Use the \
fetch_rocket_launch_date function for the Mars 2020 launch date and the \
format_mission_summary function when asked to summarize a mission. Keep \
answers factual and concise, and say so when you do not know.";

/// Manages the named agent record on the service.
#[derive(Debug, Clone)]
pub struct AgentManager {
    client: ProjectClient,
}

impl AgentManager {
    pub fn new(client: ProjectClient) -> Self {
        Self { client }
    }

    /// Find an agent by name, paging through the list until a match or the end.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<AgentRecord>> {
        let mut after: Option<String> = None;
        loop {
            let query: Vec<(&str, &str)> = match &after {
                Some(cursor) => vec![("after", cursor.as_str())],
                None => vec![],
            };
            let page: ListResponse<AgentRecord> = self
                .client
                .get_json_with_query("assistants", &query)
                .await?;

            if let Some(agent) = page
                .data
                .into_iter()
                .find(|agent| agent.name.as_deref() == Some(name))
            {
                return Ok(Some(agent));
            }
            if !page.has_more || page.last_id.is_none() {
                return Ok(None);
            }
            after = page.last_id;
        }
    }

    /// Create the named agent, or update the existing record so it carries the
    /// current model, instructions, and toolset.
    pub async fn ensure_agent(
        &self,
        config: &AgentChatConfig,
        tools: &[ToolDefinition],
    ) -> Result<AgentRecord> {
        let body = json!({
            "name": config.agent_name,
            "model": config.model_deployment,
            "instructions": MARS_AGENT_INSTRUCTIONS,
            "tools": tools,
        });

        match self.find_by_name(&config.agent_name).await? {
            Some(existing) => {
                tracing::info!(agent = %config.agent_name, id = %existing.id, "updating existing agent");
                self.client
                    .post_json(&format!("assistants/{}", existing.id), &body)
                    .await
            }
            None => {
                tracing::info!(agent = %config.agent_name, "creating agent");
                self.client.post_json("assistants", &body).await
            }
        }
    }

    /// Delete the agent record (teardown path).
    pub async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        tracing::info!(agent = %agent_id, "deleting agent");
        self.client.delete(&format!("assistants/{}", agent_id)).await
    }
}
