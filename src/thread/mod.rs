//! Server-side conversation threads.
//!
//! A thread is a service-persisted session tied to an agent; this crate keeps
//! only the id for the duration of a chat. Clearing the chat just forgets the
//! id and creates a fresh thread on the next turn.

use serde_json::json;

use crate::client::ProjectClient;
use crate::types::{MessageRecord, ThreadRecord};
use crate::Result;

/// Create a new, empty conversation thread.
pub async fn create_thread(client: &ProjectClient) -> Result<ThreadRecord> {
    let thread: ThreadRecord = client.post_json("threads", &json!({})).await?;
    tracing::info!(thread = %thread.id, "created conversation thread");
    Ok(thread)
}

/// Append a user message to a thread.
pub async fn post_user_message(
    client: &ProjectClient,
    thread_id: &str,
    text: &str,
) -> Result<MessageRecord> {
    client
        .post_json(
            &format!("threads/{}/messages", thread_id),
            &json!({
                "role": "user",
                "content": text,
            }),
        )
        .await
}

/// Delete a thread record (teardown path).
pub async fn delete_thread(client: &ProjectClient, thread_id: &str) -> Result<()> {
    tracing::info!(thread = %thread_id, "deleting thread");
    client.delete(&format!("threads/{}", thread_id)).await
}
