//! Streamed run events and the chat relay.
//!
//! Opening a run on a thread (or submitting tool outputs into one) yields a
//! server-sent-event stream. This module decodes those frames into
//! [`RunStreamEvent`]s and drives a whole chat turn through [`drive_run`]:
//! one loop consumes the stream and fans every event out to a single
//! [`observer::ChatObserver`], so console logging and transcript state cannot
//! drift apart.
//!
//! The function-calling contract lives here too: when the service parks a run
//! in `requires_action`, the relay dispatches each named call through the
//! local [`ToolRegistry`](crate::tools::ToolRegistry), submits the outputs,
//! and continues with the stream the submission returns.

pub mod observer;

use futures::{Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use std::collections::HashSet;
use std::pin::Pin;

use crate::client::ProjectClient;
use crate::error::AgentError;
use crate::tools::ToolRegistry;
use crate::types::{MessageRecord, RequiredToolCall, RunRecord, RunStatus, ToolOutput};
use crate::Result;

use observer::ChatObserver;

/// One decoded event from the run stream.
#[derive(Debug, Clone)]
pub enum RunStreamEvent {
    /// Partial assistant text
    MessageDelta { message_id: String, text: String },
    /// An assistant message finished; carries the full text
    MessageCompleted { message_id: String, text: String },
    /// Run lifecycle transition
    RunStatus {
        run_id: String,
        status: RunStatus,
        error: Option<String>,
    },
    /// The run is waiting on local function results
    RequiresAction {
        run_id: String,
        tool_calls: Vec<RequiredToolCall>,
    },
    /// Run step progress (message creation, tool invocation)
    RunStep { kind: String, status: String },
    /// The service reported a stream-level error
    StreamError { message: String },
    /// End of this event stream
    Done,
}

type EventStream = Pin<Box<dyn Stream<Item = Result<RunStreamEvent>> + Send>>;

/// Open a streamed run of the agent against a thread.
pub async fn open_run_stream(
    client: &ProjectClient,
    thread_id: &str,
    agent_id: &str,
) -> Result<EventStream> {
    let response = client
        .post_stream(
            &format!("threads/{}/runs", thread_id),
            &serde_json::json!({
                "assistant_id": agent_id,
                "stream": true,
            }),
        )
        .await?;
    Ok(sse_event_stream(response))
}

/// Submit local function results into a waiting run, continuing the stream.
pub async fn submit_tool_outputs_stream(
    client: &ProjectClient,
    thread_id: &str,
    run_id: &str,
    outputs: &[ToolOutput],
) -> Result<EventStream> {
    let response = client
        .post_stream(
            &format!("threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
            &serde_json::json!({
                "tool_outputs": outputs,
                "stream": true,
            }),
        )
        .await?;
    Ok(sse_event_stream(response))
}

/// Drive one chat turn: consume the run stream, relay every event to the
/// observer, dispatch required tool calls, and return the assistant's text.
///
/// A run that ends in a failed status resolves to inline error text rather
/// than an `Err`, so the transcript can show it; transport-level stream
/// failures propagate.
pub async fn drive_run(
    client: &ProjectClient,
    registry: &ToolRegistry,
    thread_id: &str,
    agent_id: &str,
    observer: &dyn ChatObserver,
) -> Result<String> {
    let stream = open_run_stream(client, thread_id, agent_id).await?;
    consume_run_stream(client, registry, thread_id, observer, stream).await
}

/// The event-consumption loop behind [`drive_run`], fed an already-open
/// stream. The client is only touched again when a run parks in
/// `requires_action` and tool outputs must be submitted.
async fn consume_run_stream(
    client: &ProjectClient,
    registry: &ToolRegistry,
    thread_id: &str,
    observer: &dyn ChatObserver,
    mut stream: EventStream,
) -> Result<String> {
    let mut tracker = MessageTracker::new();

    loop {
        let event = match stream.next().await {
            Some(event) => event?,
            None => break,
        };

        match event {
            RunStreamEvent::MessageDelta { message_id, text } => {
                tracker.apply_delta(&message_id, &text);
                observer.on_text_delta(&text).await;
            }
            RunStreamEvent::MessageCompleted { message_id, text } => {
                // Both completed shapes the service emits funnel here; only
                // the first sighting of a message id is relayed.
                if tracker.complete(&message_id, &text) {
                    observer.on_message_completed(&text).await;
                }
            }
            RunStreamEvent::RunStatus {
                run_id,
                status,
                error,
            } => {
                observer.on_run_status(status).await;
                if status == RunStatus::Failed {
                    let detail = error.unwrap_or_else(|| "no error detail".to_string());
                    tracing::warn!(run = %run_id, "run failed: {}", detail);
                    let inline = format!("[the run failed: {}]", detail);
                    observer.on_error(&inline).await;
                    tracker.complete(&run_id, &inline);
                }
            }
            RunStreamEvent::RequiresAction { run_id, tool_calls } => {
                let outputs = execute_tool_calls(registry, &tool_calls, observer).await;
                stream =
                    submit_tool_outputs_stream(client, thread_id, &run_id, &outputs).await?;
            }
            RunStreamEvent::RunStep { kind, status } => {
                observer.on_run_step(&kind, &status).await;
            }
            RunStreamEvent::StreamError { message } => {
                observer.on_error(&message).await;
                return Err(AgentError::stream(message));
            }
            RunStreamEvent::Done => {
                observer.on_done().await;
                break;
            }
        }
    }

    Ok(tracker.into_text())
}

/// Dispatch each required call through the registry. A failing local tool
/// reports its error text as the tool output so the run can still finish.
async fn execute_tool_calls(
    registry: &ToolRegistry,
    tool_calls: &[RequiredToolCall],
    observer: &dyn ChatObserver,
) -> Vec<ToolOutput> {
    let mut outputs = Vec::with_capacity(tool_calls.len());
    for call in tool_calls {
        let name = &call.function.name;
        let output = match registry.dispatch(name, &call.function.arguments).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %name, "function tool failed: {}", e);
                format!("error: {}", e)
            }
        };
        observer.on_tool_call(name, &output).await;
        outputs.push(ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        });
    }
    outputs
}

/// Accumulates streamed text and deduplicates message completions.
#[derive(Debug, Default)]
struct MessageTracker {
    completed: HashSet<String>,
    buffer: String,
    final_text: Option<String>,
}

impl MessageTracker {
    fn new() -> Self {
        Self::default()
    }

    fn apply_delta(&mut self, _message_id: &str, text: &str) {
        self.buffer.push_str(text);
    }

    /// Record a completed message. Returns false for ids already seen, which
    /// is how the two completed-event shapes collapse into one relay event.
    fn complete(&mut self, message_id: &str, text: &str) -> bool {
        if !self.completed.insert(message_id.to_string()) {
            return false;
        }
        self.final_text = Some(text.to_string());
        true
    }

    /// Final assistant text: a completed message wins over accumulated deltas.
    fn into_text(self) -> String {
        self.final_text.unwrap_or(self.buffer)
    }
}

/// Decode an SSE response body into run events, line-buffered.
fn sse_event_stream(response: reqwest::Response) -> EventStream {
    let byte_stream = response.bytes_stream().map_err(std::io::Error::other);

    let stream = async_stream::stream! {
        // Byte buffer, split on newlines before decoding: a multi-byte UTF-8
        // character may arrive split across two network chunks.
        let mut buffer: Vec<u8> = Vec::new();
        let mut decoder = SseFrameDecoder::new();
        let mut chunks = byte_stream;

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => {
                    buffer.extend_from_slice(&chunk);
                    while let Some(line) = next_line(&mut buffer) {
                        if let Some((event, data)) = decoder.push_line(&line) {
                            if let Some(decoded) = decode_frame(&event, &data) {
                                let done = matches!(decoded, RunStreamEvent::Done);
                                yield Ok(decoded);
                                if done {
                                    return;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("run event stream broke: {}", e);
                    yield Err(AgentError::stream(format!("stream transport error: {}", e)));
                    return;
                }
            }
        }
    };

    Box::pin(stream)
}

/// Drain one newline-terminated line from the byte buffer, decoding it only
/// once it is complete. Strips the trailing `\n` and any `\r`.
fn next_line(buffer: &mut Vec<u8>) -> Option<String> {
    let newline = buffer.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=newline).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(String::from_utf8_lossy(&line).into_owned())
}

/// Pairs `event:` lines with their `data:` payloads.
#[derive(Debug, Default)]
struct SseFrameDecoder {
    event: Option<String>,
}

impl SseFrameDecoder {
    fn new() -> Self {
        Self::default()
    }

    /// Feed one line; yields a complete `(event, data)` frame when a data
    /// line arrives. Blank lines end the current frame.
    fn push_line(&mut self, line: &str) -> Option<(String, String)> {
        if line.is_empty() {
            self.event = None;
            return None;
        }
        if let Some(event) = line.strip_prefix("event: ") {
            self.event = Some(event.trim().to_string());
            return None;
        }
        if let Some(data) = line.strip_prefix("data: ") {
            let event = self.event.clone().unwrap_or_else(|| "message".to_string());
            return Some((event, data.to_string()));
        }
        None
    }
}

/// Decode one SSE frame into a [`RunStreamEvent`]. Frames this client does
/// not care about come back as `None`.
fn decode_frame(event: &str, data: &str) -> Option<RunStreamEvent> {
    if data.trim() == "[DONE]" || event == "done" {
        return Some(RunStreamEvent::Done);
    }
    if event == "error" {
        let message = serde_json::from_str::<Value>(data)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.pointer("/error/message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| data.to_string());
        return Some(RunStreamEvent::StreamError { message });
    }

    match event {
        "thread.message.delta" => {
            let value: Value = serde_json::from_str(data).ok()?;
            let message_id = value.get("id")?.as_str()?.to_string();
            let mut text = String::new();
            if let Some(blocks) = value.pointer("/delta/content").and_then(Value::as_array) {
                for block in blocks {
                    if let Some(piece) = block.pointer("/text/value").and_then(Value::as_str) {
                        text.push_str(piece);
                    }
                }
            }
            if text.is_empty() {
                return None;
            }
            Some(RunStreamEvent::MessageDelta { message_id, text })
        }
        "thread.message.completed" => {
            let message: MessageRecord = serde_json::from_str(data).ok()?;
            Some(RunStreamEvent::MessageCompleted {
                text: message.text(),
                message_id: message.id,
            })
        }
        // Some API versions emit the full message object under a bare
        // `thread.message` kind, with completion signalled by its status.
        "thread.message" => {
            let message: MessageRecord = serde_json::from_str(data).ok()?;
            if message.status.as_deref() != Some("completed") {
                return None;
            }
            Some(RunStreamEvent::MessageCompleted {
                text: message.text(),
                message_id: message.id,
            })
        }
        _ if event.starts_with("thread.run.step") => {
            let value: Value = serde_json::from_str(data).ok()?;
            Some(RunStreamEvent::RunStep {
                kind: value
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                status: value
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            })
        }
        _ if event.starts_with("thread.run") => {
            let run: RunRecord = serde_json::from_str(data).ok()?;
            if run.status == RunStatus::RequiresAction {
                if let Some(action) = run.required_action {
                    return Some(RunStreamEvent::RequiresAction {
                        run_id: run.id,
                        tool_calls: action.submit_tool_outputs.tool_calls,
                    });
                }
            }
            Some(RunStreamEvent::RunStatus {
                run_id: run.id,
                status: run.status,
                error: run.last_error.map(|e| e.message),
            })
        }
        other => {
            tracing::trace!(kind = %other, "ignoring stream event");
            None
        }
    }
}
