//! Observers for streamed chat turns.
//!
//! [`ChatObserver`] is the single event-consumer seam of the relay: every
//! event from a run stream is delivered exactly once, to one observer. All
//! methods default to no-ops, so implementations override only what they
//! care about.

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Arc;

use crate::types::RunStatus;

/// Receives every event of a chat turn from the relay.
#[async_trait]
pub trait ChatObserver: Send + Sync {
    /// Partial assistant text, in arrival order
    async fn on_text_delta(&self, delta: &str) {
        let _ = delta;
    }

    /// The assistant message finished; `text` is the full message
    async fn on_message_completed(&self, text: &str) {
        let _ = text;
    }

    /// Run lifecycle transition
    async fn on_run_status(&self, status: RunStatus) {
        let _ = status;
    }

    /// Run step progress (message creation, tool invocation)
    async fn on_run_step(&self, kind: &str, status: &str) {
        let _ = (kind, status);
    }

    /// A local function tool was executed for the run
    async fn on_tool_call(&self, name: &str, output: &str) {
        let _ = (name, output);
    }

    /// The run or the stream reported an error
    async fn on_error(&self, message: &str) {
        let _ = message;
    }

    /// The event stream ended
    async fn on_done(&self) {}
}

/// Observer that does nothing. Useful for headless turns and tests.
#[derive(Debug, Default)]
pub struct NullObserver;

#[async_trait]
impl ChatObserver for NullObserver {}

/// Streams assistant text to stdout as it arrives, with optional run-step
/// progress lines.
#[derive(Debug)]
pub struct PrintingObserver {
    show_steps: bool,
}

impl PrintingObserver {
    pub fn new() -> Self {
        Self { show_steps: false }
    }

    pub fn with_steps() -> Self {
        Self { show_steps: true }
    }
}

impl Default for PrintingObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatObserver for PrintingObserver {
    async fn on_text_delta(&self, delta: &str) {
        print!("{}", delta);
        let _ = io::stdout().flush();
    }

    async fn on_message_completed(&self, _text: &str) {
        println!();
    }

    async fn on_run_step(&self, kind: &str, status: &str) {
        if self.show_steps {
            println!("[step: {} {}]", kind, status);
        }
    }

    async fn on_tool_call(&self, name: &str, _output: &str) {
        println!("\n[function: {}]", name);
    }

    async fn on_error(&self, message: &str) {
        eprintln!("\n{}", message);
    }
}

/// Fans events out to several observers in registration order.
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ChatObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn with_observers(observers: Vec<Arc<dyn ChatObserver>>) -> Self {
        Self { observers }
    }

    pub fn add(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatObserver for CompositeObserver {
    async fn on_text_delta(&self, delta: &str) {
        for observer in &self.observers {
            observer.on_text_delta(delta).await;
        }
    }

    async fn on_message_completed(&self, text: &str) {
        for observer in &self.observers {
            observer.on_message_completed(text).await;
        }
    }

    async fn on_run_status(&self, status: RunStatus) {
        for observer in &self.observers {
            observer.on_run_status(status).await;
        }
    }

    async fn on_run_step(&self, kind: &str, status: &str) {
        for observer in &self.observers {
            observer.on_run_step(kind, status).await;
        }
    }

    async fn on_tool_call(&self, name: &str, output: &str) {
        for observer in &self.observers {
            observer.on_tool_call(name, output).await;
        }
    }

    async fn on_error(&self, message: &str) {
        for observer in &self.observers {
            observer.on_error(message).await;
        }
    }

    async fn on_done(&self) {
        for observer in &self.observers {
            observer.on_done().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records events for assertions.
    #[derive(Debug, Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatObserver for RecordingObserver {
        async fn on_text_delta(&self, delta: &str) {
            self.events.lock().unwrap().push(format!("delta:{}", delta));
        }

        async fn on_message_completed(&self, text: &str) {
            self.events.lock().unwrap().push(format!("done:{}", text));
        }

        async fn on_tool_call(&self, name: &str, _output: &str) {
            self.events.lock().unwrap().push(format!("tool:{}", name));
        }
    }

    #[tokio::test]
    async fn test_null_observer_is_a_no_op() {
        let observer = NullObserver;
        observer.on_text_delta("hello").await;
        observer.on_run_status(RunStatus::InProgress).await;
        observer.on_done().await;
    }

    #[tokio::test]
    async fn test_composite_fans_out_in_order() {
        let first = Arc::new(RecordingObserver::default());
        let second = Arc::new(RecordingObserver::default());
        let composite = CompositeObserver::new()
            .add(first.clone())
            .add(second.clone());

        composite.on_text_delta("a").await;
        composite.on_message_completed("ab").await;
        composite.on_tool_call("fetch_rocket_launch_date", "out").await;

        for observer in [&first, &second] {
            let events = observer.events.lock().unwrap();
            assert_eq!(
                *events,
                vec![
                    "delta:a".to_string(),
                    "done:ab".to_string(),
                    "tool:fetch_rocket_launch_date".to_string(),
                ]
            );
        }
    }
}
