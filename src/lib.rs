//! Chat with a hosted AI-agent service about NASA Mars missions.
//!
//! This crate is a typed, streaming client for a cloud agents platform: the
//! service owns the language model, the document index, and the web-search
//! grounding; this crate owns the wiring. You get lookup-or-create management
//! of the server-side agent, thread, and vector store records, a streamed run
//! relay with pluggable observers, and local function tools the model can call
//! mid-response.
//!
//! # Quick Start
//!
//! ```no_run
//! use mission_agent::chat::ChatSession;
//! use mission_agent::config::AgentChatConfig;
//! use mission_agent::streaming::observer::PrintingObserver;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentChatConfig::load()?;
//!     let mut session = ChatSession::connect(config).await?;
//!
//!     let answer = session
//!         .send("When did the Perseverance rover land?", &PrintingObserver::new())
//!         .await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture Overview
//!
//! - [`client::ProjectClient`] - authenticated HTTP handle to the agents endpoint
//! - [`agent::AgentManager`] - lookup-or-create for the named server-side agent
//! - [`tools`] - local function tools plus the grounding-tool descriptors
//! - [`streaming`] - SSE run-event decoding and the observer relay
//! - [`chat::ChatSession`] - one conversation: thread, transcript, turns
//!
//! The heavy lifting (retrieval, ranking, generation) happens on the service;
//! every durable record lives there and this crate holds only its id for the
//! session.
//!
//! # Module Organization
//!
//! - [`config`] - environment and settings-file configuration
//! - [`client`] - HTTP client, connection resolution, file upload
//! - [`types`] - wire records for agents, threads, runs, and tools
//! - [`tools`] - function-tool trait, registry, and toolset assembly
//! - [`vector_store`] - lookup-or-create document index from a local folder
//! - [`agent`] / [`thread`] - server-side record managers
//! - [`streaming`] - run event stream and chat observers
//! - [`chat`] - conversation session and teardown
//! - [`error`] - crate error types

pub mod agent;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod streaming;
pub mod thread;
pub mod tools;
pub mod types;
pub mod vector_store;

pub use error::AgentError;

pub type Result<T> = std::result::Result<T, AgentError>;
