//! Interactive terminal chat with the Mars mission agent.
//!
//! One page of UI, rendered in a terminal: a message prompt, a streamed
//! transcript, three example questions selectable by number, and `/clear` to
//! discard the conversation and start a new server-side thread.
//!
//! Usage:
//! ```bash
//! export MISSION_AGENT_ENDPOINT=https://<project-endpoint>
//! export MISSION_AGENT_API_KEY=<key>
//! cargo run --bin mars-chat
//! ```

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mission_agent::chat::{ChatSession, EXAMPLE_PROMPTS};
use mission_agent::config::AgentChatConfig;
use mission_agent::streaming::observer::PrintingObserver;

#[derive(Debug, Parser)]
#[command(name = "mars-chat", about = "Chat about NASA Mars missions")]
struct Args {
    /// Settings file to load instead of mission-agent.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Documents folder to index for document search
    #[arg(long)]
    docs_dir: Option<PathBuf>,

    /// Show run-step progress while the agent works
    #[arg(long)]
    verbose: bool,

    /// Delete the agent, thread, and vector store records, then exit
    #[arg(long)]
    teardown: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => {
            let mut config = AgentChatConfig::from_file(path)?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => AgentChatConfig::load()?,
    };
    if let Some(docs_dir) = args.docs_dir {
        config.docs_dir = docs_dir;
    }

    println!("{}", "Mars Mission Chat".bold());
    println!("Connecting to {}...", config.endpoint);

    let mut session = ChatSession::connect(config)
        .await
        .context("failed to set up the agent session")?;

    if args.teardown {
        println!("Tearing down service records...");
        session.teardown().await?;
        println!("{}", "Done.".green());
        return Ok(());
    }

    println!("{}", "Ready. Ask about NASA Mars missions.".green());
    print_examples();
    println!("Commands: /clear, /examples, /help, /quit\n");

    let observer = if args.verbose {
        PrintingObserver::with_steps()
    } else {
        PrintingObserver::new()
    };
    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline(&format!("{} ", "you>".cyan().bold())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye.");
                break;
            }
            Err(e) => return Err(e).context("failed to read input"),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        let prompt = match input {
            "/quit" | "/exit" => {
                println!("Goodbye.");
                break;
            }
            "/help" => {
                println!("  /clear     discard the conversation and start fresh");
                println!("  /examples  show the example questions");
                println!("  /quit      exit");
                println!("  1..{}      ask an example question", EXAMPLE_PROMPTS.len());
                continue;
            }
            "/examples" => {
                print_examples();
                continue;
            }
            "/clear" => {
                session.clear();
                println!("{}", "Conversation cleared.".yellow());
                continue;
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=EXAMPLE_PROMPTS.len()).contains(&n) => {
                    let prompt = EXAMPLE_PROMPTS[n - 1];
                    println!("{} {}", "you>".cyan().bold(), prompt);
                    prompt
                }
                _ => other,
            },
        };

        print!("{} ", "agent>".magenta().bold());
        match session.send(prompt, &observer).await {
            Ok(_) => {}
            Err(e) => {
                println!();
                eprintln!("{} {}", "error:".red().bold(), e);
                if e.is_auth_error() {
                    eprintln!("Check MISSION_AGENT_API_KEY and your project permissions.");
                }
            }
        }
        println!();
    }

    Ok(())
}

fn print_examples() {
    println!("Example questions:");
    for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
        println!("  {}. {}", i + 1, prompt);
    }
}
