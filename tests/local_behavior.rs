//! Offline contract tests for the parts of the crate that do not need the
//! hosted service: the two function tools, tool-call dispatch, the documents
//! folder scan, and configuration precedence.

use std::fs::File;
use std::io::Write;

use mission_agent::chat::EXAMPLE_PROMPTS;
use mission_agent::config::AgentChatConfig;
use mission_agent::tools::builtin::ROCKET_LAUNCH_DATE;
use mission_agent::tools::{MissionSummaryTool, ToolRegistry};
use mission_agent::types::ToolDefinition;
use mission_agent::vector_store::collect_upload_paths;

#[tokio::test]
async fn launch_date_is_the_same_for_every_call_count() {
    let registry = ToolRegistry::with_builtin_tools();
    let mut outputs = Vec::new();
    for _ in 0..3 {
        outputs.push(
            registry
                .dispatch("fetch_rocket_launch_date", "{}")
                .await
                .unwrap(),
        );
    }
    assert!(outputs.iter().all(|o| o == ROCKET_LAUNCH_DATE));
}

#[tokio::test]
async fn mission_summary_keeps_template_order_for_arbitrary_pairs() {
    let pairs = [
        ("Sojourner", "first rover on Mars"),
        ("Spirit", "operated for six years"),
        ("Ingenuity", "first powered flight on another planet"),
    ];
    for (name, highlight) in pairs {
        let output = MissionSummaryTool::format(name, highlight);
        let name_pos = output.find(name).unwrap();
        let highlight_pos = output.find(highlight).unwrap();
        assert!(name_pos < highlight_pos, "template order broke for {}", name);
    }
}

#[tokio::test]
async fn dispatch_surfaces_tool_errors_without_panicking() {
    let registry = ToolRegistry::with_builtin_tools();
    let err = registry
        .dispatch("format_mission_summary", r#"{"mission_name": 7}"#)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("mission_name"));
}

#[test]
fn function_definitions_carry_schemas() {
    let registry = ToolRegistry::with_builtin_tools();
    for definition in registry.definitions() {
        match definition {
            ToolDefinition::Function { function } => {
                assert!(!function.name.is_empty());
                assert!(!function.description.is_empty());
                assert_eq!(function.parameters["type"], "object");
            }
            other => panic!("expected a function descriptor, got {:?}", other),
        }
    }
}

#[test]
fn empty_docs_folder_means_no_document_search() {
    let dir = tempfile::tempdir().unwrap();
    assert!(collect_upload_paths(dir.path()).unwrap().is_empty());

    let mut file = File::create(dir.path().join("missions.md")).unwrap();
    writeln!(file, "Mariner 4 flew by Mars in 1965.").unwrap();
    assert_eq!(collect_upload_paths(dir.path()).unwrap().len(), 1);
}

#[test]
fn settings_file_and_defaults_compose() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
endpoint = "https://example.test/project"
agent_name = "flight-ops-agent"
"#
    )
    .unwrap();

    let config = AgentChatConfig::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.agent_name, "flight-ops-agent");
    // Fields the file does not mention keep their defaults.
    assert_eq!(config.model_deployment, "gpt-4o");
    assert_eq!(config.vector_store_name, "mars-mission-docs");
}

#[test]
fn three_example_prompts_for_the_ui() {
    assert_eq!(EXAMPLE_PROMPTS.len(), 3);
    for prompt in EXAMPLE_PROMPTS {
        assert!(!prompt.trim().is_empty());
    }
}
