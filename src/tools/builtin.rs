//! Built-in function tools for the Mars mission agent.
//!
//! Both tools are deterministic and side-effect free: the launch-date lookup
//! returns a fixed string regardless of arguments, and the summary formatter
//! is a pure string template. The model decides when to call them; nothing
//! here touches the network.

use serde_json::{json, Value};

use super::{FunctionTool, ToolError};

/// Fixed answer for the Mars 2020 launch, returned on every call.
pub const ROCKET_LAUNCH_DATE: &str = "The Mars 2020 mission carrying the Perseverance rover \
     launched on July 30, 2020 at 11:50 UTC, aboard an Atlas V-541 from Cape Canaveral SLC-41.";

/// Returns the hardcoded Mars 2020 launch date.
#[derive(Debug, Default)]
pub struct RocketLaunchTool;

#[async_trait::async_trait]
impl FunctionTool for RocketLaunchTool {
    fn name(&self) -> &str {
        "fetch_rocket_launch_date"
    }

    fn description(&self) -> &str {
        "Get the launch date and vehicle of the Mars 2020 / Perseverance mission"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _arguments: Value) -> Result<String, ToolError> {
        Ok(ROCKET_LAUNCH_DATE.to_string())
    }
}

/// Formats a one-line mission summary from a mission name and a highlight.
#[derive(Debug, Default)]
pub struct MissionSummaryTool;

impl MissionSummaryTool {
    /// The template both the tool and its tests rely on: mission name first,
    /// highlight second, fixed separators.
    pub fn format(mission_name: &str, highlight: &str) -> String {
        format!("Mission report for {}: {}", mission_name, highlight)
    }
}

#[async_trait::async_trait]
impl FunctionTool for MissionSummaryTool {
    fn name(&self) -> &str {
        "format_mission_summary"
    }

    fn description(&self) -> &str {
        "Format a one-line summary for a Mars mission given its name and a key highlight"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mission_name": {
                    "type": "string",
                    "description": "Name of the mission, e.g. 'Curiosity'"
                },
                "highlight": {
                    "type": "string",
                    "description": "The fact to highlight about the mission"
                }
            },
            "required": ["mission_name", "highlight"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let mission_name = required_string(&arguments, "mission_name")?;
        let highlight = required_string(&arguments, "highlight")?;
        Ok(Self::format(mission_name, highlight))
    }
}

fn required_string<'a>(arguments: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParameters {
            message: format!("missing required string argument '{}'", field),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_launch_date_is_stable_across_calls() {
        let tool = RocketLaunchTool;
        let first = tool.execute(json!({})).await.unwrap();
        for _ in 0..5 {
            let again = tool.execute(json!({})).await.unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(first, ROCKET_LAUNCH_DATE);
    }

    #[tokio::test]
    async fn test_launch_date_ignores_arguments() {
        let tool = RocketLaunchTool;
        let with_args = tool.execute(json!({"anything": 42})).await.unwrap();
        assert_eq!(with_args, ROCKET_LAUNCH_DATE);
    }

    #[tokio::test]
    async fn test_summary_contains_both_inputs_in_order() {
        let tool = MissionSummaryTool;
        let output = tool
            .execute(json!({
                "mission_name": "Curiosity",
                "highlight": "confirmed ancient lakebeds in Gale Crater"
            }))
            .await
            .unwrap();

        let name_pos = output.find("Curiosity").expect("mission name present");
        let highlight_pos = output
            .find("confirmed ancient lakebeds in Gale Crater")
            .expect("highlight present");
        assert!(name_pos < highlight_pos);
    }

    #[tokio::test]
    async fn test_summary_injective_in_each_argument() {
        // Fixed highlight, varying names
        let a = MissionSummaryTool::format("Viking 1", "first US soft landing");
        let b = MissionSummaryTool::format("Viking 2", "first US soft landing");
        assert_ne!(a, b);

        // Fixed name, varying highlights
        let c = MissionSummaryTool::format("InSight", "measured marsquakes");
        let d = MissionSummaryTool::format("InSight", "deployed a heat probe");
        assert_ne!(c, d);
    }

    #[tokio::test]
    async fn test_summary_rejects_missing_arguments() {
        let tool = MissionSummaryTool;

        let err = tool
            .execute(json!({"mission_name": "Opportunity"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters { .. }));
        assert!(err.to_string().contains("highlight"));

        let err = tool
            .execute(json!({"highlight": "drove a marathon"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mission_name"));
    }
}
