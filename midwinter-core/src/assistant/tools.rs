//! Retrieval tools exposed to the reasoning service.
//!
//! Each tool maps one name and argument contract onto one retrieval or
//! relationship operation. Arguments are checked against the tool's own
//! input schema before anything runs.

use crate::error::{Error, Result};
use crate::relationships::RelationshipGraph;
use crate::retrieval::RetrievalEngine;
use claude::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// The fixed tool registry.
pub struct ManualTools;

impl ManualTools {
    /// Every tool definition, in the order offered to the model.
    pub fn all() -> Vec<Tool> {
        vec![
            Self::search_manual(),
            Self::show_page(),
            Self::filter_by_section(),
            Self::quick_search(),
            Self::list_sections(),
            Self::list_entities(),
            Self::can_recruit(),
            Self::who_can_recruit(),
            Self::get_friends(),
            Self::get_enemies(),
        ]
    }

    /// Look up one definition by name.
    pub fn get(name: &str) -> Option<Tool> {
        Self::all().into_iter().find(|t| t.name == name)
    }

    fn search_manual() -> Tool {
        Tool {
            name: "search_manual".to_string(),
            description: "Full-text search across the Midwinter game manual. Returns page numbers with text snippets ranked by relevance. Use this first to find relevant pages, then use show_page to read the full content.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search keywords - try single important words first, then phrases (e.g., 'hang glider', 'morale')"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn show_page() -> Tool {
        Tool {
            name: "show_page".to_string(),
            description: "Get the FULL content of a specific manual page. Use this after search_manual finds a promising page to read all the details and verify information.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_number": {
                        "type": "integer",
                        "description": "Page number to display"
                    }
                },
                "required": ["page_number"]
            }),
        }
    }

    fn filter_by_section() -> Tool {
        Tool {
            name: "filter_by_section".to_string(),
            description: "Search within a specific manual section: characters, equipment, locations, story_sections, or general_content.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "section": {
                        "type": "string",
                        "enum": ["characters", "equipment", "locations", "story_sections", "general_content"],
                        "description": "Section to search in"
                    },
                    "query": {
                        "type": "string",
                        "description": "Search keywords"
                    }
                },
                "required": ["section", "query"]
            }),
        }
    }

    fn quick_search() -> Tool {
        Tool {
            name: "quick_search".to_string(),
            description: "Fast entity lookup for characters, buildings, enemy vehicles and skills by name. Returns biography, occupation and age for characters.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Entity name to find (e.g., 'Stark', 'snow buggy')"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn list_sections() -> Tool {
        Tool {
            name: "list_sections".to_string(),
            description: "List all sections in the manual with page counts and page ranges.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    fn list_entities() -> Tool {
        Tool {
            name: "list_entities".to_string(),
            description: "List every pre-extracted entity name (characters, buildings, enemy vehicles, skills) available for quick_search.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    fn can_recruit() -> Tool {
        Tool {
            name: "can_recruit".to_string(),
            description: "Check if one character can recruit another. Returns YES, NO, or UNKNOWN based on their relationship.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "recruiter": {
                        "type": "string",
                        "description": "Name of the character doing the recruiting (e.g., 'Stark', 'Llewellyn')"
                    },
                    "target": {
                        "type": "string",
                        "description": "Name of the character to be recruited (e.g., 'Adams', 'Wright')"
                    }
                },
                "required": ["recruiter", "target"]
            }),
        }
    }

    fn who_can_recruit() -> Tool {
        Tool {
            name: "who_can_recruit".to_string(),
            description: "Find all characters who can (or cannot) recruit a specific target character.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target": {
                        "type": "string",
                        "description": "Name of the character to find recruiters for"
                    }
                },
                "required": ["target"]
            }),
        }
    }

    fn get_friends() -> Tool {
        Self::social_tool(
            "get_friends",
            "Get all friends/allies of a character - people they like or who like them.",
        )
    }

    fn get_enemies() -> Tool {
        Self::social_tool(
            "get_enemies",
            "Get all enemies of a character - people they dislike or who dislike them.",
        )
    }

    fn social_tool(name: &str, description: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "character": {
                        "type": "string",
                        "description": "Name of the character"
                    }
                },
                "required": ["character"]
            }),
        }
    }
}

/// Check `input` against a tool's schema: every required field present, and
/// every declared field that is present carrying the declared JSON type.
pub fn validate(tool: &Tool, input: &Value) -> Result<()> {
    let schema = &tool.input_schema;

    if let Some(required) = schema["required"].as_array() {
        for field in required.iter().filter_map(Value::as_str) {
            if input.get(field).map_or(true, Value::is_null) {
                return Err(Error::MissingArgument {
                    tool: tool.name.clone(),
                    field: field.to_string(),
                });
            }
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        for (field, spec) in properties {
            let Some(value) = input.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let expected = match spec["type"].as_str() {
                Some("string") if !value.is_string() => "string",
                Some("integer") if !value.is_i64() => "integer",
                Some("boolean") if !value.is_boolean() => "boolean",
                _ => continue,
            };
            return Err(Error::InvalidArgument {
                tool: tool.name.clone(),
                field: field.clone(),
                expected,
            });
        }
    }

    Ok(())
}

/// Routes validated tool calls to the retrieval engine and relationship graph.
pub struct ToolDispatcher {
    retrieval: Arc<RetrievalEngine>,
    graph: Arc<RelationshipGraph>,
}

impl ToolDispatcher {
    pub fn new(retrieval: Arc<RetrievalEngine>, graph: Arc<RelationshipGraph>) -> Self {
        Self { retrieval, graph }
    }

    pub fn retrieval(&self) -> &RetrievalEngine {
        &self.retrieval
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Run one tool and render its output.
    ///
    /// An unknown tool name is not an error; the model is told so in text.
    pub fn dispatch(&self, name: &str, input: &Value) -> Result<String> {
        let Some(tool) = ManualTools::get(name) else {
            return Ok(format!("Unknown tool: {name}"));
        };
        validate(&tool, input)?;

        let text = |field: &str| input[field].as_str().unwrap_or_default();

        let output = match name {
            "search_manual" => self.retrieval.search_manual(text("query"))?.to_string(),
            "show_page" => {
                let page = input["page_number"].as_i64().unwrap_or(0);
                self.retrieval.show_page(page)?.to_string()
            }
            "filter_by_section" => self
                .retrieval
                .filter_by_section(text("section"), text("query"))?
                .to_string(),
            "quick_search" => self.retrieval.quick_search(text("query")).to_string(),
            "list_sections" => self.retrieval.list_sections().to_string(),
            "list_entities" => self.retrieval.list_entities().to_string(),
            "can_recruit" => self
                .graph
                .can_recruit(text("recruiter"), text("target"))?
                .to_string(),
            "who_can_recruit" => self.graph.who_can_recruit(text("target"))?.to_string(),
            "get_friends" => self.graph.friends(text("character"))?.to_string(),
            "get_enemies" => self.graph.enemies(text("character"))?.to_string(),
            _ => format!("Unknown tool: {name}"),
        };
        Ok(output)
    }

    /// Dispatch and wrap the outcome as a tool result for the conversation.
    pub fn execute(&self, name: &str, input: &Value) -> ToolResult {
        match self.dispatch(name, input) {
            Ok(output) => {
                debug!(tool = name, bytes = output.len(), "tool succeeded");
                ToolResult::success(output)
            }
            Err(e) => {
                debug!(tool = name, error = %e, kind = ?e.kind(), "tool failed");
                ToolResult::error(e.to_string())
            }
        }
    }
}
