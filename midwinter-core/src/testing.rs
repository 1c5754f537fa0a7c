//! Testing utilities.
//!
//! - [`MockReasoner`] replays scripted replies in place of the Claude API
//!   and records every request it receives.
//! - [`sample_reference_data`] builds a 196-page manual with the Midwinter
//!   cast, buildings, vehicles and skills.

use crate::assistant::ReasoningService;
use crate::corpus::{Page, SectionType};
use crate::entities::{Building, Character, EntityIndex, GenericEntity, Skill, Vehicle};
use crate::loader::ReferenceData;
use crate::relationships::curated_relationships;
use async_trait::async_trait;
use claude::{ContentBlock, Request, Response, StopReason, Usage};
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A final answer.
    Text(String),
    /// Request these tools, in order.
    ToolCalls(Vec<(String, Value)>),
    /// Fail the exchange with an API error.
    Error(String),
    /// Wait, then answer with the text.
    Delayed(Duration, String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn tool(name: impl Into<String>, input: Value) -> Self {
        MockReply::ToolCalls(vec![(name.into(), input)])
    }
}

/// A reasoning service that returns scripted replies in order.
///
/// Once the script runs out every exchange gets the fallback reply.
pub struct MockReasoner {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    requests: Mutex<Vec<Request>>,
    next_tool_id: AtomicUsize,
}

impl MockReasoner {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: MockReply::text("The mock reasoner has no more scripted replies."),
            requests: Mutex::new(Vec::new()),
            next_tool_id: AtomicUsize::new(0),
        }
    }

    /// A service that asks for the same tool on every exchange.
    pub fn always_tools(name: impl Into<String>, input: Value) -> Self {
        Self::new(Vec::new()).with_fallback(MockReply::tool(name, input))
    }

    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn response(&self, content: Vec<ContentBlock>, stop_reason: StopReason) -> Response {
        Response {
            id: format!("msg_mock_{}", self.request_count()),
            model: "mock".to_string(),
            content,
            stop_reason,
            usage: Usage::default(),
        }
    }
}

#[async_trait]
impl ReasoningService for MockReasoner {
    async fn respond(&self, request: Request) -> Result<Response, claude::Error> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }

        match self.next_reply() {
            MockReply::Text(text) => Ok(self.response(
                vec![ContentBlock::Text { text }],
                StopReason::EndTurn,
            )),
            MockReply::ToolCalls(calls) => {
                let content = calls
                    .into_iter()
                    .map(|(name, input)| ContentBlock::ToolUse {
                        id: format!(
                            "toolu_mock_{}",
                            self.next_tool_id.fetch_add(1, Ordering::Relaxed)
                        ),
                        name,
                        input,
                    })
                    .collect();
                Ok(self.response(content, StopReason::ToolUse))
            }
            MockReply::Error(message) => Err(claude::Error::Api {
                status: 500,
                message,
            }),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(self.response(
                    vec![ContentBlock::Text { text }],
                    StopReason::EndTurn,
                ))
            }
        }
    }
}

/// Pages per section in [`sample_reference_data`].
pub const SAMPLE_SECTIONS: [(SectionType, u32, u32); 5] = [
    (SectionType::General, 1, 20),
    (SectionType::Character, 21, 80),
    (SectionType::Equipment, 81, 120),
    (SectionType::Location, 121, 160),
    (SectionType::Story, 161, 196),
];

/// Total pages in [`sample_reference_data`].
pub const SAMPLE_PAGE_COUNT: u32 = 196;

fn sample_page_text(n: u32, section: SectionType) -> String {
    match n {
        3 => "Starting the game. The Free Villages must resist the invasion led by General Masters.".into(),
        25 => "Captain John Stark commands the Peace Force. He trusts Lieutenant Howard Courtenay and is close to Nurse Sarah Maddocks.".into(),
        90 => "The hang glider is launched from high ground. A glider descends slowly and silently, ideal for reaching enemy bases.".into(),
        95 => "The snow buggy is the fastest vehicle on flat snow but burns fuel quickly.".into(),
        130 => "Shepherd's Rise is a village with a cable car station and a radio mast.".into(),
        170 => "The story of the Midwinter war: General Masters' forces land on the southern coast.".into(),
        _ => format!("Midwinter {section} reference, page {n}. The island lies under snow."),
    }
}

/// A complete, deterministic data set for tests.
///
/// Relationships are left unset so the curated table is used.
pub fn sample_reference_data() -> ReferenceData {
    let pages = SAMPLE_SECTIONS
        .iter()
        .flat_map(|&(section, first, last)| {
            (first..=last).map(move |n| Page::new(n, section, sample_page_text(n, section)))
        })
        .collect();

    let mut names: BTreeSet<String> = curated_relationships()
        .into_iter()
        .flat_map(|r| [r.from_character, r.to_character])
        .collect();
    names.insert("Mrs Amelia Randles".to_string());

    let characters = names
        .into_iter()
        .map(|name| match name.as_str() {
            "Captain John Stark" => Character::new(name)
                .with_title("Captain")
                .with_age("42")
                .with_occupation("Commander of the Peace Force")
                .with_biography("Leader of the Free Villages resistance against General Masters."),
            "Nurse Sarah Maddocks" => Character::new(name)
                .with_title("Nurse")
                .with_occupation("Nurse")
                .with_biography("Tends the wounded at the Shepherd's Rise infirmary."),
            _ => Character::new(name),
        })
        .collect();

    let entities = EntityIndex {
        characters,
        buildings: vec![
            Building {
                building_type: "Cable Car Station".into(),
                description: Some("Carries units between mountain villages.".into()),
                gameplay_function: Some("Fast travel".into()),
            },
            Building {
                building_type: "Factory".into(),
                description: Some("Produces enemy vehicles.".into()),
                gameplay_function: Some("Sabotage target".into()),
            },
        ],
        enemy_vehicles: vec![
            Vehicle {
                vehicle_type: "Bomber".into(),
                role: Some("Air strike".into()),
                description: Some("Flies over the snow fields in pairs.".into()),
            },
            Vehicle {
                vehicle_type: "Snow Buggy".into(),
                role: Some("Patrol".into()),
                description: Some("Fast, lightly armed ground vehicle.".into()),
            },
        ],
        skills: vec![Skill {
            skill_name: "Hang Gliding".into(),
            description: Some("Ability to fly the hang glider.".into()),
        }],
        entities: vec![GenericEntity {
            name: "General Masters".into(),
            entity_type: Some("faction leader".into()),
            description: Some("Commander of the invading army.".into()),
        }],
    };

    ReferenceData {
        pages,
        entities,
        relationships: None,
    }
}
