use serde::{Deserialize, Serialize};

use crate::highlighter::{HighlightEvent, Phase};
use crate::model::MatchRecord;
use crate::search_box::Key;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyDto {
    Enter,
    Escape,
}

impl From<KeyDto> for Key {
    fn from(value: KeyDto) -> Self {
        match value {
            KeyDto::Enter => Key::Enter,
            KeyDto::Escape => Key::Escape,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyRequest {
    pub key: KeyDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvanceRequest {
    pub ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    Search(SearchRequest),
    Clear,
    Type(TypeRequest),
    Key(KeyRequest),
    Advance(AdvanceRequest),
    Settle,
    Snapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    /// `None` while the search waits behind a fade-out clear.
    pub match_count: Option<usize>,
    pub queued: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearResponse {
    pub immediate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventsResponse {
    pub now_ms: u64,
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    Search(SearchResponse),
    Clear(ClearResponse),
    Events(EventsResponse),
    Snapshot(SnapshotDto),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventDto {
    Marked { element: usize },
    Revealed { element: usize },
    AttentionCleared { element: usize },
    Cleared,
    SearchCompleted { term: String, match_count: usize },
    HintHidden,
}

impl From<HighlightEvent> for EventDto {
    fn from(value: HighlightEvent) -> Self {
        match value {
            HighlightEvent::Marked(element) => Self::Marked { element: element.0 },
            HighlightEvent::Revealed(element) => Self::Revealed { element: element.0 },
            HighlightEvent::AttentionCleared(element) => {
                Self::AttentionCleared { element: element.0 }
            }
            HighlightEvent::Cleared => Self::Cleared,
            HighlightEvent::SearchCompleted { term, match_count } => {
                Self::SearchCompleted { term, match_count }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchDto {
    pub container: usize,
    pub element: usize,
    pub segment: usize,
    pub start: usize,
    pub end: usize,
    pub excerpt: String,
}

impl MatchDto {
    pub fn from_record(record: &MatchRecord, excerpt: String) -> Self {
        Self {
            container: record.container.element().0,
            element: record.element.0,
            segment: record.segment,
            start: record.start_offset,
            end: record.end_offset,
            excerpt,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDto {
    Idle,
    Searching,
    Highlighting,
    Active,
    Clearing,
}

impl From<Phase> for PhaseDto {
    fn from(value: Phase) -> Self {
        match value {
            Phase::Idle => Self::Idle,
            Phase::Searching => Self::Searching,
            Phase::Highlighting => Self::Highlighting,
            Phase::Active => Self::Active,
            Phase::Clearing => Self::Clearing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchBoxDto {
    pub value: String,
    pub focused: bool,
    pub styled: bool,
    pub expanded: bool,
    pub clear_hint_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotDto {
    pub now_ms: u64,
    pub phase: PhaseDto,
    pub flags: Vec<String>,
    pub highlighted: Vec<usize>,
    pub matches: Vec<MatchDto>,
    pub search_box: SearchBoxDto,
}

/// Settled result of one query, as printed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchReport {
    pub term: String,
    pub match_count: usize,
    pub highlighted: Vec<usize>,
    pub first_highlight: Option<usize>,
    pub matches: Vec<MatchDto>,
}
