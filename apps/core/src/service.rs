use std::time::Duration;

use tracing::{debug, info};

use crate::config::HighlightConfig;
use crate::contract::{
    ClearResponse, CoreRequest, CoreResponse, EventDto, EventsResponse, MatchDto, SearchBoxDto,
    SearchReport, SearchResponse, SnapshotDto,
};
use crate::document::MemoryDocument;
use crate::highlighter::{ClearOutcome, HighlightEvent, SearchHighlighter, SearchOutcome};
use crate::scheduler::{Clock, ManualClock};
use crate::search_box::{BoxAction, Key, SearchBox};
use crate::source::TextSource;

const MAX_ADVANCE_MS: u64 = 3_600_000;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// A page, its highlighter and its search box, running on virtual time.
pub struct SearchService {
    doc: MemoryDocument,
    highlighter: SearchHighlighter<ManualClock>,
    search_box: SearchBox,
    clock: ManualClock,
}

impl SearchService {
    pub fn new(doc: MemoryDocument, config: HighlightConfig) -> Self {
        let clock = ManualClock::new();
        let search_box = SearchBox::new(config.hint_hide_delay());
        Self {
            doc,
            highlighter: SearchHighlighter::with_clock(config, clock.clone()),
            search_box,
            clock,
        }
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.doc
    }

    pub fn highlighter(&self) -> &SearchHighlighter<ManualClock> {
        &self.highlighter
    }

    pub fn search_box(&self) -> &SearchBox {
        &self.search_box
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn search(&mut self, term: &str) -> SearchOutcome {
        let outcome = self.highlighter.search(&mut self.doc, term);
        if let SearchOutcome::Completed(count) = outcome {
            self.search_box.search_completed(count);
        }
        outcome
    }

    pub fn clear(&mut self) -> ClearOutcome {
        self.highlighter.clear(&mut self.doc, None)
    }

    pub fn focus(&mut self) {
        let has_results = self.highlighter.has_active_matches();
        self.search_box.focus(has_results);
    }

    pub fn blur(&mut self) {
        self.search_box.blur(self.clock.now());
    }

    pub fn type_text(&mut self, text: &str) {
        let has_results = self.highlighter.has_active_matches();
        self.search_box.input(text, has_results);
    }

    pub fn press(&mut self, key: Key) -> BoxAction {
        let action = self.search_box.key(key);
        self.dispatch(&action);
        action
    }

    pub fn click_clear_hint(&mut self) {
        let action = self.search_box.click_clear_hint();
        self.dispatch(&action);
    }

    fn dispatch(&mut self, action: &BoxAction) {
        match action {
            BoxAction::None => {}
            BoxAction::Search(term) => {
                debug!(term = term.as_str(), "search submitted");
                self.search(term);
            }
            BoxAction::Clear => {
                self.clear();
            }
        }
    }

    /// Moves virtual time forward by `by`, firing highlighter and search box
    /// deadlines in the order they fall due.
    pub fn advance(&mut self, by: Duration) -> Vec<EventDto> {
        let target = self.clock.now() + by;
        let mut out = Vec::new();
        while let Some(due) = self.next_deadline().filter(|due| *due <= target) {
            self.clock.set(due);
            self.fire_due(&mut out);
        }
        self.clock.set(target);
        out
    }

    /// Runs virtual time forward until nothing is pending.
    pub fn settle(&mut self) -> Vec<EventDto> {
        let mut out = Vec::new();
        while let Some(due) = self.next_deadline() {
            self.clock.set(due);
            self.fire_due(&mut out);
        }
        out
    }

    fn next_deadline(&self) -> Option<Duration> {
        match (self.highlighter.next_deadline(), self.search_box.next_deadline()) {
            (Some(engine), Some(hint)) => Some(engine.min(hint)),
            (engine, hint) => engine.or(hint),
        }
    }

    fn fire_due(&mut self, out: &mut Vec<EventDto>) {
        for event in self.highlighter.tick(&mut self.doc) {
            if let HighlightEvent::SearchCompleted { match_count, .. } = &event {
                self.search_box.search_completed(*match_count);
            }
            out.push(event.into());
        }
        if self.search_box.tick(self.clock.now()) {
            out.push(EventDto::HintHidden);
        }
    }

    pub fn matches(&self) -> Vec<MatchDto> {
        self.highlighter
            .active_matches()
            .iter()
            .map(|record| {
                let excerpt = self
                    .doc
                    .segments(record.container)
                    .get(record.segment)
                    .and_then(|segment| record.excerpt(segment.text))
                    .unwrap_or_default()
                    .to_string();
                MatchDto::from_record(record, excerpt)
            })
            .collect()
    }

    pub fn snapshot(&self) -> SnapshotDto {
        let marker = &self.highlighter.config().classes.marker;
        SnapshotDto {
            now_ms: millis(self.clock.now()),
            phase: self.highlighter.phase().into(),
            flags: self.doc.flags().into_iter().map(str::to_string).collect(),
            highlighted: self
                .doc
                .elements_with_class(marker)
                .into_iter()
                .map(|element| element.0)
                .collect(),
            matches: self.matches(),
            search_box: SearchBoxDto {
                value: self.search_box.value().to_string(),
                focused: self.search_box.is_focused(),
                styled: self.search_box.is_styled(),
                expanded: self.search_box.is_expanded(),
                clear_hint_visible: self.search_box.is_clear_hint_visible(),
            },
        }
    }

    /// Searches for `term`, lets every animation finish and reports the final state.
    pub fn report(&mut self, term: &str) -> SearchReport {
        let outcome = self.search(term);
        let events = self.settle();

        let match_count = outcome.match_count().unwrap_or_else(|| {
            events
                .iter()
                .find_map(|event| match event {
                    EventDto::SearchCompleted { match_count, .. } => Some(*match_count),
                    _ => None,
                })
                .unwrap_or(0)
        });
        let first_highlight = events.iter().find_map(|event| match event {
            EventDto::Revealed { element } => Some(*element),
            _ => None,
        });

        info!(term, match_count, "query settled");
        SearchReport {
            term: term.trim().to_string(),
            match_count,
            highlighted: self
                .highlighter
                .highlighted_elements()
                .iter()
                .map(|element| element.0)
                .collect(),
            first_highlight,
            matches: self.matches(),
        }
    }

    pub fn handle_command(&mut self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Search(request) => {
                let outcome = self.search(&request.term);
                Ok(CoreResponse::Search(SearchResponse {
                    match_count: outcome.match_count(),
                    queued: outcome == SearchOutcome::Queued,
                }))
            }
            CoreRequest::Clear => {
                let outcome = self.clear();
                Ok(CoreResponse::Clear(ClearResponse {
                    immediate: outcome == ClearOutcome::Immediate,
                }))
            }
            CoreRequest::Type(request) => {
                self.type_text(&request.text);
                Ok(CoreResponse::Snapshot(self.snapshot()))
            }
            CoreRequest::Key(request) => {
                self.press(request.key.into());
                Ok(CoreResponse::Snapshot(self.snapshot()))
            }
            CoreRequest::Advance(request) => {
                if request.ms > MAX_ADVANCE_MS {
                    return Err(ServiceError::InvalidRequest(format!(
                        "advance must be at most {MAX_ADVANCE_MS} ms"
                    )));
                }
                let events = self.advance(Duration::from_millis(request.ms));
                Ok(self.events_response(events))
            }
            CoreRequest::Settle => {
                let events = self.settle();
                Ok(self.events_response(events))
            }
            CoreRequest::Snapshot => Ok(CoreResponse::Snapshot(self.snapshot())),
        }
    }

    fn events_response(&self, events: Vec<EventDto>) -> CoreResponse {
        CoreResponse::Events(EventsResponse {
            now_ms: millis(self.clock.now()),
            events,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
