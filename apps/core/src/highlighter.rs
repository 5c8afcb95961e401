//! Search-and-highlight engine.
//!
//! A search scans every searchable container, records each occurrence and
//! schedules a staggered marker on each matched element. Clearing fades the
//! document out before removing markers. A new search never starts while a
//! clear is in flight: it is queued behind the fade and runs from the `tick`
//! that finishes it.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::config::HighlightConfig;
use crate::model::{normalize_term, ElementId, MatchRecord};
use crate::scheduler::{Clock, ManualClock, TimerQueue};
use crate::search::scan;
use crate::source::Page;

pub type ClearCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Enumeration in progress. Only observable from inside a text source.
    Searching,
    /// Markers are still being staggered onto elements.
    Highlighting,
    Active,
    Clearing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Completed(usize),
    /// Waiting for a fade-out clear; the count arrives as [`HighlightEvent::SearchCompleted`].
    Queued,
}

impl SearchOutcome {
    pub fn match_count(self) -> Option<usize> {
        match self {
            Self::Completed(count) => Some(count),
            Self::Queued => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Immediate,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightEvent {
    Marked(ElementId),
    Revealed(ElementId),
    AttentionCleared(ElementId),
    Cleared,
    SearchCompleted { term: String, match_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Mark(ElementId),
    Reveal,
    DropAttention(ElementId),
    FinishClear,
}

pub struct SearchHighlighter<C: Clock> {
    config: HighlightConfig,
    clock: C,
    timers: TimerQueue<Task>,
    phase: Phase,
    active_matches: Vec<MatchRecord>,
    marked: Vec<ElementId>,
    marked_set: HashSet<ElementId>,
    pending_marks: usize,
    attention: Option<ElementId>,
    queued_search: Option<String>,
    clear_callbacks: Vec<ClearCallback>,
}

impl<C: Clock> SearchHighlighter<C> {
    pub fn with_clock(config: HighlightConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            timers: TimerQueue::new(),
            phase: Phase::Idle,
            active_matches: Vec::new(),
            marked: Vec::new(),
            marked_set: HashSet::new(),
            pending_marks: 0,
            attention: None,
            queued_search: None,
            clear_callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_matches(&self) -> &[MatchRecord] {
        &self.active_matches
    }

    pub fn has_active_matches(&self) -> bool {
        !self.active_matches.is_empty()
    }

    /// Elements marked (or scheduled to be marked) by the current session, in reveal order.
    pub fn highlighted_elements(&self) -> &[ElementId] {
        &self.marked
    }

    pub fn queued_search(&self) -> Option<&str> {
        self.queued_search.as_deref()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Clears any current highlight, then searches for `term`.
    pub fn search<P: Page + ?Sized>(&mut self, page: &mut P, term: &str) -> SearchOutcome {
        let term = normalize_term(term);
        if term.is_empty() {
            return SearchOutcome::Completed(0);
        }

        match self.phase {
            Phase::Idle => SearchOutcome::Completed(self.run_search(page, term)),
            Phase::Clearing => {
                debug!(term, "search queued behind in-flight clear");
                self.queued_search = Some(term.to_string());
                SearchOutcome::Queued
            }
            Phase::Searching | Phase::Highlighting | Phase::Active => {
                if self.begin_clear(page) == ClearOutcome::Immediate {
                    return SearchOutcome::Completed(self.run_search(page, term));
                }
                debug!(term, "search queued behind fade-out");
                self.queued_search = Some(term.to_string());
                SearchOutcome::Queued
            }
        }
    }

    /// Removes every highlight, fading out first when any marker is visible.
    ///
    /// `on_complete` runs synchronously when nothing is highlighted.
    pub fn clear<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        on_complete: Option<ClearCallback>,
    ) -> ClearOutcome {
        self.queued_search = None;
        let outcome = match self.phase {
            Phase::Clearing => ClearOutcome::Pending,
            _ => self.begin_clear(page),
        };

        if let Some(callback) = on_complete {
            match outcome {
                ClearOutcome::Immediate => callback(),
                ClearOutcome::Pending => self.clear_callbacks.push(callback),
            }
        }
        outcome
    }

    /// Fires every task due at the clock's current reading.
    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P) -> Vec<HighlightEvent> {
        let mut events = Vec::new();
        while let Some(task) = self.timers.pop_due(self.clock.now()) {
            self.fire(page, task, &mut events);
        }
        events
    }

    fn fire<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        task: Task,
        events: &mut Vec<HighlightEvent>,
    ) {
        match task {
            Task::Mark(element) => {
                self.pending_marks = self.pending_marks.saturating_sub(1);
                if page.contains(element) {
                    page.add_class(element, &self.config.classes.marker);
                    events.push(HighlightEvent::Marked(element));
                }
                if self.pending_marks == 0 && self.phase == Phase::Highlighting {
                    self.phase = Phase::Active;
                }
            }
            Task::Reveal => {
                let marker = &self.config.classes.marker;
                let Some(element) = self
                    .marked
                    .iter()
                    .copied()
                    .find(|&element| page.contains(element) && page.has_class(element, marker))
                else {
                    debug!("no marked element to reveal");
                    return;
                };
                page.scroll_into_view(element);
                page.add_class(element, &self.config.classes.attention);
                self.attention = Some(element);
                let due = self.clock.now() + self.config.attention();
                self.timers.schedule(due, Task::DropAttention(element));
                events.push(HighlightEvent::Revealed(element));
            }
            Task::DropAttention(element) => {
                self.attention = None;
                if page.contains(element) {
                    page.remove_class(element, &self.config.classes.attention);
                    events.push(HighlightEvent::AttentionCleared(element));
                }
            }
            Task::FinishClear => self.finish_clear(page, events),
        }
    }

    fn run_search<P: Page + ?Sized>(&mut self, page: &mut P, term: &str) -> usize {
        self.phase = Phase::Searching;
        self.reset_session();

        let records = scan(
            &*page,
            term,
            &self.config.container_class,
            &self.config.excluded_tags,
        );

        let now = self.clock.now();
        let mut delay = Duration::ZERO;
        for record in &records {
            let element = record.element;
            if self.marked_set.contains(&element)
                || page.has_class(element, &self.config.classes.marker)
            {
                continue;
            }
            delay += self.config.stagger_step();
            self.timers.schedule(now + delay, Task::Mark(element));
            self.marked_set.insert(element);
            self.marked.push(element);
            self.pending_marks += 1;
        }

        page.set_flag(&self.config.classes.active_mode, true);

        if !self.marked.is_empty() {
            self.timers
                .schedule(now + self.config.reveal_delay(), Task::Reveal);
        }

        let match_count = records.len();
        self.active_matches = records;
        self.phase = if self.pending_marks > 0 {
            Phase::Highlighting
        } else {
            Phase::Active
        };

        debug!(
            term,
            match_count,
            elements = self.marked.len(),
            "search highlighted"
        );
        match_count
    }

    fn begin_clear<P: Page + ?Sized>(&mut self, page: &mut P) -> ClearOutcome {
        let cancelled = self.timers.cancel_all();
        self.pending_marks = 0;

        let marker = &self.config.classes.marker;
        let visible = self
            .marked
            .iter()
            .any(|&element| page.contains(element) && page.has_class(element, marker));

        if let Some(element) = self.attention.take() {
            if page.contains(element) {
                page.remove_class(element, &self.config.classes.attention);
            }
        }

        if !visible {
            page.set_flag(&self.config.classes.clearing, false);
            page.set_flag(&self.config.classes.active_mode, false);
            self.reset_session();
            self.phase = Phase::Idle;
            debug!(cancelled, "clear finished immediately");
            return ClearOutcome::Immediate;
        }

        page.set_flag(&self.config.classes.clearing, true);
        let due = self.clock.now() + self.config.clear_fade();
        self.timers.schedule(due, Task::FinishClear);
        self.phase = Phase::Clearing;
        debug!(cancelled, "clear fading out");
        ClearOutcome::Pending
    }

    fn finish_clear<P: Page + ?Sized>(&mut self, page: &mut P, events: &mut Vec<HighlightEvent>) {
        for &element in &self.marked {
            if page.contains(element) {
                page.remove_class(element, &self.config.classes.marker);
            }
        }
        page.set_flag(&self.config.classes.clearing, false);
        page.set_flag(&self.config.classes.active_mode, false);
        self.reset_session();
        self.phase = Phase::Idle;
        events.push(HighlightEvent::Cleared);

        for callback in std::mem::take(&mut self.clear_callbacks) {
            callback();
        }

        if let Some(term) = self.queued_search.take() {
            let match_count = self.run_search(page, &term);
            events.push(HighlightEvent::SearchCompleted { term, match_count });
        }
    }

    fn reset_session(&mut self) {
        self.active_matches.clear();
        self.marked.clear();
        self.marked_set.clear();
        self.pending_marks = 0;
        self.attention = None;
    }
}

impl SearchHighlighter<ManualClock> {
    /// Advances virtual time through every pending deadline.
    pub fn settle<P: Page + ?Sized>(&mut self, page: &mut P) -> Vec<HighlightEvent> {
        let mut events = Vec::new();
        while let Some(due) = self.timers.next_due() {
            self.clock.set(due);
            events.extend(self.tick(page));
        }
        events
    }

    pub fn advance<P: Page + ?Sized>(&mut self, page: &mut P, by: Duration) -> Vec<HighlightEvent> {
        let target = self.clock.now() + by;
        let mut events = Vec::new();
        while let Some(due) = self.timers.next_due().filter(|due| *due <= target) {
            self.clock.set(due);
            events.extend(self.tick(page));
        }
        self.clock.set(target);
        events
    }
}
