use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxAction {
    None,
    Search(String),
    Clear,
}

/// Search input state: the typed value, focus styling and the clear hint.
///
/// `styled` is the focus ring, `expanded` the widened box. Escape drops the
/// ring but leaves the box wide until a blur with an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBox {
    value: String,
    focused: bool,
    styled: bool,
    expanded: bool,
    clear_hint_visible: bool,
    hint_hides: VecDeque<Duration>,
    hint_hide_delay: Duration,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}

impl SearchBox {
    pub fn new(hint_hide_delay: Duration) -> Self {
        Self {
            value: String::new(),
            focused: false,
            styled: false,
            expanded: false,
            clear_hint_visible: false,
            hint_hides: VecDeque::new(),
            hint_hide_delay,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_styled(&self) -> bool {
        self.styled
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_clear_hint_visible(&self) -> bool {
        self.clear_hint_visible
    }

    pub fn focus(&mut self, has_results: bool) {
        self.focused = true;
        self.styled = true;
        self.expanded = true;
        if !is_blank(&self.value) || has_results {
            self.clear_hint_visible = true;
        }
    }

    /// The hint hides a short while after blur so a click on it still lands.
    /// Every blur schedules its own hide; a later focus cancels none of them.
    pub fn blur(&mut self, now: Duration) {
        self.focused = false;
        if is_blank(&self.value) {
            self.styled = false;
            self.expanded = false;
        }
        let due = now + self.hint_hide_delay;
        let index = self.hint_hides.partition_point(|pending| *pending <= due);
        self.hint_hides.insert(index, due);
    }

    pub fn input(&mut self, text: &str, has_results: bool) {
        self.value = text.to_string();
        if !is_blank(&self.value) {
            self.clear_hint_visible = true;
        } else if !has_results {
            self.clear_hint_visible = false;
        }
    }

    pub fn key(&mut self, key: Key) -> BoxAction {
        match key {
            Key::Enter => {
                let term = self.value.trim();
                if term.is_empty() {
                    BoxAction::None
                } else {
                    BoxAction::Search(term.to_string())
                }
            }
            Key::Escape => {
                self.value.clear();
                self.clear_hint_visible = false;
                self.styled = false;
                BoxAction::Clear
            }
        }
    }

    pub fn click_clear_hint(&mut self) -> BoxAction {
        self.value.clear();
        self.clear_hint_visible = false;
        self.focused = true;
        self.styled = true;
        self.expanded = true;
        BoxAction::Clear
    }

    pub fn search_completed(&mut self, match_count: usize) {
        if match_count > 0 {
            self.clear_hint_visible = true;
        }
    }

    /// Applies every due hint hide. Returns true when the hint was hidden.
    pub fn tick(&mut self, now: Duration) -> bool {
        let mut hidden = false;
        while self.hint_hides.front().is_some_and(|due| *due <= now) {
            self.hint_hides.pop_front();
            hidden |= self.clear_hint_visible;
            self.clear_hint_visible = false;
        }
        hidden
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.hint_hides.front().copied()
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
