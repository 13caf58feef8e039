//! Picker application - key handling and state
//!
//! The App owns the index and re-runs the search engine on every filter
//! keystroke. It does no rendering; that's delegated to the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use templateindex::{TemplateIndex, TemplateRecord};

use crate::search::{SearchEngine, SearchOptions, SearchResult};

/// What keystrokes currently mean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
}

/// Picker state
pub struct App {
    index: TemplateIndex,
    engine: SearchEngine,
    /// Current ranked results, re-computed from `filter`
    pub results: Vec<SearchResult>,
    /// Selected row within `results`
    pub selected: usize,
    pub mode: InputMode,
    /// Live filter text (the `/` query)
    pub filter: String,
    pub should_quit: bool,
    /// Set when the user confirms a selection with Enter
    pub chosen: Option<TemplateRecord>,
}

impl App {
    pub fn new(index: TemplateIndex) -> Self {
        let mut app = Self {
            index,
            engine: SearchEngine::new(),
            results: Vec::new(),
            selected: 0,
            mode: InputMode::Normal,
            filter: String::new(),
            should_quit: false,
            chosen: None,
        };
        app.rerun_search();
        app
    }

    /// Re-run the engine with the current filter text
    fn rerun_search(&mut self) {
        let opts = SearchOptions {
            keyword: (!self.filter.is_empty()).then(|| self.filter.clone()),
            max_results: usize::MAX,
            ..Default::default()
        };
        self.results = self.engine.search(&self.index, &opts).results;
        if self.selected >= self.results.len() {
            self.selected = self.results.len().saturating_sub(1);
        }
    }

    /// The record under the cursor
    pub fn selected_record(&self) -> Option<&TemplateRecord> {
        self.results.get(self.selected).map(|r| &r.template)
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Filter => self.handle_filter_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                self.should_quit = true;
            }
            (KeyCode::Char('/'), _) => {
                self.mode = InputMode::Filter;
                self.filter.clear();
                self.rerun_search();
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.selected = self.selected.saturating_sub(1);
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                if self.selected + 1 < self.results.len() {
                    self.selected += 1;
                }
            }
            (KeyCode::Char('g'), _) => {
                self.selected = 0;
            }
            (KeyCode::Char('G'), _) => {
                self.selected = self.results.len().saturating_sub(1);
            }
            (KeyCode::Enter, _) => {
                self.chosen = self.selected_record().cloned();
                if self.chosen.is_some() {
                    self.should_quit = true;
                }
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.mode = InputMode::Normal;
                self.rerun_search();
            }
            KeyCode::Enter => {
                // Keep the filter, go back to navigation
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.rerun_search();
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.rerun_search();
            }
            _ => {}
        }
    }
}
