//! Terminal-independent application state.
//!
//! [`App`] owns every piece of view state and turns input (keys, clicks,
//! timer ticks, API outcomes) into state changes plus [`Effect`]s for the
//! event loop to carry out. It never touches the network or the terminal,
//! which keeps the whole search flow testable with a fake clock.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

use crate::model::SearchResult;
use crate::search::detail::{DetailResolver, DetailState, FetchTicket};
use crate::search::dispatch::ApiEvent;
use crate::search::orchestrator::{
    Completion, RequestSequence, SearchOrchestrator, SearchTicket,
};
use crate::search::query_sync::QuerySync;
use crate::ui::components::theme::ThemePreset;
use crate::ui::data::Focus;
use crate::ui::keys::{KeyAction, KeyListeners, ListenerGuard};
use crate::ui::layout::{OverlayHit, overlay_hit};
use crate::ui::list::ResultList;
use crate::ui::route::{History, Route};

/// Work the event loop performs on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Search(SearchTicket),
    Fetch(FetchTicket),
    CancelFetch,
    OpenUrl(String),
}

/// The mounted detail overlay.
#[derive(Debug)]
pub struct DetailView {
    id: String,
    resolver: DetailResolver,
    scroll: u16,
    _escape: ListenerGuard,
}

impl DetailView {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &DetailState {
        self.resolver.state()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }
}

#[derive(Debug)]
pub struct App {
    sync: QuerySync,
    search: SearchOrchestrator,
    history: History,
    list: ResultList,
    focus: Focus,
    detail: Option<DetailView>,
    fetches: RequestSequence,
    keys: KeyListeners,
    theme: ThemePreset,
    status: String,
    should_quit: bool,
}

impl App {
    /// Build the app at `start` and return the effects of mounting it: the
    /// search for a query carried in the route and, for a detail deep link,
    /// the single-result fetch.
    pub fn new(
        start: Route,
        search_delay: Duration,
        route_delay: Duration,
        theme: ThemePreset,
    ) -> (Self, Vec<Effect>) {
        let history = History::new(start);
        let initial = history.search_query().unwrap_or_default().to_string();
        let mut app = Self {
            sync: QuerySync::new(&initial, search_delay, route_delay),
            search: SearchOrchestrator::new(),
            history,
            list: ResultList::default(),
            focus: Focus::Query,
            detail: None,
            fetches: RequestSequence::default(),
            keys: KeyListeners::new(),
            theme,
            status: String::new(),
            should_quit: false,
        };

        let mut effects = Vec::new();
        if let Some(query) = app.sync.initial_search() {
            app.issue_search(&query, &mut effects);
        }
        app.sync_route(&mut effects);
        (app, effects)
    }

    pub fn query(&self) -> &str {
        self.sync.query()
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    pub fn list(&self) -> &ResultList {
        &self.list
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn route(&self) -> &Route {
        self.history.current()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn theme(&self) -> ThemePreset {
        self.theme
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Live key subscriptions (the overlay's Esc while it is mounted).
    pub fn key_listeners(&self) -> usize {
        self.keys.len()
    }

    /// Earliest pending timer, for the event loop's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sync.next_deadline()
    }

    /// Fire due timers: debounced searches and route writes.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        let fired = self.sync.poll(now);
        if let Some(query) = fired.search {
            self.issue_search(&query, &mut effects);
        }
        if let Some(write) = fired.route {
            self.history.set_search_query(write.into_query());
            debug!(route = %self.history.current(), "route_query_written");
        }
        effects
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        if key.kind == KeyEventKind::Release {
            return effects;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return effects;
        }
        if let Some(action) = self.keys.dispatch(&key) {
            match action {
                KeyAction::NavigateBack => self.navigate_back(&mut effects),
            }
            return effects;
        }
        if key.code == KeyCode::F(2) {
            self.theme = self.theme.toggled();
            self.status = format!("Theme: {}", self.theme.name());
            return effects;
        }
        if self.detail.is_some() {
            self.on_detail_key(key, &mut effects);
            return effects;
        }
        match self.focus {
            Focus::Query => self.on_query_key(key, now, &mut effects),
            Focus::Results => self.on_results_key(key, &mut effects),
        }
        effects
    }

    /// A left click at `pos`; `overlay` is where the detail overlay is drawn.
    pub fn on_click(&mut self, pos: Position, overlay: Rect) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.detail.is_none() {
            return effects;
        }
        match overlay_hit(overlay, pos) {
            OverlayHit::Close | OverlayHit::Backdrop => self.navigate_back(&mut effects),
            OverlayHit::Content => {}
        }
        effects
    }

    /// A click on list row `idx`.
    pub fn select_result(&mut self, idx: usize) {
        let len = self.search.results().len();
        if self.detail.is_none() && idx < len {
            self.list.select(idx, len);
            self.focus = Focus::Results;
        }
    }

    pub fn on_api_event(&mut self, event: ApiEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            ApiEvent::Search { ticket, outcome } => {
                if self.search.finish(&ticket, outcome) == Completion::Applied {
                    let results = self.search.results();
                    self.list.sync(results);
                    self.status = match self.search.error() {
                        Some(_) => String::new(),
                        None => format!("{} results for \"{}\"", results.len(), ticket.query),
                    };
                    self.sync_route(&mut effects);
                }
            }
            ApiEvent::Detail { ticket, outcome } => {
                if let Some(view) = self.detail.as_mut()
                    && view.resolver.complete(&ticket, outcome)
                {
                    view.scroll = 0;
                }
            }
        }
        effects
    }

    /// Drop pending timers and unmount the overlay.
    pub fn teardown(&mut self) {
        self.sync.cancel_pending();
        self.detail = None;
    }

    fn on_query_key(&mut self, key: KeyEvent, now: Instant, effects: &mut Vec<Effect>) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => self.sync.set_query("", now),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                let mut next = self.sync.query().to_string();
                next.push(c);
                self.sync.set_query(next, now);
            }
            KeyCode::Backspace => {
                let mut next = self.sync.query().to_string();
                if next.pop().is_some() {
                    self.sync.set_query(next, now);
                }
            }
            KeyCode::Enter => self.submit(effects),
            KeyCode::Down | KeyCode::Tab => {
                if !self.search.results().is_empty() {
                    self.focus = Focus::Results;
                }
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent, effects: &mut Vec<Effect>) {
        let len = self.search.results().len();
        match key.code {
            KeyCode::Down => self.list.select_next(len),
            KeyCode::Up => {
                if self.list.selected() == 0 {
                    self.focus = Focus::Query;
                } else {
                    self.list.select_prev();
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected().map(|r| r.id.clone()) {
                    self.list.toggle(&id);
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected().map(|r| r.id.clone()) {
                    self.history.push(Route::result(id));
                    self.sync_route(effects);
                }
            }
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('/') => self.focus = Focus::Query,
            _ => {}
        }
    }

    fn on_detail_key(&mut self, key: KeyEvent, effects: &mut Vec<Effect>) {
        let Some(view) = self.detail.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Down => view.scroll = view.scroll.saturating_add(1),
            KeyCode::Up => view.scroll = view.scroll.saturating_sub(1),
            KeyCode::PageDown => view.scroll = view.scroll.saturating_add(10),
            KeyCode::PageUp => view.scroll = view.scroll.saturating_sub(10),
            KeyCode::Char('o') => {
                if let Some(result) = view.resolver.result()
                    && !result.url.is_empty()
                {
                    effects.push(Effect::OpenUrl(result.url.clone()));
                }
            }
            _ => {}
        }
    }

    fn selected(&self) -> Option<&SearchResult> {
        self.list.selected_result(self.search.results())
    }

    /// Explicit submit: run the pending search now instead of waiting out
    /// the debounce, or search the current query again when nothing is
    /// pending. Ignored while a search is in flight.
    fn submit(&mut self, effects: &mut Vec<Effect>) {
        if self.search.is_loading() {
            self.status = "Search in progress".to_string();
            return;
        }
        if let Some(query) = self
            .sync
            .flush_search()
            .or_else(|| self.sync.current_search())
        {
            self.issue_search(&query, effects);
        }
    }

    fn issue_search(&mut self, query: &str, effects: &mut Vec<Effect>) {
        if let Some(ticket) = self.search.begin(query) {
            effects.push(Effect::Search(ticket));
        }
    }

    fn navigate_back(&mut self, effects: &mut Vec<Effect>) {
        if !self.history.can_go_back() {
            let query = Some(self.sync.query().to_string()).filter(|q| !q.is_empty());
            self.history.set_search_query(query);
        }
        self.history.back();
        info!(route = %self.history.current(), "navigate_back");
        self.sync_route(effects);
    }

    /// Mount, update, or unmount the overlay to match the current route.
    fn sync_route(&mut self, effects: &mut Vec<Effect>) {
        let Some(id) = self.history.current().result_id().map(str::to_string) else {
            if let Some(view) = self.detail.take()
                && view.state() == &DetailState::Loading
            {
                effects.push(Effect::CancelFetch);
            }
            return;
        };

        let keys = &self.keys;
        let view = self.detail.get_or_insert_with(|| DetailView {
            id: id.clone(),
            resolver: DetailResolver::new(),
            scroll: 0,
            _escape: keys.subscribe(KeyCode::Esc, KeyAction::NavigateBack),
        });
        if view.id != id {
            view.id = id.clone();
            view.scroll = 0;
        }
        if let Some(ticket) = view
            .resolver
            .resolve(&id, self.search.results(), &mut self.fetches)
        {
            effects.push(Effect::Fetch(ticket));
        }
    }
}
