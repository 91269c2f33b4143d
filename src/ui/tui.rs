//! Ratatui front end: terminal setup, the event loop, and rendering.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::TestBackend;
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::api::{HttpSearchApi, SearchApi};
use crate::config::PatchyConfig;
use crate::model::SearchResult;
use crate::search::detail::{DetailSource, DetailState};
use crate::search::dispatch::{ApiDispatcher, ApiEvent};
use crate::search::query_sync::{MIN_QUERY_CHARS, is_searchable};
use crate::ui::app::{App, DetailView, Effect};
use crate::ui::components::theme::{ThemePalette, kbd_style};
use crate::ui::data::{Focus, TuiStatePersisted, load_state, save_state, state_path_for};
use crate::ui::highlight::highlight_ranges;
use crate::ui::layout::{CLOSE_LABEL, close_button_rect, overlay_rect, search_areas};
use crate::ui::list::{COLLAPSED_LINES, toggle_label};
use crate::ui::markup;
use crate::ui::route::Route;
use crate::ui::shortcuts;

/// Upper bound on how long the loop sleeps before checking for API events.
const TICK: Duration = Duration::from_millis(50);

/// Footer legend for the current context.
pub fn footer_legend(focus: Focus, overlay_open: bool) -> String {
    let pairs: &[(&str, &str)] = if overlay_open {
        &[
            (shortcuts::DETAIL_CLOSE, "close"),
            (shortcuts::SCROLL, "scroll"),
            (shortcuts::OPEN_SOURCE, "open source"),
            (shortcuts::THEME, "theme"),
        ]
    } else {
        match focus {
            Focus::Query => &[
                (shortcuts::SUBMIT, "search"),
                (shortcuts::FOCUS_RESULTS, "results"),
                (shortcuts::CLEAR_QUERY, "clear"),
                (shortcuts::THEME, "theme"),
                (shortcuts::QUIT, "quit"),
            ],
            Focus::Results => &[
                (shortcuts::DETAIL_OPEN, "open"),
                (shortcuts::TOGGLE_EXPAND, "expand"),
                (shortcuts::FOCUS_QUERY, "search box"),
                (shortcuts::THEME, "theme"),
                (shortcuts::FORCE_QUIT, "quit"),
            ],
        }
    };
    pairs
        .iter()
        .map(|(key, what)| format!("{key} {what}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// One rendered line of result text, with backend emphasis and query
/// matches styled. Matches are found on the sanitized text, so a match may
/// span an emphasis boundary.
fn styled_line(pieces: &[(String, bool)], query: &str, palette: ThemePalette) -> Line<'static> {
    let plain: String = pieces.iter().map(|(t, _)| t.as_str()).collect();
    let matches = highlight_ranges(&plain, query);

    let mut cuts: Vec<usize> = vec![0, plain.len()];
    let mut offset = 0;
    let mut emphasis_at = Vec::with_capacity(pieces.len());
    for (text, emphasis) in pieces {
        emphasis_at.push((offset..offset + text.len(), *emphasis));
        offset += text.len();
        cuts.push(offset);
    }
    for m in &matches {
        cuts.push(m.start);
        cuts.push(m.end);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let spans = cuts
        .windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| {
            let matched = matches.iter().any(|m| m.contains(&w[0]));
            let emphasis = emphasis_at
                .iter()
                .any(|(range, emph)| *emph && range.contains(&w[0]));
            let style = if matched {
                palette.highlight_style()
            } else if emphasis {
                palette.emphasis_style()
            } else {
                palette.text()
            };
            Span::styled(plain[w[0]..w[1]].to_string(), style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Result text as styled lines.
pub fn result_lines(raw: &str, query: &str, palette: ThemePalette) -> Vec<Line<'static>> {
    let mut lines: Vec<Vec<(String, bool)>> = vec![Vec::new()];
    for segment in markup::parse(raw) {
        for (i, part) in segment.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if !part.is_empty()
                && let Some(line) = lines.last_mut()
            {
                line.push((part.trim_end_matches('\r').to_string(), segment.emphasis));
            }
        }
    }
    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
        .iter()
        .map(|pieces| styled_line(pieces, query, palette))
        .collect()
}

fn result_item(
    result: &SearchResult,
    expanded: bool,
    query: &str,
    palette: ThemePalette,
) -> ListItem<'static> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("#{}", markup::strip_controls(&result.id)),
            palette.title(),
        ),
        Span::raw("  "),
        Span::styled(markup::strip_controls(&result.url), palette.hint_style()),
    ])];
    let mut body = result_lines(&result.text, query, palette);
    if !expanded {
        body.truncate(COLLAPSED_LINES);
    }
    lines.extend(body);
    if let Some(label) = toggle_label(result, expanded) {
        lines.push(Line::from(Span::styled(
            format!("[{}] {label}", shortcuts::TOGGLE_EXPAND),
            kbd_style(palette),
        )));
    }
    ListItem::new(lines)
}

/// Screen rows occupied by each visible list item, recorded while drawing so
/// clicks map back to result indices.
#[derive(Debug, Default)]
pub struct ListHits {
    rows: Vec<(u16, u16, usize)>,
}

impl ListHits {
    pub fn index_at(&self, row: u16) -> Option<usize> {
        self.rows
            .iter()
            .find(|(top, height, _)| row >= *top && row < top.saturating_add(*height))
            .map(|(_, _, idx)| *idx)
    }
}

/// Draw one frame of `app`.
pub fn draw(f: &mut Frame, app: &App, list_state: &mut ListState, hits: &mut ListHits) {
    let palette = app.theme().to_palette();
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(palette.bg)), area);
    let areas = search_areas(area);
    let query = app.query().trim();
    let search = app.search();

    // Header: title, route, status.
    let header = Line::from(vec![
        Span::styled("patchy", palette.title()),
        Span::raw("  "),
        Span::styled(app.route().to_string(), palette.hint_style()),
        Span::raw("  "),
        Span::styled(app.status().to_string(), palette.text()),
    ]);
    f.render_widget(Paragraph::new(header), areas.header);

    // Search box with its submit affordance.
    let query_focused = app.focus() == Focus::Query && app.detail().is_none();
    let (submit_label, submit_style) = if search.is_loading() {
        ("Searching...", palette.disabled_style())
    } else {
        ("Search", kbd_style(palette))
    };
    let box_block = Block::default()
        .title(Span::styled("Search", palette.title()))
        .title_bottom(
            Line::from(Span::styled(format!("[ {submit_label} ]"), submit_style))
                .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(if query_focused {
            palette.border_focus_style()
        } else {
            palette.border_style()
        });
    let input = if app.query().is_empty() {
        Span::styled("Search patches...", palette.hint_style())
    } else {
        Span::styled(app.query().to_string(), palette.text())
    };
    f.render_widget(
        Paragraph::new(Line::from(input))
            .block(box_block)
            .style(palette.surface_style()),
        areas.search_box,
    );
    if query_focused {
        let width = app.query().chars().count() as u16;
        let inner_right = areas.search_box.x + areas.search_box.width.saturating_sub(2);
        f.set_cursor_position(Position::new(
            (areas.search_box.x + 1 + width).min(inner_right),
            areas.search_box.y + 1,
        ));
    }

    // Error line, or a hint while the query is below the threshold.
    let notice = match search.error() {
        Some(err) => Span::styled(err.to_string(), palette.error_style()),
        None if !app.query().is_empty() && !is_searchable(app.query()) => Span::styled(
            format!("Type at least {MIN_QUERY_CHARS} characters to search"),
            palette.hint_style(),
        ),
        None => Span::raw(""),
    };
    f.render_widget(Paragraph::new(Line::from(notice)), areas.error);

    // Result list.
    let results = search.results();
    let list_block = Block::default()
        .title(Span::styled(
            format!("Results ({})", results.len()),
            palette.title(),
        ))
        .borders(Borders::ALL)
        .border_style(if app.focus() == Focus::Results {
            palette.border_focus_style()
        } else {
            palette.border_style()
        });
    hits.rows.clear();
    if results.is_empty() {
        let text = if search.is_loading() {
            "Searching..."
        } else if search.active_query().is_some() && search.error().is_none() {
            "No results"
        } else {
            ""
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, palette.hint_style())).block(list_block),
            areas.results,
        );
    } else {
        let items: Vec<ListItem> = results
            .items()
            .iter()
            .map(|r| result_item(r, app.list().is_expanded(&r.id), query, palette))
            .collect();
        let heights: Vec<u16> = items
            .iter()
            .map(|i| u16::try_from(i.height()).unwrap_or(u16::MAX))
            .collect();
        let inner = list_block.inner(areas.results);
        list_state.select(Some(app.list().selected()));
        let list = List::new(items)
            .block(list_block)
            .highlight_style(palette.selected_style());
        f.render_stateful_widget(list, areas.results, list_state);

        let mut top = inner.y;
        for (idx, height) in heights.iter().enumerate().skip(list_state.offset()) {
            if top >= inner.bottom() {
                break;
            }
            hits.rows.push((top, *height, idx));
            top = top.saturating_add(*height);
        }
    }

    // Footer legend.
    let footer = Line::from(Span::styled(
        footer_legend(app.focus(), app.detail().is_some()),
        palette.hint_style(),
    ));
    f.render_widget(Paragraph::new(footer), areas.footer);

    if let Some(view) = app.detail() {
        draw_detail(f, view, query, palette);
    }
}

fn draw_detail(f: &mut Frame, view: &DetailView, query: &str, palette: ThemePalette) {
    let popup = overlay_rect(f.area());
    let title = match view.state() {
        DetailState::Ready {
            source: DetailSource::Fetched,
            ..
        } => format!("Result {} (fetched)", markup::strip_controls(view.id())),
        _ => format!("Result {}", markup::strip_controls(view.id())),
    };
    let block = Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(palette.surface_style());

    let lines: Vec<Line> = match view.state() {
        DetailState::Empty | DetailState::Loading => {
            vec![Line::from(Span::styled("Loading...", palette.hint_style()))]
        }
        DetailState::Failed(msg) => {
            vec![Line::from(Span::styled(msg.clone(), palette.error_style()))]
        }
        DetailState::Ready { result, .. } => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Source: ", palette.hint_style()),
                    Span::styled(markup::strip_controls(&result.url), palette.text()),
                ]),
                Line::from(""),
            ];
            lines.extend(result_lines(&result.text, query, palette));
            lines
        }
    };

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((view.scroll(), 0)),
        popup,
    );
    f.render_widget(
        Paragraph::new(Span::styled(CLOSE_LABEL, kbd_style(palette))),
        close_button_rect(popup),
    );
}

pub fn open_in_browser(url: &str) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    Ok(())
}

fn apply_effects<A: SearchApi>(dispatcher: &mut ApiDispatcher<A>, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Search(ticket) => dispatcher.search(ticket),
            Effect::Fetch(ticket) => dispatcher.fetch(ticket),
            Effect::CancelFetch => dispatcher.cancel_fetch(),
            Effect::OpenUrl(url) => {
                if let Err(err) = open_in_browser(&url) {
                    warn!(url = %url, error = %err, "open_in_browser_failed");
                }
            }
        }
    }
}

/// Run the interactive client until the user quits.
///
/// Blocks the calling thread; API calls are spawned onto `runtime`.
pub fn run_tui(
    config: &PatchyConfig,
    start: Route,
    data_dir: &Path,
    once: bool,
    runtime: Handle,
) -> Result<()> {
    let api = Arc::new(HttpSearchApi::new(&config.api_base_url, config.http_timeout())?);
    let state_path = state_path_for(data_dir);
    let persisted = load_state(&state_path);

    let (mut app, effects) = App::new(
        start,
        config.search_debounce(),
        config.route_debounce(),
        persisted.theme(),
    );
    let (mut dispatcher, mut rx) = ApiDispatcher::new(api, runtime);
    apply_effects(&mut dispatcher, effects);
    info!(route = %app.route(), api = %config.api_base_url, "tui_start");

    if once {
        let mut terminal = Terminal::new(TestBackend::new(100, 30))?;
        terminal.draw(|f| draw(f, &app, &mut ListState::default(), &mut ListHits::default()))?;
        return Ok(());
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = event_loop(&mut terminal, &mut app, &mut dispatcher, &mut rx);

    app.teardown();
    dispatcher.cancel_all();
    save_state(
        &state_path,
        &TuiStatePersisted {
            theme: Some(app.theme().name().to_string()),
        },
    );
    teardown_terminal()?;
    outcome
}

fn event_loop<A: SearchApi>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &mut ApiDispatcher<A>,
    rx: &mut UnboundedReceiver<ApiEvent>,
) -> Result<()> {
    let mut list_state = ListState::default();
    let mut hits = ListHits::default();
    let mut frame_area = Rect::default();
    let mut needs_draw = true;

    loop {
        if needs_draw {
            terminal.draw(|f| {
                frame_area = f.area();
                draw(f, app, &mut list_state, &mut hits);
            })?;
            needs_draw = false;
        }

        while let Ok(event) = rx.try_recv() {
            let effects = app.on_api_event(event);
            apply_effects(dispatcher, effects);
            needs_draw = true;
        }

        let now = Instant::now();
        if app.next_deadline().is_some_and(|due| due <= now) {
            let effects = app.tick(now);
            apply_effects(dispatcher, effects);
            needs_draw = true;
        }

        let timeout = app
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(TICK)
            .min(TICK);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    let effects = app.on_key(key, Instant::now());
                    apply_effects(dispatcher, effects);
                    needs_draw = true;
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let pos = Position::new(mouse.column, mouse.row);
                    if app.detail().is_some() {
                        let effects = app.on_click(pos, overlay_rect(frame_area));
                        apply_effects(dispatcher, effects);
                    } else if search_areas(frame_area).results.contains(pos)
                        && let Some(idx) = hits.index_at(mouse.row)
                    {
                        app.select_result(idx);
                    }
                    needs_draw = true;
                }
                Event::Resize(_, _) => needs_draw = true,
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}
