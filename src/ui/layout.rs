//! Screen geometry shared by rendering and mouse hit-testing.

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Areas of the search view, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAreas {
    pub header: Rect,
    pub search_box: Rect,
    pub error: Rect,
    pub results: Rect,
    pub footer: Rect,
}

pub fn search_areas(area: Rect) -> SearchAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    SearchAreas {
        header: chunks[0],
        search_box: chunks[1],
        error: chunks[2],
        results: chunks[3],
        footer: chunks[4],
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// The detail overlay's content box; everything outside it is backdrop.
pub fn overlay_rect(area: Rect) -> Rect {
    centered_rect(80, 80, area)
}

pub const CLOSE_LABEL: &str = "[ Close ]";

/// The close affordance, drawn on the overlay's top border at the right.
pub fn close_button_rect(overlay: Rect) -> Rect {
    let width = (CLOSE_LABEL.len() as u16).min(overlay.width.saturating_sub(2));
    Rect {
        x: (overlay.x + overlay.width).saturating_sub(width + 1),
        y: overlay.y,
        width,
        height: if overlay.height > 0 { 1 } else { 0 },
    }
}

/// What a click landed on while the overlay is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayHit {
    Close,
    Content,
    Backdrop,
}

pub fn overlay_hit(overlay: Rect, pos: Position) -> OverlayHit {
    if close_button_rect(overlay).contains(pos) {
        OverlayHit::Close
    } else if overlay.contains(pos) {
        OverlayHit::Content
    } else {
        OverlayHit::Backdrop
    }
}
