// Screen layout: zone arrangement and sizing.
//
// +------------------------------------------+
// | Status Bar (1 row)                        |
// +------------------------------------------+
// | Notice (1 row)                            |
// +------------------------------------------+
// | Page Body (fill)                          |
// +------------------------------------------+
// | Action Button (3 rows)                    |
// +------------------------------------------+
// | Help Bar (1 row)                          |
// +------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each page zone.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Page title and the last host signal.
    pub status_bar: Rect,
    /// Load problems (missing identifier, failed fetch).
    pub notice: Rect,
    /// Item card or listing form.
    pub body: Rect,
    /// The page's single primary action.
    pub action: Rect,
    /// Keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the page layout from the available terminal area.
pub fn build_layout(area: Rect) -> PageLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // notice
            Constraint::Min(6),    // body
            Constraint::Length(3), // action button
            Constraint::Length(1), // help bar
        ])
        .split(area);

    PageLayout {
        status_bar: vertical[0],
        notice: vertical[1],
        body: vertical[2],
        action: vertical[3],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
