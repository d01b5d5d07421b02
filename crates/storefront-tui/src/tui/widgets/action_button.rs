// The page's primary action rendered as a bordered button.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use storefront_core::view::ActionView;

use super::Palette;

pub fn render(frame: &mut Frame, area: Rect, action: &ActionView, focused: bool, palette: &Palette) {
    let paragraph = Paragraph::new(action.label.clone())
        .alignment(Alignment::Center)
        .style(button_style(action, palette))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused, palette)),
        );
    frame.render_widget(paragraph, area);
}

/// Disabled buttons keep the label but drop the button colors.
pub fn button_style(action: &ActionView, palette: &Palette) -> Style {
    if action.enabled {
        Style::default()
            .fg(palette.button_text)
            .bg(palette.button)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(palette.hint)
            .add_modifier(Modifier::DIM)
    }
}

fn border_style(focused: bool, palette: &Palette) -> Style {
    if focused {
        Style::default().fg(palette.button).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.hint)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
