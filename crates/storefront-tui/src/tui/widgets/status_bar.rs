// Status bar and help bar: page title, last host signal, key hints.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use storefront_core::page::PageKind;
use storefront_core::view::Modal;

use super::Palette;
use crate::tui::ScreenState;

/// Render the status bar into the given area.
///
/// Layout: [page title] | [last host signal]
pub fn render(frame: &mut Frame, area: Rect, state: &ScreenState, palette: &Palette) {
    let mut spans = vec![Span::styled(
        format!(" {} ", page_title(state.kind)),
        Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(signal) = &state.last_signal {
        spans.push(Span::styled(" | ", Style::default().fg(palette.hint)));
        spans.push(Span::styled(signal.clone(), Style::default().fg(palette.hint)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.card));
    frame.render_widget(paragraph, area);
}

/// Render context-dependent key hints.
pub fn render_help(frame: &mut Frame, area: Rect, state: &ScreenState, palette: &Palette) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default().fg(palette.hint),
    )));
    frame.render_widget(paragraph, area);
}

pub fn page_title(kind: PageKind) -> &'static str {
    match kind {
        PageKind::Buy => "Покупка",
        PageKind::Sell => "Продажа",
    }
}

/// Key hints for whatever currently owns the keyboard.
pub fn help_text(state: &ScreenState) -> &'static str {
    if state.alert.is_some() {
        return " Enter:OK";
    }
    match (&state.page.modal, state.kind) {
        (Some(Modal::Confirmation), _) => " y/Enter:Подтвердить  n/Esc:Отмена",
        (Some(Modal::Success { .. }), _) => " Enter:OK",
        (Some(Modal::Error { .. }), _) => " Enter/Esc:Закрыть",
        (None, PageKind::Buy) => " Enter:Купить  F2:Тема  q/Esc:Выход",
        (None, PageKind::Sell) => " Tab/↑↓:Поле  Enter:Далее  F2:Тема  Esc:Выход",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn palette(state: &ScreenState) -> Palette {
        state.palette()
    }

    #[test]
    fn page_title_values() {
        assert_eq!(page_title(PageKind::Buy), "Покупка");
        assert_eq!(page_title(PageKind::Sell), "Продажа");
    }

    #[test]
    fn help_text_follows_modal() {
        let mut state = ScreenState::new(PageKind::Buy, "#ff4d4d");
        assert!(help_text(&state).contains("Купить"));

        state.page.modal = Some(Modal::Confirmation);
        assert!(help_text(&state).contains("Подтвердить"));

        state.alert = Some("x".into());
        assert_eq!(help_text(&state), " Enter:OK");
    }

    #[test]
    fn sell_help_mentions_field_navigation() {
        let state = ScreenState::new(PageKind::Sell, "#ff4d4d");
        assert!(help_text(&state).contains("Tab"));
    }

    #[test]
    fn render_shows_title_and_signal() {
        let mut state = ScreenState::new(PageKind::Sell, "#ff4d4d");
        state.last_signal = Some("impact: medium".into());
        let palette = palette(&state);

        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state, &palette))
            .unwrap();
        let line: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(line.contains("Продажа"));
        assert!(line.contains("impact: medium"));
    }
}
