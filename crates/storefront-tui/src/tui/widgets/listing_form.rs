// Listing form for the sell page: context line, three inputs, counter.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use storefront_core::view::{CounterView, Field, Section};

use super::Palette;
use crate::tui::{Focus, ScreenState};

const NAME_LABEL: &str = "Название";
const DESCRIPTION_LABEL: &str = "Описание";
const PRICE_LABEL: &str = "Цена, ₽";

pub fn render(frame: &mut Frame, area: Rect, state: &ScreenState, palette: &Palette) {
    let rows = Layout::vertical([
        Constraint::Length(1), // context line
        Constraint::Length(3), // name
        Constraint::Min(3),    // description
        Constraint::Length(1), // counter
        Constraint::Length(3), // price
    ])
    .split(area);

    if state.page.is_visible(Section::ContextInfo) {
        let info = state.page.field(Field::ContextInfo).unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {info}"),
                Style::default().fg(palette.hint),
            )),
            rows[0],
        );
    }

    let focused = |focus: Focus| state.focus == focus && state.page.modal.is_none();

    render_input(frame, rows[1], NAME_LABEL, &state.inputs.name, focused(Focus::Name), palette);
    render_input(
        frame,
        rows[2],
        DESCRIPTION_LABEL,
        &state.inputs.description,
        focused(Focus::Description),
        palette,
    );
    if let Some(counter) = &state.page.counter {
        frame.render_widget(
            Paragraph::new(Line::from(counter_span(counter, palette)).right_aligned()),
            rows[3],
        );
    }
    render_input(frame, rows[4], PRICE_LABEL, &state.inputs.price, focused(Focus::Price), palette);
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    palette: &Palette,
) {
    let border = if focused {
        Style::default().fg(palette.button).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.hint)
    };
    let text = if focused {
        format!("{value}▏")
    } else {
        value.to_string()
    };
    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(palette.text)))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {label} ")),
        );
    frame.render_widget(paragraph, area);
}

/// Counter text; over the limit it takes the warning color.
pub fn counter_span(counter: &CounterView, palette: &Palette) -> Span<'static> {
    let style = if counter.warning {
        Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.hint)
    };
    Span::styled(format!("{} ", counter.text), style)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
