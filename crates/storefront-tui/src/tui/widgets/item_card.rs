// Item card for the buy page: name, description, price, server, seller.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use storefront_core::view::{Field, Section, ViewState};

use super::Palette;

pub fn render(frame: &mut Frame, area: Rect, view: &ViewState, palette: &Palette) {
    let name = view.field(Field::ItemName).unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.hint))
        .title(Span::styled(
            format!(" {name} "),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(palette.card));

    let paragraph = Paragraph::new(card_lines(view, palette))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn card_lines(view: &ViewState, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(description) = view.field(Field::ItemDescription) {
        lines.push(Line::from(Span::styled(
            description.to_string(),
            Style::default().fg(palette.text),
        )));
        lines.push(Line::default());
    }

    lines.push(labelled("Цена", view.field(Field::ItemPrice), palette));
    if view.is_visible(Section::ServerDetails) {
        lines.push(labelled("Сервер", view.field(Field::ItemServer), palette));
    }
    lines.push(labelled("Продавец", view.field(Field::Seller), palette));

    // A terminal can't show the picture; show where it lives.
    if let Some(image) = view.field(Field::ItemImage) {
        lines.push(labelled("Изображение", Some(image), palette));
    }
    lines
}

fn labelled(label: &str, value: Option<&str>, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(palette.hint)),
        Span::styled(
            value.unwrap_or("-").to_string(),
            Style::default().fg(palette.text),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
