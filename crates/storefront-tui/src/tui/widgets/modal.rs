// Modal overlays: purchase confirmation, success, error, host alert.
//
// Rendered centered on top of the page. At most one page modal is visible;
// a host alert draws over everything.

use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use storefront_core::view::{Field, Modal, ViewState};

use super::Palette;

const DIALOG_WIDTH: u16 = 52;
const DIALOG_HEIGHT: u16 = 7;

pub const CONFIRM_TITLE: &str = "Подтверждение";

pub fn render(frame: &mut Frame, area: Rect, modal: &Modal, view: &ViewState, palette: &Palette) {
    match modal {
        Modal::Confirmation => {
            let lines = vec![
                Line::from(confirmation_text(view)),
                Line::default(),
                Line::from(vec![
                    Span::raw("("),
                    Span::styled(
                        "y",
                        Style::default()
                            .fg(palette.button)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("/"),
                    Span::styled(
                        "n",
                        Style::default()
                            .fg(palette.warning)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(")"),
                ]),
            ];
            render_dialog(frame, area, CONFIRM_TITLE, lines, palette.button, palette);
        }
        Modal::Success { title, message } => {
            let lines = vec![Line::from(message.clone()), Line::default(), Line::from("[ OK ]")];
            render_dialog(frame, area, title, lines, palette.button, palette);
        }
        Modal::Error { title, message } => {
            let lines = vec![
                Line::from(message.clone()),
                Line::default(),
                Line::from("[ Закрыть ]"),
            ];
            render_dialog(frame, area, title, lines, palette.warning, palette);
        }
    }
}

/// Host-owned alert, drawn over any page modal.
pub fn render_alert(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let lines = vec![Line::from(message.to_string()), Line::default(), Line::from("[ OK ]")];
    render_dialog(frame, area, "", lines, palette.hint, palette);
}

/// "Подтвердить покупку <name> за <price>?" from the rendered item fields.
pub fn confirmation_text(view: &ViewState) -> String {
    let name = view.field(Field::ItemName).unwrap_or("товара");
    match view.field(Field::ItemPrice) {
        Some(price) => format!("Подтвердить покупку «{name}» за {price}?"),
        None => format!("Подтвердить покупку «{name}»?"),
    }
}

fn render_dialog(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
    accent: Color,
    palette: &Palette,
) {
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));
    if !title.is_empty() {
        block = block.title(Span::styled(
            format!(" {title} "),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(palette.text).bg(palette.card));
    frame.render_widget(paragraph, dialog_area);
}

/// Compute a centered rectangle of the given size within `area`.
///
/// If the area is too small, the dialog is clamped to the available space.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use storefront_core::view::{UiUpdate, View};

    fn draw_with(f: impl FnOnce(&mut Frame, &Palette)) -> String {
        let palette = Palette::from_view(&ViewState::default(), "#ff4d4d");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| f(frame, &palette)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn centered_rect_is_centered() {
        let result = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, Rect::new(0, 0, 80, 24));
        assert_eq!(result.width, DIALOG_WIDTH);
        assert_eq!(result.height, DIALOG_HEIGHT);
        assert!((result.x as i32 - 14).abs() <= 1);
        assert!((result.y as i32 - 8).abs() <= 1);
    }

    #[test]
    fn centered_rect_clamps_to_small_area() {
        let result = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, Rect::new(0, 0, 20, 4));
        assert_eq!(result.width, 20);
        assert_eq!(result.height, 4);
    }

    #[test]
    fn confirmation_text_uses_item_fields() {
        let mut view = ViewState::default();
        assert_eq!(confirmation_text(&view), "Подтвердить покупку «товара»?");
        view.apply(UiUpdate::Field(Field::ItemName, "Меч".into()));
        view.apply(UiUpdate::Field(Field::ItemPrice, "150 ₽".into()));
        assert_eq!(confirmation_text(&view), "Подтвердить покупку «Меч» за 150 ₽?");
    }

    #[test]
    fn error_modal_shows_title_and_message() {
        let modal = Modal::Error {
            title: "Ошибка".into(),
            message: "Товар уже продан".into(),
        };
        let text = draw_with(|frame, palette| {
            render(frame, frame.area(), &modal, &ViewState::default(), palette)
        });
        assert!(text.contains("Ошибка"));
        assert!(text.contains("Товар уже продан"));
    }

    #[test]
    fn alert_renders_message() {
        let text = draw_with(|frame, palette| {
            render_alert(frame, frame.area(), "Пожалуйста, заполните все поля.", palette)
        });
        assert!(text.contains("заполните все поля."));
    }
}
