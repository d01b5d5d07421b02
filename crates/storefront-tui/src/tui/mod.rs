// Terminal rendition of a Mini App page: layout, input handling, rendering.
//
// The page task pushes `TuiMessage`s over an mpsc channel; the TUI applies
// them to `ScreenState` and re-renders at ~30 fps. Key presses become
// `PageEvent`s sent back to the page task.

pub mod input;
pub mod layout;
pub mod widgets;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;
use storefront_core::host::HostBridge;
use storefront_core::page::PageKind;
use storefront_core::theme;
use storefront_core::view::{View, ViewState};
use storefront_core::workflow::{FormField, PageEvent};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::host::TerminalHost;
use crate::protocol::TuiMessage;
use layout::build_layout;
use widgets::{action_button, item_card, listing_form, modal, status_bar, Palette};

// ---------------------------------------------------------------------------
// Focus and form inputs
// ---------------------------------------------------------------------------

/// Focusable controls on the sell page, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Description,
    Price,
    Submit,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Name, Focus::Description, Focus::Price, Focus::Submit];

    pub fn next(self) -> Focus {
        let i = Self::ORDER.iter().position(|&f| f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Focus {
        let i = Self::ORDER.iter().position(|&f| f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// The form field behind this control, if it is a text input.
    pub fn form_field(self) -> Option<FormField> {
        match self {
            Focus::Name => Some(FormField::Name),
            Focus::Description => Some(FormField::Description),
            Focus::Price => Some(FormField::Price),
            Focus::Submit => None,
        }
    }
}

/// Text typed into the sell form, kept locally for editing and display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl FormInputs {
    pub fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Description => &mut self.description,
            FormField::Price => &mut self.price,
        }
    }
}

// ---------------------------------------------------------------------------
// ScreenState
// ---------------------------------------------------------------------------

/// Everything the render loop draws from.
pub struct ScreenState {
    pub kind: PageKind,
    /// Page model, updated by the workflow.
    pub page: ViewState,
    pub focus: Focus,
    pub inputs: FormInputs,
    /// Host alert awaiting dismissal.
    pub alert: Option<String>,
    /// Last haptic or bridge activity, shown in the status bar.
    pub last_signal: Option<String>,
    /// Counter color when the description is over its limit.
    pub warning_color: String,
    pub closed: bool,
}

impl ScreenState {
    pub fn new(kind: PageKind, warning_color: &str) -> Self {
        ScreenState {
            kind,
            page: ViewState::default(),
            focus: Focus::Name,
            inputs: FormInputs::default(),
            alert: None,
            last_signal: None,
            warning_color: warning_color.to_string(),
            closed: false,
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::from_view(&self.page, &self.warning_color)
    }
}

/// Apply a single message from the page task.
fn apply_message(state: &mut ScreenState, message: TuiMessage) {
    match message {
        TuiMessage::View(update) => state.page.apply(update),
        TuiMessage::Signal(signal) => state.last_signal = Some(signal),
        TuiMessage::Alert(message) => state.alert = Some(message),
        TuiMessage::Closed => state.closed = true,
    }
}

/// Flip the host theme. The workflow re-mirrors the six theme tokens on
/// `ThemeChanged`; the warning color is the screen's own and is re-read here.
fn toggle_host_theme(host: &TerminalHost, state: &mut ScreenState) {
    host.toggle_theme();
    state.warning_color = theme::warning_color(&host.theme_params()).to_string();
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ScreenState) {
    let palette = state.palette();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    let layout = build_layout(area);
    status_bar::render(frame, layout.status_bar, state, &palette);
    render_notice(frame, layout.notice, state, &palette);

    if state.page.loading {
        frame.render_widget(
            Paragraph::new(Span::styled("Загрузка...", Style::default().fg(palette.hint))),
            layout.body,
        );
    } else {
        match state.kind {
            PageKind::Buy => item_card::render(frame, layout.body, &state.page, &palette),
            PageKind::Sell => listing_form::render(frame, layout.body, state, &palette),
        }
    }

    let focused = state.kind == PageKind::Sell && state.focus == Focus::Submit;
    action_button::render(frame, layout.action, &state.page.action, focused, &palette);
    status_bar::render_help(frame, layout.help_bar, state, &palette);

    if let Some(page_modal) = &state.page.modal {
        modal::render(frame, area, page_modal, &state.page, &palette);
    }
    if let Some(message) = &state.alert {
        modal::render_alert(frame, area, message, &palette);
    }
}

fn render_notice(frame: &mut Frame, area: ratatui::layout::Rect, state: &ScreenState, palette: &Palette) {
    if let Some(notice) = &state.page.notice {
        let line = Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(palette.warning),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the page closes or the user quits.
///
/// 1. Initializes the terminal and installs a panic hook that restores it.
/// 2. Runs an async select loop: page messages, keyboard input, render ticks.
/// 3. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::UnboundedReceiver<TuiMessage>,
    events_tx: mpsc::Sender<PageEvent>,
    host: Arc<TerminalHost>,
    mut state: ScreenState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // Messages from the page task
            message = ui_rx.recv() => {
                match message {
                    Some(message) => {
                        apply_message(&mut state, message);
                        if state.closed {
                            terminal.draw(|frame| render_frame(frame, &state))?;
                            info!("page closed by host");
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        let Some(event) = input::handle_key(key_event, &mut state) else {
                            continue;
                        };
                        if event == PageEvent::ThemeChanged {
                            toggle_host_theme(&host, &mut state);
                        }
                        let quit = event == PageEvent::Quit;
                        if events_tx.send(event).await.is_err() {
                            debug!("page task gone");
                            break;
                        }
                        if quit {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => {
                        let _ = events_tx.send(PageEvent::Quit).await;
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
