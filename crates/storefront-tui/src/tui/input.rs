// Keyboard input handling.
//
// Translates crossterm key events into `PageEvent`s for the page task, or
// into local `ScreenState` changes (focus movement, alert dismissal). Typed
// characters update the local input copy and are also forwarded so the
// workflow's form stays in sync.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use storefront_core::page::PageKind;
use storefront_core::view::Modal;
use storefront_core::workflow::PageEvent;

use super::{Focus, ScreenState};

/// Handle a keyboard event.
///
/// Returns `Some(PageEvent)` when the key press should reach the workflow.
/// Returns `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, state: &mut ScreenState) -> Option<PageEvent> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(PageEvent::Quit);
    }

    // Host alert owns the keyboard until dismissed
    if state.alert.is_some() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.alert = None;
        }
        return None;
    }

    match &state.page.modal {
        Some(Modal::Confirmation) => return handle_confirmation(key_event),
        Some(Modal::Success { .. }) => {
            return match key_event.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(PageEvent::SuccessAcknowledged),
                _ => None,
            };
        }
        Some(Modal::Error { .. }) => {
            return match key_event.code {
                KeyCode::Enter | KeyCode::Esc => Some(PageEvent::ErrorDismissed),
                _ => None,
            };
        }
        None => {}
    }

    match key_event.code {
        KeyCode::Esc => return Some(PageEvent::Quit),
        KeyCode::F(2) => return Some(PageEvent::ThemeChanged),
        _ => {}
    }

    match state.kind {
        PageKind::Buy => match key_event.code {
            KeyCode::Enter => Some(PageEvent::ActionActivated),
            KeyCode::Char('q') => Some(PageEvent::Quit),
            _ => None,
        },
        PageKind::Sell => handle_sell_form(key_event, state),
    }
}

/// y/Enter confirm, n/Esc cancel, everything else blocked.
fn handle_confirmation(key_event: KeyEvent) -> Option<PageEvent> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            Some(PageEvent::ConfirmAccepted)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            Some(PageEvent::ConfirmCancelled)
        }
        _ => None,
    }
}

fn handle_sell_form(key_event: KeyEvent, state: &mut ScreenState) -> Option<PageEvent> {
    match key_event.code {
        KeyCode::Tab | KeyCode::Down => {
            state.focus = state.focus.next();
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus = state.focus.prev();
            None
        }
        KeyCode::Enter => match state.focus {
            Focus::Submit => Some(PageEvent::ActionActivated),
            focus => {
                state.focus = focus.next();
                None
            }
        },
        KeyCode::Backspace => {
            let field = state.focus.form_field()?;
            let input = state.inputs.get_mut(field);
            input.pop()?;
            Some(PageEvent::FieldChanged {
                field,
                value: input.clone(),
            })
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            let field = state.focus.form_field()?;
            let input = state.inputs.get_mut(field);
            input.push(c);
            Some(PageEvent::FieldChanged {
                field,
                value: input.clone(),
            })
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
