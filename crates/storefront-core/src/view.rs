// View binding: the vocabulary a page uses to update what the user sees.
//
// The workflow never looks up UI elements. It emits `UiUpdate` values through
// the `View` trait; a front-end turns them into pixels, and tests apply them
// to the in-memory `ViewState`.

use std::collections::{HashMap, HashSet};

use crate::theme::ThemeToken;

// ---------------------------------------------------------------------------
// Logical elements
// ---------------------------------------------------------------------------

/// Read-only display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ItemName,
    ItemDescription,
    ItemPrice,
    ItemServer,
    Seller,
    ItemImage,
    /// Sell page: "Игра: ... | Сервер: ..." line.
    ContextInfo,
}

/// Blocks whose visibility depends on the loaded context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    ServerDetails,
    ContextInfo,
}

/// The three mutually exclusive modal presentations.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Confirmation,
    Success { title: String, message: String },
    Error { title: String, message: String },
}

/// State of the page's single primary action control.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionView {
    pub enabled: bool,
    pub label: String,
}

/// Description character counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterView {
    pub text: String,
    pub warning: bool,
}

// ---------------------------------------------------------------------------
// UiUpdate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Field(Field, String),
    SectionVisible(Section, bool),
    Action(ActionView),
    /// Show a modal, replacing any visible one; `None` hides all modals.
    Modal(Option<Modal>),
    Counter(CounterView),
    ThemeVar(ThemeToken, String),
    /// Inline notice shown above the action (load problems).
    Notice(Option<String>),
    /// Remove the loading skeleton.
    LoadingFinished,
}

/// Sink for view updates.
pub trait View: Send {
    fn apply(&mut self, update: UiUpdate);
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// In-memory page model. Front-ends render from it; tests assert on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub fields: HashMap<Field, String>,
    pub visible_sections: HashSet<Section>,
    pub action: ActionView,
    pub modal: Option<Modal>,
    pub counter: Option<CounterView>,
    pub theme: HashMap<ThemeToken, String>,
    pub notice: Option<String>,
    pub loading: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            fields: HashMap::new(),
            visible_sections: HashSet::new(),
            action: ActionView {
                enabled: false,
                label: String::new(),
            },
            modal: None,
            counter: None,
            theme: HashMap::new(),
            notice: None,
            loading: true,
        }
    }
}

impl ViewState {
    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_visible(&self, section: Section) -> bool {
        self.visible_sections.contains(&section)
    }

    /// Resolved theme value, falling back to the token default before the
    /// first mirror.
    pub fn theme_value(&self, token: ThemeToken) -> &str {
        self.theme
            .get(&token)
            .map(String::as_str)
            .unwrap_or_else(|| token.default_value())
    }
}

impl View for ViewState {
    fn apply(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Field(field, text) => {
                self.fields.insert(field, text);
            }
            UiUpdate::SectionVisible(section, true) => {
                self.visible_sections.insert(section);
            }
            UiUpdate::SectionVisible(section, false) => {
                self.visible_sections.remove(&section);
            }
            UiUpdate::Action(action) => self.action = action,
            UiUpdate::Modal(modal) => self.modal = modal,
            UiUpdate::Counter(counter) => self.counter = Some(counter),
            UiUpdate::ThemeVar(token, value) => {
                self.theme.insert(token, value);
            }
            UiUpdate::Notice(notice) => self.notice = notice,
            UiUpdate::LoadingFinished => self.loading = false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
