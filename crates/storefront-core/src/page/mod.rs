// Page bindings. One workflow serves both pages; a `PageProfile` carries the
// copy that differs between them, and `buy`/`sell` fill the view from the
// loaded context.

pub mod buy;
pub mod sell;

use crate::context::{ItemContext, ListingSeed, LoadError, QueryParams};

pub const SUCCESS_TITLE: &str = "Успешно!";
pub const ERROR_TITLE: &str = "Ошибка";

/// Success copy for the host bridge, which never learns whether the bot acted.
pub const BRIDGE_SUCCESS_MESSAGE: &str = "Запрос передан боту. Подтверждение придёт в чат.";

/// Shown when the item fetch fails and the page falls back to link data.
pub const FETCH_FAILED_NOTICE: &str = "Не удалось загрузить данные товара. Показаны данные из ссылки.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Buy,
    Sell,
}

/// Everything page-specific the workflow needs to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProfile {
    pub kind: PageKind,
    pub action_label: &'static str,
    pub busy_label: &'static str,
    pub blocked_label: &'static str,
    pub blocked_notice: &'static str,
    pub failure_fallback: &'static str,
    pub success_fallback: &'static str,
}

impl PageKind {
    pub fn profile(self) -> PageProfile {
        match self {
            PageKind::Buy => PageProfile {
                kind: self,
                action_label: "Купить",
                busy_label: "Обработка...",
                blocked_label: "Ошибка: Товар не найден",
                blocked_notice: "Не удалось определить товар для покупки.",
                failure_fallback: "Произошла неизвестная ошибка.",
                success_fallback: "Покупка успешно оформлена.",
            },
            PageKind::Sell => PageProfile {
                kind: self,
                action_label: "Выставить на продажу",
                busy_label: "Публикация...",
                blocked_label: "Ошибка: Игра не найдена",
                blocked_notice: "Не удалось определить игру для объявления.",
                failure_fallback: "Произошла ошибка при выставлении товара.",
                success_fallback: "Товар успешно выставлен на продажу.",
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageKind::Buy => "buy",
            PageKind::Sell => "sell",
        }
    }
}

/// Context a page acts on, loaded once.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContext {
    Item(ItemContext),
    Listing(ListingSeed),
}

/// Derive the page's context from its launch query.
pub fn load(kind: PageKind, query: &QueryParams) -> Result<PageContext, LoadError> {
    match kind {
        PageKind::Buy => ItemContext::from_query(query).map(PageContext::Item),
        PageKind::Sell => ListingSeed::from_query(query).map(PageContext::Listing),
    }
}
