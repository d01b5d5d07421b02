// Context loading: turns a page's query string (or a fetched item record) into
// the immutable context the workflow renders and submits.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

pub const DEFAULT_ITEM_NAME: &str = "Название не найдено";
pub const DEFAULT_ITEM_DESCRIPTION: &str = "Описание не найдено.";
pub const DEFAULT_SELLER: &str = "Sacred Store";

const CURRENCY_SUFFIX: &str = "₽";
const GROUP_SEPARATOR: char = '\u{a0}';
const DECIMAL_SEPARATOR: char = ',';
const MAX_FRACTION_DIGITS: usize = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A mandatory identifier is absent; the page cannot act.
    #[error("missing required query parameter `{param}`")]
    MissingContext { param: &'static str },
}

// ---------------------------------------------------------------------------
// QueryParams
// ---------------------------------------------------------------------------

/// Decoded page query parameters, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a raw query. Accepts `a=1&b=2`, `?a=1&b=2`, or a full URL.
    pub fn parse(raw: &str) -> Self {
        let query = match raw.split_once('?') {
            Some((_, rest)) => rest,
            None => raw,
        };
        let query = query.split('#').next().unwrap_or_default();
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        QueryParams { pairs }
    }

    /// First value for `key`, like `URLSearchParams.get`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, treating an empty value as absent.
    pub fn get_present(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// Server hints arrive from a Python bot that stringifies `None`.
fn server_hint(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.is_empty() && *s != "None" && *s != "null")
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// ItemContext (buy page)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ItemContext {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub server: Option<String>,
    pub seller_handle: String,
    pub image: Option<String>,
}

impl ItemContext {
    pub fn from_query(query: &QueryParams) -> Result<Self, LoadError> {
        let id = query
            .get_present("itemId")
            .ok_or(LoadError::MissingContext { param: "itemId" })?;

        Ok(ItemContext {
            id: id.to_string(),
            name: query
                .get_present("name")
                .unwrap_or(DEFAULT_ITEM_NAME)
                .to_string(),
            description: query
                .get_present("description")
                .unwrap_or(DEFAULT_ITEM_DESCRIPTION)
                .to_string(),
            price: parse_js_float(query.get_present("price").unwrap_or("0")),
            server: server_hint(query.get("server")),
            seller_handle: query
                .get_present("seller")
                .unwrap_or(DEFAULT_SELLER)
                .to_string(),
            image: query.get_present("image").map(str::to_string),
        })
    }

    /// Overlay a fetched record. Fields the record leaves out keep their
    /// query-derived values.
    pub fn merge_record(mut self, record: ItemRecord) -> Self {
        if let Some(name) = record.name.filter(|s| !s.is_empty()) {
            self.name = name;
        }
        if let Some(description) = record.description.filter(|s| !s.is_empty()) {
            self.description = description;
        }
        if let Some(price) = record.price.as_ref().and_then(price_from_json) {
            self.price = price;
        }
        if record.server.is_some() {
            self.server = server_hint(record.server.as_deref());
        }
        if let Some(seller) = record.seller.filter(|s| !s.is_empty()) {
            self.seller_handle = seller;
        }
        if let Some(image) = record.image.filter(|s| !s.is_empty()) {
            self.image = Some(image);
        }
        self
    }

    pub fn formatted_price(&self) -> String {
        format_price(self.price)
    }

    pub fn seller_display(&self) -> String {
        format!("@{}", self.seller_handle)
    }
}

/// Item record returned by `GET {base}/items/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Number or numeric string, depending on the backend's serializer.
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

fn price_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(parse_js_float(s)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ListingSeed (sell page)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSeed {
    pub game_id: String,
    pub game_name: Option<String>,
    pub server: Option<String>,
}

impl ListingSeed {
    pub fn from_query(query: &QueryParams) -> Result<Self, LoadError> {
        let game_id = query
            .get_present("gameId")
            .ok_or(LoadError::MissingContext { param: "gameId" })?;
        Ok(ListingSeed {
            game_id: game_id.to_string(),
            game_name: query.get_present("gameName").map(str::to_string),
            server: server_hint(query.get("server")),
        })
    }

    /// Context line shown above the form; `None` when the game name is unknown.
    pub fn context_label(&self) -> Option<String> {
        let game_name = self.game_name.as_ref()?;
        let mut label = format!("Игра: {game_name}");
        if let Some(server) = &self.server {
            label.push_str(&format!(" | Сервер: {server}"));
        }
        Some(label)
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Parse the longest numeric prefix of `input` the way JavaScript's
/// `parseFloat` does. Returns NaN when there is no numeric prefix.
pub fn parse_js_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Format a price for display: `ru-RU` number formatting plus the ruble sign.
///
/// Integer digits are grouped in threes with a no-break space, the decimal
/// separator is a comma, and at most three fraction digits are kept with
/// trailing zeros dropped.
pub fn format_price(price: f64) -> String {
    format!("{} {CURRENCY_SUFFIX}", format_ru_number(price))
}

fn format_ru_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value.is_sign_negative() && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(frac_part);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
