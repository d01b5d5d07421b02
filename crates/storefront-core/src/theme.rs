// Theme mirror: copies the host's color tokens into the view's style variables.

use crate::host::{HostBridge, ThemeParams};
use crate::view::{UiUpdate, View};

/// Fallback for the description counter's warning color when the host does
/// not define `destructive_text_color`.
pub const DEFAULT_WARNING_COLOR: &str = "#ff4d4d";

/// The fixed set of host color tokens a page mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeToken {
    Background,
    Text,
    Button,
    ButtonText,
    Hint,
    SecondaryBackground,
}

impl ThemeToken {
    pub const ALL: [ThemeToken; 6] = [
        ThemeToken::Background,
        ThemeToken::Text,
        ThemeToken::Button,
        ThemeToken::ButtonText,
        ThemeToken::Hint,
        ThemeToken::SecondaryBackground,
    ];

    /// Name of the style variable the token is mirrored into.
    pub fn css_var(self) -> &'static str {
        match self {
            ThemeToken::Background => "--tg-theme-bg-color",
            ThemeToken::Text => "--tg-theme-text-color",
            ThemeToken::Button => "--tg-theme-button-color",
            ThemeToken::ButtonText => "--tg-theme-button-text-color",
            ThemeToken::Hint => "--tg-theme-hint-color",
            ThemeToken::SecondaryBackground => "--tg-theme-secondary-bg-color",
        }
    }

    /// Value used when the host omits the token.
    pub fn default_value(self) -> &'static str {
        match self {
            ThemeToken::Background => "#f0f2f5",
            ThemeToken::Text => "#000000",
            ThemeToken::Button => "#007aff",
            ThemeToken::ButtonText => "#ffffff",
            ThemeToken::Hint => "#999999",
            ThemeToken::SecondaryBackground => "#ffffff",
        }
    }

    fn host_value(self, params: &ThemeParams) -> Option<&str> {
        let value = match self {
            ThemeToken::Background => &params.bg_color,
            ThemeToken::Text => &params.text_color,
            ThemeToken::Button => &params.button_color,
            ThemeToken::ButtonText => &params.button_text_color,
            ThemeToken::Hint => &params.hint_color,
            ThemeToken::SecondaryBackground => &params.secondary_bg_color,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Resolve every token against the host's parameters, substituting defaults.
pub fn resolve(params: &ThemeParams) -> Vec<(ThemeToken, String)> {
    ThemeToken::ALL
        .iter()
        .map(|&token| {
            let value = token
                .host_value(params)
                .unwrap_or_else(|| token.default_value());
            (token, value.to_string())
        })
        .collect()
}

/// Push the host's current theme into the view. Safe to call any number of
/// times; each call overwrites all six variables.
pub fn mirror<V: View + ?Sized>(host: &dyn HostBridge, view: &mut V) {
    for (token, value) in resolve(&host.theme_params()) {
        view.apply(UiUpdate::ThemeVar(token, value));
    }
}

pub fn warning_color(params: &ThemeParams) -> &str {
    params
        .destructive_text_color
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_WARNING_COLOR)
}

/// Parse `#rrggbb` or `#rgb` into its components.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
