// TUI widget modules for each page zone, plus the shared theme palette.

pub mod action_button;
pub mod item_card;
pub mod listing_form;
pub mod modal;
pub mod status_bar;

use ratatui::style::Color;
use storefront_core::theme::{parse_hex_color, ThemeToken};
use storefront_core::view::ViewState;

/// Terminal colors resolved from the page's mirrored theme variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub button: Color,
    pub button_text: Color,
    pub hint: Color,
    pub card: Color,
    pub warning: Color,
}

impl Palette {
    pub fn from_view(view: &ViewState, warning: &str) -> Self {
        let color = |token| hex_to_color(view.theme_value(token));
        Palette {
            background: color(ThemeToken::Background),
            text: color(ThemeToken::Text),
            button: color(ThemeToken::Button),
            button_text: color(ThemeToken::ButtonText),
            hint: color(ThemeToken::Hint),
            card: color(ThemeToken::SecondaryBackground),
            warning: hex_to_color(warning),
        }
    }
}

/// `#rrggbb`/`#rgb` to an RGB terminal color; anything else keeps the
/// terminal's own color.
pub fn hex_to_color(value: &str) -> Color {
    match parse_hex_color(value) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::view::{UiUpdate, View};

    #[test]
    fn hex_to_color_parses_or_resets() {
        assert_eq!(hex_to_color("#007aff"), Color::Rgb(0, 122, 255));
        assert_eq!(hex_to_color("#fff"), Color::Rgb(255, 255, 255));
        assert_eq!(hex_to_color("blue"), Color::Reset);
    }

    #[test]
    fn palette_uses_defaults_until_mirrored() {
        let mut view = ViewState::default();
        let palette = Palette::from_view(&view, "#ff4d4d");
        assert_eq!(palette.background, Color::Rgb(0xf0, 0xf2, 0xf5));
        assert_eq!(palette.warning, Color::Rgb(0xff, 0x4d, 0x4d));

        view.apply(UiUpdate::ThemeVar(ThemeToken::Background, "#17212b".into()));
        let palette = Palette::from_view(&view, "#ff4d4d");
        assert_eq!(palette.background, Color::Rgb(0x17, 0x21, 0x2b));
    }
}
