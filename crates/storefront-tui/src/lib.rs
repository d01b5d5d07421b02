pub mod host;
pub mod protocol;
pub mod tui;
