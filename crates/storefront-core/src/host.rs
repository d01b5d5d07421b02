// Host bridge: the capabilities the embedding Telegram client offers a page.
//
// A page never touches a global host object. It receives an implementation of
// `HostBridge` once at startup and calls through it, so tests can substitute a
// recording fake and the terminal front-end can supply its own host.

use serde::Deserialize;

/// Maximum size in bytes of a `sendData` payload accepted by Telegram clients.
pub const SEND_DATA_LIMIT: usize = 4096;

// ---------------------------------------------------------------------------
// Haptic levels
// ---------------------------------------------------------------------------

/// Strength of an impact haptic (`HapticFeedback.impactOccurred`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

impl ImpactStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ImpactStyle::Light => "light",
            ImpactStyle::Medium => "medium",
            ImpactStyle::Heavy => "heavy",
        }
    }
}

/// Kind of a notification haptic (`HapticFeedback.notificationOccurred`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Success,
    Error,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Theme parameters
// ---------------------------------------------------------------------------

/// The host's `themeParams`. Hosts omit keys they don't define, so every
/// field is optional. Key names follow Telegram's snake_case spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThemeParams {
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub button_color: Option<String>,
    #[serde(default)]
    pub button_text_color: Option<String>,
    #[serde(default)]
    pub hint_color: Option<String>,
    #[serde(default)]
    pub secondary_bg_color: Option<String>,
    #[serde(default)]
    pub destructive_text_color: Option<String>,
}

// ---------------------------------------------------------------------------
// HostBridge
// ---------------------------------------------------------------------------

/// Capability interface onto the Mini App host.
///
/// All methods are synchronous and fire-and-forget, matching the host API:
/// nothing the page asks of the host reports success or failure back.
pub trait HostBridge: Send + Sync {
    /// Tell the host the page has finished its initial setup.
    fn ready(&self);

    /// Ask the host to expand the Mini App to full height.
    fn expand(&self);

    /// Current theme parameters.
    fn theme_params(&self) -> ThemeParams;

    /// Hand a message to the bot through the host's one-way channel.
    fn send_data(&self, data: &str);

    /// Opaque host-signed session string, forwarded to the backend as auth.
    fn init_data(&self) -> String;

    fn impact_occurred(&self, style: ImpactStyle);

    fn notification_occurred(&self, kind: NotificationType);

    /// Show a blocking alert owned by the host.
    fn show_alert(&self, message: &str);

    /// Close the Mini App surface.
    fn close(&self);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
