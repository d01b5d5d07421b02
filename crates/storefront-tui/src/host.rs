// Terminal stand-in for the Telegram Mini App host.
//
// `send_data` has nowhere to go in a terminal, so messages are kept in an
// outbox and printed after the TUI exits. Haptics, alerts and close become
// `TuiMessage`s for the render loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use storefront_core::config::HostConfig;
use storefront_core::host::{HostBridge, ImpactStyle, NotificationType, ThemeParams};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::protocol::TuiMessage;

pub struct TerminalHost {
    init_data: String,
    theme: Mutex<ThemeParams>,
    /// Theme swapped in by `toggle_theme`.
    alternate_theme: Mutex<ThemeParams>,
    outbox: Mutex<Vec<String>>,
    closed: AtomicBool,
    tx: mpsc::UnboundedSender<TuiMessage>,
}

impl TerminalHost {
    pub fn new(config: &HostConfig, tx: mpsc::UnboundedSender<TuiMessage>) -> Self {
        TerminalHost {
            init_data: config.init_data.clone(),
            theme: Mutex::new(config.theme.clone()),
            alternate_theme: Mutex::new(ThemeParams::default()),
            outbox: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            tx,
        }
    }

    /// Swap between the configured theme and the built-in defaults, the way
    /// a user flipping the client's night mode would.
    pub fn toggle_theme(&self) {
        if let (Ok(mut current), Ok(mut alternate)) =
            (self.theme.lock(), self.alternate_theme.lock())
        {
            std::mem::swap(&mut *current, &mut *alternate);
        }
        debug!("host theme toggled");
    }

    /// Messages handed over with `send_data`, oldest first.
    pub fn sent_messages(&self) -> Vec<String> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn emit(&self, message: TuiMessage) {
        if self.tx.send(message).is_err() {
            debug!("render loop gone, dropping host message");
        }
    }
}

impl HostBridge for TerminalHost {
    fn ready(&self) {
        debug!("host ready");
    }

    fn expand(&self) {
        debug!("host expand");
    }

    fn theme_params(&self) -> ThemeParams {
        self.theme
            .lock()
            .map(|theme| theme.clone())
            .unwrap_or_default()
    }

    fn send_data(&self, data: &str) {
        info!(bytes = data.len(), "sendData");
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(data.to_string());
        }
        self.emit(TuiMessage::Signal(format!("sendData: {} bytes", data.len())));
    }

    fn init_data(&self) -> String {
        self.init_data.clone()
    }

    fn impact_occurred(&self, style: ImpactStyle) {
        self.emit(TuiMessage::Signal(format!("impact: {}", style.as_str())));
    }

    fn notification_occurred(&self, kind: NotificationType) {
        self.emit(TuiMessage::Signal(format!("notification: {}", kind.as_str())));
    }

    fn show_alert(&self, message: &str) {
        self.emit(TuiMessage::Alert(message.to_string()));
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("host closed");
            self.emit(TuiMessage::Closed);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
