// Messages from the page task to the terminal render loop.
//
// The workflow talks to two capabilities, the view and the host. In the
// terminal both end up on one channel so the render loop sees them in the
// order they happened.

use storefront_core::view::{UiUpdate, View};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum TuiMessage {
    /// A page view update.
    View(UiUpdate),
    /// Something the host did that a phone would show or vibrate for.
    Signal(String),
    /// Host-owned alert; blocks input until dismissed.
    Alert(String),
    /// The host surface was closed.
    Closed,
}

/// `View` that forwards every update to the render loop.
pub struct ChannelView {
    tx: mpsc::UnboundedSender<TuiMessage>,
}

impl ChannelView {
    pub fn new(tx: mpsc::UnboundedSender<TuiMessage>) -> Self {
        ChannelView { tx }
    }
}

impl View for ChannelView {
    fn apply(&mut self, update: UiUpdate) {
        if self.tx.send(TuiMessage::View(update)).is_err() {
            debug!("render loop gone, dropping view update");
        }
    }
}
