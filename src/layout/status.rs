use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

/// Latest user-facing status line. `id` increases with every post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMessage {
    pub id: u64,
    pub text: String,
}

/// Broadcasts status lines to any number of watchers.
///
/// Transient messages clear themselves after a delay on a detached task. The
/// clear is skipped if a newer message was posted in the meantime.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    sender: Arc<watch::Sender<StatusMessage>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(StatusMessage::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusMessage> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> String {
        self.sender.borrow().text.clone()
    }

    pub fn post(&self, text: impl Into<String>) -> u64 {
        let text = text.into();
        let mut posted = 0;
        self.sender.send_modify(|status| {
            status.id += 1;
            status.text = text;
            posted = status.id;
        });
        posted
    }

    /// Post `text` and clear it no earlier than `delay` from now.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn post_transient(&self, text: impl Into<String>, delay: Duration) -> JoinHandle<()> {
        let posted = self.post(text);
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sender.send_if_modified(|status| {
                if status.id != posted || status.text.is_empty() {
                    return false;
                }
                status.text.clear();
                true
            });
        })
    }
}
