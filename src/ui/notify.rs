use std::sync::{Arc, Mutex};

/// Blocking, user-visible notification (an `alert` on the page).
pub trait Notifier: Send {
    fn notify(&self, message: &str);
}

/// Writes notifications to the log instead of showing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::warn!("notification: {}", message);
    }
}

/// Keeps every notification; clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages().pop()
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        log::info!("notification: {}", message);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
