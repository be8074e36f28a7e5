use parking_lot::Mutex;
use tracing::{info, warn};

use crate::ports::{Notification, NotificationPort};

/// Emits notifications as log events.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        if notification.is_error {
            warn!(title = %notification.title, "{}", notification.message);
        } else {
            info!(title = %notification.title, "{}", notification.message);
        }
    }
}

/// Records notifications for later inspection.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.sent.lock().last().cloned()
    }
}

impl NotificationPort for MemoryNotifier {
    fn notify(&self, notification: &Notification) {
        self.sent.lock().push(notification.clone());
    }
}
