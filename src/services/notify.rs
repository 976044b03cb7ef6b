use std::sync::{Arc, Mutex};

use tracing::info;

/// Fire-and-forget sink for user-facing notices (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Emits every notice as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(target: "tripbook::notice", "{message}");
    }
}

/// Keeps notices in memory so a caller can hand them back, e.g. in an HTTP response.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the collected notices in the order they were emitted.
    pub fn take(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str) {
        TracingNotifier.notify(message);
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_notifier_drains_in_order() {
        let notifier = CollectingNotifier::new();
        notifier.notify("first");
        notifier.clone().notify("second");

        assert_eq!(notifier.take(), vec!["first", "second"]);
        assert!(notifier.take().is_empty());
    }
}
