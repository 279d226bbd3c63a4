//! Terminal-backed notification delivery.

use std::sync::Mutex;

use crate::error::NotifyError;

use super::{Notification, Notifier, PermissionStatus};

/// Delivers notifications to the terminal.
///
/// Pending notifications are tracked per tag, so `cancel` and
/// `pending_by_tag` behave like a real notification center. "Pending" here
/// means delivered and not yet replaced or cancelled.
pub struct ConsoleNotifier {
    enabled: bool,
    pending: Mutex<Vec<Notification>>,
    indicator: Mutex<u32>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            enabled: true,
            pending: Mutex::new(Vec::new()),
            indicator: Mutex::new(0),
        }
    }

    /// A notifier that reports permission as denied and delivers nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Current value of the external indicator.
    pub fn indicator_count(&self) -> u32 {
        self.indicator.lock().map(|count| *count).unwrap_or(0)
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn request_permission(&self) -> PermissionStatus {
        if self.enabled {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn deliver(&self, note: &Notification) -> Result<(), NotifyError> {
        if !self.enabled {
            return Err(NotifyError::PermissionDenied);
        }
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| NotifyError::DeliveryFailed("pending list poisoned".to_string()))?;
        pending.retain(|p| p.tag != note.tag);
        pending.push(note.clone());
        println!("[notify] {}: {}", note.title, note.body);
        Ok(())
    }

    fn set_indicator_count(&self, count: u32) -> Result<(), NotifyError> {
        let mut indicator = self
            .indicator
            .lock()
            .map_err(|_| NotifyError::DeliveryFailed("indicator poisoned".to_string()))?;
        *indicator = count;
        Ok(())
    }

    fn pending_by_tag(&self, tag: &str) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|pending| pending.iter().filter(|p| p.tag == tag).cloned().collect())
            .unwrap_or_default()
    }

    fn cancel(&self, tag: &str) -> Result<(), NotifyError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| NotifyError::DeliveryFailed("pending list poisoned".to_string()))?;
        pending.retain(|p| p.tag != tag);
        Ok(())
    }
}
