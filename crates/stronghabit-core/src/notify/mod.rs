//! Notification delivery abstraction.
//!
//! The core decides *when* to notify; *how* is a pluggable collaborator so
//! hosts can route notifications to whatever surface they own. Permission
//! denial disables emission only and never breaks the daily cycle.

mod console;

pub use console::ConsoleNotifier;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Unsupported,
}

/// A notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Dedup key: a new delivery replaces pending ones with the same tag.
    pub tag: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: tag.into(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Trait for notification delivery mechanisms.
pub trait Notifier: Send + Sync {
    /// Ask the surface for permission to notify.
    fn request_permission(&self) -> PermissionStatus;

    /// Deliver a notification, replacing any pending one with the same tag.
    fn deliver(&self, note: &Notification) -> Result<(), NotifyError>;

    /// Mirror the incomplete-exercise count on an external indicator.
    /// Zero clears the indicator.
    fn set_indicator_count(&self, count: u32) -> Result<(), NotifyError>;

    /// Pending notifications with this tag.
    fn pending_by_tag(&self, tag: &str) -> Vec<Notification>;

    /// Cancel pending notifications with this tag.
    fn cancel(&self, tag: &str) -> Result<(), NotifyError>;
}
