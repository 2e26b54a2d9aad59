//! User-facing notifications (toasts)

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A message for the view renderer to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Collects notices until the renderer drains them
#[derive(Default)]
pub struct NoticeBoard {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Emits notices as log events
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => tracing::info!("{}", notice.message),
        }
    }
}
