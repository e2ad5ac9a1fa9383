// services/trip-dash/src/notice.rs
//
// Single-slot user notification: the latest message replaces whatever is
// showing and disappears on its own after a fixed duration.
//

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub raised_at: Instant,
}

pub struct Notifier {
    current: Mutex<Option<Notice>>,
    dismiss_after: Duration,
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            current: Mutex::new(None),
            dismiss_after,
        }
    }
    
    pub fn error(&self, message: impl Into<String>) {
        self.raise(NoticeLevel::Error, message.into(), Instant::now());
    }
    
    pub fn warning(&self, message: impl Into<String>) {
        self.raise(NoticeLevel::Warning, message.into(), Instant::now());
    }
    
    pub fn raise(&self, level: NoticeLevel, message: String, raised_at: Instant) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = Some(Notice { level, message, raised_at });
    }
    
    /// The visible notice, if any. Expired notices are dropped here.
    pub fn current(&self) -> Option<Notice> {
        self.current_at(Instant::now())
    }
    
    pub fn current_at(&self, now: Instant) -> Option<Notice> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let expired = current
            .as_ref()
            .map(|n| now.saturating_duration_since(n.raised_at) >= self.dismiss_after)
            .unwrap_or(false);
        if expired {
            *current = None;
        }
        current.clone()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_latest_message_replaces_previous() {
        let notifier = Notifier::default();
        notifier.error("first");
        notifier.error("second");
        assert_eq!(notifier.current().map(|n| n.message), Some("second".to_string()));
    }
    
    #[test]
    fn test_auto_dismiss() {
        let notifier = Notifier::new(Duration::from_secs(5));
        let start = Instant::now();
        notifier.raise(NoticeLevel::Error, "boom".to_string(), start);
        
        assert!(notifier.current_at(start + Duration::from_secs(4)).is_some());
        assert!(notifier.current_at(start + Duration::from_secs(5)).is_none());
        // Stays gone once dismissed
        assert!(notifier.current_at(start).is_none());
    }
}
