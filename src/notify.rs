//! Notification consumers for module-completion events
//!
//! The engine's obligation ends at event construction; presentation (video,
//! narration, toasts) belongs to consumers behind this seam. A tracing-based
//! consumer ships for headless use.

use crate::types::ModuleCompletionEvent;
use tracing::info;

/// Receives completion events as they are emitted
pub trait CompletionSink: Send + Sync {
    fn notify(&self, event: &ModuleCompletionEvent);
}

/// Logs completions through tracing
pub struct LogSink;

impl CompletionSink for LogSink {
    fn notify(&self, event: &ModuleCompletionEvent) {
        info!(
            module = %event.module_name,
            reward = %event.reward,
            difficulty = %event.difficulty,
            next = event
                .next_module
                .as_ref()
                .map(|n| n.module_name.as_str())
                .unwrap_or("none"),
            "module completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_log_sink_accepts_event() {
        let event = ModuleCompletionEvent {
            module_name: "Basics".into(),
            short_explanation: "Getting started.".into(),
            reward: "Bronze badge".into(),
            difficulty: "Easy".into(),
            notification_asset: None,
            next_module: None,
            completed_at: Utc::now(),
        };
        LogSink.notify(&event);
    }
}
