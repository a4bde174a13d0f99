//! Page-side subscribers of the controller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::render::WidgetView;

/// Receives everything the controller wants shown.
///
/// Only `render` is required; the page may ignore the transient effects.
pub trait WidgetHost {
    /// Redraw every region from `view`.
    fn render(&mut self, view: &WidgetView);

    /// Show a blocking notice.
    fn notice(&mut self, _message: &str) {}

    /// Show a toast for `duration`.
    fn feedback(&mut self, _message: &str, _duration: Duration) {}

    /// Animate the cart badge.
    fn pulse_badge(&mut self) {}
}

/// One call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Render(Box<WidgetView>),
    Notice(String),
    Feedback { message: String, duration: Duration },
    PulseBadge,
}

/// Host that records every call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// The most recently rendered view.
    #[must_use]
    pub fn last_view(&self) -> Option<WidgetView> {
        self.events().into_iter().rev().find_map(|event| match event {
            HostEvent::Render(view) => Some(*view),
            _ => None,
        })
    }

    /// Notices shown, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Notice(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Toast messages shown, oldest first.
    #[must_use]
    pub fn feedback(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Feedback { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn push(&self, event: HostEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl WidgetHost for RecordingHost {
    fn render(&mut self, view: &WidgetView) {
        self.push(HostEvent::Render(Box::new(view.clone())));
    }

    fn notice(&mut self, message: &str) {
        self.push(HostEvent::Notice(message.to_string()));
    }

    fn feedback(&mut self, message: &str, duration: Duration) {
        self.push(HostEvent::Feedback {
            message: message.to_string(),
            duration,
        });
    }

    fn pulse_badge(&mut self) {
        self.push(HostEvent::PulseBadge);
    }
}
