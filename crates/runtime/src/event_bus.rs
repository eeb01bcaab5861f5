use foundation::time::Millis;

/// Well-known event kinds surfaced to a front end.
pub mod kinds {
    /// Message shown on the loading overlay.
    pub const OVERLAY: &str = "overlay";
    /// Full-screen error replacing the loading overlay.
    pub const FATAL: &str = "fatal";
    /// Blocking alert dialog.
    pub const ALERT: &str = "alert";
    /// Informational notice; never blocks.
    pub const NOTICE: &str = "notice";
}

/// User-facing notification, timestamped against the session clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub at: Millis,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, at: Millis, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(kind, %at, %message, "event");
        self.events.push(Event { at, kind, message });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}
