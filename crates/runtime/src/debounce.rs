use foundation::time::Millis;

/// Trailing-edge debouncer.
///
/// Each [`Debouncer::push`] restarts the idle window; [`Debouncer::poll`]
/// yields the latest value once the window has elapsed with no newer input,
/// and at most once per window.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window_ms: u64,
    pending: Option<(Millis, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    /// Records `value` as the latest input, superseding anything still pending.
    pub fn push(&mut self, now: Millis, value: T) {
        self.pending = Some((now.after(self.window_ms), value));
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match &self.pending {
            Some((at, _)) if *at <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Drops any pending value without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }
}
