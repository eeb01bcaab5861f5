use std::collections::BTreeMap;

use foundation::time::Millis;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct TimerId(u64);

/// Deterministic one-shot timer set.
///
/// Ordering contract:
/// - Due timers fire in `(deadline, insertion_order)` order.
/// - A timer scheduled at or before `now` while popping fires in the same pass.
#[derive(Debug)]
pub struct Timers<T> {
    next_id: u64,
    pending: BTreeMap<(Millis, TimerId), T>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Millis, payload: T) {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.insert((at, id), payload);
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    /// Pops the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, T)> {
        let key = *self.pending.keys().next()?;
        if key.0 > now {
            return None;
        }
        let payload = self.pending.remove(&key)?;
        Some((key.0, payload))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Timers;
    use foundation::time::Millis;

    #[test]
    fn fires_in_deadline_then_insertion_order() {
        let mut t = Timers::new();
        t.schedule(Millis(20), "late");
        t.schedule(Millis(10), "a");
        t.schedule(Millis(10), "b");

        let mut fired = Vec::new();
        while let Some((_, p)) = t.pop_due(Millis(15)) {
            fired.push(p);
        }
        assert_eq!(fired, vec!["a", "b"]);
        assert_eq!(t.next_deadline(), Some(Millis(20)));
    }

    #[test]
    fn clear_drops_everything_pending() {
        let mut t = Timers::new();
        t.schedule(Millis(5), 1);
        t.schedule(Millis(6), 2);
        t.clear();
        assert_eq!(t.next_deadline(), None);
        assert!(t.pop_due(Millis(100)).is_none());
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut t = Timers::new();
        t.schedule(Millis(100), ());
        assert!(t.pop_due(Millis(99)).is_none());
        assert!(t.pop_due(Millis(100)).is_some());
    }
}
