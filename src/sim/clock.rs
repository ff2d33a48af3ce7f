//! Virtual clock timers
//!
//! Timers fire in deadline order; ties fire in the order they were scheduled.
//! Nothing here reads wall time, the owner passes `now` in.

#[derive(Debug, Clone)]
struct Timer<E> {
    due_ms: u64,
    event: E,
}

/// Pending timers keyed by deadline
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    // Kept sorted by due_ms, insertion order within a deadline
    timers: Vec<Timer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    /// Schedule `event` to fire at `now_ms + delay_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, event: E) {
        let due_ms = now_ms.saturating_add(delay_ms);

        // Insert after every timer due at or before this one
        let at = self.timers.partition_point(|t| t.due_ms <= due_ms);
        self.timers.insert(at, Timer { due_ms, event });
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, E)> {
        match self.timers.first() {
            Some(t) if t.due_ms <= now_ms => {
                let timer = self.timers.remove(0);
                Some((timer.due_ms, timer.event))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0, 300, "c");
        q.schedule(0, 100, "a");
        q.schedule(0, 200, "b");

        assert_eq!(q.pop_due(50), None);
        assert_eq!(q.pop_due(1000), Some((100, "a")));
        assert_eq!(q.pop_due(1000), Some((200, "b")));
        assert_eq!(q.pop_due(1000), Some((300, "c")));
        assert!(q.is_empty());
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(0, 100, 1);
        q.schedule(50, 50, 2);
        q.schedule(100, 0, 3);

        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(100)).map(|(_, e)| e).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut q = TimerQueue::new();
        q.schedule(0, 100, "a");
        q.schedule(0, 200, "b");
        assert_eq!(q.len(), 2);

        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop_due(u64::MAX), None);
    }
}
