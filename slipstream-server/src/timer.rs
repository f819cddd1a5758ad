use std::time::Instant;

pub type TimerHandle = u64;

struct TimerEntry<T> {
    handle: TimerHandle,
    deadline: Instant,
    kind: T,
}

// One-shot scheduled timers, pumped from the session tick loop. This is the
// engine-coroutine replacement: the state machine schedules a wakeup, the
// loop fires whatever is due, and phase re-entry cancels whatever went stale.
pub struct TimerService<T> {
    entries: Vec<TimerEntry<T>>,
    next_handle: TimerHandle,
}

impl<T> TimerService<T> {
    pub fn new() -> TimerService<T> {
        TimerService {
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn schedule(&mut self, kind: T, deadline: Instant) -> TimerHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.push(TimerEntry {
            handle,
            deadline,
            kind,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    // Pop everything due at `now`, in deadline order; timers scheduled for
    // the same instant fire in the order they were scheduled
    pub fn fire_due(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<TimerEntry<T>> = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].deadline <= now {
                due.push(self.entries.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|entry| (entry.deadline, entry.handle));
        due.into_iter().map(|entry| entry.kind).collect()
    }
}
