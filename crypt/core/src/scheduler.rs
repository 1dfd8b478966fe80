//! Timer Scheduler
//!
//! A first-class home for every delayed action in the crypt: demo steps,
//! typing replay, mood auto-clears, ambient glitches. Each scheduled entry
//! is a `(delay, action)` pair backed by one tokio timer task; the handle is
//! retained until the timer fires or is cancelled, so cancellation is an
//! explicit, testable operation and a stopped run can never leak a timer
//! that later mutates state it no longer owns.
//!
//! Fired actions are not executed in the timer task. They are queued and
//! drained by the owner's poll loop, which preserves the single-threaded
//! interleaving model: state is only ever touched between polls, never
//! concurrently from a timer callback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Opaque handle to one scheduled entry, usable to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerKey(u64);

struct Entry {
    group: Option<&'static str>,
    handle: JoinHandle<()>,
}

/// Schedules actions to fire after a delay, delivering them through an
/// internal queue drained by [`Scheduler::try_next`] / [`Scheduler::next`].
pub struct Scheduler<A> {
    next_id: AtomicU64,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
    entries: Arc<Mutex<HashMap<u64, Entry>>>,
}

impl<A: Send + 'static> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Send + 'static> Scheduler<A> {
    /// Create an empty scheduler. Timers are tokio tasks, so scheduling
    /// (not construction) must happen within a runtime.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            next_id: AtomicU64::new(0),
            tx,
            rx,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedule an ungrouped action.
    pub fn schedule(&self, delay: Duration, action: A) -> TimerKey {
        self.schedule_entry(None, delay, action)
    }

    /// Schedule an action belonging to a named group, so a whole family of
    /// timers (one demo run's steps, say) can be cancelled together.
    pub fn schedule_in(&self, group: &'static str, delay: Duration, action: A) -> TimerKey {
        self.schedule_entry(Some(group), delay, action)
    }

    fn schedule_entry(&self, group: Option<&'static str>, delay: Duration, action: A) -> TimerKey {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tx = self.tx.clone();
        let entries = Arc::clone(&self.entries);

        // Hold the lock across spawn + insert so the timer task cannot
        // observe the map before its own entry exists (a zero-delay timer
        // fires immediately under a paused test clock).
        let mut map = self.entries.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the scheduler was dropped; nothing to do.
            let _ = tx.send(action);
            entries.lock().remove(&id);
        });
        map.insert(id, Entry { group, handle });

        TimerKey(id)
    }

    /// Cancel one entry. Returns whether it was still pending.
    pub fn cancel(&self, key: TimerKey) -> bool {
        match self.entries.lock().remove(&key.0) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending entry in a group. Returns how many were cancelled.
    pub fn cancel_group(&self, group: &'static str) -> usize {
        let mut map = self.entries.lock();
        let ids: Vec<u64> = map
            .iter()
            .filter(|(_, entry)| entry.group == Some(group))
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            if let Some(entry) = map.remove(id) {
                entry.handle.abort();
            }
        }
        ids.len()
    }

    /// Cancel everything still pending.
    pub fn cancel_all(&self) {
        let mut map = self.entries.lock();
        for (_, entry) in map.drain() {
            entry.handle.abort();
        }
    }

    /// Number of entries that have not fired or been cancelled yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.lock().len()
    }

    /// Pending entries in one group.
    #[must_use]
    pub fn pending_in(&self, group: &'static str) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.group == Some(group))
            .count()
    }

    /// Pop the next fired action without waiting.
    pub fn try_next(&mut self) -> Option<A> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next fired action.
    pub async fn next(&mut self) -> Option<A> {
        self.rx.recv().await
    }
}

impl<A> Drop for Scheduler<A> {
    fn drop(&mut self) {
        for (_, entry) in self.entries.lock().drain() {
            entry.handle.abort();
        }
    }
}
