//! Single-slot mailbox between an interrupt handler and a task.
//!
//! The producer (ISR) overwrites the slot with the newest record; the
//! consumer takes whatever is there. Both sides are a single atomic
//! operation, so the ISR never spins on a lock the interrupted task holds.
//! Records are 63-bit values; the top bit marks the slot as full.

use core::sync::atomic::{AtomicU64, Ordering};

const PENDING: u64 = 1 << 63;

pub struct EventSlot {
    word: AtomicU64,
}

impl EventSlot {
    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(0),
        }
    }

    /// Publish `value`, replacing any record the consumer has not taken yet.
    #[inline]
    pub fn post(&self, value: u64) {
        self.word.store(PENDING | (value & !PENDING), Ordering::Release);
    }

    /// Take the pending record, leaving the slot empty.
    #[inline]
    pub fn take(&self) -> Option<u64> {
        let word = self.word.swap(0, Ordering::AcqRel);
        if word & PENDING != 0 {
            Some(word & !PENDING)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.word.load(Ordering::Acquire) & PENDING != 0
    }
}

impl Default for EventSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_yields_nothing() {
        let slot = EventSlot::new();
        assert!(!slot.is_pending());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_zero_is_a_valid_record() {
        let slot = EventSlot::new();
        slot.post(0);
        assert!(slot.is_pending());
        assert_eq!(slot.take(), Some(0));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_newer_record_replaces_older() {
        let slot = EventSlot::new();
        slot.post(1);
        slot.post(2);
        assert_eq!(slot.take(), Some(2));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_cross_thread_handoff() {
        use std::sync::Arc;

        let slot = Arc::new(EventSlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for v in 1..=1000u64 {
                    slot.post(v);
                }
            })
        };
        let mut last = 0;
        while last < 1000 {
            if let Some(v) = slot.take() {
                assert!(v > last, "records must arrive in order");
                last = v;
            } else if producer.is_finished() && !slot.is_pending() {
                break;
            }
        }
        producer.join().unwrap();
        assert!(last <= 1000);
    }
}
