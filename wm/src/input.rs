//! Input mailbox between the device interrupt handlers and the window
//! manager task.
//!
//! Interrupt handlers call [`InputMailbox::post_pointer`] and
//! [`InputMailbox::post_key`]; both are a single atomic store. Pointer
//! reports coalesce: only the newest one survives until the task takes it.

use unios_abi::{KeyEvent, PointerEvent};
use unios_lib::EventSlot;

pub struct InputMailbox {
    pointer: EventSlot,
    key: EventSlot,
}

impl InputMailbox {
    pub const fn new() -> Self {
        Self {
            pointer: EventSlot::new(),
            key: EventSlot::new(),
        }
    }

    #[inline]
    pub fn post_pointer(&self, event: PointerEvent) {
        self.pointer.post(event.pack());
    }

    #[inline]
    pub fn post_key(&self, event: KeyEvent) {
        self.key.post(event.pack());
    }

    #[inline]
    pub fn take_pointer(&self) -> Option<PointerEvent> {
        self.pointer.take().map(PointerEvent::unpack)
    }

    #[inline]
    pub fn take_key(&self) -> Option<KeyEvent> {
        self.key.take().map(KeyEvent::unpack)
    }
}

impl Default for InputMailbox {
    fn default() -> Self {
        Self::new()
    }
}
