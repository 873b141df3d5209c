//! Kernel support shared by the window system: logging and the
//! interrupt-to-task event mailbox.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod event_slot;
pub mod klog;

pub use event_slot::EventSlot;
pub use klog::{
    KlogBackend, KlogLevel, klog_get_level, klog_init, klog_is_enabled, klog_register_backend,
    klog_set_level, klog_unregister_backend,
};
