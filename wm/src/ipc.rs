//! Message bus seam used to forward input to window owners.
//!
//! The window manager only ever sends, and must never block doing so: a
//! full or missing mailbox is reported and the event dropped.

use alloc::collections::{BTreeMap, VecDeque};
use core::fmt;

use unios_abi::Message;
use unios_abi::ipc::{IPC_ANY, Pid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    NoSuchProcess(Pid),
    MailboxFull(Pid),
    /// Nothing matching is queued.
    WouldBlock,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchProcess(pid) => write!(f, "no process {}", pid),
            Self::MailboxFull(pid) => write!(f, "mailbox of process {} is full", pid),
            Self::WouldBlock => write!(f, "no message pending"),
        }
    }
}

pub trait MessageBus {
    fn send(&mut self, dest: Pid, msg: Message) -> Result<(), BusError>;

    /// Oldest message for `receiver` sent by `source`, or by anyone when
    /// `source` is [`IPC_ANY`].
    fn receive(&mut self, receiver: Pid, source: Pid) -> Result<Message, BusError>;
}

pub const DEFAULT_MAILBOX_DEPTH: usize = 64;

/// In-memory bus with one FIFO mailbox per registered process.
pub struct LocalBus {
    depth: usize,
    mailboxes: BTreeMap<Pid, VecDeque<Message>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_MAILBOX_DEPTH)
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            mailboxes: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, pid: Pid) {
        self.mailboxes.entry(pid).or_default();
    }

    pub fn unregister(&mut self, pid: Pid) {
        self.mailboxes.remove(&pid);
    }

    pub fn pending(&self, pid: Pid) -> usize {
        self.mailboxes.get(&pid).map_or(0, VecDeque::len)
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus for LocalBus {
    fn send(&mut self, dest: Pid, msg: Message) -> Result<(), BusError> {
        let queue = self
            .mailboxes
            .get_mut(&dest)
            .ok_or(BusError::NoSuchProcess(dest))?;
        if queue.len() >= self.depth {
            return Err(BusError::MailboxFull(dest));
        }
        queue.push_back(msg);
        Ok(())
    }

    fn receive(&mut self, receiver: Pid, source: Pid) -> Result<Message, BusError> {
        let queue = self
            .mailboxes
            .get_mut(&receiver)
            .ok_or(BusError::NoSuchProcess(receiver))?;
        let pos = queue
            .iter()
            .position(|m| source == IPC_ANY || m.source == source)
            .ok_or(BusError::WouldBlock)?;
        queue.remove(pos).ok_or(BusError::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unios_abi::ipc::MSG_PING;

    fn from(source: Pid, tag: i32) -> Message {
        Message {
            source,
            kind: MSG_PING,
            words: [tag, 0, 0, 0],
        }
    }

    #[test]
    fn test_unknown_destination() {
        let mut bus = LocalBus::new();
        assert_eq!(bus.send(3, from(1, 0)), Err(BusError::NoSuchProcess(3)));
    }

    #[test]
    fn test_fifo_and_any() {
        let mut bus = LocalBus::new();
        bus.register(2);
        bus.send(2, from(1, 10)).unwrap();
        bus.send(2, from(5, 20)).unwrap();
        bus.send(2, from(1, 30)).unwrap();
        assert_eq!(bus.receive(2, 5).unwrap().words[0], 20);
        assert_eq!(bus.receive(2, IPC_ANY).unwrap().words[0], 10);
        assert_eq!(bus.receive(2, 5), Err(BusError::WouldBlock));
        assert_eq!(bus.receive(2, 1).unwrap().words[0], 30);
        assert_eq!(bus.pending(2), 0);
    }

    #[test]
    fn test_mailbox_depth() {
        let mut bus = LocalBus::with_depth(2);
        bus.register(7);
        bus.send(7, from(1, 0)).unwrap();
        bus.send(7, from(1, 1)).unwrap();
        assert_eq!(bus.send(7, from(1, 2)), Err(BusError::MailboxFull(7)));
    }
}
