//! Fixed-size IPC message shared by the message-passing syscall and the
//! window manager's event forwarding.

/// Process identifier as seen by the message bus.
pub type Pid = i32;

/// Size of the process table the bus addresses.
pub const MAX_PROCESSES: Pid = 64;

/// No owning process.
pub const NO_OWNER: Pid = -1;

// sendrec() functions
pub const IPC_SEND: i32 = 1;
pub const IPC_RECEIVE: i32 = 2;
pub const IPC_BOTH: i32 = 3;

/// Receive from any source.
pub const IPC_ANY: Pid = MAX_PROCESSES + 10;
/// Send to nobody.
pub const IPC_NO_TASK: Pid = MAX_PROCESSES + 20;
/// Source pid of messages synthesized from hardware interrupts.
pub const IPC_INTERRUPT: Pid = -10;

// Message types
pub const MSG_HARDWARE_INTR: i32 = 1;
pub const MSG_PING: i32 = 2;
pub const MSG_GUI_CLICK: i32 = 100;
pub const MSG_GUI_KEY: i32 = 101;
pub const MSG_GUI_MOUSE_EVENT: i32 = 102;

/// A 24-byte message: sender, type code, then four integers or one pointer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub source: Pid,
    pub kind: i32,
    pub words: [i32; 4],
}

const _: () = assert!(core::mem::size_of::<Message>() == 24);

impl Message {
    #[inline]
    pub const fn new(kind: i32, words: [i32; 4]) -> Self {
        Self {
            source: 0,
            kind,
            words,
        }
    }

    /// A message whose payload is a user pointer. The pointer occupies the
    /// first two words.
    pub const fn with_pointer(kind: i32, ptr: u64) -> Self {
        Self::new(kind, [ptr as u32 as i32, (ptr >> 32) as u32 as i32, 0, 0])
    }

    #[inline]
    pub const fn pointer(&self) -> u64 {
        (self.words[0] as u32 as u64) | ((self.words[1] as u32 as u64) << 32)
    }

    /// Pointer report for the window under the cursor: window-local
    /// position and the button mask.
    #[inline]
    pub const fn mouse(local_x: i32, local_y: i32, buttons: u8) -> Self {
        Self::new(MSG_GUI_MOUSE_EVENT, [local_x, local_y, buttons as i32, 0])
    }

    #[inline]
    pub const fn key(code: u32) -> Self {
        Self::new(MSG_GUI_KEY, [code as i32, 0, 0, 0])
    }
}
