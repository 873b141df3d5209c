use core::fmt;

use unios_gfx::GfxError;

use crate::ipc::BusError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmError {
    /// A surface or window record could not be allocated.
    NoMemory,
    /// Every slot of the handle table is live.
    TableFull,
    /// The handle does not name a live window.
    InvalidHandle,
    /// The operation is not allowed on the root window.
    RootWindow,
    /// The framebuffer reports an unusable mode.
    NoDisplay,
    Bus(BusError),
}

impl fmt::Display for WmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMemory => write!(f, "out of memory"),
            Self::TableFull => write!(f, "window table full"),
            Self::InvalidHandle => write!(f, "invalid window handle"),
            Self::RootWindow => write!(f, "operation not permitted on root window"),
            Self::NoDisplay => write!(f, "no usable display mode"),
            Self::Bus(err) => write!(f, "message bus: {}", err),
        }
    }
}

impl From<GfxError> for WmError {
    fn from(_: GfxError) -> Self {
        Self::NoMemory
    }
}

impl From<BusError> for WmError {
    fn from(err: BusError) -> Self {
        Self::Bus(err)
    }
}

pub type WmResult<T> = Result<T, WmError>;
