use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxError {
    /// The pixel buffer could not be reserved.
    NoMemory { bytes: usize },
    /// Width times height overflows the address space.
    InvalidDimensions { width: u32, height: u32 },
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMemory { bytes } => write!(f, "out of memory for {} byte surface", bytes),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid surface dimensions {}x{}", width, height)
            }
        }
    }
}

pub type GfxResult<T> = Result<T, GfxError>;
