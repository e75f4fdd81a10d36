use alloc::string::String;
use enough::StopReason;

/// Errors from a BMP conversion.
///
/// The `Display` text of each variant is the caller-visible diagnostic and is
/// stable; [`crate::ImageProcessResult::message`] carries it verbatim.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StaffError {
    #[error("Failed to open upload")]
    OpenSource(#[source] StorageError),

    #[error("Not a BMP")]
    NotBmp,

    #[error("Invalid BMP planes")]
    InvalidPlanes(u16),

    #[error("BMP must be 24-bit uncompressed")]
    UnsupportedFormat { bit_depth: u16, compression: u32 },

    #[error("Invalid BMP size")]
    InvalidSize { width: i32, height: i32 },

    #[error("Invalid output width")]
    InvalidOutputWidth,

    #[error("Output too large")]
    OutputTooLarge { size: u64, budget: u32 },

    #[error("Source too large")]
    SourceTooLarge { width: u32, height: u32 },

    #[error("Out of memory")]
    OutOfMemory,

    #[error("Failed to open output")]
    OpenOutput(#[source] StorageError),

    #[error("Failed to seek BMP")]
    Seek(#[source] StorageError),

    #[error("Failed to read BMP")]
    Read(#[source] StorageError),

    #[error("Failed to write BMP")]
    Write(#[source] StorageError),

    #[error("Conversion cancelled")]
    Cancelled(StopReason),
}

/// Coarse classification of a [`StaffError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad magic, unsupported pixel format or invalid geometry.
    Format,
    /// Output or source exceeds the configured limits.
    ResourceLimit,
    /// Open, seek, read or write failure on either file.
    Io,
    /// The caller's [`enough::Stop`] fired.
    Cancelled,
}

impl StaffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotBmp
            | Self::InvalidPlanes(_)
            | Self::UnsupportedFormat { .. }
            | Self::InvalidSize { .. }
            | Self::InvalidOutputWidth => ErrorKind::Format,
            Self::OutputTooLarge { .. } | Self::SourceTooLarge { .. } | Self::OutOfMemory => {
                ErrorKind::ResourceLimit
            }
            Self::OpenSource(_)
            | Self::OpenOutput(_)
            | Self::Seek(_)
            | Self::Read(_)
            | Self::Write(_) => ErrorKind::Io,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<StopReason> for StaffError {
    fn from(r: StopReason) -> Self {
        StaffError::Cancelled(r)
    }
}

/// Errors reported by a [`crate::Storage`] implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("storage accepted no more bytes")]
    WriteZero,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        use alloc::string::ToString;
        match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            std::io::ErrorKind::UnexpectedEof => StorageError::UnexpectedEof,
            std::io::ErrorKind::WriteZero => StorageError::WriteZero,
            _ => StorageError::Io(e.to_string()),
        }
    }
}
