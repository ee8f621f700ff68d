use std::io;
use thiserror::Error;

//===========================================================================//

/// Errors produced while decoding, resampling, or packing icons.
#[derive(Debug, Error)]
pub enum Error {
    /// The source bytes could not be interpreted as a raster image.
    #[error("Cannot decode source image: {0}")]
    Decode(String),

    /// Resampling or serializing the raster for one target size failed.
    #[error("Cannot encode {size}x{size} icon: {reason}")]
    Encode {
        /// Edge length of the icon that failed.
        size: u32,
        /// What went wrong.
        reason: String,
    },

    /// Rendering one target size failed for a reason other than encoding.
    #[error("Cannot render {size}x{size} icon: {source}")]
    Size {
        /// Edge length of the icon that failed.
        size: u32,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The ICO encoder was given no images.
    #[error("Cannot build an ICO file from zero images")]
    EmptyInput,

    /// One of the images handed to the ICO encoder is unusable.
    #[error("Invalid image at index {index}: {reason}")]
    MalformedEntry {
        /// Position of the offending image in the input sequence.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Encoded data (PNG or ICO) is structurally invalid.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A caller-supplied parameter is out of range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upload was rejected before decoding.
    #[error("Upload rejected: {0}")]
    Upload(String),

    /// An I/O error from an underlying writer or reader.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the target size this error is attributed to, if any.
    pub fn size(&self) -> Option<u32> {
        match *self {
            Error::Encode { size, .. } | Error::Size { size, .. } => Some(size),
            _ => None,
        }
    }

    /// Attributes this error to a particular target size.  Errors that
    /// already name a size are returned unchanged.
    pub(crate) fn for_size(self, size: u32) -> Error {
        match self {
            error @ Error::Encode { .. } | error @ Error::Size { .. } => error,
            other => Error::Size { size, source: Box::new(other) },
        }
    }
}

/// A specialized `Result` type for icon conversion.
pub type Result<T> = std::result::Result<T, Error>;

//===========================================================================//


//===========================================================================//
