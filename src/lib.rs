//! A library for turning a single raster image into a favicon bundle: one
//! square PNG per requested size, plus an ICO file holding all of them.
//!
//! ```no_run
//! use favico::{ConversionSettings, Converter, TargetSize};
//!
//! let bytes = std::fs::read("logo.png").unwrap();
//! let settings = ConversionSettings::with_sizes(vec![
//!     TargetSize::S16,
//!     TargetSize::S32,
//!     TargetSize::S48,
//! ]);
//! let output = Converter::new(settings).convert(&bytes).unwrap();
//! for icon in output.icons() {
//!     std::fs::write(icon.file_name(), icon.png_data()).unwrap();
//! }
//! std::fs::write(output.ico().file_name(), output.ico().data()).unwrap();
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod convert;
mod error;
mod icondir;
mod preprocess;
mod raster;
mod resample;
mod session;
mod settings;
mod size;
mod source;

pub use crate::convert::{
    ConversionObserver, ConversionOutput, Converter, NoopObserver,
};
pub use crate::error::{Error, Result};
pub use crate::icondir::{
    encode, is_ico, IcoContainer, IcoDirEntry, IcoDirectory, ICO_FILE_NAME,
    ICO_MEDIA_TYPE,
};
pub use crate::preprocess::{BackgroundKey, Preprocess};
pub use crate::raster::{EncodedRaster, RenderedIcon};
pub use crate::resample::{render, resize};
pub use crate::session::{RequestToken, Session};
pub use crate::settings::{ConversionSettings, MAX_QUALITY, MIN_QUALITY};
pub use crate::size::{SizeSet, TargetSize};
pub use crate::source::{
    validate_upload, SourceImage, ALLOWED_MEDIA_TYPES, MAX_UPLOAD_LEN,
};
