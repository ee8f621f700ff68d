use crate::error::{Error, Result};
use crate::size::TargetSize;
use image::RgbaImage;
use std::io::{Read, Write};

//===========================================================================//

// The signature that all PNG files start with.
pub(crate) const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

// The largest edge length an ICO directory entry can describe.
pub(crate) const MAX_ICO_DIMENSION: u32 = 256;

//===========================================================================//

/// An encoded still image (PNG) together with its pixel dimensions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl EncodedRaster {
    /// Wraps already-encoded image data with caller-declared dimensions.  The
    /// dimensions are checked by the ICO encoder, not here.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> EncodedRaster {
        EncodedRaster { width, height, data }
    }

    /// Wraps PNG data, reading the dimensions from its header.  Returns an
    /// error if the data isn't a readable PNG.
    pub fn from_png(data: Vec<u8>) -> Result<EncodedRaster> {
        let (width, height) = read_png_size(data.as_slice())?;
        Ok(EncodedRaster { width, height, data })
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the encoded image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the raster, returning the encoded image data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns true if the data starts with the PNG signature.
    pub fn is_png(&self) -> bool {
        self.data.starts_with(PNG_SIGNATURE)
    }
}

//===========================================================================//

/// One rendered icon: a square PNG at one of the supported sizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedIcon {
    size: TargetSize,
    raster: EncodedRaster,
}

impl RenderedIcon {
    pub(crate) fn new(size: TargetSize, raster: EncodedRaster) -> RenderedIcon {
        debug_assert_eq!(raster.width(), size.pixels());
        debug_assert_eq!(raster.height(), size.pixels());
        RenderedIcon { size, raster }
    }

    /// Returns the size this icon was rendered at.
    pub fn size(&self) -> TargetSize {
        self.size
    }

    /// Returns the encoded PNG.
    pub fn raster(&self) -> &EncodedRaster {
        &self.raster
    }

    /// Returns the PNG bytes.
    pub fn png_data(&self) -> &[u8] {
        self.raster.data()
    }

    /// Returns the conventional download name, e.g. `favicon_32x32.png`.
    pub fn file_name(&self) -> String {
        format!("favicon_{}.png", self.size)
    }

    /// Returns the media type of the encoded data.
    pub fn media_type(&self) -> &'static str {
        "image/png"
    }
}

//===========================================================================//

/// Maps a quality in (0, 1] onto PNG compression effort.  PNG is lossless, so
/// this never changes the decoded pixels.
pub(crate) fn compression_for_quality(quality: f32) -> png::Compression {
    if quality >= 0.9 {
        png::Compression::Best
    } else if quality >= 0.5 {
        png::Compression::Default
    } else {
        png::Compression::Fast
    }
}

/// Encodes an image as an 8-bit RGBA PNG.  The alpha channel is always
/// written, even if every pixel is opaque.
pub(crate) fn write_png<W: Write>(
    image: &RgbaImage,
    compression: png::Compression,
    writer: W,
) -> Result<()> {
    match write_png_enc(image, compression, writer) {
        Ok(()) => Ok(()),
        Err(png::EncodingError::IoError(error)) => Err(Error::Io(error)),
        Err(png::EncodingError::Format(error)) => {
            invalid_input!("PNG format error: {}", error);
        }
        Err(png::EncodingError::LimitsExceeded) => {
            invalid_input!("PNG limits exceeded");
        }
        Err(png::EncodingError::Parameter(error)) => {
            invalid_input!("PNG parameter error: {}", error);
        }
    }
}

fn write_png_enc<W: Write>(
    image: &RgbaImage,
    compression: png::Compression,
    writer: W,
) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}

/// Decodes just enough of a PNG to determine its size.
pub(crate) fn read_png_size<R: Read>(reader: R) -> Result<(u32, u32)> {
    let decoder = png::Decoder::new(reader);
    let png_reader = match decoder.read_info() {
        Ok(png_reader) => png_reader,
        Err(error) => invalid_data!("Malformed PNG data: {}", error),
    };
    let info = png_reader.info();
    if info.width == 0 || info.height == 0 {
        invalid_data!("Invalid PNG dimensions ({}x{})", info.width, info.height);
    }
    Ok((info.width, info.height))
}

//===========================================================================//


//===========================================================================//
