use crate::error::{Error, Result};
use image::RgbaImage;

//===========================================================================//

/// Media types accepted by `validate_upload`.
pub const ALLOWED_MEDIA_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Largest upload accepted by `validate_upload`, in bytes.
pub const MAX_UPLOAD_LEN: u64 = 500 * 1024;

// Size limits for source images:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

//===========================================================================//

/// Checks an upload's declared media type and byte length before any decoding
/// is attempted.
pub fn validate_upload(media_type: &str, len: u64) -> Result<()> {
    if !ALLOWED_MEDIA_TYPES.contains(&media_type) {
        return Err(Error::Upload(format!(
            "Unsupported media type {:?} (must be JPEG, PNG, or GIF)",
            media_type
        )));
    }
    if len > MAX_UPLOAD_LEN {
        return Err(Error::Upload(format!(
            "File is too large (was {} bytes, but max is {})",
            len, MAX_UPLOAD_LEN
        )));
    }
    Ok(())
}

//===========================================================================//

/// A decoded source image, stored as straight-alpha RGBA.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decodes a JPEG, PNG, or GIF image.  Only the first frame of an animated
    /// GIF is used.
    pub fn decode(bytes: &[u8]) -> Result<SourceImage> {
        let decoded = match image::load_from_memory(bytes) {
            Ok(decoded) => decoded,
            Err(error) => return Err(Error::Decode(error.to_string())),
        };
        let pixels = decoded.to_rgba8();
        tracing::debug!(
            width = pixels.width(),
            height = pixels.height(),
            "Decoded source image"
        );
        SourceImage::from_pixels(pixels)
    }

    /// Creates a source image with the given dimensions and RGBA data.  The
    /// `width` and `height` must be nonzero, and `rgba_data` must have `4 *
    /// width * height` bytes and be in row-major order from top to bottom.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> Result<SourceImage> {
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            invalid_input!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        match RgbaImage::from_raw(width, height, rgba_data) {
            Some(pixels) => SourceImage::from_pixels(pixels),
            None => invalid_input!("Invalid {}x{} image buffer", width, height),
        }
    }

    pub(crate) fn from_pixels(pixels: RgbaImage) -> Result<SourceImage> {
        if pixels.width() < MIN_WIDTH {
            invalid_input!(
                "Invalid width (was {}, but must be at least {})",
                pixels.width(),
                MIN_WIDTH
            );
        }
        if pixels.height() < MIN_HEIGHT {
            invalid_input!(
                "Invalid height (was {}, but must be at least {})",
                pixels.height(),
                MIN_HEIGHT
            );
        }
        Ok(SourceImage { pixels })
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub(crate) fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{validate_upload, SourceImage, MAX_UPLOAD_LEN};
    use crate::error::Error;

    #[test]
    fn upload_media_types() {
        validate_upload("image/png", 1024).unwrap();
        validate_upload("image/jpeg", 1024).unwrap();
        validate_upload("image/jpg", 1024).unwrap();
        validate_upload("image/gif", 1024).unwrap();
        let error = validate_upload("image/webp", 1024).unwrap_err();
        assert!(matches!(error, Error::Upload(_)));
    }

    #[test]
    fn upload_size_limit() {
        validate_upload("image/png", MAX_UPLOAD_LEN).unwrap();
        let error = validate_upload("image/png", MAX_UPLOAD_LEN + 1);
        assert!(matches!(error, Err(Error::Upload(_))));
    }

    #[test]
    fn decode_garbage_fails() {
        let error = SourceImage::decode(b"definitely not an image");
        assert!(matches!(error, Err(Error::Decode(_))));
    }

    #[test]
    fn from_rgba_data_checks_length() {
        let error = SourceImage::from_rgba_data(2, 2, vec![0; 15]);
        assert!(matches!(error, Err(Error::InvalidInput(_))));
        let error = SourceImage::from_rgba_data(0, 3, Vec::new());
        assert!(matches!(error, Err(Error::InvalidInput(_))));
        let image = SourceImage::from_rgba_data(2, 1, vec![7; 8]).unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 1);
        assert_eq!(image.rgba_data(), &[7; 8]);
    }
}

//===========================================================================//
