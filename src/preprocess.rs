use crate::error::Result;
use crate::source::SourceImage;

//===========================================================================//

/// An optional stage that transforms the decoded source before it is
/// resampled.
pub trait Preprocess: Send + Sync {
    /// Returns the transformed image.
    fn apply(&self, image: SourceImage) -> Result<SourceImage>;
}

//===========================================================================//

/// Makes a uniform background transparent by keying out every pixel close to
/// the average of the four corner colors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BackgroundKey {
    threshold: u8,
}

impl BackgroundKey {
    /// The default per-channel distance below which a pixel is keyed out.
    pub const DEFAULT_THRESHOLD: u8 = 50;

    /// Creates a key with the given per-channel threshold.
    pub fn new(threshold: u8) -> BackgroundKey {
        BackgroundKey { threshold }
    }

    /// Returns the per-channel threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

impl Default for BackgroundKey {
    fn default() -> BackgroundKey {
        BackgroundKey::new(BackgroundKey::DEFAULT_THRESHOLD)
    }
}

impl Preprocess for BackgroundKey {
    fn apply(&self, image: SourceImage) -> Result<SourceImage> {
        let mut pixels = image.into_pixels();
        let (width, height) = pixels.dimensions();
        let corners = [
            pixels.get_pixel(0, 0),
            pixels.get_pixel(width - 1, 0),
            pixels.get_pixel(0, height - 1),
            pixels.get_pixel(width - 1, height - 1),
        ];
        let mut key = [0u8; 3];
        for (channel, value) in key.iter_mut().enumerate() {
            let sum: u32 =
                corners.iter().map(|pixel| pixel[channel] as u32).sum();
            *value = ((sum + 2) / 4) as u8;
        }
        let threshold = self.threshold as i16;
        let mut keyed = 0usize;
        for pixel in pixels.pixels_mut() {
            let close = (0..3).all(|channel| {
                (pixel[channel] as i16 - key[channel] as i16).abs() < threshold
            });
            if close {
                pixel[3] = 0;
                keyed += 1;
            }
        }
        tracing::debug!(?key, keyed, "Keyed out background");
        SourceImage::from_pixels(pixels)
    }
}

//===========================================================================//


//===========================================================================//
