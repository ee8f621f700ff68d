use crate::error::Result;
use crate::size::{SizeSet, TargetSize};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// Lowest quality accepted by `ConversionSettings::validate`.
pub const MIN_QUALITY: f32 = 0.1;

/// Highest quality accepted by `ConversionSettings::validate`.
pub const MAX_QUALITY: f32 = 1.0;

//===========================================================================//

/// The parameters of one conversion request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConversionSettings {
    /// The sizes to render.
    pub sizes: SizeSet,
    /// Encoder fidelity, from 0.1 to 1.0.
    pub quality: f32,
}

impl Default for ConversionSettings {
    fn default() -> ConversionSettings {
        ConversionSettings { sizes: SizeSet::all(), quality: MAX_QUALITY }
    }
}

impl ConversionSettings {
    /// Creates settings for the given sizes at maximum quality.
    pub fn with_sizes<I>(sizes: I) -> ConversionSettings
    where
        I: IntoIterator<Item = TargetSize>,
    {
        ConversionSettings {
            sizes: sizes.into_iter().collect(),
            quality: MAX_QUALITY,
        }
    }

    /// Adds `size` if it is absent, or removes it if it is present.  Returns
    /// true if the size is selected afterwards.
    pub fn toggle_size(&mut self, size: TargetSize) -> bool {
        if self.sizes.remove(size) {
            false
        } else {
            self.sizes.insert(size);
            true
        }
    }

    /// Checks that at least one size is selected and that the quality is in
    /// range.
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            invalid_input!("No icon sizes selected");
        }
        if !self.quality.is_finite()
            || self.quality < MIN_QUALITY
            || self.quality > MAX_QUALITY
        {
            invalid_input!(
                "Invalid quality (was {}, but must be between {} and {})",
                self.quality,
                MIN_QUALITY,
                MAX_QUALITY
            );
        }
        Ok(())
    }
}

//===========================================================================//


//===========================================================================//
