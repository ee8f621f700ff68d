#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

//===========================================================================//

/// One of the edge lengths a favicon bundle can be rendered at.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum TargetSize {
    /// 16x16 pixels
    S16,
    /// 32x32 pixels
    S32,
    /// 48x48 pixels
    S48,
    /// 64x64 pixels
    S64,
    /// 128x128 pixels
    S128,
}

impl TargetSize {
    /// Every supported size, smallest first.
    pub const ALL: [TargetSize; 5] = [
        TargetSize::S16,
        TargetSize::S32,
        TargetSize::S48,
        TargetSize::S64,
        TargetSize::S128,
    ];

    /// Returns the size with the given edge length, or `None` if that edge
    /// length is not supported.
    pub fn from_pixels(pixels: u32) -> Option<TargetSize> {
        match pixels {
            16 => Some(TargetSize::S16),
            32 => Some(TargetSize::S32),
            48 => Some(TargetSize::S48),
            64 => Some(TargetSize::S64),
            128 => Some(TargetSize::S128),
            _ => None,
        }
    }

    /// Returns the edge length, in pixels.
    pub fn pixels(&self) -> u32 {
        match *self {
            TargetSize::S16 => 16,
            TargetSize::S32 => 32,
            TargetSize::S48 => 48,
            TargetSize::S64 => 64,
            TargetSize::S128 => 128,
        }
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}x{}", self.pixels(), self.pixels())
    }
}

impl TryFrom<u32> for TargetSize {
    type Error = String;

    fn try_from(pixels: u32) -> Result<TargetSize, String> {
        TargetSize::from_pixels(pixels)
            .ok_or_else(|| format!("Unsupported icon size ({})", pixels))
    }
}

impl From<TargetSize> for u32 {
    fn from(size: TargetSize) -> u32 {
        size.pixels()
    }
}

//===========================================================================//

/// A set of target sizes.  Duplicates collapse, and iteration is always in
/// ascending order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SizeSet {
    sizes: BTreeSet<TargetSize>,
}

impl SizeSet {
    /// Creates an empty set.
    pub fn new() -> SizeSet {
        SizeSet { sizes: BTreeSet::new() }
    }

    /// Creates a set containing every supported size.
    pub fn all() -> SizeSet {
        TargetSize::ALL.iter().copied().collect()
    }

    /// Adds a size; returns false if it was already present.
    pub fn insert(&mut self, size: TargetSize) -> bool {
        self.sizes.insert(size)
    }

    /// Removes a size; returns false if it was not present.
    pub fn remove(&mut self, size: TargetSize) -> bool {
        self.sizes.remove(&size)
    }

    /// Returns true if the set contains `size`.
    pub fn contains(&self, size: TargetSize) -> bool {
        self.sizes.contains(&size)
    }

    /// Returns the number of sizes in the set.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns true if the set has no sizes.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Iterates over the sizes, smallest first.
    pub fn iter(&self) -> impl Iterator<Item = TargetSize> + '_ {
        self.sizes.iter().copied()
    }
}

impl FromIterator<TargetSize> for SizeSet {
    fn from_iter<I: IntoIterator<Item = TargetSize>>(iter: I) -> SizeSet {
        SizeSet { sizes: iter.into_iter().collect() }
    }
}

//===========================================================================//


//===========================================================================//
