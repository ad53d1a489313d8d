// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rendering layers and the bitmask used to select them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// One of the fixed rendering layers, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RenderLayer {
    /// Sky boxes and backdrops.
    Background = 0,
    /// Opaque scene geometry.
    Opaque = 1,
    /// Alpha-tested geometry (foliage, fences).
    Cutout = 2,
    /// Blended geometry.
    Transparent = 3,
    /// Particles and other additive effects.
    Effects = 4,
    /// World-space overlays (gizmos, selection outlines).
    Overlay = 5,
    /// Screen-space user interface.
    Ui = 6,
    /// Debug visualisation.
    Debug = 7,
}

impl RenderLayer {
    /// Number of layers.
    pub const COUNT: usize = 8;

    /// Every layer, in index order.
    pub const ALL: [RenderLayer; Self::COUNT] = [
        RenderLayer::Background,
        RenderLayer::Opaque,
        RenderLayer::Cutout,
        RenderLayer::Transparent,
        RenderLayer::Effects,
        RenderLayer::Overlay,
        RenderLayer::Ui,
        RenderLayer::Debug,
    ];

    /// The index of this layer, in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the layer with the given index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The mask selecting only this layer.
    pub const fn mask(self) -> LayerMask {
        LayerMask::from_bits(1 << self as u32)
    }
}

impl fmt::Display for RenderLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A set of [`RenderLayer`]s, one bit per layer index.
///
/// Masks combine with `|` and intersect with `&`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct LayerMask {
    bits: u32,
}

impl LayerMask {
    /// No layers.
    pub const NONE: Self = Self { bits: 0 };
    /// Every layer.
    pub const ALL: Self = Self {
        bits: (1 << RenderLayer::COUNT) - 1,
    };
    /// Scene geometry: opaque, cutout and transparent.
    pub const GEOMETRY: Self = RenderLayer::Opaque
        .mask()
        .union(RenderLayer::Cutout.mask())
        .union(RenderLayer::Transparent.mask());
    /// Everything drawn on top of the scene: overlays, UI and debug.
    pub const OVERLAYS: Self = RenderLayer::Overlay
        .mask()
        .union(RenderLayer::Ui.mask())
        .union(RenderLayer::Debug.mask());

    /// Creates a mask from raw bits. Bits above the last layer are ignored.
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            bits: bits & ((1 << RenderLayer::COUNT) - 1),
        }
    }

    /// Builds a mask from a list of layers.
    pub fn from_layers(layers: &[RenderLayer]) -> Self {
        layers
            .iter()
            .fold(Self::NONE, |mask, layer| mask.union(layer.mask()))
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Combines two masks.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Keeps only the layers present in both masks.
    pub const fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Checks if the mask selects `layer`.
    pub const fn contains(self, layer: RenderLayer) -> bool {
        self.bits & (1 << layer as u32) != 0
    }

    /// Checks if the mask selects no layer.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterates the selected layers in ascending index order.
    pub fn layers(self) -> impl Iterator<Item = RenderLayer> {
        RenderLayer::ALL
            .into_iter()
            .filter(move |layer| self.contains(*layer))
    }
}

impl From<RenderLayer> for LayerMask {
    fn from(layer: RenderLayer) -> Self {
        layer.mask()
    }
}

impl From<u32> for LayerMask {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl From<LayerMask> for u32 {
    fn from(mask: LayerMask) -> Self {
        mask.bits
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOr<RenderLayer> for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: RenderLayer) -> Self {
        self.union(rhs.mask())
    }
}

impl BitOr for RenderLayer {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> LayerMask {
        self.mask().union(rhs.mask())
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for LayerMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_index_round_trip() {
        for layer in RenderLayer::ALL {
            assert_eq!(RenderLayer::from_index(layer.index()), Some(layer));
        }
        assert_eq!(RenderLayer::from_index(RenderLayer::COUNT), None);
    }

    #[test]
    fn test_mask_operations() {
        let mask = RenderLayer::Opaque | RenderLayer::Ui;
        assert!(mask.contains(RenderLayer::Opaque));
        assert!(mask.contains(RenderLayer::Ui));
        assert!(!mask.contains(RenderLayer::Debug));

        let narrowed = mask & LayerMask::GEOMETRY;
        assert_eq!(narrowed, RenderLayer::Opaque.mask());
        assert!((mask & RenderLayer::Debug.mask()).is_empty());
    }

    #[test]
    fn test_presets() {
        assert_eq!(LayerMask::ALL.layers().count(), RenderLayer::COUNT);
        assert_eq!(
            LayerMask::GEOMETRY.layers().collect::<Vec<_>>(),
            vec![RenderLayer::Opaque, RenderLayer::Cutout, RenderLayer::Transparent]
        );
        assert!(LayerMask::NONE.is_empty());
        assert_eq!(LayerMask::default(), LayerMask::NONE);
    }

    #[test]
    fn test_from_bits_truncates_unknown_layers() {
        assert_eq!(LayerMask::from_bits(u32::MAX), LayerMask::ALL);
        assert_eq!(LayerMask::from(0x1_0003_u32), RenderLayer::Background | RenderLayer::Opaque);
        assert_eq!(u32::from(LayerMask::ALL), 0xff);
    }

    #[test]
    fn test_from_layers() {
        let mask = LayerMask::from_layers(&[RenderLayer::Background, RenderLayer::Cutout]);
        assert_eq!(mask.bits(), 0b101);
    }
}
