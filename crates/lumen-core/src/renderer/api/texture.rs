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

//! Defines data structures related to GPU texture resources.

use std::borrow::Cow;

/// The shape of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A single two-dimensional image.
    D2,
    /// Six square two-dimensional faces addressed by direction.
    Cube,
}

/// The internal storage format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// A single 8-bit unsigned normalized channel.
    R8,
    /// Three 8-bit unsigned normalized channels.
    Rgb8,
    /// Four 8-bit unsigned normalized channels.
    Rgba8,
    /// Four 8-bit channels in the sRGB color space.
    Rgba8Srgb,
    /// Packed 10-bit RGB with a 2-bit alpha channel.
    Rgb10A2,
    /// Four 16-bit float channels.
    Rgba16Float,
    /// Four 32-bit float channels.
    Rgba32Float,
    /// A 32-bit float depth channel.
    Depth32Float,
    /// A 24-bit depth channel with an 8-bit stencil channel.
    Depth24Stencil8,
}

impl TextureFormat {
    /// Returns the size of one texel in bytes.
    pub const fn bytes_per_texel(&self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8
            | TextureFormat::Rgba8Srgb
            | TextureFormat::Rgb10A2
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24Stencil8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns `true` for depth (and depth-stencil) formats.
    pub const fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24Stencil8
        )
    }
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation of the nearest texels.
    Linear,
    /// Linear interpolation inside and between the two closest mip levels.
    LinearMipmapLinear,
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    Repeat,
    /// Coordinates are clamped to the edge. `1.1` becomes `1.0`.
    ClampToEdge,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// Whether the texture is a plain 2D image or a cubemap.
    pub kind: TextureKind,
    /// The storage format.
    pub format: TextureFormat,
    /// The width of mip level 0 in texels.
    pub width: u32,
    /// The height of mip level 0 in texels.
    pub height: u32,
    /// The number of mip levels to allocate (at least 1).
    pub mip_levels: u32,
    /// The minification filter.
    pub min_filter: FilterMode,
    /// The magnification filter.
    pub mag_filter: FilterMode,
    /// The wrapping mode for both texture axes.
    pub address_mode: AddressMode,
}

impl<'a> TextureDescriptor<'a> {
    /// Describes a single-level, nearest-filtered, clamped 2D texture.
    ///
    /// This is the configuration used for render-target attachments.
    pub fn attachment(label: &'a str, format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            label: Some(Cow::Borrowed(label)),
            kind: TextureKind::D2,
            format,
            width,
            height,
            mip_levels: 1,
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            address_mode: AddressMode::ClampToEdge,
        }
    }
}

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Computes the number of levels in a full mip chain for an image of the given size.
///
/// The result is `1 + floor(log2(max(width, height)))`. A zero-sized image still
/// has one level.
pub fn calculate_mip_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_count_matches_full_chain() {
        assert_eq!(calculate_mip_count(512, 512), 10);
        assert_eq!(calculate_mip_count(1, 1), 1);
        assert_eq!(calculate_mip_count(19, 19), 5);
        assert_eq!(calculate_mip_count(256, 64), 9);
        assert_eq!(calculate_mip_count(0, 0), 1);
    }

    #[test]
    fn texel_sizes() {
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_texel(), 16);
        assert_eq!(TextureFormat::R8.bytes_per_texel(), 1);
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(!TextureFormat::Rgb10A2.is_depth());
    }
}
