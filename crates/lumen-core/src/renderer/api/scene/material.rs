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

//! Surface description consumed by the geometry pass.

use crate::math::{Vec3, Vec4};
use crate::renderer::api::texture::TextureId;

/// How the alpha channel of a material is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    /// Alpha is ignored.
    #[default]
    Opaque,
    /// Fragments below the cutoff are discarded.
    Mask,
    /// Alpha blends with the background.
    Blend,
}

impl AlphaMode {
    /// The integer code shaders receive.
    pub const fn code(&self) -> i32 {
        match self {
            AlphaMode::Opaque => 0,
            AlphaMode::Mask => 1,
            AlphaMode::Blend => 2,
        }
    }
}

/// A physically based metallic-roughness material.
///
/// Every texture slot is optional. Render systems bind a neutral fallback
/// texture for each unset slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color factor (linear RGBA).
    pub base_color: Vec4,
    /// Emissive color factor (linear RGB).
    pub emissive_color: Vec3,
    /// Metallic factor.
    pub metallic: f32,
    /// Roughness factor.
    pub roughness: f32,
    /// Base color texture.
    pub base_color_texture: Option<TextureId>,
    /// Combined roughness (G) and metallic (B) texture.
    pub roughness_metallic_texture: Option<TextureId>,
    /// Ambient occlusion texture.
    pub occlusion_texture: Option<TextureId>,
    /// Tangent-space normal map.
    pub normal_texture: Option<TextureId>,
    /// Emissive color texture.
    pub emissive_color_texture: Option<TextureId>,
    /// If `true`, occlusion is stored in the R channel of the roughness-metallic texture.
    pub packed_occlusion: bool,
    /// How alpha is interpreted.
    pub alpha_mode: AlphaMode,
    /// The cutoff used by [`AlphaMode::Mask`].
    pub alpha_cutoff: f32,
    /// If `true`, back faces are not culled.
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            emissive_color: Vec3::ZERO,
            metallic: 0.0,
            roughness: 1.0,
            base_color_texture: None,
            roughness_metallic_texture: None,
            occlusion_texture: None,
            normal_texture: None,
            emissive_color_texture: None,
            packed_occlusion: false,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

impl Material {
    /// The texture slots in binding order: base color, roughness-metallic,
    /// occlusion, normal, emissive.
    pub fn texture_slots(&self) -> [Option<TextureId>; 5] {
        [
            self.base_color_texture,
            self.roughness_metallic_texture,
            self.occlusion_texture,
            self.normal_texture,
            self.emissive_color_texture,
        ]
    }
}
