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

//! Uniform records written into the frame uniform ring.
//!
//! Every record follows std140: `vec3` members are padded to 16 bytes, booleans
//! occupy a full 4-byte word and `mat3` is stored as three padded columns.

use bytemuck::{Pod, Zeroable};
use lumen_core::math::{Mat3, Mat4, Vec3};
use lumen_core::renderer::{
    CameraData, CommandBuffer, DirectionalLight, FrameUniformRing, FxaaQualityPreset, FxaaSettings,
    GraphicsDevice, Material,
};

/// Uniform block binding of per-model data in the geometry pass.
pub const MODEL_BINDING: u32 = 0;
/// Uniform block binding of per-material data in the geometry pass.
pub const MATERIAL_BINDING: u32 = 1;
/// Uniform block binding of the lighting pass data.
pub const LIGHTING_BINDING: u32 = 0;
/// Uniform block binding of the environment draw data.
pub const IBL_BINDING: u32 = 2;
/// Uniform block binding of the FXAA data.
pub const FXAA_BINDING: u32 = 0;

#[inline]
fn std140_bool(value: bool) -> u32 {
    u32::from(value)
}

/// Per-model data of the geometry pass.
///
/// # Memory Layout
///
/// Total size: 128 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneVertexUniforms {
    /// The model-to-world transform.
    pub model: Mat4,
    /// The inverse transpose of the model matrix, as three padded columns.
    pub normal_matrix: [[f32; 4]; 3],
    /// Whether the mesh carries normals.
    pub has_normals: u32,
    /// Whether the mesh carries tangents.
    pub has_tangents: u32,
    /// std140 padding.
    pub _padding: [u32; 2],
}

impl SceneVertexUniforms {
    /// Builds the record for a model transform.
    ///
    /// A singular model matrix yields an identity normal matrix.
    pub fn new(model: &Mat4, has_normals: bool, has_tangents: bool) -> Self {
        let normal_matrix = Mat3::from_mat4(model)
            .inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(Mat3::IDENTITY);
        Self {
            model: *model,
            normal_matrix: normal_matrix.to_std140(),
            has_normals: std140_bool(has_normals),
            has_tangents: std140_bool(has_tangents),
            _padding: [0; 2],
        }
    }
}

/// Per-material data of the geometry pass.
///
/// # Memory Layout
///
/// Total size: 80 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneMaterialUniforms {
    /// Linear base colour and alpha.
    pub base_color: [f32; 4],
    /// Linear emissive colour.
    pub emissive_color: [f32; 3],
    /// Metallic factor.
    pub metallic: f32,
    /// Roughness factor.
    pub roughness: f32,
    /// Whether a base colour texture is bound.
    pub has_base_color_texture: u32,
    /// Whether a roughness-metallic texture is bound.
    pub has_roughness_metallic_texture: u32,
    /// Whether an occlusion texture is bound.
    pub has_occlusion_texture: u32,
    /// Whether a normal map is bound.
    pub has_normal_texture: u32,
    /// Whether an emissive texture is bound.
    pub has_emissive_color_texture: u32,
    /// Occlusion is packed into the red channel of the roughness-metallic texture.
    pub packed_occlusion: u32,
    /// See [`AlphaMode::code`](lumen_core::renderer::AlphaMode::code).
    pub alpha_mode: i32,
    /// Alpha threshold in mask mode.
    pub alpha_cutoff: f32,
    /// std140 padding.
    pub _padding: [f32; 3],
}

impl From<&Material> for SceneMaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            base_color: material.base_color.to_array(),
            emissive_color: material.emissive_color.to_array(),
            metallic: material.metallic,
            roughness: material.roughness,
            has_base_color_texture: std140_bool(material.base_color_texture.is_some()),
            has_roughness_metallic_texture: std140_bool(material.roughness_metallic_texture.is_some()),
            has_occlusion_texture: std140_bool(material.occlusion_texture.is_some()),
            has_normal_texture: std140_bool(material.normal_texture.is_some()),
            has_emissive_color_texture: std140_bool(material.emissive_color_texture.is_some()),
            // A separate occlusion texture wins over the packed channel.
            packed_occlusion: std140_bool(material.packed_occlusion && material.occlusion_texture.is_none()),
            alpha_mode: material.alpha_mode.code(),
            alpha_cutoff: material.alpha_cutoff,
            _padding: [0.0; 3],
        }
    }
}

/// Data of the full-screen lighting pass.
///
/// # Memory Layout
///
/// Total size: 112 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingPassUniforms {
    /// Reconstructs world positions from depth.
    pub inverse_view_projection: Mat4,
    /// The camera position in world space.
    pub camera_position: Vec3,
    /// std140 padding.
    pub _padding0: f32,
    /// Normalized direction the directional light travels in.
    pub light_direction: Vec3,
    /// Illuminance of the directional light in lux.
    pub light_intensity: f32,
    /// Linear colour of the directional light.
    pub light_color: Vec3,
    /// std140 padding.
    pub _padding1: f32,
}

impl LightingPassUniforms {
    /// Builds the record for the current camera and directional light.
    pub fn new(camera: &CameraData, light: &DirectionalLight) -> Self {
        let inverse_view_projection = camera.view_projection.inverse().unwrap_or(Mat4::IDENTITY);
        Self {
            inverse_view_projection,
            camera_position: camera.world_position(),
            _padding0: 0.0,
            light_direction: light.direction.normalize(),
            light_intensity: light.intensity,
            light_color: light.color,
            _padding1: 0.0,
        }
    }
}

/// Data of the environment draw.
///
/// # Memory Layout
///
/// Total size: 128 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct IblData {
    /// View-projection without the camera translation.
    pub view_projection: Mat4,
    /// Rotates and scales the environment lookup direction.
    pub rotation_scale: [[f32; 4]; 3],
    /// Mip level of the prefiltered map drawn as background.
    pub render_level: f32,
    /// Environment intensity multiplier.
    pub intensity: f32,
    /// std140 padding.
    pub _padding: [f32; 2],
}

impl IblData {
    /// Builds the record.
    pub fn new(view_projection: &Mat4, rotation_scale: &Mat3, render_level: f32, intensity: f32) -> Self {
        Self {
            view_projection: *view_projection,
            rotation_scale: rotation_scale.to_std140(),
            render_level,
            intensity,
            _padding: [0.0; 2],
        }
    }
}

/// Data of the FXAA pass.
///
/// # Memory Layout
///
/// Total size: 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FxaaData {
    /// `1 / width`, `1 / height`.
    pub inverse_screen_size: [f32; 2],
    /// Amount of sub-pixel aliasing removal.
    pub subpixel_filter: f32,
    /// 0 = medium, 1 = high, 2 = extreme.
    pub quality_preset: i32,
}

impl FxaaData {
    /// Builds the record for an output of `width` x `height` pixels.
    pub fn new(settings: &FxaaSettings, width: u32, height: u32) -> Self {
        let quality_preset = match settings.quality_preset {
            FxaaQualityPreset::Medium => 0,
            FxaaQualityPreset::High => 1,
            FxaaQualityPreset::Extreme => 2,
        };
        Self {
            inverse_screen_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            subpixel_filter: settings.subpixel_filter.clamp(0.0, 1.0),
            quality_preset,
        }
    }
}

/// The number of bins of the luminance histogram.
pub const HISTOGRAM_BIN_COUNT: usize = 256;

/// The layout of the luminance storage buffer shared by the exposure compute passes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LuminanceHistogram {
    /// Pixel counts per log-luminance bin.
    pub bins: [u32; HISTOGRAM_BIN_COUNT],
    /// The exponential moving average of the scene luminance.
    pub luminance: f32,
}

impl LuminanceHistogram {
    /// Byte offset of [`luminance`](Self::luminance) inside the buffer.
    pub const LUMINANCE_OFFSET: u64 = (HISTOGRAM_BIN_COUNT * 4) as u64;
    /// Lower bound of the histogram in log2 luminance.
    pub const MIN_LOG_LUMINANCE: f32 = -10.0;
    /// Width of the histogram in log2 luminance.
    pub const LOG_LUMINANCE_RANGE: f32 = 42.0;

    /// An empty histogram with the averaged luminance primed to `1.0`.
    pub fn initial() -> Self {
        Self {
            bins: [0; HISTOGRAM_BIN_COUNT],
            luminance: 1.0,
        }
    }
}

/// Writes `record` into the ring and records the binding of its range at `binding`.
///
/// # Panics
///
/// Panics if the ring overflows or its mapping is gone. Both mean the ring was
/// sized or released incorrectly.
pub(crate) fn record_uniforms<T: Pod>(
    device: &dyn GraphicsDevice,
    ring: &mut FrameUniformRing,
    commands: &mut CommandBuffer,
    binding: u32,
    record: &T,
) {
    let offset = ring
        .push_pod(device, record)
        .unwrap_or_else(|err| panic!("Writing uniforms to the frame ring failed: {err}"));
    commands.bind_uniform_buffer_range(binding, ring.buffer(), offset, std::mem::size_of::<T>() as u64);
}

/// Returns the view-projection of a camera with its translation removed.
pub fn rotation_only_view_projection(camera: &CameraData) -> Mat4 {
    camera.projection * Mat3::from_mat4(&camera.view).to_mat4()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::renderer::AlphaMode;

    #[test]
    fn record_sizes_follow_std140() {
        assert_eq!(std::mem::size_of::<SceneVertexUniforms>(), 128);
        assert_eq!(std::mem::size_of::<SceneMaterialUniforms>(), 80);
        assert_eq!(std::mem::size_of::<LightingPassUniforms>(), 112);
        assert_eq!(std::mem::size_of::<IblData>(), 128);
        assert_eq!(std::mem::size_of::<FxaaData>(), 16);
        assert_eq!(std::mem::size_of::<LuminanceHistogram>(), 1028);
    }

    #[test]
    fn lighting_record_bytes_follow_the_math_types() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y).unwrap();
        let camera = CameraData::new(view, Mat4::perspective_rh_zo(1.0, 1.5, 0.1, 100.0));
        let light = DirectionalLight {
            direction: Vec3::new(0.0, -2.0, 0.0),
            color: Vec3::new(1.0, 0.5, 0.25),
            intensity: 3.0,
        };
        let record = LightingPassUniforms::new(&camera, &light);
        let bytes = bytemuck::bytes_of(&record);
        let inverse = camera.view_projection.inverse().unwrap_or(Mat4::IDENTITY);
        assert_eq!(&bytes[..64], bytemuck::bytes_of(&inverse.to_cols_array_2d()));
        let floats: &[f32] = bytemuck::cast_slice(&bytes[64..]);
        assert_eq!(&floats[..3], &camera.world_position().to_array());
        assert_eq!(&floats[4..8], &[0.0, -1.0, 0.0, 3.0]);
        assert_eq!(&floats[8..11], &[1.0, 0.5, 0.25]);
    }

    #[test]
    fn normal_matrix_of_uniform_scale_is_inverse_scale() {
        let record = SceneVertexUniforms::new(&Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0)), true, false);
        assert_eq!(record.has_normals, 1);
        assert_eq!(record.has_tangents, 0);
        assert!((record.normal_matrix[0][0] - 0.5).abs() < 1e-6);
        assert!((record.normal_matrix[1][1] - 0.5).abs() < 1e-6);
        assert_eq!(record.normal_matrix[0][3], 0.0);
    }

    #[test]
    fn packed_occlusion_needs_no_occlusion_texture() {
        let mut material = Material {
            packed_occlusion: true,
            alpha_mode: AlphaMode::Mask,
            ..Default::default()
        };
        let record = SceneMaterialUniforms::from(&material);
        assert_eq!(record.packed_occlusion, 1);
        assert_eq!(record.alpha_mode, AlphaMode::Mask.code());

        material.occlusion_texture = Some(lumen_core::renderer::TextureId(4));
        let record = SceneMaterialUniforms::from(&material);
        assert_eq!(record.packed_occlusion, 0);
        assert_eq!(record.has_occlusion_texture, 1);
    }

    #[test]
    fn rotation_only_view_projection_drops_translation() {
        let view = Mat4::from_translation(Vec3::new(5.0, -3.0, 2.0));
        let camera = CameraData::new(view, Mat4::IDENTITY);
        assert_eq!(rotation_only_view_projection(&camera), Mat4::IDENTITY);
    }
}
