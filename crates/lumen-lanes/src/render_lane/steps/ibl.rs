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

//! Image based lighting.
//!
//! An equirectangular HDR image is turned into the three maps the lighting
//! pass samples:
//!
//! 1. the source is projected onto a cubemap and its mip chain is generated,
//! 2. the cubemap is convolved into a small diffuse irradiance map,
//! 3. each mip of the specular map is prefiltered at a roughness rising
//!    linearly from 0 at the base level to 1 at the last level.
//!
//! A BRDF lookup table, independent of the environment, is integrated once
//! when the step is created. Each precomputation runs in its own short-lived
//! [`CommandBuffer`] flushed immediately, outside the per-frame stream.

use super::StepError;
use crate::render_lane::resources::{CreationFailure, CreationScope, DefaultResources, GpuResource};
use crate::render_lane::shaders;
use crate::render_lane::uniforms::{record_uniforms, IblData, IBL_BINDING};
use lumen_core::math::{Mat3, Mat4};
use lumen_core::renderer::*;
use std::borrow::Cow;

/// Texture unit of the irradiance map in the lighting pass.
pub const IRRADIANCE_UNIT: u32 = 5;
/// Texture unit of the prefiltered specular map in the lighting pass.
pub const PREFILTERED_SPECULAR_UNIT: u32 = 6;
/// Texture unit of the BRDF lookup table in the lighting pass.
pub const BRDF_LUT_UNIT: u32 = 7;

const CUBEMAP_SIZE: u32 = 1024;
const PREFILTERED_SPECULAR_SIZE: u32 = 1024;
const IRRADIANCE_SIZE: u32 = 32;
const BRDF_LUT_SIZE: u32 = 256;

const IBL_WORK_GROUP_SIZE: u32 = 32;
const BRDF_WORK_GROUP_SIZE: u32 = 8;

const CUBE_VERTICES: [f32; 36] = [
    -1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, //
    -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, //
    -1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0,
];
const CUBE_INDICES: [u8; 18] = [8, 9, 0, 2, 1, 3, 3, 2, 5, 4, 7, 6, 6, 0, 7, 1, 10, 11];

/// The maps derived from one environment image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentMaps {
    /// The projected environment with its full mip chain.
    pub cubemap: TextureId,
    /// Diffuse irradiance.
    pub irradiance: TextureId,
    /// Specular radiance, one roughness per mip level.
    pub prefiltered_specular: TextureId,
}

impl EnvironmentMaps {
    fn resources(&self) -> [GpuResource; 3] {
        [
            GpuResource::Texture(self.cubemap),
            GpuResource::Texture(self.irradiance),
            GpuResource::Texture(self.prefiltered_specular),
        ]
    }
}

/// Roughness the specular map is prefiltered at for `mip` of a `mip_count` chain.
///
/// A single-level chain is prefiltered at roughness 0.
pub fn prefilter_roughness(mip: u32, mip_count: u32) -> f32 {
    if mip_count <= 1 {
        0.0
    } else {
        mip as f32 / (mip_count - 1) as f32
    }
}

fn cube_texture(label: &'static str, size: u32, mip_levels: u32, min_filter: FilterMode) -> TextureDescriptor<'static> {
    TextureDescriptor {
        label: Some(Cow::Borrowed(label)),
        kind: TextureKind::Cube,
        format: TextureFormat::Rgba16Float,
        width: size,
        height: size,
        mip_levels,
        min_filter,
        mag_filter: FilterMode::Linear,
        address_mode: AddressMode::ClampToEdge,
    }
}

/// The image based lighting step.
#[derive(Debug)]
pub struct IblStep {
    equirect_program: ShaderProgramId,
    irradiance_program: ShaderProgramId,
    prefilter_program: ShaderProgramId,
    brdf_program: ShaderProgramId,
    draw_program: ShaderProgramId,
    cube_vertices: BufferId,
    cube_indices: BufferId,
    cube: VertexArrayId,
    brdf_lut: TextureId,
    maps: Option<EnvironmentMaps>,
    render_level: f32,
    intensity: f32,
    rotation_scale: Mat3,
}

impl IblStep {
    /// Creates the programs, the environment cube and the BRDF lookup table.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] naming the first resource that could not be
    /// created. Nothing created before it is kept.
    pub fn create(device: &dyn GraphicsDevice, configuration: &IblStepConfiguration) -> Result<Self, StepError> {
        Self::create_resources(device, configuration).map_err(StepError::creation(RenderStep::Ibl))
    }

    fn create_resources(
        device: &dyn GraphicsDevice,
        configuration: &IblStepConfiguration,
    ) -> Result<Self, CreationFailure> {
        assert!(
            IblStepConfiguration::is_valid_render_level(configuration.render_level),
            "IBL render level {} is outside -1.0 or 0.0..=8.0",
            configuration.render_level
        );

        let mut scope = CreationScope::new(device);

        let equirect_program = scope.program(
            "equirect to cubemap program",
            &ShaderProgramDescriptor::compute("Equirect To Cubemap", shaders::EQUIRECT_TO_CUBEMAP_COMPUTE),
        )?;
        let irradiance_program = scope.program(
            "irradiance program",
            &ShaderProgramDescriptor::compute("Irradiance Map", shaders::IRRADIANCE_COMPUTE),
        )?;
        let prefilter_program = scope.program(
            "prefilter program",
            &ShaderProgramDescriptor::compute("Prefilter Specular", shaders::PREFILTER_SPECULAR_COMPUTE),
        )?;
        let brdf_program = scope.program(
            "BRDF integration program",
            &ShaderProgramDescriptor::compute("BRDF Integration", shaders::BRDF_INTEGRATION_COMPUTE),
        )?;
        let draw_program = scope.program(
            "environment program",
            &ShaderProgramDescriptor::graphics("Environment", shaders::CUBEMAP_VERTEX, None, shaders::CUBEMAP_FRAGMENT),
        )?;

        let cube_vertices = scope.buffer(
            "cube vertex buffer",
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Environment Cube Vertices")),
                size: std::mem::size_of_val(&CUBE_VERTICES) as u64,
                target: BufferTarget::Vertex,
                access: BufferAccess::NONE,
            },
            Some(bytemuck::cast_slice(&CUBE_VERTICES)),
        )?;
        let cube_indices = scope.buffer(
            "cube index buffer",
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Environment Cube Indices")),
                size: CUBE_INDICES.len() as u64,
                target: BufferTarget::Index,
                access: BufferAccess::NONE,
            },
            Some(&CUBE_INDICES),
        )?;
        let cube = scope.vertex_array(
            "cube vertex array",
            &VertexArrayDescriptor {
                label: Some(Cow::Borrowed("Environment Cube")),
                vertex_buffer: Some(cube_vertices),
                stride: 3 * std::mem::size_of::<f32>() as u32,
                attributes: vec![VertexAttribute {
                    location: 0,
                    components: 3,
                    offset: 0,
                }],
                index_buffer: Some(cube_indices),
            },
        )?;

        let brdf_lut = scope.texture(
            "BRDF lookup table",
            &TextureDescriptor {
                label: Some(Cow::Borrowed("BRDF LUT")),
                kind: TextureKind::D2,
                format: TextureFormat::Rgba16Float,
                width: BRDF_LUT_SIZE,
                height: BRDF_LUT_SIZE,
                mip_levels: 1,
                min_filter: FilterMode::Linear,
                mag_filter: FilterMode::Linear,
                address_mode: AddressMode::ClampToEdge,
            },
            None,
        )?;

        let mut commands = CommandBuffer::new();
        commands.bind_shader_program(Some(brdf_program));
        commands.bind_image_texture(0, brdf_lut, 0, false, 0, ImageAccess::WriteOnly, TextureFormat::Rgba16Float);
        commands.bind_single_uniform(0, UniformValue::Vec2([BRDF_LUT_SIZE as f32, BRDF_LUT_SIZE as f32]));
        let groups = BRDF_LUT_SIZE.div_ceil(BRDF_WORK_GROUP_SIZE);
        commands.dispatch_compute(groups, groups, 1);
        commands.add_memory_barrier(MemoryBarrierFlags::SHADER_IMAGE_ACCESS);
        commands.bind_shader_program(None);
        commands.execute(device);

        scope.finish();
        log::debug!("IBL step created, BRDF lookup table integrated at {BRDF_LUT_SIZE}x{BRDF_LUT_SIZE}");

        Ok(Self {
            equirect_program,
            irradiance_program,
            prefilter_program,
            brdf_program,
            draw_program,
            cube_vertices,
            cube_indices,
            cube,
            brdf_lut,
            maps: None,
            render_level: configuration.render_level,
            intensity: DEFAULT_ENVIRONMENT_INTENSITY,
            rotation_scale: Mat3::IDENTITY,
        })
    }

    /// Applies a new configuration.
    ///
    /// # Panics
    ///
    /// Panics if the render level is out of range.
    pub fn configure(&mut self, configuration: &IblStepConfiguration) {
        self.set_render_level(configuration.render_level);
    }

    /// Replaces the environment with one computed from `hdr`.
    ///
    /// `None` releases the current maps and the placeholders are bound again.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if one of the new maps cannot be created. The
    /// previous maps are released in every case.
    pub fn load_from_hdr(&mut self, device: &dyn GraphicsDevice, hdr: Option<TextureId>) -> Result<(), StepError> {
        self.release_maps(device);

        let Some(hdr) = hdr else {
            self.render_level = IblStepConfiguration::SKIP;
            return Ok(());
        };

        let mut scope = CreationScope::new(device);
        let cubemap_mips = calculate_mip_count(CUBEMAP_SIZE, CUBEMAP_SIZE);
        let cubemap = scope
            .texture(
                "environment cubemap",
                &cube_texture("Environment Cubemap", CUBEMAP_SIZE, cubemap_mips, FilterMode::LinearMipmapLinear),
                None,
            )
            .map_err(StepError::creation(RenderStep::Ibl))?;
        let specular_mips = calculate_mip_count(PREFILTERED_SPECULAR_SIZE, PREFILTERED_SPECULAR_SIZE);
        let prefiltered_specular = scope
            .texture(
                "prefiltered specular map",
                &cube_texture(
                    "Prefiltered Specular",
                    PREFILTERED_SPECULAR_SIZE,
                    specular_mips,
                    FilterMode::LinearMipmapLinear,
                ),
                None,
            )
            .map_err(StepError::creation(RenderStep::Ibl))?;
        let irradiance = scope
            .texture(
                "irradiance map",
                &cube_texture("Irradiance", IRRADIANCE_SIZE, 1, FilterMode::Linear),
                None,
            )
            .map_err(StepError::creation(RenderStep::Ibl))?;
        scope.finish();

        let maps = EnvironmentMaps {
            cubemap,
            irradiance,
            prefiltered_specular,
        };
        self.record_precomputation(hdr, &maps, specular_mips).execute(device);
        self.maps = Some(maps);

        log::info!("Environment loaded: {specular_mips} specular mip levels");
        Ok(())
    }

    fn record_precomputation(&self, hdr: TextureId, maps: &EnvironmentMaps, specular_mips: u32) -> CommandBuffer {
        let mut commands = CommandBuffer::new();
        let groups = |size: u32| size.div_ceil(IBL_WORK_GROUP_SIZE);
        let size_uniform = |size: u32| UniformValue::Vec2([size as f32, size as f32]);

        commands.bind_shader_program(Some(self.equirect_program));
        commands.bind_texture(0, hdr);
        commands.bind_image_texture(1, maps.cubemap, 0, true, 0, ImageAccess::WriteOnly, TextureFormat::Rgba16Float);
        commands.bind_single_uniform(1, size_uniform(CUBEMAP_SIZE));
        commands.dispatch_compute(groups(CUBEMAP_SIZE), groups(CUBEMAP_SIZE), 6);
        commands.add_memory_barrier(MemoryBarrierFlags::SHADER_IMAGE_ACCESS);
        commands.calculate_mipmaps(maps.cubemap);
        commands.add_memory_barrier(MemoryBarrierFlags::TEXTURE_FETCH);

        commands.bind_shader_program(Some(self.irradiance_program));
        commands.bind_texture(0, maps.cubemap);
        commands.bind_image_texture(1, maps.irradiance, 0, true, 0, ImageAccess::WriteOnly, TextureFormat::Rgba16Float);
        commands.bind_single_uniform(1, size_uniform(IRRADIANCE_SIZE));
        commands.dispatch_compute(groups(IRRADIANCE_SIZE), groups(IRRADIANCE_SIZE), 6);
        commands.add_memory_barrier(MemoryBarrierFlags::SHADER_IMAGE_ACCESS);

        commands.bind_shader_program(Some(self.prefilter_program));
        commands.bind_texture(0, maps.cubemap);
        for mip in 0..specular_mips {
            let size = (PREFILTERED_SPECULAR_SIZE >> mip).max(1);
            commands.bind_image_texture(
                1,
                maps.prefiltered_specular,
                mip,
                true,
                0,
                ImageAccess::WriteOnly,
                TextureFormat::Rgba16Float,
            );
            commands.bind_single_uniform(1, size_uniform(size));
            commands.bind_single_uniform(2, UniformValue::Float(prefilter_roughness(mip, specular_mips)));
            commands.dispatch_compute(groups(size), groups(size), 6);
        }
        commands.add_memory_barrier(MemoryBarrierFlags::SHADER_IMAGE_ACCESS);
        commands.bind_shader_program(None);
        commands
    }

    fn release_maps(&mut self, device: &dyn GraphicsDevice) {
        if let Some(maps) = self.maps.take() {
            for resource in maps.resources() {
                resource.release(device);
            }
        }
    }

    /// Binds the irradiance, prefiltered specular and BRDF maps for the lighting pass.
    ///
    /// Without a loaded environment the placeholder cubemap stands in for the
    /// first two.
    pub fn bind_image_based_light_maps(&self, commands: &mut CommandBuffer, defaults: &DefaultResources) {
        let (irradiance, specular) = match &self.maps {
            Some(maps) => (maps.irradiance, maps.prefiltered_specular),
            None => (defaults.environment, defaults.environment),
        };
        commands.bind_texture(IRRADIANCE_UNIT, irradiance);
        commands.bind_texture(PREFILTERED_SPECULAR_UNIT, specular);
        commands.bind_texture(BRDF_LUT_UNIT, self.brdf_lut);
    }

    /// Records the environment draw and returns `true`, or returns `false`
    /// without recording anything when the render level is negative.
    ///
    /// `view_projection` must not contain the camera translation.
    pub fn execute(
        &self,
        device: &dyn GraphicsDevice,
        commands: &mut CommandBuffer,
        ring: &mut FrameUniformRing,
        defaults: &DefaultResources,
        view_projection: &Mat4,
    ) -> bool {
        if self.render_level < 0.0 {
            return false;
        }

        commands.bind_shader_program(Some(self.draw_program));
        commands.bind_vertex_array(Some(self.cube));
        let data = IblData::new(view_projection, &self.rotation_scale, self.render_level, self.intensity);
        record_uniforms(device, ring, commands, IBL_BINDING, &data);
        let environment = self
            .maps
            .map_or(defaults.environment, |maps| maps.prefiltered_specular);
        commands.bind_texture(0, environment);
        commands.draw_elements(PrimitiveTopology::TriangleStrip, 0, CUBE_INDICES.len() as u32, IndexType::UByte, 1);
        commands.bind_vertex_array(None);
        commands.bind_shader_program(None);
        true
    }

    /// Sets the mip level drawn as background, or [`IblStepConfiguration::SKIP`].
    ///
    /// # Panics
    ///
    /// Panics if the level is out of range.
    pub fn set_render_level(&mut self, render_level: f32) {
        assert!(
            IblStepConfiguration::is_valid_render_level(render_level),
            "IBL render level {render_level} is outside -1.0 or 0.0..=8.0"
        );
        self.render_level = render_level;
    }

    /// Sets the environment intensity multiplier.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// Sets the rotation and scale applied to environment lookups.
    pub fn set_rotation_scale(&mut self, rotation_scale: Mat3) {
        self.rotation_scale = rotation_scale;
    }

    /// The current render level.
    pub fn render_level(&self) -> f32 {
        self.render_level
    }

    /// The current environment intensity.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// The loaded environment maps, if any.
    pub fn maps(&self) -> Option<&EnvironmentMaps> {
        self.maps.as_ref()
    }

    /// The BRDF lookup table.
    pub fn brdf_lut(&self) -> TextureId {
        self.brdf_lut
    }

    /// Releases every resource of the step.
    pub fn destroy(mut self, device: &dyn GraphicsDevice) {
        self.release_maps(device);
        for resource in [
            GpuResource::VertexArray(self.cube),
            GpuResource::Buffer(self.cube_indices),
            GpuResource::Buffer(self.cube_vertices),
            GpuResource::Texture(self.brdf_lut),
            GpuResource::ShaderProgram(self.draw_program),
            GpuResource::ShaderProgram(self.brdf_program),
            GpuResource::ShaderProgram(self.prefilter_program),
            GpuResource::ShaderProgram(self.irradiance_program),
            GpuResource::ShaderProgram(self.equirect_program),
        ] {
            resource.release(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roughness_spans_the_chain() {
        assert_eq!(prefilter_roughness(0, 11), 0.0);
        assert_eq!(prefilter_roughness(10, 11), 1.0);
        assert_eq!(prefilter_roughness(5, 11), 0.5);
    }

    #[test]
    fn single_level_chain_is_mirror_like() {
        assert_eq!(prefilter_roughness(0, 1), 0.0);
        assert_eq!(prefilter_roughness(0, 0), 0.0);
    }

    #[test]
    fn cube_indices_stay_inside_the_vertex_data() {
        let vertex_count = (CUBE_VERTICES.len() / 3) as u8;
        assert!(CUBE_INDICES.iter().all(|&index| index < vertex_count));
    }
}
