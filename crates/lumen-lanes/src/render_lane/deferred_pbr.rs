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

//! Deferred PBR render system.
//!
//! # Frame structure
//!
//! ```text
//! begin_render   G-buffer bound and cleared, geometry program bound,
//!                wait for the ring fence of the previous cycle
//! draws          per-model and per-material records pushed to the ring
//! finish_render  lighting      G-buffer + environment maps -> HDR buffer
//!                environment   IBL cube drawn behind the scene (optional)
//!                exposure      histogram + reduction compute, flush, read back (optional)
//!                composite     HDR buffer -> backbuffer with camera exposure
//!                end           fence the ring, clear the surface, FXAA (optional),
//!                              flush, rewind the ring
//! ```
//!
//! Every pass is recorded into one [`CommandBuffer`]. It is flushed twice per
//! frame: after the exposure passes, because the CPU reads their result back,
//! and at the end of the frame.

use super::auto_exposure::{adaptation_coefficient, apply_auto_exposure, camera_exposure};
use super::resources::{CreationFailure, CreationScope, DefaultResources, GpuResource};
use super::shaders;
use super::steps::{
    FxaaStep, IblStep, PipelineStep, StepError, BRDF_LUT_UNIT, IRRADIANCE_UNIT, PREFILTERED_SPECULAR_UNIT,
};
use super::uniforms::{
    record_uniforms, rotation_only_view_projection, LightingPassUniforms, LuminanceHistogram,
    SceneMaterialUniforms, SceneVertexUniforms, LIGHTING_BINDING, MATERIAL_BINDING, MODEL_BINDING,
};
use lumen_core::math::Mat4;
use lumen_core::platform::RenderSurface;
use lumen_core::renderer::*;
use std::borrow::Cow;
use std::sync::Arc;

/// Default size of the frame uniform ring in bytes.
pub const FRAME_UNIFORM_RING_SIZE: u64 = 4 << 20;

const LUMINANCE_WORK_GROUP_SIZE: u32 = 16;

const GBUFFER_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const HDR_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.2, 1.0];
const SURFACE_CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// First texture unit of the G-buffer in the lighting pass. Depth follows the
/// four colour attachments.
const GBUFFER_FIRST_UNIT: u32 = 0;

/// The framebuffers of the pipeline, exposed for inspection tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredDebugViews {
    /// Base colour, normals, emission and occlusion-roughness-metallic, plus depth.
    pub gbuffer: FramebufferId,
    /// Linear HDR radiance, plus depth.
    pub hdr_buffer: FramebufferId,
    /// The exposed and tone mapped image, plus depth.
    pub backbuffer: FramebufferId,
}

impl DeferredDebugViews {
    fn all(&self) -> [FramebufferId; 3] {
        [self.gbuffer, self.hdr_buffer, self.backbuffer]
    }
}

#[derive(Debug, Clone, Copy)]
struct DeferredPrograms {
    geometry: ShaderProgramId,
    lighting: ShaderProgramId,
    composite: ShaderProgramId,
    luminance_histogram: ShaderProgramId,
    luminance_reduction: ShaderProgramId,
}

impl DeferredPrograms {
    fn resources(&self) -> [GpuResource; 5] {
        [
            GpuResource::ShaderProgram(self.geometry),
            GpuResource::ShaderProgram(self.lighting),
            GpuResource::ShaderProgram(self.composite),
            GpuResource::ShaderProgram(self.luminance_histogram),
            GpuResource::ShaderProgram(self.luminance_reduction),
        ]
    }
}

/// Attachment textures looked up once, they survive resizes.
#[derive(Debug, Clone, Copy)]
struct AttachmentTextures {
    gbuffer: [TextureId; MAX_COLOR_ATTACHMENTS + 1],
    hdr_color: TextureId,
    backbuffer_color: TextureId,
}

fn framebuffer_descriptor(
    label: &'static str,
    width: u32,
    height: u32,
    color_formats: Vec<TextureFormat>,
) -> FramebufferDescriptor<'static> {
    FramebufferDescriptor {
        label: Some(Cow::Borrowed(label)),
        width,
        height,
        color_formats,
        depth_format: Some(TextureFormat::Depth32Float),
    }
}

fn alive(ring: &mut Option<FrameUniformRing>) -> &mut FrameUniformRing {
    match ring {
        Some(ring) => ring,
        None => panic!("The deferred PBR render system was used after destroy"),
    }
}

/// A [`RenderSystem`] implementing [`RenderPipeline::DeferredPbr`].
#[derive(Debug)]
pub struct DeferredPbrRenderSystem {
    device: Arc<dyn GraphicsDevice>,
    commands: CommandBuffer,
    ring: Option<FrameUniformRing>,
    framebuffers: DeferredDebugViews,
    attachments: AttachmentTextures,
    programs: DeferredPrograms,
    luminance_buffer: BufferId,
    defaults: DefaultResources,
    steps: Vec<PipelineStep>,
    light: DirectionalLight,
    viewport: Viewport,
    stats: HardwareStats,
    // Set when creation installed the logging sink; a sink set by the caller is left alone.
    owns_debug_callback: bool,
}

impl DeferredPbrRenderSystem {
    /// Creates every resource of the pipeline for an output of `width` x `height` pixels.
    ///
    /// Debug builds route driver diagnostics to the `log` facade unless the
    /// device already has a sink. That sink is removed again by
    /// [`destroy`](RenderSystem::destroy).
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] naming the first resource that could not be
    /// created. Nothing created before it is kept.
    pub fn create(device: Arc<dyn GraphicsDevice>, width: u32, height: u32) -> Result<Self, RenderError> {
        Self::create_with_ring_capacity(device, width, height, FRAME_UNIFORM_RING_SIZE)
    }

    /// Like [`create`](Self::create), with a frame uniform ring of `ring_capacity` bytes.
    pub fn create_with_ring_capacity(
        device: Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        ring_capacity: u64,
    ) -> Result<Self, RenderError> {
        let api_version = device.api_version();
        log::info!("Using: {api_version}");

        let owns_debug_callback = cfg!(debug_assertions) && !device.has_debug_callback();
        if owns_debug_callback {
            device.set_debug_callback(Some(Box::new(log_debug_message)));
        }

        let result = Self::create_resources(&device, width, height, ring_capacity);
        let (framebuffers, attachments, programs, luminance_buffer, defaults, ring) = match result {
            Ok(resources) => resources,
            Err(err) => {
                log::error!("Creation of {} failed! Render system not available!", err.what);
                if owns_debug_callback {
                    device.set_debug_callback(None);
                }
                return Err(err.into());
            }
        };

        Ok(Self {
            device,
            commands: CommandBuffer::with_capacity(512),
            ring: Some(ring),
            framebuffers,
            attachments,
            programs,
            luminance_buffer,
            defaults,
            steps: Vec::new(),
            light: DirectionalLight {
                intensity: 0.0,
                ..Default::default()
            },
            viewport: Viewport {
                x: 0,
                y: 0,
                width: width as i32,
                height: height as i32,
            },
            stats: HardwareStats {
                api_version,
                last_frame: FrameStats {
                    canvas_width: width,
                    canvas_height: height,
                    ..Default::default()
                },
            },
            owns_debug_callback,
        })
    }

    #[allow(clippy::type_complexity)]
    fn create_resources(
        device: &Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        ring_capacity: u64,
    ) -> Result<
        (
            DeferredDebugViews,
            AttachmentTextures,
            DeferredPrograms,
            BufferId,
            DefaultResources,
            FrameUniformRing,
        ),
        CreationFailure,
    > {
        let device = device.as_ref();
        let mut scope = CreationScope::new(device);

        let gbuffer = scope.framebuffer(
            "gbuffer",
            &framebuffer_descriptor(
                "G-Buffer",
                width,
                height,
                vec![
                    TextureFormat::Rgba8,
                    TextureFormat::Rgb10A2,
                    TextureFormat::Rgba8,
                    TextureFormat::Rgba8,
                ],
            ),
        )?;
        let hdr_buffer = scope.framebuffer(
            "hdr buffer",
            &framebuffer_descriptor("HDR Buffer", width, height, vec![TextureFormat::Rgba32Float]),
        )?;
        let backbuffer = scope.framebuffer(
            "backbuffer",
            &framebuffer_descriptor("Backbuffer", width, height, vec![TextureFormat::Rgb8]),
        )?;
        let framebuffers = DeferredDebugViews {
            gbuffer,
            hdr_buffer,
            backbuffer,
        };

        let attachment = |framebuffer, slot, what| {
            device
                .framebuffer_attachment(framebuffer, slot)
                .map_err(|source| CreationFailure { what, source })
        };
        let attachments = AttachmentTextures {
            gbuffer: [
                attachment(gbuffer, FramebufferAttachment::Color0, "gbuffer attachment")?,
                attachment(gbuffer, FramebufferAttachment::Color1, "gbuffer attachment")?,
                attachment(gbuffer, FramebufferAttachment::Color2, "gbuffer attachment")?,
                attachment(gbuffer, FramebufferAttachment::Color3, "gbuffer attachment")?,
                attachment(gbuffer, FramebufferAttachment::Depth, "gbuffer attachment")?,
            ],
            hdr_color: attachment(hdr_buffer, FramebufferAttachment::Color0, "hdr buffer attachment")?,
            backbuffer_color: attachment(backbuffer, FramebufferAttachment::Color0, "backbuffer attachment")?,
        };

        let programs = DeferredPrograms {
            geometry: scope.program(
                "geometry pass program",
                &ShaderProgramDescriptor::graphics(
                    "Geometry Pass",
                    shaders::GEOMETRY_VERTEX,
                    None,
                    shaders::GEOMETRY_FRAGMENT,
                ),
            )?,
            lighting: scope.program(
                "lighting pass program",
                &shaders::screen_space_program("Lighting Pass", shaders::LIGHTING_FRAGMENT),
            )?,
            composite: scope.program(
                "composing pass program",
                &shaders::screen_space_program("Composing Pass", shaders::COMPOSITE_FRAGMENT),
            )?,
            luminance_histogram: scope.program(
                "luminance histogram program",
                &ShaderProgramDescriptor::compute("Luminance Histogram", shaders::LUMINANCE_HISTOGRAM_COMPUTE),
            )?,
            luminance_reduction: scope.program(
                "luminance reduction program",
                &ShaderProgramDescriptor::compute("Luminance Reduction", shaders::LUMINANCE_REDUCTION_COMPUTE),
            )?,
        };

        let luminance_buffer = scope.mapped_buffer(
            "luminance buffer",
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Luminance Histogram")),
                size: std::mem::size_of::<LuminanceHistogram>() as u64,
                target: BufferTarget::ShaderStorage,
                access: BufferAccess::READ
                    | BufferAccess::WRITE
                    | BufferAccess::PERSISTENT
                    | BufferAccess::COHERENT,
            },
            Some(bytemuck::bytes_of(&LuminanceHistogram::initial())),
        )?;

        let defaults = DefaultResources::create(&mut scope)?;

        let ring = FrameUniformRing::new(device, ring_capacity).map_err(|source| CreationFailure {
            what: "frame uniform buffer",
            source,
        })?;

        scope.finish();
        Ok((framebuffers, attachments, programs, luminance_buffer, defaults, ring))
    }

    /// Replaces the environment of the IBL step with one computed from `hdr`,
    /// or releases it with `None`.
    ///
    /// A new environment is drawn at render level 0 with the default intensity.
    /// Does nothing but warn when the IBL step is not configured.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the environment maps cannot be created.
    pub fn set_environment_texture(&mut self, hdr: Option<TextureId>) -> Result<(), RenderError> {
        let device = self.device.as_ref();
        let Some(ibl) = ibl_step_mut(&mut self.steps) else {
            log::warn!("Environment texture ignored: the IBL step is not configured");
            return Ok(());
        };

        ibl.load_from_hdr(device, hdr)
            .map_err(|err| RenderError::StepInitialization(err.to_string()))?;
        if hdr.is_some() {
            ibl.set_render_level(0.0);
            ibl.set_intensity(DEFAULT_ENVIRONMENT_INTENSITY);
        }
        // The precomputation ran through its own command buffer.
        self.commands.invalidate_state();
        Ok(())
    }

    /// Sets the render level and intensity of the environment.
    ///
    /// # Panics
    ///
    /// Panics if `render_level` is neither -1.0 nor inside 0.0..=8.0.
    pub fn set_environment_settings(&mut self, render_level: f32, intensity: f32) {
        match ibl_step_mut(&mut self.steps) {
            Some(ibl) => {
                ibl.set_render_level(render_level);
                ibl.set_intensity(intensity);
            }
            None => log::warn!("Environment settings ignored: the IBL step is not configured"),
        }
    }

    /// The framebuffers of the pipeline.
    pub fn debug_views(&self) -> DeferredDebugViews {
        self.framebuffers
    }

    /// The storage buffer holding the luminance histogram and its average.
    pub fn luminance_buffer(&self) -> BufferId {
        self.luminance_buffer
    }

    /// The configured steps, in execution order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// The IBL step, if configured.
    pub fn ibl_step(&self) -> Option<&IblStep> {
        ibl_step(&self.steps)
    }

    /// The placeholder resources of the pipeline.
    pub fn default_resources(&self) -> &DefaultResources {
        &self.defaults
    }

    /// The recorded commands not flushed yet.
    pub fn pending_commands(&self) -> &[Command] {
        self.commands.commands()
    }

    /// What the command buffer believes is bound on the device.
    pub fn command_state(&self) -> &GraphicsState {
        self.commands.state()
    }

    fn release_steps(&mut self) {
        if self.steps.is_empty() {
            return;
        }
        for step in self.steps.drain(..) {
            step.destroy(self.device.as_ref());
        }
        self.commands.invalidate_state();
    }

    fn canvas_size(&self) -> (u32, u32) {
        (self.stats.last_frame.canvas_width, self.stats.last_frame.canvas_height)
    }
}

fn ibl_step(steps: &[PipelineStep]) -> Option<&IblStep> {
    steps.iter().find_map(|step| match step {
        PipelineStep::Ibl(ibl) => Some(ibl),
        _ => None,
    })
}

fn ibl_step_mut(steps: &mut [PipelineStep]) -> Option<&mut IblStep> {
    steps.iter_mut().find_map(|step| match step {
        PipelineStep::Ibl(ibl) => Some(ibl),
        _ => None,
    })
}

fn step_failed(err: StepError) -> RenderError {
    log::error!("Render step creation failed: {err}");
    RenderError::StepInitialization(err.to_string())
}

fn fxaa_step(steps: &[PipelineStep]) -> Option<&FxaaStep> {
    steps.iter().find_map(|step| match step {
        PipelineStep::Fxaa(fxaa) => Some(fxaa),
        _ => None,
    })
}

impl RenderSystem for DeferredPbrRenderSystem {
    fn configure(
        &mut self,
        configuration: &RenderConfiguration,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), RenderError> {
        if configuration.base_pipeline != RenderPipeline::DeferredPbr {
            return Err(RenderError::UnsupportedConfiguration(format!(
                "{:?} cannot be rendered by the deferred PBR render system",
                configuration.base_pipeline
            )));
        }

        surface.set_vsync(configuration.vsync);

        let device = self.device.as_ref();
        let enabled = |step| configuration.is_render_step_enabled(step);
        let (mut ibl, mut fxaa) = (None, None);
        for step in self.steps.drain(..) {
            match step {
                PipelineStep::Ibl(step) if enabled(RenderStep::Ibl) => ibl = Some(step),
                PipelineStep::Fxaa(step) if enabled(RenderStep::Fxaa) => fxaa = Some(step),
                step => {
                    step.destroy(device);
                    // Released names may be handed out again while still cached.
                    self.commands.invalidate_state();
                }
            }
        }

        if enabled(RenderStep::Ibl) && ibl.is_none() {
            match IblStep::create(device, &configuration.ibl) {
                Ok(step) => {
                    ibl = Some(step);
                    // The BRDF integration ran through its own command buffer.
                    self.commands.invalidate_state();
                }
                Err(err) => {
                    if let Some(step) = fxaa {
                        step.destroy(device);
                    }
                    self.commands.invalidate_state();
                    return Err(step_failed(err));
                }
            }
        } else if let Some(step) = ibl.as_mut() {
            step.configure(&configuration.ibl);
        }

        if enabled(RenderStep::Fxaa) && fxaa.is_none() {
            match FxaaStep::create(device, &configuration.fxaa) {
                Ok(step) => fxaa = Some(step),
                Err(err) => {
                    if let Some(step) = ibl {
                        step.destroy(device);
                    }
                    self.commands.invalidate_state();
                    return Err(step_failed(err));
                }
            }
        } else if let Some(step) = fxaa.as_mut() {
            step.configure(&configuration.fxaa);
        }

        self.steps.extend(ibl.map(PipelineStep::Ibl));
        self.steps.extend(fxaa.map(PipelineStep::Fxaa));

        log::info!(
            "Deferred PBR configured: vsync {}, steps {:?}",
            configuration.vsync,
            self.steps.iter().map(PipelineStep::kind).collect::<Vec<_>>()
        );
        Ok(())
    }

    fn begin_render(&mut self, camera: &CameraData) {
        let ring = alive(&mut self.ring);
        let commands = &mut self.commands;
        self.stats.last_frame.reset_counters();

        let Viewport { x, y, width, height } = self.viewport;
        commands.set_viewport(x, y, width, height);
        commands.set_depth_test(true);
        commands.set_depth_func(CompareFunction::Less);
        commands.set_face_culling(true);
        commands.set_cull_face(PolygonFace::Back);

        commands.bind_framebuffer(Some(self.framebuffers.gbuffer));
        commands.clear_framebuffer(
            Some(self.framebuffers.gbuffer),
            ClearOp::color_and_depth(GBUFFER_CLEAR_COLOR),
        );

        commands.bind_shader_program(Some(self.programs.geometry));
        commands.bind_single_uniform(0, UniformValue::Mat4(camera.view_projection.to_cols_array_2d()));

        commands.wait_for_buffer(ring.buffer());
    }

    fn set_mesh_geometry(&mut self, vertex_array: VertexArrayId) {
        self.commands.bind_vertex_array(Some(vertex_array));
    }

    fn set_model_info(&mut self, model: &Mat4, has_normals: bool, has_tangents: bool) {
        let ring = alive(&mut self.ring);
        let record = SceneVertexUniforms::new(model, has_normals, has_tangents);
        record_uniforms(self.device.as_ref(), ring, &mut self.commands, MODEL_BINDING, &record);
        self.stats.last_frame.meshes += 1;
    }

    fn draw_mesh(
        &mut self,
        material: &Material,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: Option<IndexType>,
        instance_count: u32,
    ) {
        let ring = alive(&mut self.ring);
        let commands = &mut self.commands;

        for (unit, texture) in (0u32..).zip(material.texture_slots()) {
            commands.bind_texture(unit, texture.unwrap_or(self.defaults.texture));
        }
        let record = SceneMaterialUniforms::from(material);
        record_uniforms(self.device.as_ref(), ring, commands, MATERIAL_BINDING, &record);

        if material.double_sided {
            commands.set_face_culling(false);
        }
        match index_type {
            Some(index_type) => commands.draw_elements(topology, first, count, index_type, instance_count),
            None => commands.draw_arrays(topology, first, count, instance_count),
        }
        if material.double_sided {
            commands.set_face_culling(true);
        }

        let frame = &mut self.stats.last_frame;
        frame.draw_calls += 1;
        frame.primitives += 1;
        frame.materials += 1;
    }

    fn submit_light(&mut self, light: &DirectionalLight) {
        self.light = *light;
    }

    fn finish_render(&mut self, dt: f32, camera: &mut CameraData) {
        let (width, height) = self.canvas_size();
        let device = self.device.as_ref();
        let ring = alive(&mut self.ring);
        let commands = &mut self.commands;
        let frame = &mut self.stats.last_frame;
        let defaults = &self.defaults;
        let framebuffers = self.framebuffers;
        let attachments = self.attachments;

        // Lighting.
        commands.bind_vertex_array(None);
        commands.bind_shader_program(None);
        commands.bind_framebuffer(Some(framebuffers.hdr_buffer));
        commands.clear_framebuffer(Some(framebuffers.hdr_buffer), ClearOp::color_and_depth(HDR_CLEAR_COLOR));
        commands.set_polygon_mode(PolygonFace::FrontAndBack, PolygonMode::Fill);
        commands.bind_shader_program(Some(self.programs.lighting));

        record_uniforms(
            device,
            ring,
            commands,
            LIGHTING_BINDING,
            &LightingPassUniforms::new(camera, &self.light),
        );
        self.light.intensity = 0.0;

        for (unit, texture) in (GBUFFER_FIRST_UNIT..).zip(attachments.gbuffer) {
            commands.bind_texture(unit, texture);
        }
        let ibl = ibl_step(&self.steps);
        match ibl {
            Some(ibl) => ibl.bind_image_based_light_maps(commands, defaults),
            None => {
                commands.bind_texture(IRRADIANCE_UNIT, defaults.environment);
                commands.bind_texture(PREFILTERED_SPECULAR_UNIT, defaults.environment);
                commands.bind_texture(BRDF_LUT_UNIT, defaults.texture);
            }
        }

        commands.bind_vertex_array(Some(defaults.vertex_array));
        commands.draw_arrays(PrimitiveTopology::Points, 0, 1, 1);
        frame.draw_calls += 1;
        commands.bind_vertex_array(None);
        commands.bind_shader_program(None);

        // Environment.
        if let Some(ibl) = ibl {
            commands.set_depth_func(CompareFunction::LessEqual);
            commands.set_cull_face(PolygonFace::Front);
            if ibl.execute(device, commands, ring, defaults, &rotation_only_view_projection(camera)) {
                frame.draw_calls += 1;
            }
        }

        // Auto exposure.
        if camera.physical.adaptive_exposure {
            commands.bind_shader_program(Some(self.programs.luminance_histogram));
            commands.bind_image_texture(
                0,
                attachments.hdr_color,
                0,
                false,
                0,
                ImageAccess::ReadOnly,
                TextureFormat::Rgba32Float,
            );
            commands.bind_buffer(1, self.luminance_buffer, BufferTarget::ShaderStorage);
            commands.bind_single_uniform(
                1,
                UniformValue::Vec2([
                    LuminanceHistogram::MIN_LOG_LUMINANCE,
                    1.0 / LuminanceHistogram::LOG_LUMINANCE_RANGE,
                ]),
            );
            commands.dispatch_compute(
                width.div_ceil(LUMINANCE_WORK_GROUP_SIZE),
                height.div_ceil(LUMINANCE_WORK_GROUP_SIZE),
                1,
            );
            commands.add_memory_barrier(MemoryBarrierFlags::SHADER_STORAGE);

            commands.bind_shader_program(Some(self.programs.luminance_reduction));
            commands.bind_buffer(0, self.luminance_buffer, BufferTarget::ShaderStorage);
            commands.bind_single_uniform(
                0,
                UniformValue::Vec4([
                    adaptation_coefficient(dt),
                    (width * height) as f32,
                    LuminanceHistogram::MIN_LOG_LUMINANCE,
                    LuminanceHistogram::LOG_LUMINANCE_RANGE,
                ]),
            );
            commands.dispatch_compute(1, 1, 1);
            commands.add_memory_barrier(MemoryBarrierFlags::SHADER_STORAGE | MemoryBarrierFlags::CLIENT_MAPPED_BUFFER);
            commands.execute(device);

            match device.read_mapped_buffer(self.luminance_buffer, LuminanceHistogram::LUMINANCE_OFFSET, 4) {
                Ok(bytes) => {
                    let luminance: f32 = bytemuck::pod_read_unaligned(&bytes);
                    apply_auto_exposure(luminance, &mut camera.physical);
                    log::trace!("Average luminance {luminance}, exposure {:?}", camera.physical);
                }
                Err(err) => log::error!("Reading back the average luminance failed: {err}"),
            }
        } else {
            commands.execute(device);
        }

        // Composite.
        commands.bind_framebuffer(Some(framebuffers.backbuffer));
        commands.clear_framebuffer(Some(framebuffers.backbuffer), ClearOp::color_and_depth(HDR_CLEAR_COLOR));
        commands.set_depth_func(CompareFunction::Less);
        commands.set_cull_face(PolygonFace::Back);
        commands.bind_shader_program(Some(self.programs.composite));

        camera.physical = camera.physical.clamped();
        commands.bind_single_uniform(1, UniformValue::Float(camera_exposure(&camera.physical)));
        commands.bind_texture(0, attachments.hdr_color);
        commands.bind_vertex_array(Some(defaults.vertex_array));
        commands.draw_arrays(PrimitiveTopology::Points, 0, 1, 1);
        frame.draw_calls += 1;

        // End.
        commands.bind_framebuffer(None);
        commands.bind_shader_program(None);
        commands.clear_framebuffer(
            None,
            ClearOp {
                flags: ClearFlags::COLOR_AND_DEPTH_STENCIL,
                mask: AttachmentMask::All,
                color: SURFACE_CLEAR_COLOR,
            },
        );
        if let Some(fxaa) = fxaa_step(&self.steps) {
            fxaa.execute(device, commands, ring, defaults, attachments.backbuffer_color, (width, height));
            frame.draw_calls += 1;
        }

        commands.lock_buffer(ring.buffer());
        commands.execute(device);
        ring.reset();
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        assert!(
            x >= 0 && y >= 0 && width >= 0 && height >= 0,
            "Invalid viewport ({x}, {y}, {width}, {height})"
        );
        self.viewport = Viewport { x, y, width, height };

        let (width, height) = (width as u32, height as u32);
        self.stats.last_frame.canvas_width = width;
        self.stats.last_frame.canvas_height = height;
        if width == 0 || height == 0 {
            // A minimized surface; the attachments keep their last extent.
            log::debug!("Deferred PBR output collapsed to {width}x{height}, framebuffers kept");
            return;
        }

        for framebuffer in self.framebuffers.all() {
            if let Err(err) = self.device.resize_framebuffer(framebuffer, width, height) {
                panic!("Resizing framebuffer {framebuffer:?} failed: {err}");
            }
        }
        log::debug!("Deferred PBR output resized to {width}x{height}");
    }

    fn base_render_pipeline(&self) -> RenderPipeline {
        RenderPipeline::DeferredPbr
    }

    fn hardware_stats(&self) -> &HardwareStats {
        &self.stats
    }

    fn destroy(&mut self) {
        let Some(ring) = self.ring.take() else {
            return;
        };
        self.release_steps();

        let device = self.device.as_ref();
        // A frame left half recorded is dropped; the last submitted one still fences the ring.
        self.commands.discard();
        self.commands.wait_for_buffer(ring.buffer());
        self.commands.execute(device);
        ring.destroy(device);
        if let Err(err) = device.unmap_buffer(self.luminance_buffer) {
            log::warn!("Failed to unmap the luminance buffer: {err}");
        }
        GpuResource::Buffer(self.luminance_buffer).release(device);
        for resource in self.defaults.resources() {
            resource.release(device);
        }
        for resource in self.programs.resources() {
            resource.release(device);
        }
        for framebuffer in self.framebuffers.all() {
            GpuResource::Framebuffer(framebuffer).release(device);
        }
        if self.owns_debug_callback {
            device.set_debug_callback(None);
        }
        log::debug!("Deferred PBR render system destroyed");
    }
}

impl Drop for DeferredPbrRenderSystem {
    fn drop(&mut self) {
        self.destroy();
    }
}
