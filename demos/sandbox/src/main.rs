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

// Lumen Sandbox
// Renders a few frames of a lit triangle through the headless backend.
//
// Usage: sandbox [render-configuration.json]

use std::borrow::Cow;
use std::mem;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::math::{Mat4, Vec3, Vec4};
use lumen_core::platform::RenderSurface;
use lumen_core::renderer::*;
use lumen_infra::graphics::headless::HeadlessDevice;
use lumen_infra::logging::init_logging;
use lumen_infra::platform::HeadlessSurface;
use lumen_lanes::render_lane::DeferredPbrRenderSystem;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const FRAME_COUNT: u32 = 4;
const FRAME_TIME: f32 = 1.0 / 60.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.5, 0.0],
        normal: [0.0, 0.0, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        normal: [0.0, 0.0, 1.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        normal: [0.0, 0.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2];

struct Triangle {
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    vertex_array: VertexArrayId,
}

impl Triangle {
    fn create(device: &dyn GraphicsDevice) -> Result<Self> {
        let vertex_buffer = device
            .create_buffer_with_data(
                &BufferDescriptor {
                    label: Some(Cow::Borrowed("Triangle Vertices")),
                    size: mem::size_of_val(VERTICES) as u64,
                    target: BufferTarget::Vertex,
                    access: BufferAccess::NONE,
                },
                bytemuck::cast_slice(VERTICES),
            )
            .context("Failed to create the vertex buffer")?;
        let index_buffer = device
            .create_buffer_with_data(
                &BufferDescriptor {
                    label: Some(Cow::Borrowed("Triangle Indices")),
                    size: mem::size_of_val(INDICES) as u64,
                    target: BufferTarget::Index,
                    access: BufferAccess::NONE,
                },
                bytemuck::cast_slice(INDICES),
            )
            .context("Failed to create the index buffer")?;
        let vertex_array = device
            .create_vertex_array(&VertexArrayDescriptor {
                label: Some(Cow::Borrowed("Triangle")),
                vertex_buffer: Some(vertex_buffer),
                stride: mem::size_of::<Vertex>() as u32,
                attributes: vec![
                    // location 0: position
                    VertexAttribute {
                        location: 0,
                        components: 3,
                        offset: 0,
                    },
                    // location 1: normal
                    VertexAttribute {
                        location: 1,
                        components: 3,
                        offset: mem::size_of::<[f32; 3]>() as u32,
                    },
                ],
                index_buffer: Some(index_buffer),
            })
            .context("Failed to create the vertex array")?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_array,
        })
    }

    fn destroy(self, device: &dyn GraphicsDevice) -> Result<()> {
        device.destroy_vertex_array(self.vertex_array)?;
        device.destroy_buffer(self.index_buffer)?;
        device.destroy_buffer(self.vertex_buffer)?;
        Ok(())
    }
}

/// A small gradient sky, standing in for an equirectangular HDR file.
fn create_sky(device: &dyn GraphicsDevice) -> Result<TextureId> {
    const SKY_WIDTH: u32 = 8;
    const SKY_HEIGHT: u32 = 4;
    let texels: Vec<[f32; 4]> = (0..SKY_WIDTH * SKY_HEIGHT)
        .map(|texel| {
            let height = (texel / SKY_WIDTH) as f32 / (SKY_HEIGHT - 1) as f32;
            [4.0 - 3.0 * height, 4.0 - 2.0 * height, 6.0, 1.0]
        })
        .collect();

    let sky = device
        .create_texture_with_data(
            &TextureDescriptor {
                label: Some(Cow::Borrowed("Sky")),
                kind: TextureKind::D2,
                format: TextureFormat::Rgba32Float,
                width: SKY_WIDTH,
                height: SKY_HEIGHT,
                mip_levels: 1,
                min_filter: FilterMode::Linear,
                mag_filter: FilterMode::Linear,
                address_mode: AddressMode::Repeat,
            },
            bytemuck::cast_slice(&texels),
        )
        .context("Failed to create the sky texture")?;
    Ok(sky)
}

fn load_configuration() -> Result<RenderConfiguration> {
    match std::env::args().nth(1) {
        Some(path) => RenderConfiguration::load(path),
        None => {
            let mut configuration = RenderConfiguration::new(RenderPipeline::DeferredPbr, true);
            configuration
                .enable_render_step(RenderStep::Ibl)
                .enable_render_step(RenderStep::Fxaa);
            configuration.ibl.render_level = 0.0;
            Ok(configuration)
        }
    }
}

fn main() -> Result<()> {
    init_logging("info")?;
    log::info!("Starting Lumen Sandbox...");

    let configuration = load_configuration()?;
    let device = Arc::new(HeadlessDevice::new());
    let mut surface = HeadlessSurface::new(WIDTH, HEIGHT);

    let mut render_system = DeferredPbrRenderSystem::create(device.clone(), WIDTH, HEIGHT)?;
    render_system.configure(&configuration, &mut surface)?;

    let sky = create_sky(device.as_ref())?;
    render_system.set_environment_texture(Some(sky))?;
    let triangle = Triangle::create(device.as_ref())?;

    let mut camera = CameraData::look_at(
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::ZERO,
        45f32.to_radians(),
        WIDTH as f32 / HEIGHT as f32,
    )
    .context("Degenerate camera")?;
    camera.physical.adaptive_exposure = true;

    let material = Material {
        base_color: Vec4::new(0.9, 0.3, 0.2, 1.0),
        roughness: 0.4,
        double_sided: true,
        ..Default::default()
    };
    let sun = DirectionalLight {
        direction: Vec3::new(-0.3, -1.0, -0.5).normalize(),
        color: Vec3::ONE,
        intensity: 100_000.0,
    };

    for frame in 0..FRAME_COUNT {
        let model = Mat4::from_translation(Vec3::new(0.0, 0.1 * frame as f32, 0.0));

        render_system.begin_render(&camera);
        render_system.set_mesh_geometry(triangle.vertex_array);
        render_system.set_model_info(&model, true, false);
        render_system.draw_mesh(
            &material,
            PrimitiveTopology::Triangles,
            0,
            INDICES.len() as u32,
            Some(IndexType::UShort),
            1,
        );
        render_system.submit_light(&sun);
        render_system.finish_render(FRAME_TIME, &mut camera);
        surface.swap_buffers();

        let stats = render_system.hardware_stats();
        log::info!(
            "Frame {frame}: {} draw calls, exposure f/{:.1} 1/{:.0}s ISO {:.0}",
            stats.last_frame.draw_calls,
            camera.physical.aperture,
            1.0 / camera.physical.shutter_speed,
            camera.physical.iso
        );
    }

    render_system.destroy();
    triangle.destroy(device.as_ref())?;
    device.destroy_texture(sky)?;

    let leaked = device.live_resources();
    log::info!(
        "Rendered {} frames on {}, {} resources left",
        surface.swap_count(),
        render_system.hardware_stats().api_version,
        leaked.total()
    );
    Ok(())
}
