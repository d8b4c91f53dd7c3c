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

#![allow(dead_code)]

use lumen_core::math::{Mat4, Vec3};
use lumen_core::renderer::*;
use lumen_infra::graphics::headless::{DeviceCall, HeadlessDevice};
use lumen_infra::logging::init_test_logging;
use lumen_lanes::render_lane::DeferredPbrRenderSystem;
use std::borrow::Cow;
use std::sync::Arc;

pub fn headless_device() -> Arc<HeadlessDevice> {
    init_test_logging();
    Arc::new(HeadlessDevice::new())
}

pub fn render_system(device: &Arc<HeadlessDevice>, width: u32, height: u32) -> DeferredPbrRenderSystem {
    let device: Arc<dyn GraphicsDevice> = device.clone();
    DeferredPbrRenderSystem::create(device, width, height).unwrap()
}

pub fn camera(width: u32, height: u32) -> CameraData {
    CameraData::look_at(
        Vec3::new(0.0, 1.0, 5.0),
        Vec3::ZERO,
        60f32.to_radians(),
        width as f32 / height as f32,
    )
    .unwrap()
}

/// A triangle list mesh with one vertex buffer, ready for `set_mesh_geometry`.
pub fn triangle_mesh(device: &HeadlessDevice) -> (BufferId, VertexArrayId) {
    let vertices: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let buffer = device
        .create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("Triangle")),
                size: std::mem::size_of_val(&vertices) as u64,
                target: BufferTarget::Vertex,
                access: BufferAccess::NONE,
            },
            bytemuck::cast_slice(&vertices),
        )
        .unwrap();
    let vertex_array = device
        .create_vertex_array(&VertexArrayDescriptor {
            label: Some(Cow::Borrowed("Triangle")),
            vertex_buffer: Some(buffer),
            stride: 12,
            attributes: vec![VertexAttribute {
                location: 0,
                components: 3,
                offset: 0,
            }],
            index_buffer: None,
        })
        .unwrap();
    (buffer, vertex_array)
}

/// A 2x1 equirectangular HDR image.
pub fn hdr_image(device: &HeadlessDevice) -> TextureId {
    let texels = [4.0f32, 2.0, 1.0, 1.0, 0.5, 0.5, 0.5, 1.0];
    device
        .create_texture_with_data(
            &TextureDescriptor {
                label: Some(Cow::Borrowed("Sky")),
                kind: TextureKind::D2,
                format: TextureFormat::Rgba32Float,
                width: 2,
                height: 1,
                mip_levels: 1,
                min_filter: FilterMode::Linear,
                mag_filter: FilterMode::Linear,
                address_mode: AddressMode::ClampToEdge,
            },
            bytemuck::cast_slice(&texels),
        )
        .unwrap()
}

pub fn render_empty_frame(system: &mut DeferredPbrRenderSystem, camera: &mut CameraData) {
    system.begin_render(camera);
    system.finish_render(1.0 / 60.0, camera);
}

pub fn render_one_mesh(
    system: &mut DeferredPbrRenderSystem,
    camera: &mut CameraData,
    vertex_array: VertexArrayId,
    material: &Material,
) {
    system.begin_render(camera);
    system.set_mesh_geometry(vertex_array);
    system.set_model_info(&Mat4::IDENTITY, true, false);
    system.draw_mesh(material, PrimitiveTopology::Triangles, 0, 3, None, 1);
    system.finish_render(1.0 / 60.0, camera);
}

pub fn draws(calls: &[DeviceCall]) -> usize {
    calls.iter().filter(|call| call.is_draw()).count()
}

pub fn dispatches(calls: &[DeviceCall]) -> Vec<(u32, u32, u32)> {
    calls
        .iter()
        .filter_map(|call| match *call {
            DeviceCall::DispatchCompute { x, y, z } => Some((x, y, z)),
            _ => None,
        })
        .collect()
}

/// The texture bound to `unit` by the last `BindTexture` call before `before`.
pub fn texture_bound_at(calls: &[DeviceCall], unit: u32, before: usize) -> Option<TextureId> {
    calls[..before].iter().rev().find_map(|call| match *call {
        DeviceCall::BindTexture { unit: bound, texture } if bound == unit => Some(texture),
        _ => None,
    })
}

/// Index of the first call for which `predicate` holds.
pub fn position(calls: &[DeviceCall], predicate: impl Fn(&DeviceCall) -> bool) -> usize {
    calls
        .iter()
        .position(predicate)
        .unwrap_or_else(|| panic!("No matching call in {calls:#?}"))
}
