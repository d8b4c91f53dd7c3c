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

use lumen_core::renderer::*;
use lumen_infra::graphics::headless::{DeviceCall, HeadlessDevice};
use std::borrow::Cow;

fn quad_program(device: &HeadlessDevice) -> ShaderProgramId {
    device
        .create_shader_program(&ShaderProgramDescriptor::graphics(
            "Quad",
            "shaders/quad.vert",
            None,
            "shaders/quad.frag",
        ))
        .unwrap()
}

#[test]
fn replay_reaches_the_device_in_submission_order() {
    let device = HeadlessDevice::new();
    let program = quad_program(&device);
    let mut commands = CommandBuffer::new();

    commands.set_depth_test(false);
    commands.bind_shader_program(Some(program));
    commands.draw_arrays(PrimitiveTopology::Triangles, 0, 3, 1);
    commands.bind_shader_program(None);
    commands.execute(&device);

    assert_eq!(
        device.take_calls(),
        vec![
            DeviceCall::SetDepthTest(false),
            DeviceCall::BindShaderProgram(Some(program)),
            DeviceCall::DrawArrays {
                topology: PrimitiveTopology::Triangles,
                first: 0,
                count: 3,
                instance_count: 1,
            },
            DeviceCall::BindShaderProgram(None),
        ]
    );
    assert!(commands.is_empty());
}

#[test]
fn ring_records_are_visible_through_bound_ranges() {
    let device = HeadlessDevice::with_alignment(256);
    let mut ring = FrameUniformRing::new(&device, 4096).unwrap();
    let mut commands = CommandBuffer::new();

    let first = ring.push_pod(&device, &[1.0f32, 2.0, 3.0, 4.0]).unwrap();
    let second = ring.push_pod(&device, &7u32).unwrap();
    commands.bind_uniform_buffer_range(0, ring.buffer(), first, 16);
    commands.bind_uniform_buffer_range(1, ring.buffer(), second, 4);
    commands.execute(&device);

    assert_eq!((first, second), (0, 256));
    assert_eq!(device.read_pod::<[f32; 4]>(ring.buffer(), first), Some([1.0, 2.0, 3.0, 4.0]));
    assert_eq!(device.read_pod::<u32>(ring.buffer(), second), Some(7));
    let bound: Vec<_> = device
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            DeviceCall::BindBuffer { index, range, .. } => Some((index, range)),
            _ => None,
        })
        .collect();
    assert_eq!(bound, vec![(0, Some((0, 16))), (1, Some((256, 4)))]);

    ring.destroy(&device);
    assert_eq!(device.live_resources().buffers, 0);
}

#[test]
fn locking_the_ring_twice_keeps_one_fence_alive() {
    let device = HeadlessDevice::new();
    let ring = FrameUniformRing::new(&device, 1024).unwrap();
    let mut commands = CommandBuffer::new();

    commands.wait_for_buffer(ring.buffer());
    commands.lock_buffer(ring.buffer());
    commands.execute(&device);
    commands.wait_for_buffer(ring.buffer());
    commands.lock_buffer(ring.buffer());
    commands.execute(&device);

    assert_eq!(device.live_resources().fences, 1);
    let waits = device
        .calls()
        .iter()
        .filter(|call| matches!(call, DeviceCall::WaitFence(_)))
        .count();
    assert_eq!(waits, 1);
}

#[test]
fn compute_work_binds_image_levels() {
    let device = HeadlessDevice::new();
    let texture = device
        .create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("Target")),
            mip_levels: 4,
            kind: TextureKind::Cube,
            ..TextureDescriptor::attachment("Target", TextureFormat::Rgba16Float, 64, 64)
        })
        .unwrap();
    let program = device
        .create_shader_program(&ShaderProgramDescriptor::compute("Fill", "shaders/fill.comp"))
        .unwrap();
    let mut commands = CommandBuffer::new();

    commands.bind_shader_program(Some(program));
    commands.bind_image_texture(0, texture, 3, true, 0, ImageAccess::WriteOnly, TextureFormat::Rgba16Float);
    commands.dispatch_compute(1, 1, 6);
    commands.add_memory_barrier(MemoryBarrierFlags::SHADER_IMAGE_ACCESS);
    commands.execute(&device);

    assert_eq!(device.is_compute_program(program), Some(true));
    assert_eq!(device.calls().iter().filter(|call| call.is_work()).count(), 1);
    assert!(device.calls().iter().all(|call| !call.is_draw()));
}
