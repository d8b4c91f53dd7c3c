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

mod common;

use common::MockGraphicsDevice;
use lumen_core::renderer::*;

#[test]
fn execute_replays_in_recording_order_and_drains() {
    let device = MockGraphicsDevice::new(256);
    let mut commands = CommandBuffer::new();

    commands.set_depth_test(true);
    commands.bind_framebuffer(None);
    commands.dispatch_compute(4, 4, 6);
    commands.draw_arrays(PrimitiveTopology::Points, 0, 1, 1);
    assert_eq!(commands.len(), 4);

    commands.execute(&device);

    assert!(commands.is_empty());
    assert_eq!(
        device.calls(),
        vec![
            "set_depth_test(true)",
            "bind_framebuffer(None)",
            "dispatch_compute(4,4,6)",
            "draw_arrays(0,1)",
        ]
    );
}

#[test]
fn redundant_state_changes_reach_the_device_once() {
    let device = MockGraphicsDevice::new(256);
    let mut commands = CommandBuffer::new();

    commands.set_face_culling(true);
    commands.set_face_culling(true);
    commands.set_cull_face(PolygonFace::Back);
    commands.bind_texture(0, TextureId(7));
    commands.bind_texture(0, TextureId(7));
    commands.bind_texture(1, TextureId(7));
    commands.execute(&device);

    assert_eq!(
        device.calls(),
        vec![
            "set_face_culling(true)",
            "set_cull_face(Back)",
            "bind_texture(0,7)",
            "bind_texture(1,7)",
        ]
    );
    assert_eq!(commands.state().skipped_calls(), 2);

    // The cache survives across executions of the same buffer.
    device.clear_calls();
    commands.set_face_culling(true);
    commands.set_face_culling(false);
    commands.execute(&device);
    assert_eq!(device.calls(), vec!["set_face_culling(false)"]);
}

#[test]
fn invalidated_state_reissues_bindings() {
    let device = MockGraphicsDevice::new(256);
    let mut commands = CommandBuffer::new();

    commands.bind_shader_program(Some(ShaderProgramId(3)));
    commands.execute(&device);
    commands.invalidate_state();
    commands.bind_shader_program(Some(ShaderProgramId(3)));
    commands.execute(&device);

    assert_eq!(
        device.calls(),
        vec!["bind_shader_program(Some(3))", "bind_shader_program(Some(3))"]
    );
}

#[test]
fn clears_draws_and_uniforms_are_never_deduplicated() {
    let device = MockGraphicsDevice::new(256);
    let mut commands = CommandBuffer::new();
    let op = ClearOp::color_and_depth([0.0, 0.0, 0.0, 1.0]);

    commands.clear_framebuffer(None, op);
    commands.clear_framebuffer(None, op);
    commands.bind_single_uniform(1, UniformValue::Float(0.5));
    commands.bind_single_uniform(1, UniformValue::Float(0.5));
    commands.draw_arrays(PrimitiveTopology::Points, 0, 1, 1);
    commands.draw_arrays(PrimitiveTopology::Points, 0, 1, 1);
    commands.execute(&device);

    assert_eq!(device.calls().len(), 6);
}

#[test]
fn lock_then_wait_uses_a_single_fence() {
    let device = MockGraphicsDevice::new(256);
    let ring = BufferId(42);
    let mut commands = CommandBuffer::new();

    commands.lock_buffer(ring);
    commands.execute(&device);
    assert!(commands.state().has_buffer_fence(ring));

    commands.wait_for_buffer(ring);
    commands.execute(&device);
    assert!(!commands.state().has_buffer_fence(ring));

    let calls = device.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("insert_fence("));
    let fence = calls[0].trim_start_matches("insert_fence(").trim_end_matches(')');
    assert_eq!(calls[1], format!("wait_fence({fence})"));
    assert_eq!(calls[2], format!("delete_fence({fence})"));
}

#[test]
fn wait_without_lock_does_nothing() {
    let device = MockGraphicsDevice::new(256);
    let mut commands = CommandBuffer::new();

    commands.wait_for_buffer(BufferId(1));
    commands.execute(&device);

    assert!(device.calls().is_empty());
}

#[test]
fn locking_twice_releases_the_stale_fence() {
    let device = MockGraphicsDevice::new(256);
    let ring = BufferId(5);
    let mut commands = CommandBuffer::new();

    commands.lock_buffer(ring);
    commands.lock_buffer(ring);
    commands.execute(&device);

    let calls = device.calls();
    assert_eq!(calls.len(), 3);
    let first = calls[0].trim_start_matches("insert_fence(").trim_end_matches(')');
    assert_eq!(calls[2], format!("delete_fence({first})"));
    assert!(commands.state().has_buffer_fence(ring));
}

#[test]
fn invalidation_keeps_pending_fences() {
    let device = MockGraphicsDevice::new(256);
    let ring = BufferId(9);
    let mut commands = CommandBuffer::new();

    commands.lock_buffer(ring);
    commands.execute(&device);
    commands.invalidate_state();

    assert!(commands.state().has_buffer_fence(ring));
}

#[test]
fn discard_drops_commands_but_keeps_fences() {
    let device = MockGraphicsDevice::new(256);
    let ring = BufferId(9);
    let mut commands = CommandBuffer::new();

    commands.lock_buffer(ring);
    commands.execute(&device);
    commands.draw_arrays(PrimitiveTopology::Points, 0, 1, 1);
    commands.discard();
    device.clear_calls();
    commands.wait_for_buffer(ring);
    commands.execute(&device);

    let calls = device.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("wait_fence"));
    assert!(calls[1].starts_with("delete_fence"));
}

#[test]
#[should_panic(expected = "failed")]
fn replaying_a_released_resource_panics() {
    let device = MockGraphicsDevice::new(256);
    let texture = device
        .create_texture(&TextureDescriptor::attachment("released", TextureFormat::Rgba8, 4, 4))
        .unwrap();
    let mut commands = CommandBuffer::new();

    commands.bind_texture(0, texture);
    device.destroy_texture(texture).unwrap();
    commands.execute(&device);
}
