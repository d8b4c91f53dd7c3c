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

//! The device state cache consulted while commands are replayed.

use crate::renderer::api::*;
use std::collections::HashMap;

/// Updates a cached slot and reports whether the device must be told.
///
/// An empty slot means the device state is unknown, so the first write always goes through.
#[inline]
fn update<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        false
    } else {
        *slot = Some(value);
        true
    }
}

/// A record of the state last sent to the device.
///
/// Every setter returns `true` if the new value differs from the cached one,
/// in which case the caller issues the device call. The cache is only touched
/// during [`CommandBuffer::execute`](super::CommandBuffer::execute).
#[derive(Debug, Default)]
pub struct GraphicsState {
    viewport: Option<Viewport>,
    depth_test: Option<bool>,
    depth_func: Option<CompareFunction>,
    face_culling: Option<bool>,
    cull_face: Option<PolygonFace>,
    polygon_mode: Option<(PolygonFace, PolygonMode)>,
    blending: Option<bool>,
    blend_factors: Option<(BlendFactor, BlendFactor)>,
    framebuffer: Option<Option<FramebufferId>>,
    shader_program: Option<Option<ShaderProgramId>>,
    vertex_array: Option<Option<VertexArrayId>>,
    textures: HashMap<u32, TextureId>,
    buffer_fences: HashMap<BufferId, FenceId>,
    skipped_calls: u64,
}

impl GraphicsState {
    /// Creates a cache that knows nothing about the device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every cached binding so the next commands reach the device.
    ///
    /// Call this after something else changed device state behind the cache's back.
    /// Pending buffer fences are kept.
    pub fn invalidate(&mut self) {
        let buffer_fences = std::mem::take(&mut self.buffer_fences);
        let skipped_calls = self.skipped_calls;
        *self = Self {
            buffer_fences,
            skipped_calls,
            ..Self::default()
        };
    }

    /// The number of state changes dropped because they matched the cache.
    pub fn skipped_calls(&self) -> u64 {
        self.skipped_calls
    }

    fn track(&mut self, changed: bool) -> bool {
        if !changed {
            self.skipped_calls += 1;
        }
        changed
    }

    /// Caches the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        let changed = update(&mut self.viewport, viewport);
        self.track(changed)
    }

    /// Caches the depth test switch.
    pub fn set_depth_test(&mut self, enabled: bool) -> bool {
        let changed = update(&mut self.depth_test, enabled);
        self.track(changed)
    }

    /// Caches the depth comparison.
    pub fn set_depth_func(&mut self, func: CompareFunction) -> bool {
        let changed = update(&mut self.depth_func, func);
        self.track(changed)
    }

    /// Caches the face culling switch.
    pub fn set_face_culling(&mut self, enabled: bool) -> bool {
        let changed = update(&mut self.face_culling, enabled);
        self.track(changed)
    }

    /// Caches the culled face.
    pub fn set_cull_face(&mut self, face: PolygonFace) -> bool {
        let changed = update(&mut self.cull_face, face);
        self.track(changed)
    }

    /// Caches the polygon mode.
    pub fn set_polygon_mode(&mut self, face: PolygonFace, mode: PolygonMode) -> bool {
        let changed = update(&mut self.polygon_mode, (face, mode));
        self.track(changed)
    }

    /// Caches the blending switch.
    pub fn set_blending(&mut self, enabled: bool) -> bool {
        let changed = update(&mut self.blending, enabled);
        self.track(changed)
    }

    /// Caches the blend factors.
    pub fn set_blend_factors(&mut self, source: BlendFactor, destination: BlendFactor) -> bool {
        let changed = update(&mut self.blend_factors, (source, destination));
        self.track(changed)
    }

    /// Caches the bound framebuffer.
    pub fn bind_framebuffer(&mut self, id: Option<FramebufferId>) -> bool {
        let changed = update(&mut self.framebuffer, id);
        self.track(changed)
    }

    /// Caches the bound shader program.
    pub fn bind_shader_program(&mut self, id: Option<ShaderProgramId>) -> bool {
        let changed = update(&mut self.shader_program, id);
        self.track(changed)
    }

    /// Caches the bound vertex array.
    pub fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> bool {
        let changed = update(&mut self.vertex_array, id);
        self.track(changed)
    }

    /// Caches the texture bound to a unit.
    pub fn bind_texture(&mut self, unit: u32, id: TextureId) -> bool {
        let changed = self.textures.insert(unit, id) != Some(id);
        self.track(changed)
    }

    /// The currently bound shader program, if known.
    pub fn shader_program(&self) -> Option<Option<ShaderProgramId>> {
        self.shader_program
    }

    /// The texture cached for a unit.
    pub fn texture(&self, unit: u32) -> Option<TextureId> {
        self.textures.get(&unit).copied()
    }

    /// Registers the fence guarding a buffer's latest GPU use, returning the one it replaces.
    pub fn set_buffer_fence(&mut self, buffer: BufferId, fence: FenceId) -> Option<FenceId> {
        self.buffer_fences.insert(buffer, fence)
    }

    /// Removes and returns the fence guarding a buffer.
    pub fn take_buffer_fence(&mut self, buffer: BufferId) -> Option<FenceId> {
        self.buffer_fences.remove(&buffer)
    }

    /// Returns `true` if a fence is pending for `buffer`.
    pub fn has_buffer_fence(&self, buffer: BufferId) -> bool {
        self.buffer_fences.contains_key(&buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_always_goes_through() {
        let mut state = GraphicsState::new();
        assert!(state.set_depth_test(false));
        assert!(state.bind_framebuffer(None));
        assert!(state.bind_texture(0, TextureId(3)));
    }

    #[test]
    fn repeated_values_are_skipped() {
        let mut state = GraphicsState::new();
        assert!(state.bind_shader_program(Some(ShaderProgramId(1))));
        assert!(!state.bind_shader_program(Some(ShaderProgramId(1))));
        assert!(state.bind_shader_program(None));
        assert!(state.bind_texture(0, TextureId(3)));
        assert!(!state.bind_texture(0, TextureId(3)));
        assert!(state.bind_texture(0, TextureId(4)));
        assert_eq!(state.skipped_calls(), 2);
    }

    #[test]
    fn invalidate_keeps_fences() {
        let mut state = GraphicsState::new();
        state.set_cull_face(PolygonFace::Back);
        state.set_buffer_fence(BufferId(7), FenceId(1));
        state.invalidate();
        assert!(state.set_cull_face(PolygonFace::Back));
        assert!(state.has_buffer_fence(BufferId(7)));
        assert_eq!(state.take_buffer_fence(BufferId(7)), Some(FenceId(1)));
        assert!(!state.has_buffer_fence(BufferId(7)));
    }
}
