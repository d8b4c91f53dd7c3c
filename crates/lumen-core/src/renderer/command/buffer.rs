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

//! Defines the [`CommandBuffer`], the record-then-replay layer between render
//! systems and a [`GraphicsDevice`].

use super::command::Command;
use super::state::GraphicsState;
use crate::renderer::api::*;
use crate::renderer::traits::GraphicsDevice;

/// An ordered, growable sequence of [`Command`]s with its device state cache.
///
/// Recording never touches the device. [`execute`](CommandBuffer::execute)
/// replays the sequence in submission order against the cache, which drops
/// state changes the device already has, then leaves the buffer empty.
///
/// A command buffer is not meant to be shared between threads while recording.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    state: GraphicsState,
}

impl CommandBuffer {
    /// Creates an empty command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty command buffer with room for `capacity` commands.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            state: GraphicsState::new(),
        }
    }

    /// Appends a command to the sequence.
    #[inline]
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// The number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no command is recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The recorded commands, in submission order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The device state cache.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Forgets cached device state, e.g. after another command buffer ran on the same device.
    pub fn invalidate_state(&mut self) {
        self.state.invalidate();
    }

    /// Drops the recorded commands without replaying them. Cached state and
    /// buffer fences are kept.
    pub fn discard(&mut self) {
        self.commands.clear();
    }

    /// Replays every recorded command in order, then empties the buffer.
    ///
    /// # Panics
    ///
    /// Panics if the device rejects a command. Commands reference resources
    /// without owning them, so a failure here means a resource was released
    /// while still recorded.
    pub fn execute(&mut self, device: &dyn GraphicsDevice) {
        log::trace!("Executing {} recorded commands", self.commands.len());
        for command in self.commands.drain(..) {
            if let Err(err) = command.apply(device, &mut self.state) {
                panic!("Replaying {command:?} failed: {err}");
            }
        }
    }

    // --- Typed recording helpers ---

    /// Records a viewport change.
    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.submit(Command::SetViewport(Viewport {
            x,
            y,
            width,
            height,
        }));
    }

    /// Records enabling or disabling the depth test.
    pub fn set_depth_test(&mut self, enabled: bool) {
        self.submit(Command::SetDepthTest(enabled));
    }

    /// Records a depth comparison change.
    pub fn set_depth_func(&mut self, func: CompareFunction) {
        self.submit(Command::SetDepthFunc(func));
    }

    /// Records enabling or disabling face culling.
    pub fn set_face_culling(&mut self, enabled: bool) {
        self.submit(Command::SetFaceCulling(enabled));
    }

    /// Records a culled face change.
    pub fn set_cull_face(&mut self, face: PolygonFace) {
        self.submit(Command::SetCullFace(face));
    }

    /// Records a polygon mode change.
    pub fn set_polygon_mode(&mut self, face: PolygonFace, mode: PolygonMode) {
        self.submit(Command::SetPolygonMode { face, mode });
    }

    /// Records enabling or disabling blending.
    pub fn set_blending(&mut self, enabled: bool) {
        self.submit(Command::SetBlending(enabled));
    }

    /// Records a blend factor change.
    pub fn set_blend_factors(&mut self, source: BlendFactor, destination: BlendFactor) {
        self.submit(Command::SetBlendFactors {
            source,
            destination,
        });
    }

    /// Records a framebuffer binding. `None` selects the default surface.
    pub fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.submit(Command::BindFramebuffer(framebuffer));
    }

    /// Records a clear of `framebuffer`, or of the default surface.
    pub fn clear_framebuffer(&mut self, framebuffer: Option<FramebufferId>, op: ClearOp) {
        self.submit(Command::ClearFramebuffer { framebuffer, op });
    }

    /// Records a shader program binding. `None` unbinds.
    pub fn bind_shader_program(&mut self, program: Option<ShaderProgramId>) {
        self.submit(Command::BindShaderProgram(program));
    }

    /// Records a vertex array binding. `None` unbinds.
    pub fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.submit(Command::BindVertexArray(vertex_array));
    }

    /// Records a uniform value for the program bound at replay time.
    pub fn bind_single_uniform(&mut self, location: u32, value: UniformValue) {
        self.submit(Command::BindSingleUniform { location, value });
    }

    /// Records binding `size` bytes of `buffer` at `offset` to uniform block `index`.
    pub fn bind_uniform_buffer_range(&mut self, index: u32, buffer: BufferId, offset: u64, size: u64) {
        self.submit(Command::BindUniformBufferRange {
            index,
            buffer,
            offset,
            size,
        });
    }

    /// Records binding a whole buffer to an indexed binding point.
    pub fn bind_buffer(&mut self, index: u32, buffer: BufferId, target: BufferTarget) {
        self.submit(Command::BindBuffer {
            index,
            buffer,
            target,
        });
    }

    /// Records a texture binding.
    pub fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.submit(Command::BindTexture { unit, texture });
    }

    /// Records an image binding for compute access.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_image_texture(
        &mut self,
        unit: u32,
        texture: TextureId,
        level: u32,
        layered: bool,
        layer: u32,
        access: ImageAccess,
        format: TextureFormat,
    ) {
        self.submit(Command::BindImageTexture {
            unit,
            texture,
            level,
            layered,
            layer,
            access,
            format,
        });
    }

    /// Records mip chain regeneration.
    pub fn calculate_mipmaps(&mut self, texture: TextureId) {
        self.submit(Command::CalculateMipmaps(texture));
    }

    /// Records a non-indexed draw.
    pub fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32, instance_count: u32) {
        self.submit(Command::DrawArrays {
            topology,
            first,
            count,
            instance_count,
        });
    }

    /// Records an indexed draw.
    pub fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    ) {
        self.submit(Command::DrawElements {
            topology,
            first,
            count,
            index_type,
            instance_count,
        });
    }

    /// Records a compute dispatch.
    pub fn dispatch_compute(&mut self, x: u32, y: u32, z: u32) {
        self.submit(Command::DispatchCompute { x, y, z });
    }

    /// Records a memory barrier.
    pub fn add_memory_barrier(&mut self, flags: MemoryBarrierFlags) {
        self.submit(Command::AddMemoryBarrier(flags));
    }

    /// Records a fence after the work that reads `buffer` so far.
    pub fn lock_buffer(&mut self, buffer: BufferId) {
        self.submit(Command::LockBuffer(buffer));
    }

    /// Records a wait on the fence of the previous lock of `buffer`.
    pub fn wait_for_buffer(&mut self, buffer: BufferId) {
        self.submit(Command::WaitForBuffer(buffer));
    }
}
