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

//! The closed set of commands a [`CommandBuffer`](super::CommandBuffer) records.

use super::state::GraphicsState;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;

/// A unit of deferred GPU work.
///
/// Commands only hold handles and small values. They do not own the resources
/// they reference, so a resource must outlive every command that names it
/// until the buffer is executed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Sets the viewport rectangle.
    SetViewport(Viewport),
    /// Enables or disables the depth test.
    SetDepthTest(bool),
    /// Sets the depth comparison function.
    SetDepthFunc(CompareFunction),
    /// Enables or disables face culling.
    SetFaceCulling(bool),
    /// Selects the culled face.
    SetCullFace(PolygonFace),
    /// Sets the polygon rasterization mode.
    SetPolygonMode {
        /// The faces affected.
        face: PolygonFace,
        /// The rasterization mode.
        mode: PolygonMode,
    },
    /// Enables or disables blending.
    SetBlending(bool),
    /// Sets the blend factors.
    SetBlendFactors {
        /// Factor applied to the incoming colour.
        source: BlendFactor,
        /// Factor applied to the stored colour.
        destination: BlendFactor,
    },
    /// Binds a framebuffer, or the default surface.
    BindFramebuffer(Option<FramebufferId>),
    /// Clears a framebuffer, or the default surface.
    ClearFramebuffer {
        /// The target to clear.
        framebuffer: Option<FramebufferId>,
        /// What to clear and with which colour.
        op: ClearOp,
    },
    /// Binds a shader program, or unbinds.
    BindShaderProgram(Option<ShaderProgramId>),
    /// Binds a vertex array, or unbinds.
    BindVertexArray(Option<VertexArrayId>),
    /// Sets a uniform of the bound program.
    BindSingleUniform {
        /// The uniform location.
        location: u32,
        /// The value.
        value: UniformValue,
    },
    /// Binds a range of a buffer to a uniform block binding.
    BindUniformBufferRange {
        /// The binding index.
        index: u32,
        /// The buffer.
        buffer: BufferId,
        /// Byte offset of the range.
        offset: u64,
        /// Byte size of the range.
        size: u64,
    },
    /// Binds a whole buffer to an indexed binding point.
    BindBuffer {
        /// The binding index.
        index: u32,
        /// The buffer.
        buffer: BufferId,
        /// The binding point kind.
        target: BufferTarget,
    },
    /// Binds a texture to a texture unit.
    BindTexture {
        /// The texture unit.
        unit: u32,
        /// The texture.
        texture: TextureId,
    },
    /// Binds one level of a texture to an image unit.
    BindImageTexture {
        /// The image unit.
        unit: u32,
        /// The texture.
        texture: TextureId,
        /// The mip level.
        level: u32,
        /// If `true`, every layer (cubemap face) is bound.
        layered: bool,
        /// The layer bound when `layered` is `false`.
        layer: u32,
        /// Shader access.
        access: ImageAccess,
        /// Format used to interpret texels.
        format: TextureFormat,
    },
    /// Regenerates the mip chain of a texture.
    CalculateMipmaps(TextureId),
    /// Draws non-indexed primitives.
    DrawArrays {
        /// The primitive topology.
        topology: PrimitiveTopology,
        /// The first vertex.
        first: u32,
        /// The vertex count.
        count: u32,
        /// The instance count.
        instance_count: u32,
    },
    /// Draws indexed primitives.
    DrawElements {
        /// The primitive topology.
        topology: PrimitiveTopology,
        /// The first index.
        first: u32,
        /// The index count.
        count: u32,
        /// The index element type.
        index_type: IndexType,
        /// The instance count.
        instance_count: u32,
    },
    /// Launches the bound compute program.
    DispatchCompute {
        /// Work groups along x.
        x: u32,
        /// Work groups along y.
        y: u32,
        /// Work groups along z.
        z: u32,
    },
    /// Orders memory accesses between dependent GPU operations.
    AddMemoryBarrier(MemoryBarrierFlags),
    /// Fences the work issued so far that reads `buffer`.
    LockBuffer(BufferId),
    /// Waits for the fence of the previous [`Command::LockBuffer`] on `buffer`.
    WaitForBuffer(BufferId),
}

impl Command {
    /// Applies the command to the device, skipping state changes the cache already holds.
    ///
    /// # Errors
    ///
    /// Returns the device error, typically [`ResourceError::InvalidHandle`] when a
    /// referenced resource was released before replay.
    pub fn apply(&self, device: &dyn GraphicsDevice, state: &mut GraphicsState) -> Result<(), ResourceError> {
        match *self {
            Command::SetViewport(viewport) => {
                if state.set_viewport(viewport) {
                    device.set_viewport(viewport)?;
                }
            }
            Command::SetDepthTest(enabled) => {
                if state.set_depth_test(enabled) {
                    device.set_depth_test(enabled)?;
                }
            }
            Command::SetDepthFunc(func) => {
                if state.set_depth_func(func) {
                    device.set_depth_func(func)?;
                }
            }
            Command::SetFaceCulling(enabled) => {
                if state.set_face_culling(enabled) {
                    device.set_face_culling(enabled)?;
                }
            }
            Command::SetCullFace(face) => {
                if state.set_cull_face(face) {
                    device.set_cull_face(face)?;
                }
            }
            Command::SetPolygonMode { face, mode } => {
                if state.set_polygon_mode(face, mode) {
                    device.set_polygon_mode(face, mode)?;
                }
            }
            Command::SetBlending(enabled) => {
                if state.set_blending(enabled) {
                    device.set_blending(enabled)?;
                }
            }
            Command::SetBlendFactors {
                source,
                destination,
            } => {
                if state.set_blend_factors(source, destination) {
                    device.set_blend_factors(source, destination)?;
                }
            }
            Command::BindFramebuffer(id) => {
                if state.bind_framebuffer(id) {
                    device.bind_framebuffer(id)?;
                }
            }
            Command::ClearFramebuffer { framebuffer, op } => {
                device.clear_framebuffer(framebuffer, op)?;
            }
            Command::BindShaderProgram(id) => {
                if state.bind_shader_program(id) {
                    device.bind_shader_program(id)?;
                }
            }
            Command::BindVertexArray(id) => {
                if state.bind_vertex_array(id) {
                    device.bind_vertex_array(id)?;
                }
            }
            Command::BindSingleUniform { location, value } => {
                device.bind_single_uniform(location, value)?;
            }
            Command::BindUniformBufferRange {
                index,
                buffer,
                offset,
                size,
            } => {
                device.bind_buffer(BufferTarget::Uniform, index, buffer, Some((offset, size)))?;
            }
            Command::BindBuffer {
                index,
                buffer,
                target,
            } => {
                device.bind_buffer(target, index, buffer, None)?;
            }
            Command::BindTexture { unit, texture } => {
                if state.bind_texture(unit, texture) {
                    device.bind_texture(unit, texture)?;
                }
            }
            Command::BindImageTexture {
                unit,
                texture,
                level,
                layered,
                layer,
                access,
                format,
            } => {
                device.bind_image_texture(unit, texture, level, layered, layer, access, format)?;
            }
            Command::CalculateMipmaps(texture) => {
                device.generate_mipmaps(texture)?;
            }
            Command::DrawArrays {
                topology,
                first,
                count,
                instance_count,
            } => {
                device.draw_arrays(topology, first, count, instance_count)?;
            }
            Command::DrawElements {
                topology,
                first,
                count,
                index_type,
                instance_count,
            } => {
                device.draw_elements(topology, first, count, index_type, instance_count)?;
            }
            Command::DispatchCompute { x, y, z } => {
                device.dispatch_compute(x, y, z)?;
            }
            Command::AddMemoryBarrier(flags) => {
                device.memory_barrier(flags)?;
            }
            Command::LockBuffer(buffer) => {
                let fence = device.insert_fence()?;
                if let Some(stale) = state.set_buffer_fence(buffer, fence) {
                    log::trace!("Replacing unwaited fence {stale:?} of buffer {buffer:?}");
                    device.delete_fence(stale)?;
                }
            }
            Command::WaitForBuffer(buffer) => {
                if let Some(fence) = state.take_buffer_fence(buffer) {
                    device.wait_fence(fence)?;
                    device.delete_fence(fence)?;
                }
            }
        }
        Ok(())
    }

    /// Returns `true` for commands that issue GPU work rather than change state.
    pub fn is_work(&self) -> bool {
        matches!(
            self,
            Command::DrawArrays { .. }
                | Command::DrawElements { .. }
                | Command::DispatchCompute { .. }
        )
    }
}
