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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The contract between render systems and a concrete graphics backend.
///
/// The trait has two halves. Resource methods create, query and release GPU
/// objects; they are called directly by render systems and steps. Immediate
/// methods change pipeline state or issue GPU work; they are only called while
/// a [`CommandBuffer`] replays its recorded commands.
///
/// Handles are plain indices. Passing a released or unknown handle returns
/// [`ResourceError::InvalidHandle`].
///
/// [`CommandBuffer`]: crate::renderer::command::CommandBuffer
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    // --- Buffers ---

    /// Creates a new GPU buffer with undefined contents.
    /// ## Arguments
    /// * `descriptor` - The size, target and CPU access of the buffer.
    /// ## Errors
    /// * `ResourceError` - If the allocation fails.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Creates a new GPU buffer initialized with `data`.
    ///
    /// `data` must not be larger than `descriptor.size`.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Releases a GPU buffer. An active mapping is released with it.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Maps the whole buffer into CPU-visible memory.
    ///
    /// Buffers created with [`BufferAccess::PERSISTENT`] stay mapped while the GPU uses them.
    /// ## Errors
    /// * `ResourceError::InvalidOperation` - If the buffer was not created mappable.
    fn map_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Releases the CPU mapping of a buffer.
    fn unmap_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Copies `data` into the mapped memory of a buffer at `offset`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the write does not fit in the buffer.
    fn write_mapped_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Reads `len` bytes from the mapped memory of a buffer at `offset`.
    fn read_mapped_buffer(&self, id: BufferId, offset: u64, len: u64) -> Result<Vec<u8>, ResourceError>;

    // --- Textures ---

    /// Creates a new texture with undefined contents.
    /// ## Arguments
    /// * `descriptor` - Shape, format, size and sampling of the texture.
    /// ## Returns
    /// The ID of the created texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Creates a new texture and uploads `data` into mip level 0 of every face.
    fn create_texture_with_data(
        &self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError>;

    /// Releases a texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Returns the `(width, height)` of mip level 0.
    fn texture_size(&self, id: TextureId) -> Result<(u32, u32), ResourceError>;

    /// Returns the number of mip levels of a texture.
    fn texture_mip_levels(&self, id: TextureId) -> Result<u32, ResourceError>;

    // --- Framebuffers ---

    /// Creates a framebuffer together with its attachment textures.
    /// ## Errors
    /// * `ResourceError::IncompleteFramebuffer` - If the attachments do not form a complete target.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError>;

    /// Releases a framebuffer and the attachment textures it owns.
    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError>;

    /// Resizes every attachment of a framebuffer.
    fn resize_framebuffer(&self, id: FramebufferId, width: u32, height: u32) -> Result<(), ResourceError>;

    /// Returns the texture behind an attachment slot.
    /// ## Errors
    /// * `ResourceError::MissingAttachment` - If the framebuffer has no such attachment.
    fn framebuffer_attachment(
        &self,
        id: FramebufferId,
        attachment: FramebufferAttachment,
    ) -> Result<TextureId, ResourceError>;

    /// Returns the `(width, height)` of a framebuffer.
    fn framebuffer_size(&self, id: FramebufferId) -> Result<(u32, u32), ResourceError>;

    // --- Programs and vertex arrays ---

    /// Compiles and links a shader program.
    /// ## Errors
    /// * `ResourceError::Shader` - If a stage fails to compile or the program fails to link.
    fn create_shader_program(
        &self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, ResourceError>;

    /// Releases a shader program.
    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), ResourceError>;

    /// Creates a vertex array.
    fn create_vertex_array(
        &self,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, ResourceError>;

    /// Releases a vertex array. The buffers it references are not released.
    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), ResourceError>;

    // --- Queries and diagnostics ---

    /// The alignment, in bytes, required for the offset of a uniform buffer range binding.
    fn uniform_buffer_offset_alignment(&self) -> u64;

    /// A human readable description of the API and driver.
    fn api_version(&self) -> String;

    /// Installs the sink receiving driver diagnostics, or removes it with `None`.
    ///
    /// There is one sink per device.
    fn set_debug_callback(&self, callback: Option<DebugCallback>);

    /// Returns `true` if a diagnostics sink is installed.
    fn has_debug_callback(&self) -> bool;

    // --- Immediate state (command replay only) ---

    /// Sets the viewport rectangle.
    fn set_viewport(&self, viewport: Viewport) -> Result<(), ResourceError>;
    /// Enables or disables the depth test.
    fn set_depth_test(&self, enabled: bool) -> Result<(), ResourceError>;
    /// Sets the depth comparison function.
    fn set_depth_func(&self, func: CompareFunction) -> Result<(), ResourceError>;
    /// Enables or disables face culling.
    fn set_face_culling(&self, enabled: bool) -> Result<(), ResourceError>;
    /// Selects which faces are culled.
    fn set_cull_face(&self, face: PolygonFace) -> Result<(), ResourceError>;
    /// Sets the rasterization mode of the given faces.
    fn set_polygon_mode(&self, face: PolygonFace, mode: PolygonMode) -> Result<(), ResourceError>;
    /// Enables or disables blending.
    fn set_blending(&self, enabled: bool) -> Result<(), ResourceError>;
    /// Sets the source and destination blend factors.
    fn set_blend_factors(&self, source: BlendFactor, destination: BlendFactor) -> Result<(), ResourceError>;

    /// Binds a framebuffer as render target. `None` selects the default surface.
    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError>;

    /// Clears a framebuffer. `None` clears the default surface.
    fn clear_framebuffer(&self, id: Option<FramebufferId>, op: ClearOp) -> Result<(), ResourceError>;

    /// Binds a shader program. `None` unbinds.
    fn bind_shader_program(&self, id: Option<ShaderProgramId>) -> Result<(), ResourceError>;

    /// Binds a vertex array. `None` unbinds.
    fn bind_vertex_array(&self, id: Option<VertexArrayId>) -> Result<(), ResourceError>;

    /// Sets a uniform of the bound program.
    fn bind_single_uniform(&self, location: u32, value: UniformValue) -> Result<(), ResourceError>;

    /// Binds a buffer (or a range of it) to an indexed binding point.
    /// ## Arguments
    /// * `target` - The binding point kind (uniform or shader storage).
    /// * `index` - The binding index.
    /// * `id` - The buffer.
    /// * `range` - `(offset, size)` in bytes, or `None` for the whole buffer.
    fn bind_buffer(
        &self,
        target: BufferTarget,
        index: u32,
        id: BufferId,
        range: Option<(u64, u64)>,
    ) -> Result<(), ResourceError>;

    /// Binds a texture to a texture unit for sampling.
    fn bind_texture(&self, unit: u32, id: TextureId) -> Result<(), ResourceError>;

    /// Binds one level of a texture to an image unit for load/store access.
    #[allow(clippy::too_many_arguments)]
    fn bind_image_texture(
        &self,
        unit: u32,
        id: TextureId,
        level: u32,
        layered: bool,
        layer: u32,
        access: ImageAccess,
        format: TextureFormat,
    ) -> Result<(), ResourceError>;

    /// Regenerates every mip level below level 0.
    fn generate_mipmaps(&self, id: TextureId) -> Result<(), ResourceError>;

    // --- Immediate work (command replay only) ---

    /// Draws non-indexed primitives with the bound vertex array.
    fn draw_arrays(
        &self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        instance_count: u32,
    ) -> Result<(), ResourceError>;

    /// Draws indexed primitives with the bound vertex array.
    fn draw_elements(
        &self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    ) -> Result<(), ResourceError>;

    /// Launches the bound compute program.
    fn dispatch_compute(&self, x: u32, y: u32, z: u32) -> Result<(), ResourceError>;

    /// Orders the memory accesses selected by `flags`.
    fn memory_barrier(&self, flags: MemoryBarrierFlags) -> Result<(), ResourceError>;

    // --- Synchronization ---

    /// Inserts a fence after all previously issued work.
    fn insert_fence(&self) -> Result<FenceId, ResourceError>;

    /// Blocks until a fence is signalled.
    fn wait_fence(&self, id: FenceId) -> Result<(), ResourceError>;

    /// Releases a fence.
    fn delete_fence(&self, id: FenceId) -> Result<(), ResourceError>;
}
