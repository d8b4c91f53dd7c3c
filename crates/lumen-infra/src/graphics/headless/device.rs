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

//! The headless [`GraphicsDevice`] implementation.

use super::DeviceCall;
use lumen_core::renderer::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The record alignment reported when none is configured.
pub const DEFAULT_UNIFORM_ALIGNMENT: u64 = 256;

#[derive(Debug)]
struct BufferEntry {
    label: String,
    target: BufferTarget,
    access: BufferAccess,
    data: Vec<u8>,
    mapped: bool,
}

/// What the device knows about a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// The debug label.
    pub label: String,
    /// 2D or cube.
    pub kind: TextureKind,
    /// The texel format.
    pub format: TextureFormat,
    /// Width of the base level.
    pub width: u32,
    /// Height of the base level.
    pub height: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// The framebuffer owning this texture as an attachment.
    pub owner: Option<FramebufferId>,
}

#[derive(Debug)]
struct FramebufferEntry {
    label: String,
    width: u32,
    height: u32,
    color: Vec<TextureId>,
    depth: Option<TextureId>,
}

#[derive(Debug)]
struct ProgramEntry {
    label: String,
    compute: bool,
}

#[derive(Debug)]
struct VertexArrayEntry {
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
}

/// Counts of the resources currently alive on a [`HeadlessDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveResources {
    /// Buffers.
    pub buffers: usize,
    /// Textures, attachments included.
    pub textures: usize,
    /// Framebuffers.
    pub framebuffers: usize,
    /// Shader programs.
    pub shader_programs: usize,
    /// Vertex arrays.
    pub vertex_arrays: usize,
    /// Fences not deleted yet.
    pub fences: usize,
}

impl LiveResources {
    /// The total number of live resources.
    pub fn total(&self) -> usize {
        self.buffers + self.textures + self.framebuffers + self.shader_programs + self.vertex_arrays + self.fences
    }
}

/// A [`GraphicsDevice`] without a GPU.
///
/// Shader stages are not compiled; a program fails to build only when one of
/// its stage paths was registered with [`fail_shader`](Self::fail_shader).
pub struct HeadlessDevice {
    alignment: u64,
    buffers: Mutex<HashMap<BufferId, BufferEntry>>,
    textures: Mutex<HashMap<TextureId, TextureInfo>>,
    framebuffers: Mutex<HashMap<FramebufferId, FramebufferEntry>>,
    programs: Mutex<HashMap<ShaderProgramId, ProgramEntry>>,
    vertex_arrays: Mutex<HashMap<VertexArrayId, VertexArrayEntry>>,
    fences: Mutex<HashSet<FenceId>>,
    failing_shaders: Mutex<HashSet<String>>,
    calls: Mutex<Vec<DeviceCall>>,
    debug_callback: Mutex<Option<DebugCallback>>,

    next_buffer_id: AtomicUsize,
    next_texture_id: AtomicUsize,
    next_framebuffer_id: AtomicUsize,
    next_program_id: AtomicUsize,
    next_vertex_array_id: AtomicUsize,
    next_fence_id: AtomicUsize,
}

impl std::fmt::Debug for HeadlessDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessDevice")
            .field("alignment", &self.alignment)
            .field("live", &self.live_resources())
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Creates a device reporting [`DEFAULT_UNIFORM_ALIGNMENT`].
    pub fn new() -> Self {
        Self::with_alignment(DEFAULT_UNIFORM_ALIGNMENT)
    }

    /// Creates a device reporting `alignment` as uniform buffer offset alignment.
    pub fn with_alignment(alignment: u64) -> Self {
        Self {
            alignment,
            buffers: Mutex::new(HashMap::new()),
            textures: Mutex::new(HashMap::new()),
            framebuffers: Mutex::new(HashMap::new()),
            programs: Mutex::new(HashMap::new()),
            vertex_arrays: Mutex::new(HashMap::new()),
            fences: Mutex::new(HashSet::new()),
            failing_shaders: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            debug_callback: Mutex::new(None),
            next_buffer_id: AtomicUsize::new(1),
            next_texture_id: AtomicUsize::new(1),
            next_framebuffer_id: AtomicUsize::new(1),
            next_program_id: AtomicUsize::new(1),
            next_vertex_array_id: AtomicUsize::new(1),
            next_fence_id: AtomicUsize::new(1),
        }
    }

    /// Makes every program using the stage at `path` fail to compile.
    pub fn fail_shader(&self, path: impl Into<String>) {
        self.failing_shaders.lock().unwrap().insert(path.into());
    }

    /// A copy of the call log.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Takes the call log, leaving it empty.
    pub fn take_calls(&self) -> Vec<DeviceCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Counts the resources currently alive.
    pub fn live_resources(&self) -> LiveResources {
        LiveResources {
            buffers: self.buffers.lock().unwrap().len(),
            textures: self.textures.lock().unwrap().len(),
            framebuffers: self.framebuffers.lock().unwrap().len(),
            shader_programs: self.programs.lock().unwrap().len(),
            vertex_arrays: self.vertex_arrays.lock().unwrap().len(),
            fences: self.fences.lock().unwrap().len(),
        }
    }

    /// What the device knows about `id`, if it is alive.
    pub fn texture_info(&self, id: TextureId) -> Option<TextureInfo> {
        self.textures.lock().unwrap().get(&id).cloned()
    }

    /// The label of a live shader program.
    pub fn program_label(&self, id: ShaderProgramId) -> Option<String> {
        self.programs.lock().unwrap().get(&id).map(|entry| entry.label.clone())
    }

    /// Whether a live shader program is a compute program.
    pub fn is_compute_program(&self, id: ShaderProgramId) -> Option<bool> {
        self.programs.lock().unwrap().get(&id).map(|entry| entry.compute)
    }

    /// The label and binding point of a live buffer.
    pub fn buffer_info(&self, id: BufferId) -> Option<(String, BufferTarget)> {
        self.buffers
            .lock()
            .unwrap()
            .get(&id)
            .map(|entry| (entry.label.clone(), entry.target))
    }

    /// Reads a `T` stored at `offset` in a live buffer, regardless of mapping.
    pub fn read_pod<T: bytemuck::Pod>(&self, id: BufferId, offset: u64) -> Option<T> {
        let buffers = self.buffers.lock().unwrap();
        let start = offset as usize;
        let bytes = buffers
            .get(&id)?
            .data
            .get(start..start + std::mem::size_of::<T>())?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Stores `value` at `offset` in a live buffer, the way a shader would.
    ///
    /// Returns `false` if the buffer is gone or too small.
    pub fn write_pod<T: bytemuck::Pod>(&self, id: BufferId, offset: u64, value: &T) -> bool {
        let mut buffers = self.buffers.lock().unwrap();
        let start = offset as usize;
        let bytes = bytemuck::bytes_of(value);
        match buffers
            .get_mut(&id)
            .and_then(|entry| entry.data.get_mut(start..start + bytes.len()))
        {
            Some(target) => {
                target.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    fn record(&self, call: DeviceCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn report(&self, category: DebugCategory, severity: DebugSeverity, message: String) {
        if let Some(callback) = self.debug_callback.lock().unwrap().as_ref() {
            callback(&DebugMessage {
                source: DebugSource::Api,
                category,
                severity,
                message,
            });
        }
    }

    fn invalid_handle(&self, what: impl std::fmt::Debug) -> ResourceError {
        self.report(
            DebugCategory::Error,
            DebugSeverity::High,
            format!("Invalid handle {what:?}"),
        );
        ResourceError::InvalidHandle
    }

    fn check_texture(&self, id: TextureId) -> Result<TextureInfo, ResourceError> {
        self.texture_info(id).ok_or_else(|| self.invalid_handle(id))
    }

    fn check_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        if self.buffers.lock().unwrap().contains_key(&id) {
            Ok(())
        } else {
            Err(self.invalid_handle(id))
        }
    }

    fn label(label: &Option<std::borrow::Cow<'_, str>>, fallback: &str) -> String {
        label.as_deref().unwrap_or(fallback).to_string()
    }

    fn insert_texture(&self, info: TextureInfo) -> TextureId {
        let id = TextureId(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.textures.lock().unwrap().insert(id, info);
        id
    }

    fn base_level_size(descriptor: &TextureDescriptor) -> usize {
        let faces = match descriptor.kind {
            TextureKind::D2 => 1,
            TextureKind::Cube => 6,
        };
        descriptor.width as usize
            * descriptor.height as usize
            * descriptor.format.bytes_per_texel() as usize
            * faces
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        let entry = BufferEntry {
            label: Self::label(&descriptor.label, "Buffer"),
            target: descriptor.target,
            access: descriptor.access,
            data: vec![0; descriptor.size as usize],
            mapped: false,
        };
        log::trace!("HeadlessDevice: created buffer '{}' ({} bytes) as {id:?}", entry.label, descriptor.size);
        self.buffers.lock().unwrap().insert(id, entry);
        Ok(id)
    }

    fn create_buffer_with_data(&self, descriptor: &BufferDescriptor, data: &[u8]) -> Result<BufferId, ResourceError> {
        if data.len() as u64 > descriptor.size {
            return Err(ResourceError::OutOfBounds);
        }
        let id = self.create_buffer(descriptor)?;
        if let Some(entry) = self.buffers.lock().unwrap().get_mut(&id) {
            entry.data[..data.len()].copy_from_slice(data);
        }
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        match self.buffers.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(self.invalid_handle(id)),
        }
    }

    fn map_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self.buffers.lock().unwrap();
        let entry = buffers.get_mut(&id).ok_or_else(|| self.invalid_handle(id))?;
        if !entry.access.is_mappable() {
            return Err(ResourceError::InvalidOperation(format!(
                "Buffer '{}' was not created with CPU access",
                entry.label
            )));
        }
        entry.mapped = true;
        Ok(())
    }

    fn unmap_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self.buffers.lock().unwrap();
        let entry = buffers.get_mut(&id).ok_or_else(|| self.invalid_handle(id))?;
        entry.mapped = false;
        Ok(())
    }

    fn write_mapped_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut buffers = self.buffers.lock().unwrap();
        let entry = buffers.get_mut(&id).ok_or_else(|| self.invalid_handle(id))?;
        if !entry.mapped || !entry.access.contains(BufferAccess::WRITE) {
            return Err(ResourceError::InvalidOperation(format!(
                "Buffer '{}' is not mapped for writing",
                entry.label
            )));
        }
        let start = offset as usize;
        let end = start.checked_add(data.len()).ok_or(ResourceError::OutOfBounds)?;
        let target = entry.data.get_mut(start..end).ok_or(ResourceError::OutOfBounds)?;
        target.copy_from_slice(data);
        Ok(())
    }

    fn read_mapped_buffer(&self, id: BufferId, offset: u64, len: u64) -> Result<Vec<u8>, ResourceError> {
        let buffers = self.buffers.lock().unwrap();
        let entry = buffers.get(&id).ok_or_else(|| self.invalid_handle(id))?;
        if !entry.mapped || !entry.access.contains(BufferAccess::READ) {
            return Err(ResourceError::InvalidOperation(format!(
                "Buffer '{}' is not mapped for reading",
                entry.label
            )));
        }
        let start = offset as usize;
        let end = start.checked_add(len as usize).ok_or(ResourceError::OutOfBounds)?;
        entry
            .data
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(ResourceError::OutOfBounds)
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::InvalidOperation(format!(
                "Texture '{}' has a zero extent",
                Self::label(&descriptor.label, "Texture")
            )));
        }
        let max_levels = calculate_mip_count(descriptor.width, descriptor.height);
        let id = self.insert_texture(TextureInfo {
            label: Self::label(&descriptor.label, "Texture"),
            kind: descriptor.kind,
            format: descriptor.format,
            width: descriptor.width,
            height: descriptor.height,
            mip_levels: descriptor.mip_levels.clamp(1, max_levels),
            owner: None,
        });
        Ok(id)
    }

    fn create_texture_with_data(&self, descriptor: &TextureDescriptor, data: &[u8]) -> Result<TextureId, ResourceError> {
        if data.len() < Self::base_level_size(descriptor) {
            return Err(ResourceError::OutOfBounds);
        }
        self.create_texture(descriptor)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut textures = self.textures.lock().unwrap();
        match textures.get(&id) {
            None => Err(self.invalid_handle(id)),
            Some(TextureInfo { owner: Some(owner), .. }) => Err(ResourceError::InvalidOperation(format!(
                "{id:?} is an attachment of {owner:?}"
            ))),
            Some(_) => {
                textures.remove(&id);
                Ok(())
            }
        }
    }

    fn texture_size(&self, id: TextureId) -> Result<(u32, u32), ResourceError> {
        self.check_texture(id).map(|info| (info.width, info.height))
    }

    fn texture_mip_levels(&self, id: TextureId) -> Result<u32, ResourceError> {
        self.check_texture(id).map(|info| info.mip_levels)
    }

    fn create_framebuffer(&self, descriptor: &FramebufferDescriptor) -> Result<FramebufferId, ResourceError> {
        let label = Self::label(&descriptor.label, "Framebuffer");
        let complete = descriptor.color_formats.len() <= MAX_COLOR_ATTACHMENTS
            && (!descriptor.color_formats.is_empty() || descriptor.depth_format.is_some())
            && descriptor.color_formats.iter().all(|format| !format.is_depth())
            && descriptor.depth_format.is_none_or(|format| format.is_depth())
            && descriptor.width > 0
            && descriptor.height > 0;
        if !complete {
            self.report(
                DebugCategory::Error,
                DebugSeverity::High,
                format!("Framebuffer '{label}' is incomplete"),
            );
            return Err(ResourceError::IncompleteFramebuffer { label });
        }

        let id = FramebufferId(self.next_framebuffer_id.fetch_add(1, Ordering::Relaxed));
        let attachment = |format: TextureFormat, name: String| {
            self.insert_texture(TextureInfo {
                label: name,
                kind: TextureKind::D2,
                format,
                width: descriptor.width,
                height: descriptor.height,
                mip_levels: 1,
                owner: Some(id),
            })
        };
        let color = descriptor
            .color_formats
            .iter()
            .enumerate()
            .map(|(index, &format)| attachment(format, format!("{label} Color {index}")))
            .collect();
        let depth = descriptor
            .depth_format
            .map(|format| attachment(format, format!("{label} Depth")));

        log::trace!("HeadlessDevice: created framebuffer '{label}' as {id:?}");
        self.framebuffers.lock().unwrap().insert(
            id,
            FramebufferEntry {
                label,
                width: descriptor.width,
                height: descriptor.height,
                color,
                depth,
            },
        );
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        let entry = self
            .framebuffers
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or_else(|| self.invalid_handle(id))?;
        let mut textures = self.textures.lock().unwrap();
        for texture in entry.color.iter().chain(entry.depth.iter()) {
            textures.remove(texture);
        }
        Ok(())
    }

    fn resize_framebuffer(&self, id: FramebufferId, width: u32, height: u32) -> Result<(), ResourceError> {
        let mut framebuffers = self.framebuffers.lock().unwrap();
        let entry = framebuffers.get_mut(&id).ok_or_else(|| self.invalid_handle(id))?;
        if width == 0 || height == 0 {
            return Err(ResourceError::IncompleteFramebuffer {
                label: entry.label.clone(),
            });
        }
        entry.width = width;
        entry.height = height;

        let mut textures = self.textures.lock().unwrap();
        for texture in entry.color.iter().chain(entry.depth.iter()) {
            if let Some(info) = textures.get_mut(texture) {
                info.width = width;
                info.height = height;
            }
        }
        Ok(())
    }

    fn framebuffer_attachment(
        &self,
        id: FramebufferId,
        attachment: FramebufferAttachment,
    ) -> Result<TextureId, ResourceError> {
        let framebuffers = self.framebuffers.lock().unwrap();
        let entry = framebuffers.get(&id).ok_or_else(|| self.invalid_handle(id))?;
        let texture = match attachment.color_index() {
            Some(index) => entry.color.get(index).copied(),
            None => entry.depth,
        };
        texture.ok_or(ResourceError::MissingAttachment)
    }

    fn framebuffer_size(&self, id: FramebufferId) -> Result<(u32, u32), ResourceError> {
        let framebuffers = self.framebuffers.lock().unwrap();
        let entry = framebuffers.get(&id).ok_or_else(|| self.invalid_handle(id))?;
        Ok((entry.width, entry.height))
    }

    fn create_shader_program(&self, descriptor: &ShaderProgramDescriptor) -> Result<ShaderProgramId, ResourceError> {
        let failed_stage = {
            let failing = self.failing_shaders.lock().unwrap();
            let stage = descriptor
                .stages()
                .into_iter()
                .find(|stage| failing.contains(stage.path.as_ref()));
            stage
        };
        if let Some(stage) = failed_stage {
            let error = ShaderError::CompilationError {
                label: descriptor.label().to_string(),
                details: format!("{:?} stage '{}' failed to compile", stage.stage, stage.path),
            };
            self.report(DebugCategory::Error, DebugSeverity::High, error.to_string());
            return Err(error.into());
        }

        let id = ShaderProgramId(self.next_program_id.fetch_add(1, Ordering::Relaxed));
        self.programs.lock().unwrap().insert(
            id,
            ProgramEntry {
                label: descriptor.label().to_string(),
                compute: descriptor.is_compute(),
            },
        );
        log::trace!("HeadlessDevice: created program '{}' as {id:?}", descriptor.label());
        Ok(id)
    }

    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), ResourceError> {
        match self.programs.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(self.invalid_handle(id)),
        }
    }

    fn create_vertex_array(&self, descriptor: &VertexArrayDescriptor) -> Result<VertexArrayId, ResourceError> {
        for buffer in descriptor.vertex_buffer.iter().chain(descriptor.index_buffer.iter()) {
            self.check_buffer(*buffer)?;
        }
        let id = VertexArrayId(self.next_vertex_array_id.fetch_add(1, Ordering::Relaxed));
        self.vertex_arrays.lock().unwrap().insert(
            id,
            VertexArrayEntry {
                vertex_buffer: descriptor.vertex_buffer,
                index_buffer: descriptor.index_buffer,
            },
        );
        Ok(id)
    }

    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), ResourceError> {
        match self.vertex_arrays.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(self.invalid_handle(id)),
        }
    }

    fn uniform_buffer_offset_alignment(&self) -> u64 {
        self.alignment
    }

    fn api_version(&self) -> String {
        format!("Headless {}", env!("CARGO_PKG_VERSION"))
    }

    fn set_debug_callback(&self, callback: Option<DebugCallback>) {
        *self.debug_callback.lock().unwrap() = callback;
    }

    fn has_debug_callback(&self) -> bool {
        self.debug_callback.lock().unwrap().is_some()
    }

    fn set_viewport(&self, viewport: Viewport) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetViewport(viewport));
        Ok(())
    }

    fn set_depth_test(&self, enabled: bool) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetDepthTest(enabled));
        Ok(())
    }

    fn set_depth_func(&self, func: CompareFunction) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetDepthFunc(func));
        Ok(())
    }

    fn set_face_culling(&self, enabled: bool) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetFaceCulling(enabled));
        Ok(())
    }

    fn set_cull_face(&self, face: PolygonFace) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetCullFace(face));
        Ok(())
    }

    fn set_polygon_mode(&self, face: PolygonFace, mode: PolygonMode) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetPolygonMode(face, mode));
        Ok(())
    }

    fn set_blending(&self, enabled: bool) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetBlending(enabled));
        Ok(())
    }

    fn set_blend_factors(&self, source: BlendFactor, destination: BlendFactor) -> Result<(), ResourceError> {
        self.record(DeviceCall::SetBlendFactors(source, destination));
        Ok(())
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !self.framebuffers.lock().unwrap().contains_key(&id) {
                return Err(self.invalid_handle(id));
            }
        }
        self.record(DeviceCall::BindFramebuffer(id));
        Ok(())
    }

    fn clear_framebuffer(&self, id: Option<FramebufferId>, op: ClearOp) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !self.framebuffers.lock().unwrap().contains_key(&id) {
                return Err(self.invalid_handle(id));
            }
        }
        self.record(DeviceCall::ClearFramebuffer(id, op));
        Ok(())
    }

    fn bind_shader_program(&self, id: Option<ShaderProgramId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !self.programs.lock().unwrap().contains_key(&id) {
                return Err(self.invalid_handle(id));
            }
        }
        self.record(DeviceCall::BindShaderProgram(id));
        Ok(())
    }

    fn bind_vertex_array(&self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            let vertex_arrays = self.vertex_arrays.lock().unwrap();
            let entry = vertex_arrays.get(&id).ok_or_else(|| self.invalid_handle(id))?;
            for buffer in entry.vertex_buffer.iter().chain(entry.index_buffer.iter()) {
                self.check_buffer(*buffer)?;
            }
        }
        self.record(DeviceCall::BindVertexArray(id));
        Ok(())
    }

    fn bind_single_uniform(&self, location: u32, value: UniformValue) -> Result<(), ResourceError> {
        self.record(DeviceCall::BindSingleUniform { location, value });
        Ok(())
    }

    fn bind_buffer(
        &self,
        target: BufferTarget,
        index: u32,
        id: BufferId,
        range: Option<(u64, u64)>,
    ) -> Result<(), ResourceError> {
        {
            let buffers = self.buffers.lock().unwrap();
            let entry = buffers.get(&id).ok_or_else(|| self.invalid_handle(id))?;
            if let Some((offset, size)) = range {
                if offset + size > entry.data.len() as u64 {
                    return Err(ResourceError::OutOfBounds);
                }
                if self.alignment > 0 && offset % self.alignment != 0 {
                    return Err(ResourceError::InvalidOperation(format!(
                        "Range offset {offset} of '{}' is not aligned to {}",
                        entry.label, self.alignment
                    )));
                }
            }
        }
        self.record(DeviceCall::BindBuffer {
            target,
            index,
            buffer: id,
            range,
        });
        Ok(())
    }

    fn bind_texture(&self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        self.check_texture(id)?;
        self.record(DeviceCall::BindTexture { unit, texture: id });
        Ok(())
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        id: TextureId,
        level: u32,
        layered: bool,
        _layer: u32,
        access: ImageAccess,
        _format: TextureFormat,
    ) -> Result<(), ResourceError> {
        let info = self.check_texture(id)?;
        if level >= info.mip_levels {
            return Err(ResourceError::OutOfBounds);
        }
        self.record(DeviceCall::BindImageTexture {
            unit,
            texture: id,
            level,
            layered,
            access,
        });
        Ok(())
    }

    fn generate_mipmaps(&self, id: TextureId) -> Result<(), ResourceError> {
        self.check_texture(id)?;
        self.record(DeviceCall::GenerateMipmaps(id));
        Ok(())
    }

    fn draw_arrays(
        &self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        instance_count: u32,
    ) -> Result<(), ResourceError> {
        self.record(DeviceCall::DrawArrays {
            topology,
            first,
            count,
            instance_count,
        });
        Ok(())
    }

    fn draw_elements(
        &self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    ) -> Result<(), ResourceError> {
        self.record(DeviceCall::DrawElements {
            topology,
            first,
            count,
            index_type,
            instance_count,
        });
        Ok(())
    }

    fn dispatch_compute(&self, x: u32, y: u32, z: u32) -> Result<(), ResourceError> {
        if x == 0 || y == 0 || z == 0 {
            self.report(
                DebugCategory::Performance,
                DebugSeverity::Low,
                format!("Empty compute dispatch ({x}, {y}, {z})"),
            );
        }
        self.record(DeviceCall::DispatchCompute { x, y, z });
        Ok(())
    }

    fn memory_barrier(&self, flags: MemoryBarrierFlags) -> Result<(), ResourceError> {
        self.record(DeviceCall::MemoryBarrier(flags));
        Ok(())
    }

    fn insert_fence(&self) -> Result<FenceId, ResourceError> {
        let id = FenceId(self.next_fence_id.fetch_add(1, Ordering::Relaxed));
        self.fences.lock().unwrap().insert(id);
        self.record(DeviceCall::InsertFence(id));
        Ok(id)
    }

    fn wait_fence(&self, id: FenceId) -> Result<(), ResourceError> {
        if !self.fences.lock().unwrap().contains(&id) {
            return Err(self.invalid_handle(id));
        }
        self.record(DeviceCall::WaitFence(id));
        Ok(())
    }

    fn delete_fence(&self, id: FenceId) -> Result<(), ResourceError> {
        if !self.fences.lock().unwrap().remove(&id) {
            return Err(self.invalid_handle(id));
        }
        self.record(DeviceCall::DeleteFence(id));
        Ok(())
    }
}
