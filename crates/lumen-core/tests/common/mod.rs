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

//! A recording graphics device for command-layer tests.

#![allow(dead_code)]

use lumen_core::renderer::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every immediate call as a short string and keeps buffer bytes.
#[derive(Debug)]
pub struct MockGraphicsDevice {
    pub alignment: u64,
    next_id: AtomicUsize,
    calls: Mutex<Vec<String>>,
    buffers: Mutex<HashMap<usize, Vec<u8>>>,
    released: Mutex<HashSet<usize>>,
}

impl MockGraphicsDevice {
    pub fn new(alignment: u64) -> Self {
        Self {
            alignment,
            next_id: AtomicUsize::new(1),
            calls: Mutex::new(Vec::new()),
            buffers: Mutex::new(HashMap::new()),
            released: Mutex::new(HashSet::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn buffer_bytes(&self, id: BufferId) -> Vec<u8> {
        self.buffers.lock().unwrap().get(&id.0).cloned().unwrap_or_default()
    }

    pub fn release(&self, raw: usize) {
        self.released.lock().unwrap().insert(raw);
    }

    fn id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, raw: usize) -> Result<(), ResourceError> {
        if self.released.lock().unwrap().contains(&raw) {
            Err(ResourceError::InvalidHandle)
        } else {
            Ok(())
        }
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let id = self.id();
        self.buffers
            .lock()
            .unwrap()
            .insert(id, vec![0; descriptor.size as usize]);
        Ok(BufferId(id))
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let id = self.create_buffer(descriptor)?;
        self.write_mapped_buffer(id, 0, data)?;
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.release(id.0);
        Ok(())
    }

    fn map_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.check(id.0)
    }

    fn unmap_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.check(id.0)
    }

    fn write_mapped_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        self.check(id.0)?;
        let mut buffers = self.buffers.lock().unwrap();
        let bytes = buffers.get_mut(&id.0).ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > bytes.len() {
            return Err(ResourceError::OutOfBounds);
        }
        bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    fn read_mapped_buffer(&self, id: BufferId, offset: u64, len: u64) -> Result<Vec<u8>, ResourceError> {
        self.check(id.0)?;
        let buffers = self.buffers.lock().unwrap();
        let bytes = buffers.get(&id.0).ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start + len as usize;
        bytes.get(start..end).map(<[u8]>::to_vec).ok_or(ResourceError::OutOfBounds)
    }

    fn create_texture(&self, _descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        Ok(TextureId(self.id()))
    }

    fn create_texture_with_data(
        &self,
        descriptor: &TextureDescriptor,
        _data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        self.create_texture(descriptor)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.release(id.0);
        Ok(())
    }

    fn texture_size(&self, id: TextureId) -> Result<(u32, u32), ResourceError> {
        self.check(id.0).map(|_| (1, 1))
    }

    fn texture_mip_levels(&self, id: TextureId) -> Result<u32, ResourceError> {
        self.check(id.0).map(|_| 1)
    }

    fn create_framebuffer(&self, _descriptor: &FramebufferDescriptor) -> Result<FramebufferId, ResourceError> {
        Ok(FramebufferId(self.id()))
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.release(id.0);
        Ok(())
    }

    fn resize_framebuffer(&self, id: FramebufferId, _width: u32, _height: u32) -> Result<(), ResourceError> {
        self.check(id.0)
    }

    fn framebuffer_attachment(
        &self,
        id: FramebufferId,
        _attachment: FramebufferAttachment,
    ) -> Result<TextureId, ResourceError> {
        self.check(id.0).map(|_| TextureId(id.0 + 1000))
    }

    fn framebuffer_size(&self, id: FramebufferId) -> Result<(u32, u32), ResourceError> {
        self.check(id.0).map(|_| (1, 1))
    }

    fn create_shader_program(&self, _descriptor: &ShaderProgramDescriptor) -> Result<ShaderProgramId, ResourceError> {
        Ok(ShaderProgramId(self.id()))
    }

    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.release(id.0);
        Ok(())
    }

    fn create_vertex_array(&self, _descriptor: &VertexArrayDescriptor) -> Result<VertexArrayId, ResourceError> {
        Ok(VertexArrayId(self.id()))
    }

    fn destroy_vertex_array(&self, id: VertexArrayId) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.release(id.0);
        Ok(())
    }

    fn uniform_buffer_offset_alignment(&self) -> u64 {
        self.alignment
    }

    fn api_version(&self) -> String {
        "Mock 1.0".to_string()
    }

    fn set_debug_callback(&self, _callback: Option<DebugCallback>) {}

    fn has_debug_callback(&self) -> bool {
        false
    }

    fn set_viewport(&self, viewport: Viewport) -> Result<(), ResourceError> {
        self.record(format!("set_viewport({},{},{},{})", viewport.x, viewport.y, viewport.width, viewport.height));
        Ok(())
    }

    fn set_depth_test(&self, enabled: bool) -> Result<(), ResourceError> {
        self.record(format!("set_depth_test({enabled})"));
        Ok(())
    }

    fn set_depth_func(&self, func: CompareFunction) -> Result<(), ResourceError> {
        self.record(format!("set_depth_func({func:?})"));
        Ok(())
    }

    fn set_face_culling(&self, enabled: bool) -> Result<(), ResourceError> {
        self.record(format!("set_face_culling({enabled})"));
        Ok(())
    }

    fn set_cull_face(&self, face: PolygonFace) -> Result<(), ResourceError> {
        self.record(format!("set_cull_face({face:?})"));
        Ok(())
    }

    fn set_polygon_mode(&self, face: PolygonFace, mode: PolygonMode) -> Result<(), ResourceError> {
        self.record(format!("set_polygon_mode({face:?},{mode:?})"));
        Ok(())
    }

    fn set_blending(&self, enabled: bool) -> Result<(), ResourceError> {
        self.record(format!("set_blending({enabled})"));
        Ok(())
    }

    fn set_blend_factors(&self, source: BlendFactor, destination: BlendFactor) -> Result<(), ResourceError> {
        self.record(format!("set_blend_factors({source:?},{destination:?})"));
        Ok(())
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            self.check(id.0)?;
        }
        self.record(format!("bind_framebuffer({:?})", id.map(|id| id.0)));
        Ok(())
    }

    fn clear_framebuffer(&self, id: Option<FramebufferId>, _op: ClearOp) -> Result<(), ResourceError> {
        self.record(format!("clear_framebuffer({:?})", id.map(|id| id.0)));
        Ok(())
    }

    fn bind_shader_program(&self, id: Option<ShaderProgramId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            self.check(id.0)?;
        }
        self.record(format!("bind_shader_program({:?})", id.map(|id| id.0)));
        Ok(())
    }

    fn bind_vertex_array(&self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        self.record(format!("bind_vertex_array({:?})", id.map(|id| id.0)));
        Ok(())
    }

    fn bind_single_uniform(&self, location: u32, _value: UniformValue) -> Result<(), ResourceError> {
        self.record(format!("bind_single_uniform({location})"));
        Ok(())
    }

    fn bind_buffer(
        &self,
        _target: BufferTarget,
        index: u32,
        id: BufferId,
        range: Option<(u64, u64)>,
    ) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.record(format!("bind_buffer({index},{},{range:?})", id.0));
        Ok(())
    }

    fn bind_texture(&self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.record(format!("bind_texture({unit},{})", id.0));
        Ok(())
    }

    fn bind_image_texture(
        &self,
        unit: u32,
        id: TextureId,
        level: u32,
        _layered: bool,
        _layer: u32,
        _access: ImageAccess,
        _format: TextureFormat,
    ) -> Result<(), ResourceError> {
        self.check(id.0)?;
        self.record(format!("bind_image_texture({unit},{},{level})", id.0));
        Ok(())
    }

    fn generate_mipmaps(&self, id: TextureId) -> Result<(), ResourceError> {
        self.record(format!("generate_mipmaps({})", id.0));
        Ok(())
    }

    fn draw_arrays(&self, _topology: PrimitiveTopology, first: u32, count: u32, _instance_count: u32) -> Result<(), ResourceError> {
        self.record(format!("draw_arrays({first},{count})"));
        Ok(())
    }

    fn draw_elements(
        &self,
        _topology: PrimitiveTopology,
        first: u32,
        count: u32,
        _index_type: IndexType,
        _instance_count: u32,
    ) -> Result<(), ResourceError> {
        self.record(format!("draw_elements({first},{count})"));
        Ok(())
    }

    fn dispatch_compute(&self, x: u32, y: u32, z: u32) -> Result<(), ResourceError> {
        self.record(format!("dispatch_compute({x},{y},{z})"));
        Ok(())
    }

    fn memory_barrier(&self, _flags: MemoryBarrierFlags) -> Result<(), ResourceError> {
        self.record("memory_barrier".to_string());
        Ok(())
    }

    fn insert_fence(&self) -> Result<FenceId, ResourceError> {
        let id = self.id();
        self.record(format!("insert_fence({id})"));
        Ok(FenceId(id))
    }

    fn wait_fence(&self, id: FenceId) -> Result<(), ResourceError> {
        self.record(format!("wait_fence({})", id.0));
        Ok(())
    }

    fn delete_fence(&self, id: FenceId) -> Result<(), ResourceError> {
        self.record(format!("delete_fence({})", id.0));
        Ok(())
    }
}
