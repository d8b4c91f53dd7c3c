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

//! Creation and release of the GPU resources a lane owns.

use lumen_core::renderer::*;
use std::borrow::Cow;

/// A resource could not be created while setting up a lane or step.
#[derive(Debug, thiserror::Error)]
#[error("creation of {what} failed: {source}")]
pub struct CreationFailure {
    /// A short name of the resource.
    pub what: &'static str,
    /// The device error.
    #[source]
    pub source: ResourceError,
}

impl From<CreationFailure> for RenderError {
    fn from(failure: CreationFailure) -> Self {
        RenderError::creation(failure.what, failure.source)
    }
}

/// Any resource handle a lane may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GpuResource {
    Buffer(BufferId),
    Texture(TextureId),
    Framebuffer(FramebufferId),
    ShaderProgram(ShaderProgramId),
    VertexArray(VertexArrayId),
}

impl GpuResource {
    /// Releases the resource. Failures are logged, there is nothing left to undo.
    pub(crate) fn release(self, device: &dyn GraphicsDevice) {
        let result = match self {
            GpuResource::Buffer(id) => device.destroy_buffer(id),
            GpuResource::Texture(id) => device.destroy_texture(id),
            GpuResource::Framebuffer(id) => device.destroy_framebuffer(id),
            GpuResource::ShaderProgram(id) => device.destroy_shader_program(id),
            GpuResource::VertexArray(id) => device.destroy_vertex_array(id),
        };
        if let Err(err) = result {
            log::warn!("Failed to release {self:?}: {err}");
        }
    }
}

/// Tracks the resources created during a multi-step setup.
///
/// If the scope is dropped before [`finish`](Self::finish), everything it
/// created is released in reverse order, so a failed setup leaves nothing behind.
pub(crate) struct CreationScope<'a> {
    device: &'a dyn GraphicsDevice,
    created: Vec<GpuResource>,
}

impl<'a> CreationScope<'a> {
    pub(crate) fn new(device: &'a dyn GraphicsDevice) -> Self {
        Self {
            device,
            created: Vec::new(),
        }
    }

    fn track<T>(
        &mut self,
        what: &'static str,
        result: Result<T, ResourceError>,
        wrap: impl FnOnce(T) -> GpuResource,
    ) -> Result<T, CreationFailure>
    where
        T: Copy,
    {
        match result {
            Ok(id) => {
                self.created.push(wrap(id));
                Ok(id)
            }
            Err(source) => {
                log::error!("Creation of {what} failed: {source}");
                Err(CreationFailure { what, source })
            }
        }
    }

    pub(crate) fn buffer(
        &mut self,
        what: &'static str,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<BufferId, CreationFailure> {
        let result = match data {
            Some(data) => self.device.create_buffer_with_data(descriptor, data),
            None => self.device.create_buffer(descriptor),
        };
        self.track(what, result, GpuResource::Buffer)
    }

    /// Creates a buffer and maps it for the rest of its lifetime.
    pub(crate) fn mapped_buffer(
        &mut self,
        what: &'static str,
        descriptor: &BufferDescriptor,
        data: Option<&[u8]>,
    ) -> Result<BufferId, CreationFailure> {
        let buffer = self.buffer(what, descriptor, data)?;
        self.device.map_buffer(buffer).map_err(|source| {
            log::error!("Mapping {what} failed: {source}");
            CreationFailure { what, source }
        })?;
        Ok(buffer)
    }

    pub(crate) fn texture(
        &mut self,
        what: &'static str,
        descriptor: &TextureDescriptor,
        data: Option<&[u8]>,
    ) -> Result<TextureId, CreationFailure> {
        let result = match data {
            Some(data) => self.device.create_texture_with_data(descriptor, data),
            None => self.device.create_texture(descriptor),
        };
        self.track(what, result, GpuResource::Texture)
    }

    pub(crate) fn framebuffer(
        &mut self,
        what: &'static str,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, CreationFailure> {
        let result = self.device.create_framebuffer(descriptor);
        self.track(what, result, GpuResource::Framebuffer)
    }

    pub(crate) fn program(
        &mut self,
        what: &'static str,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, CreationFailure> {
        let result = self.device.create_shader_program(descriptor);
        self.track(what, result, GpuResource::ShaderProgram)
    }

    pub(crate) fn vertex_array(
        &mut self,
        what: &'static str,
        descriptor: &VertexArrayDescriptor,
    ) -> Result<VertexArrayId, CreationFailure> {
        let result = self.device.create_vertex_array(descriptor);
        self.track(what, result, GpuResource::VertexArray)
    }

    /// Keeps every created resource alive.
    pub(crate) fn finish(mut self) {
        self.created.clear();
    }
}

impl Drop for CreationScope<'_> {
    fn drop(&mut self) {
        for resource in self.created.drain(..).rev() {
            resource.release(self.device);
        }
    }
}

/// Placeholder resources bound wherever a pass has nothing better.
///
/// Owned by the render system and lent to its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultResources {
    /// An empty vertex array for attribute-less full-screen draws.
    pub vertex_array: VertexArrayId,
    /// A 1x1 black texture for unset material slots.
    pub texture: TextureId,
    /// A 1x1 neutral gray cubemap standing in for a missing environment.
    pub environment: TextureId,
}

impl DefaultResources {
    pub(crate) fn create(scope: &mut CreationScope<'_>) -> Result<Self, CreationFailure> {
        let vertex_array = scope.vertex_array(
            "default vertex array",
            &VertexArrayDescriptor {
                label: Some(Cow::Borrowed("Default VAO")),
                ..Default::default()
            },
        )?;
        let texture = scope.texture(
            "default texture",
            &TextureDescriptor {
                label: Some(Cow::Borrowed("Default Texture")),
                kind: TextureKind::D2,
                format: TextureFormat::R8,
                width: 1,
                height: 1,
                mip_levels: 1,
                min_filter: FilterMode::Nearest,
                mag_filter: FilterMode::Nearest,
                address_mode: AddressMode::ClampToEdge,
            },
            Some(&[0]),
        )?;
        let environment = scope.texture(
            "default environment",
            &TextureDescriptor {
                label: Some(Cow::Borrowed("Default Environment")),
                kind: TextureKind::Cube,
                format: TextureFormat::Rgb8,
                width: 1,
                height: 1,
                mip_levels: 1,
                min_filter: FilterMode::Nearest,
                mag_filter: FilterMode::Nearest,
                address_mode: AddressMode::ClampToEdge,
            },
            Some(&[127; 18]),
        )?;
        Ok(Self {
            vertex_array,
            texture,
            environment,
        })
    }

    pub(crate) fn resources(&self) -> [GpuResource; 3] {
        [
            GpuResource::VertexArray(self.vertex_array),
            GpuResource::Texture(self.texture),
            GpuResource::Texture(self.environment),
        ]
    }
}
