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

//! Defines data structures related to GPU buffer resources.

use crate::lumen_bitflags;
use std::borrow::Cow;

/// The binding point a buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Vertex,
    /// Index data for indexed draws.
    Index,
    /// A uniform block.
    Uniform,
    /// A shader storage block, read and written by compute passes.
    ShaderStorage,
}

lumen_bitflags! {
    /// A set of flags describing how the CPU may access a [`BufferId`].
    ///
    /// The driver uses them to place the buffer in the right memory type.
    /// A buffer meant to stay mapped across frames needs `PERSISTENT`, and
    /// usually `COHERENT` so CPU writes become visible without explicit flushes.
    pub struct BufferAccess: u32 {
        /// GPU-only storage.
        const NONE = 0;
        /// The buffer can be mapped for reading on the CPU.
        const READ = 1 << 0;
        /// The buffer can be mapped for writing on the CPU.
        const WRITE = 1 << 1;
        /// The mapping may stay alive while the GPU uses the buffer.
        const PERSISTENT = 1 << 2;
        /// CPU writes are visible to the GPU without explicit flushes.
        const COHERENT = 1 << 3;
        /// The contents are updated frequently.
        const DYNAMIC = 1 << 4;
    }
}

impl BufferAccess {
    /// Checks whether the buffer can be mapped at all.
    pub const fn is_mappable(&self) -> bool {
        self.intersects(Self::READ.union(Self::WRITE))
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// The binding point the buffer is meant for.
    pub target: BufferTarget,
    /// How the CPU may access the buffer.
    pub access: BufferAccess,
}

/// An opaque handle to a GPU buffer resource.
///
/// This ID is returned by [`GraphicsDevice::create_buffer`] and is used to reference
/// the buffer in all subsequent operations.
///
/// [`GraphicsDevice::create_buffer`]: crate::renderer::GraphicsDevice::create_buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// An opaque handle to a vertex array object (vertex buffer + layout + index buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub usize);

/// An opaque handle to a GPU fence, signalled once the commands issued
/// before it have completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FenceId(pub usize);

/// A single vertex attribute inside an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The shader location of the attribute.
    pub location: u32,
    /// Number of `f32` components (1 to 4).
    pub components: u32,
    /// Byte offset of the attribute inside one vertex.
    pub offset: u32,
}

/// A descriptor used to create a [`VertexArrayId`].
///
/// A descriptor with no vertex buffer describes an empty vertex array, which is
/// what attribute-less full-screen passes bind.
#[derive(Debug, Clone, Default)]
pub struct VertexArrayDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The vertex buffer feeding the attributes, if any.
    pub vertex_buffer: Option<BufferId>,
    /// The size of one vertex in bytes.
    pub stride: u32,
    /// The attribute layout.
    pub attributes: Vec<VertexAttribute>,
    /// The index buffer, if any.
    pub index_buffer: Option<BufferId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistent_ring_access_is_mappable() {
        let access = BufferAccess::WRITE | BufferAccess::PERSISTENT | BufferAccess::COHERENT;
        assert!(access.is_mappable());
        assert!(access.contains(BufferAccess::PERSISTENT | BufferAccess::WRITE));
        assert!(!access.contains(BufferAccess::READ));
        assert!(!BufferAccess::NONE.is_mappable());
        assert_eq!(
            format!("{access:?}"),
            "BufferAccess(WRITE | PERSISTENT | COHERENT)"
        );
    }
}
