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

//! Fixed-function render state and the small value types recorded by commands.

use crate::lumen_bitflags;

/// A function used for depth comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// The comparison never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    Less,
    /// Passes if the new value is equal to the existing value.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the new value is not equal to the existing value.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The comparison always passes.
    Always,
}

/// Selects polygon faces by winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonFace {
    /// Front-facing polygons.
    Front,
    /// Back-facing polygons.
    Back,
    /// Both faces.
    FrontAndBack,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Only the vertices are drawn.
    Point,
    /// Only the edges are drawn.
    Line,
    /// Polygons are filled.
    Fill,
}

/// The primitive assembly mode of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// One point per vertex.
    Points,
    /// One line per pair of vertices.
    Lines,
    /// A connected line strip.
    LineStrip,
    /// One triangle per three vertices.
    Triangles,
    /// A connected triangle strip.
    TriangleStrip,
    /// A triangle fan around the first vertex.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Returns the number of primitives assembled from `count` vertices.
    pub const fn primitive_count(&self, count: u32) -> u32 {
        match self {
            PrimitiveTopology::Points => count,
            PrimitiveTopology::Lines => count / 2,
            PrimitiveTopology::LineStrip => count.saturating_sub(1),
            PrimitiveTopology::Triangles => count / 3,
            PrimitiveTopology::TriangleStrip | PrimitiveTopology::TriangleFan => {
                count.saturating_sub(2)
            }
        }
    }
}

/// The element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 8-bit unsigned indices.
    UByte,
    /// 16-bit unsigned indices.
    UShort,
    /// 32-bit unsigned indices.
    UInt,
}

impl IndexType {
    /// Returns the size of one index in bytes.
    pub const fn size(&self) -> u32 {
        match self {
            IndexType::UByte => 1,
            IndexType::UShort => 2,
            IndexType::UInt => 4,
        }
    }
}

/// A factor applied to source or destination colour when blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0`.
    Zero,
    /// `1`.
    One,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`.
    OneMinusSrcAlpha,
    /// Destination alpha.
    DstAlpha,
    /// `1 - destination alpha`.
    OneMinusDstAlpha,
}

/// How a compute pass may access a bound image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageAccess {
    /// The image is only read.
    ReadOnly,
    /// The image is only written.
    WriteOnly,
    /// The image is read and written.
    ReadWrite,
}

lumen_bitflags! {
    /// A set of flags selecting which kinds of memory access a barrier orders.
    pub struct MemoryBarrierFlags: u32 {
        /// Orders every kind of access.
        const ALL = u32::MAX;
        /// Orders image load/store accesses.
        const SHADER_IMAGE_ACCESS = 1 << 0;
        /// Orders shader storage buffer accesses.
        const SHADER_STORAGE = 1 << 1;
        /// Orders texture fetches after image writes.
        const TEXTURE_FETCH = 1 << 2;
        /// Orders uniform buffer reads.
        const UNIFORM = 1 << 3;
        /// Orders CPU reads of persistently mapped buffers.
        const CLIENT_MAPPED_BUFFER = 1 << 4;
    }
}

lumen_bitflags! {
    /// A set of flags selecting which buffers of a framebuffer are cleared.
    pub struct ClearFlags: u32 {
        /// Clear colour attachments.
        const COLOR = 1 << 0;
        /// Clear the depth attachment.
        const DEPTH = 1 << 1;
        /// Clear the stencil attachment.
        const STENCIL = 1 << 2;
        /// Colour and depth.
        const COLOR_AND_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
        /// Colour, depth and stencil.
        const COLOR_AND_DEPTH_STENCIL = Self::COLOR_AND_DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// Which attachments of the bound framebuffer a clear affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentMask {
    /// Every colour draw buffer and the depth attachment.
    AllDrawBuffersAndDepth,
    /// Every attachment, including stencil.
    All,
}

/// A clear operation recorded against a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOp {
    /// The buffers to clear.
    pub flags: ClearFlags,
    /// The attachments affected.
    pub mask: AttachmentMask,
    /// The clear colour as linear RGBA.
    pub color: [f32; 4],
}

impl ClearOp {
    /// Clears colour and depth of every draw buffer to `color`.
    pub const fn color_and_depth(color: [f32; 4]) -> Self {
        Self {
            flags: ClearFlags::COLOR_AND_DEPTH,
            mask: AttachmentMask::AllDrawBuffersAndDepth,
            color,
        }
    }
}

/// A viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// A small uniform value bound directly to a program location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A single float.
    Float(f32),
    /// A single signed integer.
    Int(i32),
    /// Two floats.
    Vec2([f32; 2]),
    /// Four floats.
    Vec4([f32; 4]),
    /// A column-major 4x4 matrix.
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    /// Returns the size of the value in bytes.
    pub const fn size(&self) -> usize {
        match self {
            UniformValue::Float(_) | UniformValue::Int(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec4(_) => 16,
            UniformValue::Mat4(_) => 64,
        }
    }
}
