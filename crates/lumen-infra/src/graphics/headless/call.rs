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

//! The record of an immediate device call.

use lumen_core::renderer::*;

/// One state change or unit of work received by a [`HeadlessDevice`](super::HeadlessDevice).
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DeviceCall {
    SetViewport(Viewport),
    SetDepthTest(bool),
    SetDepthFunc(CompareFunction),
    SetFaceCulling(bool),
    SetCullFace(PolygonFace),
    SetPolygonMode(PolygonFace, PolygonMode),
    SetBlending(bool),
    SetBlendFactors(BlendFactor, BlendFactor),
    BindFramebuffer(Option<FramebufferId>),
    ClearFramebuffer(Option<FramebufferId>, ClearOp),
    BindShaderProgram(Option<ShaderProgramId>),
    BindVertexArray(Option<VertexArrayId>),
    BindSingleUniform {
        location: u32,
        value: UniformValue,
    },
    BindBuffer {
        target: BufferTarget,
        index: u32,
        buffer: BufferId,
        range: Option<(u64, u64)>,
    },
    BindTexture {
        unit: u32,
        texture: TextureId,
    },
    BindImageTexture {
        unit: u32,
        texture: TextureId,
        level: u32,
        layered: bool,
        access: ImageAccess,
    },
    GenerateMipmaps(TextureId),
    DrawArrays {
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        instance_count: u32,
    },
    DrawElements {
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: IndexType,
        instance_count: u32,
    },
    DispatchCompute {
        x: u32,
        y: u32,
        z: u32,
    },
    MemoryBarrier(MemoryBarrierFlags),
    InsertFence(FenceId),
    WaitFence(FenceId),
    DeleteFence(FenceId),
}

impl DeviceCall {
    /// Returns `true` for draws and dispatches.
    pub fn is_work(&self) -> bool {
        matches!(
            self,
            DeviceCall::DrawArrays { .. } | DeviceCall::DrawElements { .. } | DeviceCall::DispatchCompute { .. }
        )
    }

    /// Returns `true` for draws.
    pub fn is_draw(&self) -> bool {
        matches!(self, DeviceCall::DrawArrays { .. } | DeviceCall::DrawElements { .. })
    }
}
