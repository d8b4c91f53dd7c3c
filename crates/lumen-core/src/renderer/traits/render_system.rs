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

use crate::math::Mat4;
use crate::platform::window::RenderSurface;
use crate::renderer::api::*;
use crate::renderer::error::RenderError;

/// Trait representing a render system.
///
/// A render system owns the GPU resources of one base pipeline and records a
/// frame between [`begin_render`](RenderSystem::begin_render) and
/// [`finish_render`](RenderSystem::finish_render). Scene traversal happens
/// outside; it feeds the frame through `set_model_info`, `draw_mesh` and
/// `submit_light`.
pub trait RenderSystem: std::fmt::Debug {
    /// Applies the configuration: vsync on `surface` and the optional steps.
    fn configure(
        &mut self,
        configuration: &RenderConfiguration,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), RenderError>;

    /// Starts a frame for `camera`.
    fn begin_render(&mut self, camera: &CameraData);

    /// Binds the vertex array of the mesh drawn by the following `draw_mesh` calls.
    fn set_mesh_geometry(&mut self, vertex_array: VertexArrayId);

    /// Records the per-mesh transform for the next draw.
    fn set_model_info(&mut self, model: &Mat4, has_normals: bool, has_tangents: bool);

    /// Records one draw of the current mesh with `material`.
    #[allow(clippy::too_many_arguments)]
    fn draw_mesh(
        &mut self,
        material: &Material,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
        index_type: Option<IndexType>,
        instance_count: u32,
    );

    /// Submits the directional light of the frame.
    fn submit_light(&mut self, light: &DirectionalLight);

    /// Finishes and flushes the frame. `camera` receives adapted exposure values.
    fn finish_render(&mut self, dt: f32, camera: &mut CameraData);

    /// Resizes the render output.
    ///
    /// A zero width or height is a valid, empty output (e.g. a minimized window).
    ///
    /// # Panics
    ///
    /// Panics if any argument is negative.
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// The base pipeline implemented by this system.
    fn base_render_pipeline(&self) -> RenderPipeline;

    /// Hardware information and the statistics of the last frame.
    fn hardware_stats(&self) -> &HardwareStats;

    /// Releases every GPU resource of the system.
    fn destroy(&mut self);
}
