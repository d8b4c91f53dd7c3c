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

//! Fast approximate anti-aliasing of the composited image.

use super::StepError;
use crate::render_lane::resources::{CreationScope, DefaultResources, GpuResource};
use crate::render_lane::shaders;
use crate::render_lane::uniforms::{record_uniforms, FxaaData, FXAA_BINDING};
use lumen_core::renderer::*;

/// Filters the backbuffer colour into the default surface.
#[derive(Debug)]
pub struct FxaaStep {
    program: ShaderProgramId,
    settings: FxaaSettings,
}

impl FxaaStep {
    /// Creates the FXAA program.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if the program cannot be created.
    pub fn create(device: &dyn GraphicsDevice, settings: &FxaaSettings) -> Result<Self, StepError> {
        let mut scope = CreationScope::new(device);
        let program = scope
            .program(
                "FXAA program",
                &ShaderProgramDescriptor::graphics(
                    "FXAA",
                    shaders::SCREEN_TRIANGLE_VERTEX,
                    None,
                    shaders::FXAA_FRAGMENT,
                ),
            )
            .map_err(StepError::creation(RenderStep::Fxaa))?;
        scope.finish();

        Ok(Self {
            program,
            settings: *settings,
        })
    }

    /// Applies new settings.
    pub fn configure(&mut self, settings: &FxaaSettings) {
        self.settings = *settings;
    }

    /// The current settings.
    pub fn settings(&self) -> &FxaaSettings {
        &self.settings
    }

    /// Records the full-screen filter of `source` into the bound target.
    ///
    /// One draw call is recorded.
    pub fn execute(
        &self,
        device: &dyn GraphicsDevice,
        commands: &mut CommandBuffer,
        ring: &mut FrameUniformRing,
        defaults: &DefaultResources,
        source: TextureId,
        (width, height): (u32, u32),
    ) {
        commands.set_depth_test(false);
        commands.bind_shader_program(Some(self.program));
        record_uniforms(device, ring, commands, FXAA_BINDING, &FxaaData::new(&self.settings, width, height));
        commands.bind_texture(0, source);
        commands.bind_vertex_array(Some(defaults.vertex_array));
        commands.draw_arrays(PrimitiveTopology::Triangles, 0, 3, 1);
        commands.bind_vertex_array(None);
        commands.bind_shader_program(None);
    }

    /// Releases the program.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        GpuResource::ShaderProgram(self.program).release(device);
    }
}
