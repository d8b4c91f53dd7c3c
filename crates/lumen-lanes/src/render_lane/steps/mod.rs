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

//! Optional steps plugged into the deferred pipeline.
//!
//! The set of steps is closed: each [`RenderStep`] of the configuration maps to
//! one [`PipelineStep`] variant, and the render system matches on the variant it
//! needs instead of looking steps up by type.

mod fxaa;
mod ibl;

pub use fxaa::FxaaStep;
pub use ibl::{
    prefilter_roughness, EnvironmentMaps, IblStep, BRDF_LUT_UNIT, IRRADIANCE_UNIT, PREFILTERED_SPECULAR_UNIT,
};

use super::resources::CreationFailure;
use lumen_core::renderer::{GraphicsDevice, RenderStep};

/// A pipeline step failed to set up its GPU resources.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A resource of the step could not be created.
    #[error("{step:?} step: {failure}")]
    Creation {
        /// The step that failed.
        step: RenderStep,
        /// The failed creation.
        #[source]
        failure: CreationFailure,
    },
}

impl StepError {
    pub(crate) fn creation(step: RenderStep) -> impl FnOnce(CreationFailure) -> Self {
        move |failure| StepError::Creation { step, failure }
    }
}

/// A configured pipeline step.
#[derive(Debug)]
pub enum PipelineStep {
    /// Image based lighting.
    Ibl(IblStep),
    /// Anti-aliasing of the final image.
    Fxaa(FxaaStep),
}

impl PipelineStep {
    /// The configuration entry this step implements.
    pub fn kind(&self) -> RenderStep {
        match self {
            PipelineStep::Ibl(_) => RenderStep::Ibl,
            PipelineStep::Fxaa(_) => RenderStep::Fxaa,
        }
    }

    /// Releases every resource the step owns.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        match self {
            PipelineStep::Ibl(step) => step.destroy(device),
            PipelineStep::Fxaa(step) => step.destroy(device),
        }
    }
}
