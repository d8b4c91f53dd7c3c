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

//! Defines shader programs and the stages they are linked from.

use std::borrow::Cow;

/// A single programmable stage of the GPU pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The geometry stage.
    Geometry,
    /// The fragment stage.
    Fragment,
    /// The compute stage.
    Compute,
}

/// The source of one shader stage, given as a resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageSource<'a> {
    /// The stage this source is compiled for.
    pub stage: ShaderStage,
    /// Path to the source, relative to the resource root.
    pub path: Cow<'a, str>,
}

/// A descriptor used to create a [`ShaderProgramId`].
#[derive(Debug, Clone)]
pub enum ShaderProgramDescriptor<'a> {
    /// A graphics program linked from a vertex, an optional geometry and a fragment stage.
    Graphics {
        /// A debug label.
        label: Cow<'a, str>,
        /// The vertex stage source path.
        vertex: Cow<'a, str>,
        /// The geometry stage source path, if any.
        geometry: Option<Cow<'a, str>>,
        /// The fragment stage source path.
        fragment: Cow<'a, str>,
    },
    /// A compute program with a single stage.
    Compute {
        /// A debug label.
        label: Cow<'a, str>,
        /// The compute stage source path.
        compute: Cow<'a, str>,
    },
}

impl<'a> ShaderProgramDescriptor<'a> {
    /// Describes a graphics program.
    pub fn graphics(
        label: &'a str,
        vertex: &'a str,
        geometry: Option<&'a str>,
        fragment: &'a str,
    ) -> Self {
        Self::Graphics {
            label: Cow::Borrowed(label),
            vertex: Cow::Borrowed(vertex),
            geometry: geometry.map(Cow::Borrowed),
            fragment: Cow::Borrowed(fragment),
        }
    }

    /// Describes a compute program.
    pub fn compute(label: &'a str, compute: &'a str) -> Self {
        Self::Compute {
            label: Cow::Borrowed(label),
            compute: Cow::Borrowed(compute),
        }
    }

    /// Returns the debug label.
    pub fn label(&self) -> &str {
        match self {
            Self::Graphics { label, .. } | Self::Compute { label, .. } => label.as_ref(),
        }
    }

    /// Lists the stages of the program with their source paths.
    pub fn stages(&self) -> Vec<ShaderStageSource<'_>> {
        fn source<'s>(stage: ShaderStage, path: &'s Cow<'_, str>) -> ShaderStageSource<'s> {
            ShaderStageSource {
                stage,
                path: Cow::Borrowed(path.as_ref()),
            }
        }
        match self {
            Self::Graphics {
                vertex,
                geometry,
                fragment,
                ..
            } => {
                let mut stages = vec![source(ShaderStage::Vertex, vertex)];
                if let Some(geometry) = geometry {
                    stages.push(source(ShaderStage::Geometry, geometry));
                }
                stages.push(source(ShaderStage::Fragment, fragment));
                stages
            }
            Self::Compute { compute, .. } => vec![source(ShaderStage::Compute, compute)],
        }
    }

    /// Returns `true` for compute programs.
    pub fn is_compute(&self) -> bool {
        matches!(self, Self::Compute { .. })
    }
}

/// An opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderProgramId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_program_lists_stages_in_pipeline_order() {
        let desc = ShaderProgramDescriptor::graphics(
            "lighting",
            "res/shader/v_empty.glsl",
            Some("res/shader/g_create_screen_space_quad.glsl"),
            "res/shader/f_deferred_lighting.glsl",
        );
        let stages: Vec<_> = desc.stages().iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![ShaderStage::Vertex, ShaderStage::Geometry, ShaderStage::Fragment]
        );
        assert!(!desc.is_compute());
    }

    #[test]
    fn compute_program_has_one_stage() {
        let desc = ShaderProgramDescriptor::compute("reduce", "res/shader/c_reduce.glsl");
        assert_eq!(desc.stages().len(), 1);
        assert_eq!(desc.label(), "reduce");
    }
}
