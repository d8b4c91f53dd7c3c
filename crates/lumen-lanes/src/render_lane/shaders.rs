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

//! Shader stage paths of the built-in passes.
//!
//! Sources are compiled by the device, which resolves these paths against its
//! asset root. Full-screen passes draw a single point that the geometry stage
//! expands into a screen-space quad, so they share [`EMPTY_VERTEX`] and
//! [`SCREEN_QUAD_GEOMETRY`].

use lumen_core::renderer::ShaderProgramDescriptor;

/// A pass-through vertex stage with no inputs.
pub const EMPTY_VERTEX: &str = "shaders/common/empty.vert";
/// Expands one point into a screen-space quad.
pub const SCREEN_QUAD_GEOMETRY: &str = "shaders/common/screen_quad.geom";
/// Emits a full-screen triangle from the vertex index.
pub const SCREEN_TRIANGLE_VERTEX: &str = "shaders/common/screen_triangle.vert";

/// Geometry pass: writes materials into the G-buffer.
pub const GEOMETRY_VERTEX: &str = "shaders/deferred/geometry.vert";
/// Geometry pass fragment stage.
pub const GEOMETRY_FRAGMENT: &str = "shaders/deferred/geometry.frag";
/// Lighting pass: shades the G-buffer into the HDR buffer.
pub const LIGHTING_FRAGMENT: &str = "shaders/deferred/lighting.frag";
/// Composite pass: applies exposure and tone mapping into the backbuffer.
pub const COMPOSITE_FRAGMENT: &str = "shaders/deferred/composite.frag";

/// Builds the luminance histogram from the HDR buffer.
pub const LUMINANCE_HISTOGRAM_COMPUTE: &str = "shaders/exposure/histogram.comp";
/// Folds the histogram into the averaged luminance.
pub const LUMINANCE_REDUCTION_COMPUTE: &str = "shaders/exposure/reduction.comp";

/// Projects an equirectangular image onto the faces of a cubemap.
pub const EQUIRECT_TO_CUBEMAP_COMPUTE: &str = "shaders/ibl/equirect_to_cubemap.comp";
/// Convolves the cubemap into the diffuse irradiance map.
pub const IRRADIANCE_COMPUTE: &str = "shaders/ibl/irradiance.comp";
/// Prefilters one mip of the specular map.
pub const PREFILTER_SPECULAR_COMPUTE: &str = "shaders/ibl/prefilter_specular.comp";
/// Integrates the split-sum BRDF into a lookup texture.
pub const BRDF_INTEGRATION_COMPUTE: &str = "shaders/ibl/brdf_integration.comp";
/// Draws the environment cube.
pub const CUBEMAP_VERTEX: &str = "shaders/ibl/cubemap.vert";
/// Samples the prefiltered environment.
pub const CUBEMAP_FRAGMENT: &str = "shaders/ibl/cubemap.frag";

/// Fast approximate anti-aliasing.
pub const FXAA_FRAGMENT: &str = "shaders/post/fxaa.frag";

/// A full-screen program: empty vertex stage, screen-quad geometry stage and `fragment`.
pub fn screen_space_program(label: &'static str, fragment: &'static str) -> ShaderProgramDescriptor<'static> {
    ShaderProgramDescriptor::graphics(label, EMPTY_VERTEX, Some(SCREEN_QUAD_GEOMETRY), fragment)
}
