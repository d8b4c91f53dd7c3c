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

//! Defines light types submitted to render systems.

use crate::math::Vec3;

/// The intensity used for an environment map when none is specified, in cd/m².
pub const DEFAULT_ENVIRONMENT_INTENSITY: f32 = 30000.0;

/// A directional light source that illuminates from a uniform direction.
///
/// Directional lights simulate infinitely distant light sources like the sun.
/// Intensity is given in lux, so physically plausible values are large
/// (direct sunlight is around 100000).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// The direction the light is pointing, from the light towards the scene.
    pub direction: Vec3,
    /// The color of the light in linear RGB space.
    pub color: Vec3,
    /// The illuminance of the light.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::ONE,
            intensity: 110000.0,
        }
    }
}
