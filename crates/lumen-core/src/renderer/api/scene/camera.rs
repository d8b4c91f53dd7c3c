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

//! Camera data read by render systems once per frame.
//!
//! Besides the usual matrices a camera carries physical exposure parameters.
//! Render systems convert them into a scalar exposure, and may write adapted
//! values back when adaptive exposure is enabled.

use crate::math::{Mat4, Vec3};

/// The smallest supported aperture (f-number).
pub const MIN_APERTURE: f32 = 0.5;
/// The largest supported aperture (f-number).
pub const MAX_APERTURE: f32 = 64.0;
/// The aperture a camera starts with.
pub const DEFAULT_APERTURE: f32 = 16.0;
/// The shortest supported shutter speed in seconds.
pub const MIN_SHUTTER_SPEED: f32 = 1.0 / 25000.0;
/// The longest supported shutter speed in seconds.
pub const MAX_SHUTTER_SPEED: f32 = 60.0;
/// The shutter speed a camera starts with.
pub const DEFAULT_SHUTTER_SPEED: f32 = 1.0 / 125.0;
/// The lowest supported sensor sensitivity.
pub const MIN_ISO: f32 = 10.0;
/// The highest supported sensor sensitivity.
pub const MAX_ISO: f32 = 204800.0;
/// The sensitivity a camera starts with.
pub const DEFAULT_ISO: f32 = 100.0;

/// Physical exposure parameters of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalCameraSettings {
    /// The aperture as an f-number.
    pub aperture: f32,
    /// The shutter speed in seconds.
    pub shutter_speed: f32,
    /// The sensor sensitivity.
    pub iso: f32,
    /// If `true`, the render system adapts the three values above to the scene luminance.
    pub adaptive_exposure: bool,
}

impl Default for PhysicalCameraSettings {
    fn default() -> Self {
        Self {
            aperture: DEFAULT_APERTURE,
            shutter_speed: DEFAULT_SHUTTER_SPEED,
            iso: DEFAULT_ISO,
            adaptive_exposure: false,
        }
    }
}

impl PhysicalCameraSettings {
    /// Returns a copy with every parameter clamped to its physical range.
    pub fn clamped(&self) -> Self {
        Self {
            aperture: self.aperture.clamp(MIN_APERTURE, MAX_APERTURE),
            shutter_speed: self.shutter_speed.clamp(MIN_SHUTTER_SPEED, MAX_SHUTTER_SPEED),
            iso: self.iso.clamp(MIN_ISO, MAX_ISO),
            adaptive_exposure: self.adaptive_exposure,
        }
    }
}

/// The active camera as seen by a render system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    /// The world-to-view transform.
    pub view: Mat4,
    /// The view-to-clip transform.
    pub projection: Mat4,
    /// `projection * view`.
    pub view_projection: Mat4,
    /// The camera's world transform.
    pub world_transform: Mat4,
    /// Physical exposure parameters.
    pub physical: PhysicalCameraSettings,
}

impl CameraData {
    /// Creates camera data from its view and projection, deriving the rest.
    ///
    /// The world transform is the inverse of `view`, or identity if `view` is singular.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view,
            projection,
            view_projection: projection * view,
            world_transform: view.inverse().unwrap_or(Mat4::IDENTITY),
            physical: PhysicalCameraSettings::default(),
        }
    }

    /// Creates a perspective camera at `eye` looking at `target`.
    ///
    /// Returns `None` if the view direction is degenerate.
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_radians: f32, aspect_ratio: f32) -> Option<Self> {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y)?;
        let projection = Mat4::perspective_rh_zo(fov_y_radians, aspect_ratio, 0.1, 1000.0);
        Some(Self::new(view, projection))
    }

    /// The camera position in world space.
    pub fn world_position(&self) -> Vec3 {
        self.world_transform.translation()
    }
}
