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

//! Statistics reported by a render system.

/// Counters for the last rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// The number of draw calls recorded for the frame.
    pub draw_calls: u32,
    /// The number of meshes submitted.
    pub meshes: u32,
    /// The number of primitives submitted.
    pub primitives: u32,
    /// The number of materials pushed.
    pub materials: u32,
    /// The width of the render output in pixels.
    pub canvas_width: u32,
    /// The height of the render output in pixels.
    pub canvas_height: u32,
}

impl FrameStats {
    /// Resets the per-frame counters. The canvas size is kept.
    pub fn reset_counters(&mut self) {
        self.draw_calls = 0;
        self.meshes = 0;
        self.primitives = 0;
        self.materials = 0;
    }
}

/// Hardware information together with the statistics of the last frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HardwareStats {
    /// A human readable description of the graphics API in use.
    pub api_version: String,
    /// Counters of the last frame.
    pub last_frame: FrameStats,
}
