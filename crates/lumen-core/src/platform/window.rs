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

//! The window-side collaborator of a render system.

/// A trait that abstracts the drawable surface of a window.
///
/// Any windowing backend can implement this trait to present frames produced
/// by a render system. The render system queries the size at initialization
/// and on resize, and toggles vsync when it is configured.
pub trait RenderSurface: Send {
    /// Returns the drawable dimensions `(width, height)` in pixels.
    fn drawable_size(&self) -> (u32, u32);

    /// Enables or disables waiting for vertical sync on buffer swaps.
    fn set_vsync(&mut self, enabled: bool);

    /// Presents the default framebuffer.
    fn swap_buffers(&mut self);
}
