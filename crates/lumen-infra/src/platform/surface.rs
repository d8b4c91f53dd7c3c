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

//! A drawable surface without a window.

use lumen_core::platform::RenderSurface;

/// A [`RenderSurface`] that only tracks its size, vsync and presented frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    vsync: bool,
    swap_count: u64,
}

impl HeadlessSurface {
    /// Creates a surface of `width` x `height` pixels with vsync enabled.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            vsync: true,
            swap_count: 0,
        }
    }

    /// Changes the drawable size, as a window resize would.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Whether swaps wait for vertical sync.
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    /// The number of frames presented so far.
    pub fn swap_count(&self) -> u64 {
        self.swap_count
    }
}

impl RenderSurface for HeadlessSurface {
    fn drawable_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_vsync(&mut self, enabled: bool) {
        log::debug!("Headless surface vsync: {enabled}");
        self.vsync = enabled;
    }

    fn swap_buffers(&mut self) {
        self.swap_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_size_vsync_and_swaps() {
        let mut surface = HeadlessSurface::new(800, 600);
        assert!(surface.vsync());
        surface.set_vsync(false);
        surface.resize(1280, 720);
        surface.swap_buffers();
        surface.swap_buffers();

        assert!(!surface.vsync());
        assert_eq!(surface.drawable_size(), (1280, 720));
        assert_eq!(surface.swap_count(), 2);
    }
}
