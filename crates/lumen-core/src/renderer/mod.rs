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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" of rendering: the [`GraphicsDevice`]
//! trait a backend implements, the resource descriptors and handles it works
//! with, the [`CommandBuffer`] that records and replays GPU work, and the
//! [`FrameUniformRing`] that feeds per-draw uniform blocks.
//!
//! The concrete backends live in `lumen-infra`; the render systems that drive
//! these contracts live in `lumen-lanes`.

pub mod api;
pub mod command;
pub mod error;
pub mod traits;
pub mod uniform_ring_buffer;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::command::{Command, CommandBuffer, GraphicsState};
pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::traits::{GraphicsDevice, RenderSystem};
pub use self::uniform_ring_buffer::FrameUniformRing;
