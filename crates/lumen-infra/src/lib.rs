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

//! Concrete implementations of the collaborators a lumen render system talks to.
//!
//! - [`graphics::headless::HeadlessDevice`]: a [`GraphicsDevice`] that keeps
//!   resources in memory and records every replayed call.
//! - [`platform::HeadlessSurface`]: a [`RenderSurface`] without a window.
//! - [`logging`]: logger bootstrap for binaries.
//!
//! [`GraphicsDevice`]: lumen_core::renderer::GraphicsDevice
//! [`RenderSurface`]: lumen_core::platform::RenderSurface

#![warn(missing_docs)]

#[cfg(feature = "graphics")]
pub mod graphics;
pub mod logging;
#[cfg(feature = "platform")]
pub mod platform;
