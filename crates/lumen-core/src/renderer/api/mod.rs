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

//! The public, backend-agnostic vocabulary of the renderer.
//!
//! Resource handles and descriptors, fixed-function state, scene data and the
//! configuration and statistics types shared by every render system.

pub mod buffer;
pub mod core;
pub mod debug;
pub mod framebuffer;
pub mod scene;
pub mod shader;
pub mod state;
pub mod texture;

pub use self::buffer::*;
pub use self::core::*;
pub use self::debug::*;
pub use self::framebuffer::*;
pub use self::scene::*;
pub use self::shader::*;
pub use self::state::*;
pub use self::texture::*;
