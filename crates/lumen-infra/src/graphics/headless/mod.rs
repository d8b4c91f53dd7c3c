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

//! An in-memory graphics backend.
//!
//! [`HeadlessDevice`] implements the full [`GraphicsDevice`] contract without a
//! GPU. Resources live in tables, persistent mappings read and write real
//! bytes, fences signal immediately and every state or work call is appended
//! to a [`DeviceCall`] log. It backs the sandbox and the end-to-end tests of
//! the render systems.
//!
//! [`GraphicsDevice`]: lumen_core::renderer::GraphicsDevice

mod call;
mod device;

pub use call::DeviceCall;
pub use device::{HeadlessDevice, LiveResources, TextureInfo};
