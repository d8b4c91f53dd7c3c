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

//! Deferred command recording.
//!
//! Render systems record [`Command`]s into a [`CommandBuffer`] while building a
//! frame. Nothing reaches the device until [`CommandBuffer::execute`] replays
//! the sequence, consulting a [`GraphicsState`] cache so that redundant state
//! changes are dropped at replay time.
//!
//! Hazards are not tracked. Whoever records a compute pass that writes a
//! resource also records the [`Command::AddMemoryBarrier`] before its readers.

mod buffer;
mod command;
mod state;

pub use self::buffer::CommandBuffer;
pub use self::command::Command;
pub use self::state::GraphicsState;
