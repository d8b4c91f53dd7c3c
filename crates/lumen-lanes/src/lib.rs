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

//! Hot-path rendering for the lumen renderer.
//!
//! A render lane turns the abstract contracts of `lumen-core` into a concrete
//! frame: it owns the GPU resources of a pipeline, records every pass into a
//! [`CommandBuffer`](lumen_core::renderer::CommandBuffer) and flushes it at the
//! points where the CPU needs results back.

#![warn(missing_docs)]

pub mod render_lane;
