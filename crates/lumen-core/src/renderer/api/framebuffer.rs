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

//! Defines framebuffers: render targets owning their attachment textures.

use super::texture::TextureFormat;
use std::borrow::Cow;

/// The maximum number of colour attachments a framebuffer may carry.
pub const MAX_COLOR_ATTACHMENTS: usize = 4;

/// Names an attachment slot of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferAttachment {
    /// Colour attachment 0.
    Color0,
    /// Colour attachment 1.
    Color1,
    /// Colour attachment 2.
    Color2,
    /// Colour attachment 3.
    Color3,
    /// The depth attachment.
    Depth,
}

impl FramebufferAttachment {
    /// Returns the colour attachment with the given index, if it exists.
    pub const fn color(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Color0),
            1 => Some(Self::Color1),
            2 => Some(Self::Color2),
            3 => Some(Self::Color3),
            _ => None,
        }
    }

    /// Returns the index of a colour attachment, or `None` for depth.
    pub const fn color_index(&self) -> Option<usize> {
        match self {
            Self::Color0 => Some(0),
            Self::Color1 => Some(1),
            Self::Color2 => Some(2),
            Self::Color3 => Some(3),
            Self::Depth => None,
        }
    }
}

/// A descriptor used to create a [`FramebufferId`].
///
/// The device creates one texture per listed format; the framebuffer owns them
/// and resizes them together.
#[derive(Debug, Clone)]
pub struct FramebufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The width of every attachment.
    pub width: u32,
    /// The height of every attachment.
    pub height: u32,
    /// Formats of the colour attachments, in slot order (at most [`MAX_COLOR_ATTACHMENTS`]).
    pub color_formats: Vec<TextureFormat>,
    /// Format of the depth attachment, if any.
    pub depth_format: Option<TextureFormat>,
}

/// An opaque handle to a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub usize);
