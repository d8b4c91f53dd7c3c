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

//! Persistently mapped ring of per-draw uniform records.
//!
//! The [`FrameUniformRing`] hands out aligned slices of one mapped buffer. The
//! CPU writes a record at the current offset, a command binds that range, and
//! the offset advances. Once per frame the ring is rewound to zero.
//!
//! # Synchronization
//!
//! ```text
//! begin frame:  wait_for_buffer(ring)   GPU finished reading last cycle
//! ...           push / bind range        CPU writes ahead of GPU reads
//! end frame:    lock_buffer(ring)        fence after the last reader
//!               execute; reset()         offset back to 0
//! ```
//!
//! The fence pair is recorded by the render system, the ring only manages
//! offsets and the mapping.

use crate::renderer::{
    api::buffer::{BufferAccess, BufferDescriptor, BufferId, BufferTarget},
    error::ResourceError,
    traits::GraphicsDevice,
};
use std::borrow::Cow;

/// Rounds `size` up to the next multiple of `alignment`.
#[inline]
pub fn align_up(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// A persistently mapped uniform buffer written front to back once per frame.
#[derive(Debug)]
pub struct FrameUniformRing {
    buffer: BufferId,
    capacity: u64,
    alignment: u64,
    offset: u64,
}

impl FrameUniformRing {
    /// Creates the ring buffer and maps it for the rest of its lifetime.
    ///
    /// The record alignment is taken from the device.
    ///
    /// # Arguments
    ///
    /// * `device` - The graphics device to allocate the buffer on.
    /// * `capacity` - The size of the buffer in bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if buffer creation or mapping fails.
    pub fn new(device: &dyn GraphicsDevice, capacity: u64) -> Result<Self, ResourceError> {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed("Frame Uniform Ring")),
            size: capacity,
            target: BufferTarget::Uniform,
            access: BufferAccess::WRITE | BufferAccess::PERSISTENT | BufferAccess::COHERENT,
        })?;

        if let Err(err) = device.map_buffer(buffer) {
            if let Err(destroy_err) = device.destroy_buffer(buffer) {
                log::warn!("Failed to release unmappable uniform ring: {destroy_err}");
            }
            return Err(err);
        }

        let alignment = device.uniform_buffer_offset_alignment().max(1);
        log::debug!("Frame uniform ring: {capacity} bytes, record alignment {alignment}");

        Ok(Self {
            buffer,
            capacity,
            alignment,
            offset: 0,
        })
    }

    /// Writes one record at the current offset and advances past it.
    ///
    /// Returns the offset the record was written at, for the range binding.
    ///
    /// # Panics
    ///
    /// Panics if the record does not fit in the remaining capacity. The ring
    /// is sized for a frame's worth of draws, so overflow is a programming error.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if the mapped write fails.
    pub fn push(&mut self, device: &dyn GraphicsDevice, record: &[u8]) -> Result<u64, ResourceError> {
        let size = record.len() as u64;
        assert!(
            self.offset + size <= self.capacity,
            "Uniform buffer size is too small: record of {size} bytes at offset {} exceeds capacity {}",
            self.offset,
            self.capacity
        );

        device.write_mapped_buffer(self.buffer, self.offset, record)?;
        let start = self.offset;
        self.offset += align_up(size, self.alignment);
        Ok(start)
    }

    /// Writes a plain-old-data record, see [`push`](Self::push).
    pub fn push_pod<T: bytemuck::Pod>(
        &mut self,
        device: &dyn GraphicsDevice,
        record: &T,
    ) -> Result<u64, ResourceError> {
        self.push(device, bytemuck::bytes_of(record))
    }

    /// Rewinds the write offset to zero for the next frame.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// The current write offset in bytes.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The total size of the ring in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// The record alignment in bytes.
    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Unmaps and releases the buffer.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        if let Err(err) = device.unmap_buffer(self.buffer) {
            log::warn!("Failed to unmap uniform ring: {err}");
        }
        if let Err(err) = device.destroy_buffer(self.buffer) {
            log::warn!("Failed to destroy uniform ring: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiples() {
        assert_eq!(align_up(0, 256), 0);
        assert_eq!(align_up(1, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
        assert_eq!(align_up(7, 0), 7);
    }
}
