// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Failure to allocate a raster surface.
///
/// Not fatal: the view buffer falls back to an unextended surface, and hosts
/// surface it as a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BufferAllocationError {
    /// A side exceeds the platform limit, or the pixel count overflows.
    #[error("a {width}x{height} surface exceeds the {max} pixel limit")]
    TooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Largest allowed side in pixels.
        max: u32,
    },
    /// The allocator could not provide the storage.
    #[error("out of memory allocating a {width}x{height} surface")]
    OutOfMemory {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}
