// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::string::String;

use waymark_buffer::BufferAllocationError;
use waymark_transform::TransformError;

use crate::layer::LayerId;

/// Error type layers return from [`Layer::draw_regions`](crate::Layer::draw_regions).
pub type LayerError = Box<dyn core::error::Error + Send + Sync>;

/// A layer failed while rendering its regions.
///
/// Caught at the viewport boundary: the remaining layers still render, and
/// the regions stay stale so the next paint retries them.
#[derive(Debug, thiserror::Error)]
#[error("layer `{name}` ({layer:?}) failed to render")]
pub struct LayerRenderError {
    /// Handle of the failing layer.
    pub layer: LayerId,
    /// Name of the failing layer, for messages.
    pub name: String,
    /// What the layer reported.
    pub source: LayerError,
}

/// Errors surfaced by the viewport.
#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    /// The requested extent or view cannot be transformed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The raster surface could not be allocated.
    #[error(transparent)]
    Allocation(#[from] BufferAllocationError),
    /// A layer failed to render.
    #[error(transparent)]
    Layer(#[from] LayerRenderError),
}
