// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Errors raised when building a [`CoordinateTransform`](crate::CoordinateTransform).
///
/// Callers are expected to guard against these before transforming, usually
/// by widening a near-zero extent with [`Extent::widened`](crate::Extent::widened).
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// The extent has no width or no height, so no scale can be derived.
    #[error("degenerate extent ({width} x {height}); widen it before transforming")]
    DegenerateExtent {
        /// Extent width in geographic units.
        width: f64,
        /// Extent height in geographic units.
        height: f64,
    },
    /// The device rectangle has no area.
    #[error("view rectangle has no area ({width} x {height} px)")]
    EmptyView {
        /// View width in pixels.
        width: f64,
        /// View height in pixels.
        height: f64,
    },
    /// The extent, view, or angle contains NaN or infinity, or the derived
    /// scale overflowed.
    #[error("transform inputs are not finite")]
    NonFinite,
}
