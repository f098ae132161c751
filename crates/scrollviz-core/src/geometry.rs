#![forbid(unsafe_code)]

//! Geometric primitives in canvas pixel space.

/// A point in pixels, origin at the top-left of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered size of a canvas or drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// A size with no area, reported by hosts that have not laid out yet.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size with non-finite or negative components replaced by zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self::new(non_negative(self.width), non_negative(self.height))
    }

    /// Whether either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// The drawing area left after removing `margin`.
    ///
    /// Saturates at zero, so an unmeasured canvas yields an empty area
    /// rather than negative extents.
    #[must_use]
    pub fn inner(&self, margin: Margin) -> Self {
        let outer = self.sanitized();
        Self::new(
            non_negative(outer.width - margin.horizontal()),
            non_negative(outer.height - margin.vertical()),
        )
    }
}

/// Space reserved around a drawing area (axes, labels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    /// Create margins in CSS order: top, right, bottom, left.
    #[inline]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Left + right.
    #[inline]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Top + bottom.
    #[inline]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Offset of the inner drawing area inside its parent.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
