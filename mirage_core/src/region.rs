// Copyright 2026 the Mirage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rectangles and disjoint-rectangle regions.
//!
//! Mirror nodes live on a pixel grid, so all geometry here is integral.
//! A [`PixelRect`] is a half-open box `[x0, x1) × [y0, y1)`. A [`Region`] is
//! a set of pairwise-disjoint, non-empty boxes; it may describe disjoint
//! areas (an L-shaped band, a frame with a hole) that no single rectangle
//! can.
//!
//! Conversions to and from [`kurbo::Rect`] are provided for hosts that
//! describe shapes in floating point. Converting *into* the pixel grid
//! rounds outward, so no covered pixel is lost.

use alloc::vec::Vec;
use core::fmt;

/// A half-open, axis-aligned integer box.
///
/// Empty boxes are normalized so that `x0 == x1` or `y0 == y1`; use
/// [`is_empty`](Self::is_empty) rather than comparing against a specific
/// empty value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl PixelRect {
    /// The empty box at the origin.
    pub const ZERO: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    /// Creates a box from an origin and a size.
    ///
    /// Edges saturate at `i32::MAX` rather than wrapping.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add_unsigned(width),
            y1: y.saturating_add_unsigned(height),
        }
    }

    /// Creates a box covering `(0, 0)` to `(width, height)`.
    #[must_use]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Creates a box from two corner points, in any order.
    #[must_use]
    pub fn from_points(xa: i32, ya: i32, xb: i32, yb: i32) -> Self {
        Self {
            x0: xa.min(xb),
            y0: ya.min(yb),
            x1: xa.max(xb),
            y1: ya.max(yb),
        }
    }

    /// Returns the horizontal extent.
    #[inline]
    #[must_use]
    pub const fn width(self) -> u32 {
        self.x1.abs_diff(self.x0)
    }

    /// Returns the vertical extent.
    #[inline]
    #[must_use]
    pub const fn height(self) -> u32 {
        self.y1.abs_diff(self.y0)
    }

    /// Returns the number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Returns `true` if the box covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Returns `true` if the pixel at `(x, y)` lies inside the box.
    #[must_use]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Returns the overlap of two boxes, or an empty box at `self`'s origin.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let r = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() {
            Self {
                x0: self.x0,
                y0: self.y0,
                x1: self.x0,
                y1: self.y0,
            }
        } else {
            r
        }
    }

    /// Returns `true` if the two boxes share at least one pixel.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Returns the smallest box containing both boxes.
    ///
    /// An empty operand contributes nothing.
    #[must_use]
    pub fn union_box(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Returns the box shifted by `(dx, dy)`.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x0: self.x0.saturating_add(dx),
            y0: self.y0.saturating_add(dy),
            x1: self.x1.saturating_add(dx),
            y1: self.y1.saturating_add(dy),
        }
    }

    /// Converts to a floating-point [`kurbo::Rect`].
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }

    /// Converts a [`kurbo::Rect`] to the pixel grid, rounding outward.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "coordinates are clamped to the i32 range before the cast"
    )]
    pub fn from_kurbo(rect: kurbo::Rect) -> Self {
        let r = rect.abs().expand();
        let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
        Self {
            x0: clamp(r.x0),
            y0: clamp(r.y0),
            x1: clamp(r.x1),
            y1: clamp(r.y1),
        }
    }
}

impl fmt::Debug for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width(),
            self.height(),
            self.x0,
            self.y0
        )
    }
}

impl From<kurbo::Rect> for PixelRect {
    fn from(rect: kurbo::Rect) -> Self {
        Self::from_kurbo(rect)
    }
}

/// Pushes the parts of `a` not covered by `b` onto `out` (at most four).
fn subtract_rect(a: PixelRect, b: PixelRect, out: &mut Vec<PixelRect>) {
    let i = a.intersect(b);
    if i.is_empty() {
        out.push(a);
        return;
    }
    // Full-width bands above and below the overlap, then the side pieces.
    let pieces = [
        PixelRect {
            x0: a.x0,
            y0: a.y0,
            x1: a.x1,
            y1: i.y0,
        },
        PixelRect {
            x0: a.x0,
            y0: i.y1,
            x1: a.x1,
            y1: a.y1,
        },
        PixelRect {
            x0: a.x0,
            y0: i.y0,
            x1: i.x0,
            y1: i.y1,
        },
        PixelRect {
            x0: i.x1,
            y0: i.y0,
            x1: a.x1,
            y1: i.y1,
        },
    ];
    out.extend(pieces.into_iter().filter(|p| !p.is_empty()));
}

/// A set of pixels described by pairwise-disjoint boxes.
///
/// The decomposition into boxes is not canonical: two regions covering the
/// same pixels compare equal even when their [`rects`](Self::rects) differ.
#[derive(Clone, Default)]
pub struct Region {
    rects: Vec<PixelRect>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single box.
    #[must_use]
    pub fn from_rect(rect: PixelRect) -> Self {
        let mut rects = Vec::new();
        if !rect.is_empty() {
            rects.push(rect);
        }
        Self { rects }
    }

    /// Creates a region covering the union of the given boxes.
    ///
    /// The boxes may overlap.
    #[must_use]
    pub fn from_rects(rects: impl IntoIterator<Item = PixelRect>) -> Self {
        let mut region = Self::new();
        for r in rects {
            region.add_rect(r);
        }
        region
    }

    /// Returns the disjoint boxes making up this region.
    #[must_use]
    pub fn rects(&self) -> &[PixelRect] {
        &self.rects
    }

    /// Returns `true` if the region covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns the number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    /// Returns `true` if the pixel at `(x, y)` lies inside the region.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Returns the smallest box containing the whole region.
    #[must_use]
    pub fn bounding_box(&self) -> PixelRect {
        self.rects
            .iter()
            .fold(PixelRect::ZERO, |acc, r| acc.union_box(*r))
    }

    /// Adds a box to the region.
    pub fn add_rect(&mut self, rect: PixelRect) {
        if rect.is_empty() {
            return;
        }
        let mut pending = Vec::from([rect]);
        let mut next = Vec::new();
        for existing in &self.rects {
            for piece in pending.drain(..) {
                subtract_rect(piece, *existing, &mut next);
            }
            core::mem::swap(&mut pending, &mut next);
            if pending.is_empty() {
                return;
            }
        }
        self.rects.append(&mut pending);
    }

    /// Returns the pixels covered by either region.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for r in &other.rects {
            out.add_rect(*r);
        }
        out
    }

    /// Returns the pixels covered by both regions.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut rects = Vec::new();
        for a in &self.rects {
            for b in &other.rects {
                let i = a.intersect(*b);
                if !i.is_empty() {
                    rects.push(i);
                }
            }
        }
        // Pieces of disjoint inputs are themselves disjoint.
        Self { rects }
    }

    /// Returns the pixels covered by `self` but not by `other`.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        let mut pending = self.rects.clone();
        let mut next = Vec::new();
        for b in &other.rects {
            for piece in pending.drain(..) {
                subtract_rect(piece, *b, &mut next);
            }
            core::mem::swap(&mut pending, &mut next);
        }
        Self { rects: pending }
    }

    /// Returns the pixels of `bounds` not covered by this region.
    #[must_use]
    pub fn inverse(&self, bounds: PixelRect) -> Self {
        Self::from_rect(bounds).subtract(self)
    }

    /// Returns the region shifted by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            rects: self.rects.iter().map(|r| r.translate(dx, dy)).collect(),
        }
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.area() == other.area() && self.subtract(other).is_empty()
    }
}

impl Eq for Region {}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.rects.iter()).finish()
    }
}

impl From<PixelRect> for Region {
    fn from(rect: PixelRect) -> Self {
        Self::from_rect(rect)
    }
}

impl FromIterator<PixelRect> for Region {
    fn from_iter<T: IntoIterator<Item = PixelRect>>(iter: T) -> Self {
        Self::from_rects(iter)
    }
}
