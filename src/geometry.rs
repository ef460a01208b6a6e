//! Core geometry types
//!
//! This module provides the geometric primitives the codec and scene graph
//! share: points, rectangles and 2D affine transforms. All coordinates are
//! in user-space units with the origin at the top-left corner:
//! - Positive X extends to the right
//! - Positive Y extends downward
//!
//! Floats are `f64` in memory; the codec narrows to `f32` on write unless
//! the document was built with big floats.

use std::fmt;

/// A 2D point in user space
///
/// # Examples
///
/// ```
/// use fastvector::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (horizontal position, increases to the right)
  pub x: f64,
  /// Y coordinate (vertical position, increases downward)
  pub y: f64,
}

impl Point {
  /// The zero point at the origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// An axis-aligned rectangle in user space
///
/// Stored as origin plus extent. Width and height are expected to be
/// non-negative (not enforced by the type).
///
/// # Examples
///
/// ```
/// use fastvector::Rect;
///
/// let r = Rect::from_xywh(10.0, 10.0, 100.0, 50.0);
/// assert_eq!(r.right(), 110.0);
/// assert_eq!(r.bottom(), 60.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  /// Left edge
  pub x: f64,
  /// Top edge
  pub y: f64,
  /// Horizontal extent
  pub width: f64,
  /// Vertical extent
  pub height: f64,
}

impl Rect {
  /// A rectangle at the origin with zero extent
  pub const ZERO: Self = Self {
    x: 0.0,
    y: 0.0,
    width: 0.0,
    height: 0.0,
  };

  /// Creates a rectangle from origin and extent
  pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// Creates the smallest rectangle containing both corner points
  pub fn from_points(a: Point, b: Point) -> Self {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    Self {
      x,
      y,
      width: a.x.max(b.x) - x,
      height: a.y.max(b.y) - y,
    }
  }

  /// Right edge (x + width)
  pub fn right(&self) -> f64 {
    self.x + self.width
  }

  /// Bottom edge (y + height)
  pub fn bottom(&self) -> f64 {
    self.y + self.height
  }

  /// True if either extent is zero or negative
  pub fn is_empty(&self) -> bool {
    self.width <= 0.0 || self.height <= 0.0
  }

  /// Smallest rectangle containing both `self` and `other`
  ///
  /// # Examples
  ///
  /// ```
  /// use fastvector::Rect;
  ///
  /// let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
  /// let b = Rect::from_xywh(20.0, 5.0, 10.0, 10.0);
  /// assert_eq!(a.union(b), Rect::from_xywh(0.0, 0.0, 30.0, 15.0));
  /// ```
  pub fn union(self, other: Rect) -> Rect {
    let x = self.x.min(other.x);
    let y = self.y.min(other.y);
    Rect {
      x,
      y,
      width: self.right().max(other.right()) - x,
      height: self.bottom().max(other.bottom()) - y,
    }
  }

  /// Extends the rectangle to contain `p`
  pub fn include(self, p: Point) -> Rect {
    let x = self.x.min(p.x);
    let y = self.y.min(p.y);
    Rect {
      x,
      y,
      width: self.right().max(p.x) - x,
      height: self.bottom().max(p.y) - y,
    }
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[{}, {} {}x{}]",
      self.x, self.y, self.width, self.height
    )
  }
}

/// A 2D affine transform
///
/// Column-major 2x3 matrix mapping `(x, y)` to:
///
/// ```text
/// x' = sx * x + kx * y + tx
/// y' = ky * x + sy * y + ty
/// ```
///
/// Serialized as six consecutive floats in the transforms array, in field
/// order `sx, ky, kx, sy, tx, ty`.
///
/// # Examples
///
/// ```
/// use fastvector::{Affine, Point};
///
/// let t = Affine::translate(5.0, -2.0);
/// assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(6.0, -1.0));
/// assert!(Affine::IDENTITY.is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
  pub sx: f64,
  pub ky: f64,
  pub kx: f64,
  pub sy: f64,
  pub tx: f64,
  pub ty: f64,
}

impl Affine {
  /// The identity transform
  pub const IDENTITY: Self = Self {
    sx: 1.0,
    ky: 0.0,
    kx: 0.0,
    sy: 1.0,
    tx: 0.0,
    ty: 0.0,
  };

  /// Creates a transform from the six matrix components
  pub const fn from_components(sx: f64, ky: f64, kx: f64, sy: f64, tx: f64, ty: f64) -> Self {
    Self {
      sx,
      ky,
      kx,
      sy,
      tx,
      ty,
    }
  }

  /// A pure translation
  pub const fn translate(tx: f64, ty: f64) -> Self {
    Self {
      sx: 1.0,
      ky: 0.0,
      kx: 0.0,
      sy: 1.0,
      tx,
      ty,
    }
  }

  /// A pure (possibly non-uniform) scale
  pub const fn scale(sx: f64, sy: f64) -> Self {
    Self {
      sx,
      ky: 0.0,
      kx: 0.0,
      sy,
      tx: 0.0,
      ty: 0.0,
    }
  }

  /// True if this is exactly the identity
  pub fn is_identity(&self) -> bool {
    *self == Self::IDENTITY
  }

  /// The determinant of the 2x2 linear part
  ///
  /// A zero determinant collapses all of user space onto a line or point;
  /// the resolver prunes subtrees carrying such transforms.
  pub fn determinant(&self) -> f64 {
    self.sx * self.sy - self.kx * self.ky
  }

  /// Applies the transform to a point
  pub fn apply(&self, p: Point) -> Point {
    Point {
      x: self.sx * p.x + self.kx * p.y + self.tx,
      y: self.ky * p.x + self.sy * p.y + self.ty,
    }
  }

  /// Composes two transforms; the result applies `other` first, then `self`
  pub fn then(&self, other: &Affine) -> Affine {
    Affine {
      sx: self.sx * other.sx + self.kx * other.ky,
      ky: self.ky * other.sx + self.sy * other.ky,
      kx: self.sx * other.kx + self.kx * other.sy,
      sy: self.ky * other.kx + self.sy * other.sy,
      tx: self.sx * other.tx + self.kx * other.ty + self.tx,
      ty: self.ky * other.tx + self.sy * other.ty + self.ty,
    }
  }

  /// Maps an axis-aligned rectangle, returning the bounding box of the
  /// transformed corners
  pub fn map_rect(&self, r: Rect) -> Rect {
    let corners = [
      self.apply(Point::new(r.x, r.y)),
      self.apply(Point::new(r.right(), r.y)),
      self.apply(Point::new(r.x, r.bottom())),
      self.apply(Point::new(r.right(), r.bottom())),
    ];
    let mut out = Rect::from_xywh(corners[0].x, corners[0].y, 0.0, 0.0);
    for c in &corners[1..] {
      out = out.include(*c);
    }
    out
  }

  /// The six components in serialization order
  pub fn components(&self) -> [f64; 6] {
    [self.sx, self.ky, self.kx, self.sy, self.tx, self.ty]
  }
}

impl Default for Affine {
  fn default() -> Self {
    Self::IDENTITY
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rect_union_is_commutative() {
    let a = Rect::from_xywh(-5.0, 0.0, 10.0, 4.0);
    let b = Rect::from_xywh(2.0, -3.0, 1.0, 20.0);
    assert_eq!(a.union(b), b.union(a));
  }

  #[test]
  fn affine_compose_matches_sequential_apply() {
    let t = Affine::translate(3.0, 4.0);
    let s = Affine::scale(2.0, 0.5);
    let p = Point::new(1.0, 2.0);
    let combined = t.then(&s);
    assert_eq!(combined.apply(p), t.apply(s.apply(p)));
  }

  #[test]
  fn degenerate_scale_has_zero_determinant() {
    assert_eq!(Affine::scale(0.0, 5.0).determinant(), 0.0);
    assert!(Affine::IDENTITY.determinant() != 0.0);
  }

  #[test]
  fn map_rect_of_rotation_covers_corners() {
    // 90-degree rotation: (x, y) -> (-y, x).
    let rot = Affine::from_components(0.0, 1.0, -1.0, 0.0, 0.0, 0.0);
    let r = rot.map_rect(Rect::from_xywh(0.0, 0.0, 2.0, 1.0));
    assert_eq!(r, Rect::from_xywh(-1.0, 0.0, 1.0, 2.0));
  }
}
