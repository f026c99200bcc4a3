//! Geometric primitives for map layout.
//!
//! - [`Point`] - A 2D coordinate in layout space
//! - [`Bounds`] - An axis-aligned bounding box
//!
//! The layout engine works in normalized units (positions rescaled into
//! `[-scale, scale]`); exporters map those units onto their own canvas.

/// A 2D point in layout coordinate space.
///
/// # Examples
///
/// ```
/// # use relmap_core::geometry::Point;
/// let p1 = Point::new(1.0, 2.0);
/// let p2 = Point::new(0.5, 0.5);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 1.5);
/// assert_eq!(sum.y(), 2.5);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 0.75);
/// assert_eq!(mid.y(), 1.25);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns true if both coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point's coordinates to this point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point's coordinates from this point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Returns the point halfway between this point and another
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean length of the vector from the origin to this point
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Multiplies both coordinates by `factor`
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Returns the coordinates as an `[x, y]` pair
    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Smallest box containing all `points`, or `None` if there are none.
    ///
    /// # Examples
    ///
    /// ```
    /// # use relmap_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::enclosing([Point::new(-1.0, 0.5), Point::new(1.0, -0.5)]).unwrap();
    /// assert_eq!(bounds.width(), 2.0);
    /// assert_eq!(bounds.height(), 1.0);
    /// ```
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    min_x: p.x,
                    min_y: p.y,
                    max_x: p.x,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Returns the minimum x-coordinate
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the width of the box
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the box
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_point_default() {
        assert!(Point::default().is_zero());
    }

    #[test]
    fn test_point_sub_and_distance() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(0.0, 0.0);
        assert_eq!(a.sub_point(b), a);
        assert!(approx_eq!(f32, a.distance(b), 5.0, ulps = 2));
    }

    #[test]
    fn test_point_scale() {
        let p = Point::new(0.5, -0.25).scale(2.0);
        assert_eq!(p.to_array(), [1.0, -0.5]);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_bounds_single_point() {
        let bounds = Bounds::enclosing([Point::new(1.0, 1.0)]).unwrap();
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
        assert_eq!(bounds.min_x(), 1.0);
    }
}
