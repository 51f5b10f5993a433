use std::cmp::{max, min};

use crate::Point;

/// Axis aligned rectangle in world coordinates, `left <= right` and
/// `top <= bottom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Bounds {
        Bounds {
            left: min(left, right),
            top: min(top, bottom),
            right: max(left, right),
            bottom: max(top, bottom),
        }
    }

    pub fn from_point(p: Point) -> Bounds {
        Bounds {
            left: p.x,
            top: p.y,
            right: p.x,
            bottom: p.y,
        }
    }

    /// Smallest bounds containing all the points, None if there are none
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Bounds> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds::from_point(first);
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    pub fn include(&mut self, p: Point) {
        self.left = min(self.left, p.x);
        self.top = min(self.top, p.y);
        self.right = max(self.right, p.x);
        self.bottom = max(self.bottom, p.y);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            left: min(self.left, other.left),
            top: min(self.top, other.top),
            right: max(self.right, other.right),
            bottom: max(self.bottom, other.bottom),
        }
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expand(&self, amount: i32) -> Bounds {
        Bounds {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, p: Point) -> bool {
        self.left <= p.x && p.x <= self.right && self.top <= p.y && p.y <= self.bottom
    }
}
