use std::fmt;

/// Point in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Rotate around `center` by a multiple of 90 degrees, counter clockwise.
    pub fn rotate_90(&mut self, center: Point, angle: i32) {
        let (x, y) = rotate_point_90(self.x - center.x, self.y - center.y, angle);
        self.x = x + center.x;
        self.y = y + center.y;
    }

    /// Mirror over the vertical axis x = `cx`
    pub fn mirror(&mut self, cx: i32) {
        self.x = 2 * cx - self.x;
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Rotate a point around the origin. Angles are normalized to 0..360 and
/// anything that is not a multiple of 90 is treated as no rotation.
pub fn rotate_point_90(x: i32, y: i32, angle: i32) -> (i32, i32) {
    match normalize_angle(angle) {
        90 => (-y, x),
        180 => (-x, -y),
        270 => (y, -x),
        _ => (x, y),
    }
}

pub fn normalize_angle(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

/// Integer distance between two points
pub fn dist(a: Point, b: Point) -> i32 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    dx.hypot(dy) as i32
}
