use crate::{dist, normalize_angle, Bounds, FillOptions, LineOptions, Point};

/// Graphical line segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
    pub stroke: LineOptions,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Line {
        Line {
            p1,
            p2,
            stroke: LineOptions::default(),
        }
    }

    pub fn length(&self) -> i32 {
        dist(self.p1, self.p2)
    }
}

/// Electrical connection between two points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    pub p1: Point,
    pub p2: Point,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PinType {
    #[default]
    Net,
    Bus,
}

/// Connection point of a symbol, `whichend` tells which end is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub p1: Point,
    pub p2: Point,
    pub pin_type: PinType,
    pub whichend: u8,
}

impl Pin {
    pub fn active_end(&self) -> Point {
        if self.whichend == 0 {
            self.p1
        } else {
            self.p2
        }
    }
}

/// Rectangle stored as its lower left corner and extents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxShape {
    pub corner: Point,
    pub width: i32,
    pub height: i32,
    pub stroke: LineOptions,
    pub fill: FillOptions,
}

impl BoxShape {
    pub fn new(corner: Point, width: i32, height: i32) -> BoxShape {
        BoxShape {
            corner,
            width,
            height,
            stroke: LineOptions::default(),
            fill: FillOptions::default(),
        }
    }

    pub fn opposite(&self) -> Point {
        Point::new(self.corner.x + self.width, self.corner.y + self.height)
    }

    /// Set from two arbitrary corners, keeps the stored corner the lower left
    pub(crate) fn set_corners(&mut self, a: Point, b: Point) {
        let bounds = Bounds::new(a.x, a.y, b.x, b.y);
        self.corner = Point::new(bounds.left, bounds.top);
        self.width = bounds.width();
        self.height = bounds.height();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circle {
    pub center: Point,
    pub radius: i32,
    pub stroke: LineOptions,
    pub fill: FillOptions,
}

impl Circle {
    pub fn new(center: Point, radius: i32) -> Circle {
        Circle {
            center,
            radius,
            stroke: LineOptions::default(),
            fill: FillOptions::default(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: self.center.x - self.radius,
            top: self.center.y - self.radius,
            right: self.center.x + self.radius,
            bottom: self.center.y + self.radius,
        }
    }

    /// Move the circle so that its center is at `center` and change the
    /// radius.
    pub fn modify(&mut self, center: Point, radius: i32) {
        self.center = center;
        self.radius = radius;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShowNameValue {
    #[default]
    Both,
    Value,
    Name,
}

impl ShowNameValue {
    pub(crate) fn from_code(code: u8) -> Option<ShowNameValue> {
        match code {
            0 => Some(ShowNameValue::Both),
            1 => Some(ShowNameValue::Value),
            2 => Some(ShowNameValue::Name),
            _ => None,
        }
    }

    pub(crate) fn code(&self) -> u8 {
        match self {
            ShowNameValue::Both => 0,
            ShowNameValue::Value => 1,
            ShowNameValue::Name => 2,
        }
    }
}

/// Possibly multiline text. Texts of the form `name=value` attached to
/// another object are attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub origin: Point,
    pub size: i32,
    pub visible: bool,
    pub show: ShowNameValue,
    pub angle: i32,
    /// 0..=8, column major from lower left to upper right
    pub alignment: u8,
    pub string: String,
}

impl Text {
    pub fn new(origin: Point, string: &str) -> Text {
        Text {
            origin,
            size: 10,
            visible: true,
            show: ShowNameValue::Both,
            angle: 0,
            alignment: 0,
            string: string.into(),
        }
    }

    /// Split into name and value if this looks like an attribute
    pub fn attribute(&self) -> Option<(&str, &str)> {
        let (name, value) = self.string.split_once('=')?;
        if name.is_empty() || name.ends_with(' ') || value.starts_with(' ') {
            return None;
        }
        Some((name, value))
    }

    pub fn line_count(&self) -> usize {
        self.string.lines().count().max(1)
    }

    pub(crate) fn rotate(&mut self, angle: i32) {
        self.angle = normalize_angle(self.angle + angle);
    }

    /// Flip the horizontal alignment column, left becomes right
    pub(crate) fn mirror_alignment(&mut self) {
        let column = self.alignment / 3;
        let row = self.alignment % 3;
        self.alignment = (2 - column.min(2)) * 3 + row;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn circle_bounds() {
        let c = Circle::new(Point::new(100, 200), 50);
        assert_eq!(c.bounds(), Bounds::new(50, 150, 150, 250));
    }

    #[test]
    fn box_corners_are_normalized() {
        let mut b = BoxShape::new(Point::new(0, 0), 10, 10);
        b.set_corners(Point::new(30, 40), Point::new(10, 0));
        assert_eq!(b.corner, Point::new(10, 0));
        assert_eq!(b.width, 20);
        assert_eq!(b.height, 40);
        assert_eq!(b.opposite(), Point::new(30, 40));
    }

    #[test]
    fn text_attribute() {
        let t = Text::new(Point::new(0, 0), "refdes=R1");
        assert_eq!(t.attribute(), Some(("refdes", "R1")));

        let t = Text::new(Point::new(0, 0), "a = b");
        assert_eq!(t.attribute(), None);

        let t = Text::new(Point::new(0, 0), "plain text");
        assert_eq!(t.attribute(), None);
    }

    #[test]
    fn mirror_alignment() {
        let mut t = Text::new(Point::new(0, 0), "x");
        t.alignment = 1;
        t.mirror_alignment();
        assert_eq!(t.alignment, 7);
        t.alignment = 4;
        t.mirror_alignment();
        assert_eq!(t.alignment, 4);
    }
}
