mod options;
mod path;
mod shapes;

use gschem_utils::key_type;

use crate::{Bounds, Point};

pub use self::{options::*, path::*, shapes::*};

key_type!(pub ObjectId);

pub type Color = u8;

pub const MAX_COLORS: Color = 25;
pub const WHITE: Color = 1;
pub const GRAPHIC_COLOR: Color = 3;
pub const NET_COLOR: Color = 4;
pub const ATTRIBUTE_COLOR: Color = 5;
pub const TEXT_COLOR: Color = 9;
pub const PIN_COLOR: Color = WHITE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Line(Line),
    Box(BoxShape),
    Circle(Circle),
    Net(Net),
    Pin(Pin),
    Text(Text),
    Path(Path),
}

impl ObjectKind {
    /// Type character used in the schematic file format
    pub fn type_char(&self) -> char {
        match self {
            ObjectKind::Line(_) => 'L',
            ObjectKind::Box(_) => 'B',
            ObjectKind::Circle(_) => 'V',
            ObjectKind::Net(_) => 'N',
            ObjectKind::Pin(_) => 'P',
            ObjectKind::Text(_) => 'T',
            ObjectKind::Path(_) => 'H',
        }
    }

    pub fn default_color(&self) -> Color {
        match self {
            ObjectKind::Net(_) => NET_COLOR,
            ObjectKind::Pin(_) => PIN_COLOR,
            ObjectKind::Text(_) => TEXT_COLOR,
            _ => GRAPHIC_COLOR,
        }
    }
}

/// A single schematic primitive.
///
/// Attribute links are kept in both directions: the owner lists its
/// attributes and every attribute knows its owner. Both are maintained by
/// [`crate::ObjectGraph`].
#[derive(Debug, Clone)]
pub struct Object {
    pub kind: ObjectKind,
    pub color: Color,
    pub(crate) attribs: Vec<ObjectId>,
    pub(crate) attached_to: Option<ObjectId>,
}

impl Object {
    pub fn new(kind: ObjectKind) -> Object {
        let color = kind.default_color();
        Object {
            kind,
            color,
            attribs: vec![],
            attached_to: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Object {
        self.color = color;
        self
    }

    pub fn attributes(&self) -> &[ObjectId] {
        &self.attribs
    }

    pub fn attached_to(&self) -> Option<ObjectId> {
        self.attached_to
    }

    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            ObjectKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// World bounds of the object. Text extents depend on font metrics so
    /// only the text anchor is counted.
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.kind {
            ObjectKind::Line(Line { p1, p2, .. })
            | ObjectKind::Net(Net { p1, p2 })
            | ObjectKind::Pin(Pin { p1, p2, .. }) => Bounds::from_points([*p1, *p2]),
            ObjectKind::Box(b) => Bounds::from_points([b.corner, b.opposite()]),
            ObjectKind::Circle(c) => Some(c.bounds()),
            ObjectKind::Text(t) => Some(Bounds::from_point(t.origin)),
            ObjectKind::Path(p) => p.bounds(),
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.for_each_point_mut(|p| p.translate(dx, dy));
    }

    /// Rotate around `center`. Negative angles are made positive and angles
    /// that are not a multiple of 90 are ignored.
    pub fn rotate(&mut self, center: Point, angle: i32) {
        let angle = angle.abs();
        if angle % 90 != 0 {
            return;
        }

        match &mut self.kind {
            ObjectKind::Box(b) => {
                let mut a = b.corner;
                let mut o = b.opposite();
                a.rotate_90(center, angle);
                o.rotate_90(center, angle);
                b.set_corners(a, o);
                return;
            }
            ObjectKind::Text(t) => {
                t.origin.rotate_90(center, angle);
                t.rotate(angle);
                return;
            }
            _ => {}
        }

        self.for_each_point_mut(|p| p.rotate_90(center, angle));
    }

    /// Mirror over the vertical axis x = `cx`
    pub fn mirror(&mut self, cx: i32) {
        match &mut self.kind {
            ObjectKind::Box(b) => {
                let mut a = b.corner;
                let mut o = b.opposite();
                a.mirror(cx);
                o.mirror(cx);
                b.set_corners(a, o);
                return;
            }
            ObjectKind::Text(t) => {
                t.origin.mirror(cx);
                t.mirror_alignment();
                return;
            }
            _ => {}
        }

        self.for_each_point_mut(|p| p.mirror(cx));
    }

    fn for_each_point_mut<F: FnMut(&mut Point)>(&mut self, mut f: F) {
        match &mut self.kind {
            ObjectKind::Line(Line { p1, p2, .. })
            | ObjectKind::Net(Net { p1, p2 })
            | ObjectKind::Pin(Pin { p1, p2, .. }) => {
                f(p1);
                f(p2);
            }
            ObjectKind::Box(b) => f(&mut b.corner),
            ObjectKind::Circle(c) => f(&mut c.center),
            ObjectKind::Text(t) => f(&mut t.origin),
            ObjectKind::Path(p) => p.for_each_point_mut(f),
        }
    }
}
