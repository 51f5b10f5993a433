use strum_macros::{Display, FromRepr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u8)]
pub enum LineEnd {
    #[default]
    None = 0,
    Square = 1,
    Round = 2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u8)]
pub enum LineType {
    #[default]
    Solid = 0,
    Dotted = 1,
    Dashed = 2,
    Center = 3,
    Phantom = 4,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u8)]
pub enum FillType {
    #[default]
    Hollow = 0,
    Fill = 1,
    Mesh = 2,
    Hatch = 3,
    Void = 4,
}

/// How the outline of a shape is stroked.
///
/// Length and space are only meaningful for dashed styles, -1 means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineOptions {
    pub width: i32,
    pub end: LineEnd,
    pub kind: LineType,
    pub length: i32,
    pub space: i32,
}

impl Default for LineOptions {
    fn default() -> Self {
        LineOptions {
            width: 0,
            end: LineEnd::None,
            kind: LineType::Solid,
            length: -1,
            space: -1,
        }
    }
}

/// How the inside of a closed shape is filled. Angles and pitches are used
/// by the mesh and hatch patterns, -1 means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FillOptions {
    pub kind: FillType,
    pub width: i32,
    pub angle1: i32,
    pub pitch1: i32,
    pub angle2: i32,
    pub pitch2: i32,
}

impl Default for FillOptions {
    fn default() -> Self {
        FillOptions {
            kind: FillType::Hollow,
            width: 0,
            angle1: -1,
            pitch1: -1,
            angle2: -1,
            pitch2: -1,
        }
    }
}
