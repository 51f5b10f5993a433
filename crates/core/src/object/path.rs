use std::fmt;

use crate::{Bounds, FillOptions, LineOptions, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSection {
    MoveTo(Point),
    LineTo(Point),
    /// Two control points and the destination
    CurveTo(Point, Point, Point),
    ClosePath,
}

impl PathSection {
    /// Point the pen ends up at, None for close path
    pub fn destination(&self) -> Option<Point> {
        match self {
            PathSection::MoveTo(p) | PathSection::LineTo(p) | PathSection::CurveTo(_, _, p) => {
                Some(*p)
            }
            PathSection::ClosePath => None,
        }
    }

    fn for_each_point_mut<F: FnMut(&mut Point)>(&mut self, mut f: F) {
        match self {
            PathSection::MoveTo(p) | PathSection::LineTo(p) => f(p),
            PathSection::CurveTo(c1, c2, p) => {
                f(c1);
                f(c2);
                f(p);
            }
            PathSection::ClosePath => {}
        }
    }
}

impl fmt::Display for PathSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSection::MoveTo(p) => write!(f, "M {p}"),
            PathSection::LineTo(p) => write!(f, "L {p}"),
            PathSection::CurveTo(c1, c2, p) => write!(f, "C {c1} {c2} {p}"),
            PathSection::ClosePath => write!(f, "z"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub sections: Vec<PathSection>,
    pub stroke: LineOptions,
    pub fill: FillOptions,
}

impl Path {
    pub fn new(sections: Vec<PathSection>) -> Path {
        Path {
            sections,
            stroke: LineOptions::default(),
            fill: FillOptions::default(),
        }
    }

    /// Every point of the path including curve control points
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            match section {
                PathSection::MoveTo(p) | PathSection::LineTo(p) => points.push(*p),
                PathSection::CurveTo(c1, c2, p) => points.extend([*c1, *c2, *p]),
                PathSection::ClosePath => {}
            }
        }
        points
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points())
    }

    pub(crate) fn for_each_point_mut<F: FnMut(&mut Point)>(&mut self, mut f: F) {
        for section in &mut self.sections {
            section.for_each_point_mut(&mut f);
        }
    }

    /// Path data one section per line
    pub fn data_lines(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.to_string()).collect()
    }

    /// Parse path data consisting of `M`, `L`, `C` and `z` commands with
    /// `x,y` coordinate pairs.
    pub fn parse_data(data: &str) -> Result<Vec<PathSection>, String> {
        let mut tokens = data.split_whitespace();
        let mut sections = vec![];

        while let Some(cmd) = tokens.next() {
            let section = match cmd {
                "M" => PathSection::MoveTo(next_point(&mut tokens)?),
                "L" => PathSection::LineTo(next_point(&mut tokens)?),
                "C" => {
                    let c1 = next_point(&mut tokens)?;
                    let c2 = next_point(&mut tokens)?;
                    let p = next_point(&mut tokens)?;
                    PathSection::CurveTo(c1, c2, p)
                }
                "z" | "Z" => PathSection::ClosePath,
                other => return Err(format!("unknown path command '{other}'")),
            };
            sections.push(section);
        }

        Ok(sections)
    }
}

fn next_point<'a, I: Iterator<Item = &'a str>>(tokens: &mut I) -> Result<Point, String> {
    let token = tokens.next().ok_or("missing path coordinate")?;
    let (x, y) = token
        .split_once(',')
        .ok_or_else(|| format!("bad path coordinate '{token}'"))?;
    let x = x
        .parse::<i32>()
        .map_err(|_| format!("bad path coordinate '{token}'"))?;
    let y = y
        .parse::<i32>()
        .map_err(|_| format!("bad path coordinate '{token}'"))?;
    Ok(Point::new(x, y))
}
