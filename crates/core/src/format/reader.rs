use std::{
    io::{BufRead, Lines},
    str::SplitWhitespace,
};

use crate::{
    BoxShape, Circle, Color, FillOptions, FillType, FormatError, Line, LineEnd, LineOptions,
    LineType, Net, Object, ObjectGraph, ObjectId, ObjectKind, Path, Pin, PinType, Point,
    ReadOptions, ShowNameValue, Text, FILEFORMAT_VERSION, MAX_COLORS, RELEASE_VERSION,
    VERSION_20000704, WHITE,
};

/// Read a schematic into a new object graph.
///
/// Recoverable problems such as invalid colors or zero radius circles are
/// fixed up and logged unless `options.quiet` is set.
pub fn read<R: BufRead>(input: R, options: ReadOptions) -> Result<ObjectGraph, FormatError> {
    let mut reader = Reader {
        lines: input.lines(),
        line_no: 0,
        release: RELEASE_VERSION,
        fileformat: FILEFORMAT_VERSION,
        quiet: options.quiet,
    };
    let mut graph = ObjectGraph::new();
    let mut last: Option<ObjectId> = None;

    while let Some(line) = reader.next_line()? {
        let line = line.trim_end();
        match line.chars().next() {
            None => continue,
            Some('v') => reader.version(line)?,
            Some('{') => {
                let Some(owner) = last else {
                    return Err(reader.error("attributes without an owner"));
                };
                reader.attributes(&mut graph, owner)?;
            }
            Some('}') => return Err(reader.error("unmatched '}'")),
            Some(_) => {
                let obj = reader.object(line)?;
                last = Some(graph.add_object(obj));
            }
        }
    }

    Ok(graph)
}

struct Reader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    release: u32,
    fileformat: u32,
    quiet: bool,
}

impl<R: BufRead> Reader<R> {
    fn next_line(&mut self) -> Result<Option<String>, FormatError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn error(&self, reason: impl Into<String>) -> FormatError {
        FormatError::Parse {
            line: self.line_no,
            reason: reason.into(),
        }
    }

    fn warn(&self, msg: &str) {
        if !self.quiet {
            log::warn!("line {}: {msg}", self.line_no);
        }
    }

    fn version(&mut self, line: &str) -> Result<(), FormatError> {
        let mut fields = self.fields(line);
        fields.next_char()?;
        self.release = fields.next_u32()?;
        self.fileformat = fields.next_u32_or(0)?;
        log::debug!(
            "schematic release {} file format {}",
            self.release,
            self.fileformat
        );
        Ok(())
    }

    fn attributes(&mut self, graph: &mut ObjectGraph, owner: ObjectId) -> Result<(), FormatError> {
        loop {
            let line = self.next_line()?.ok_or(FormatError::UnexpectedEof)?;
            let line = line.trim_end();
            match line.chars().next() {
                None => continue,
                Some('}') => return Ok(()),
                Some(_) => {
                    let obj = self.object(line)?;
                    if obj.as_text().is_none() {
                        return Err(self.error("only text can be an attribute"));
                    }
                    let id = graph.add_object(obj);
                    graph.attach(owner, id);
                }
            }
        }
    }

    fn object(&mut self, line: &str) -> Result<Object, FormatError> {
        let mut fields = self.fields(line);
        let kind = fields.next_char()?;
        let old_format = self.release <= VERSION_20000704;

        let (kind, color) = match kind {
            'L' => {
                let p1 = fields.next_point()?;
                let p2 = fields.next_point()?;
                let color = fields.next_i32()?;
                let mut line = Line::new(p1, p2);
                if !old_format {
                    line.stroke = fields.stroke()?;
                }
                (ObjectKind::Line(line), color)
            }
            'B' => {
                let corner = fields.next_point()?;
                let width = fields.next_i32()?;
                let height = fields.next_i32()?;
                let color = fields.next_i32()?;
                let mut b = BoxShape::new(corner, width, height);
                if !old_format {
                    b.stroke = fields.stroke()?;
                    b.fill = fields.fill()?;
                }
                (ObjectKind::Box(b), color)
            }
            'V' => {
                let center = fields.next_point()?;
                let radius = fields.next_i32()?;
                let color = fields.next_i32()?;
                let mut circle = Circle::new(center, radius);
                if !old_format {
                    circle.stroke = fields.stroke()?;
                    circle.fill = fields.fill()?;
                }
                if radius == 0 {
                    self.warn(&format!("Found a zero radius circle [ {line} ]"));
                }
                (ObjectKind::Circle(circle), color)
            }
            'N' => {
                let p1 = fields.next_point()?;
                let p2 = fields.next_point()?;
                let color = fields.next_i32()?;
                (ObjectKind::Net(Net { p1, p2 }), color)
            }
            'P' => {
                let p1 = fields.next_point()?;
                let p2 = fields.next_point()?;
                let color = fields.next_i32()?;
                let pin_type = match fields.next_u32_or(0)? {
                    0 => PinType::Net,
                    1 => PinType::Bus,
                    n => return Err(self.error(format!("invalid pin type {n}"))),
                };
                let whichend = fields.next_u32_or(0)?;
                let pin = Pin {
                    p1,
                    p2,
                    pin_type,
                    whichend: u8::from(whichend != 0),
                };
                (ObjectKind::Pin(pin), color)
            }
            'T' => {
                let origin = fields.next_point()?;
                let color = fields.next_i32()?;
                let size = fields.next_i32()?;
                let visible = fields.next_u32()? != 0;
                let show = fields.next_u32()?;
                let show = u8::try_from(show)
                    .ok()
                    .and_then(ShowNameValue::from_code)
                    .ok_or_else(|| self.error(format!("invalid show name value {show}")))?;
                let angle = fields.next_i32()?;
                let alignment = fields.next_u32_or(0)?;
                let num_lines = fields.next_u32_or(1)?;
                let string = self.following_lines(num_lines)?;
                let text = Text {
                    origin,
                    size,
                    visible,
                    show,
                    angle,
                    alignment: alignment.min(8) as u8,
                    string,
                };
                (ObjectKind::Text(text), color)
            }
            'H' => {
                let color = fields.next_i32()?;
                let stroke = fields.stroke()?;
                let fill = fields.fill()?;
                let num_lines = fields.next_u32()?;
                let data = self.following_lines(num_lines)?;
                let sections = Path::parse_data(&data).map_err(|e| self.error(e))?;
                let mut path = Path::new(sections);
                path.stroke = stroke;
                path.fill = fill;
                (ObjectKind::Path(path), color)
            }
            kind => {
                return Err(FormatError::UnknownObject {
                    line: self.line_no,
                    kind,
                })
            }
        };

        let color = self.color(color, line);
        Ok(Object::new(kind).with_color(color))
    }

    fn color(&self, color: i32, line: &str) -> Color {
        match Color::try_from(color) {
            Ok(c) if c <= MAX_COLORS => c,
            _ => {
                self.warn(&format!(
                    "Found an invalid color [ {line} ], setting color to WHITE"
                ));
                WHITE
            }
        }
    }

    fn following_lines(&mut self, count: u32) -> Result<String, FormatError> {
        let mut lines = vec![];
        for _ in 0..count {
            let line = self.next_line()?.ok_or(FormatError::UnexpectedEof)?;
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    fn fields<'a>(&self, line: &'a str) -> Fields<'a> {
        Fields {
            tokens: line.split_whitespace(),
            line_no: self.line_no,
        }
    }
}

struct Fields<'a> {
    tokens: SplitWhitespace<'a>,
    line_no: usize,
}

impl<'a> Fields<'a> {
    fn error(&self, reason: String) -> FormatError {
        FormatError::Parse {
            line: self.line_no,
            reason,
        }
    }

    fn next_token(&mut self) -> Result<&'a str, FormatError> {
        self.tokens
            .next()
            .ok_or_else(|| self.error("missing field".into()))
    }

    fn next_char(&mut self) -> Result<char, FormatError> {
        let token = self.next_token()?;
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(self.error(format!("expected object type, found '{token}'"))),
        }
    }

    fn next_i32(&mut self) -> Result<i32, FormatError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected a number, found '{token}'")))
    }

    fn next_u32(&mut self) -> Result<u32, FormatError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| self.error(format!("expected a positive number, found '{token}'")))
    }

    /// Optional trailing field, older files leave these out
    fn next_u32_or(&mut self, default: u32) -> Result<u32, FormatError> {
        match self.tokens.next() {
            Some(token) => token
                .parse()
                .map_err(|_| self.error(format!("expected a positive number, found '{token}'"))),
            None => Ok(default),
        }
    }

    fn next_point(&mut self) -> Result<Point, FormatError> {
        let x = self.next_i32()?;
        let y = self.next_i32()?;
        Ok(Point::new(x, y))
    }

    fn next_repr(&mut self) -> Result<u8, FormatError> {
        let n = self.next_i32()?;
        u8::try_from(n).map_err(|_| self.error(format!("invalid option value {n}")))
    }

    fn stroke(&mut self) -> Result<LineOptions, FormatError> {
        let width = self.next_i32()?;
        let end = self.next_repr()?;
        let end = LineEnd::from_repr(end).ok_or_else(|| self.error(format!("invalid line end {end}")))?;
        let kind = self.next_repr()?;
        let kind =
            LineType::from_repr(kind).ok_or_else(|| self.error(format!("invalid line type {kind}")))?;
        let length = self.next_i32()?;
        let space = self.next_i32()?;

        Ok(LineOptions {
            width,
            end,
            kind,
            length,
            space,
        })
    }

    fn fill(&mut self) -> Result<FillOptions, FormatError> {
        let kind = self.next_repr()?;
        let kind =
            FillType::from_repr(kind).ok_or_else(|| self.error(format!("invalid fill type {kind}")))?;

        Ok(FillOptions {
            kind,
            width: self.next_i32()?,
            angle1: self.next_i32()?,
            pitch1: self.next_i32()?,
            angle2: self.next_i32()?,
            pitch2: self.next_i32()?,
        })
    }
}
