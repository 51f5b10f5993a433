use std::io::{self, Write};

use crate::{
    FillOptions, LineOptions, Object, ObjectGraph, ObjectKind, PinType, FILEFORMAT_VERSION,
    RELEASE_VERSION,
};

/// Write the graph in the current file format. Attributes are written in a
/// `{ }` block right after their owner.
pub fn write<W: Write>(graph: &ObjectGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, "v {RELEASE_VERSION} {FILEFORMAT_VERSION}")?;

    for (_, obj) in graph.iter() {
        if obj.attached_to().is_some() {
            continue;
        }

        write_object(out, obj)?;

        if !obj.attributes().is_empty() {
            writeln!(out, "{{")?;
            for attrib in obj.attributes() {
                if let Some(attrib) = graph.get(*attrib) {
                    write_object(out, attrib)?;
                }
            }
            writeln!(out, "}}")?;
        }
    }

    Ok(())
}

fn write_object<W: Write>(out: &mut W, obj: &Object) -> io::Result<()> {
    let t = obj.kind.type_char();
    let color = obj.color;

    match &obj.kind {
        ObjectKind::Line(l) => writeln!(
            out,
            "{t} {} {} {} {} {color} {}",
            l.p1.x,
            l.p1.y,
            l.p2.x,
            l.p2.y,
            stroke(&l.stroke)
        ),
        ObjectKind::Box(b) => writeln!(
            out,
            "{t} {} {} {} {} {color} {} {}",
            b.corner.x,
            b.corner.y,
            b.width,
            b.height,
            stroke(&b.stroke),
            fill(&b.fill)
        ),
        ObjectKind::Circle(c) => writeln!(
            out,
            "{t} {} {} {} {color} {} {}",
            c.center.x,
            c.center.y,
            c.radius,
            stroke(&c.stroke),
            fill(&c.fill)
        ),
        ObjectKind::Net(n) => {
            writeln!(out, "{t} {} {} {} {} {color}", n.p1.x, n.p1.y, n.p2.x, n.p2.y)
        }
        ObjectKind::Pin(p) => {
            let pin_type = match p.pin_type {
                PinType::Net => 0,
                PinType::Bus => 1,
            };
            writeln!(
                out,
                "{t} {} {} {} {} {color} {pin_type} {}",
                p.p1.x, p.p1.y, p.p2.x, p.p2.y, p.whichend
            )
        }
        ObjectKind::Text(text) => {
            let lines: Vec<&str> = if text.string.is_empty() {
                vec![""]
            } else {
                text.string.lines().collect()
            };
            writeln!(
                out,
                "{t} {} {} {color} {} {} {} {} {} {}",
                text.origin.x,
                text.origin.y,
                text.size,
                u8::from(text.visible),
                text.show.code(),
                text.angle,
                text.alignment,
                lines.len()
            )?;
            for line in lines {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        ObjectKind::Path(path) => {
            let data = path.data_lines();
            writeln!(
                out,
                "{t} {color} {} {} {}",
                stroke(&path.stroke),
                fill(&path.fill),
                data.len()
            )?;
            for line in data {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
    }
}

fn stroke(opts: &LineOptions) -> String {
    format!(
        "{} {} {} {} {}",
        opts.width, opts.end as u8, opts.kind as u8, opts.length, opts.space
    )
}

fn fill(opts: &FillOptions) -> String {
    format!(
        "{} {} {} {} {} {}",
        opts.kind as u8, opts.width, opts.angle1, opts.pitch1, opts.angle2, opts.pitch2
    )
}
