use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    str::FromStr,
};

use anyhow::{anyhow, bail, Context};
use gschem_core::{
    Bounds, BoxShape, Circle, Line, Net, Object, ObjectGraph, ObjectId, ObjectKind, Point, Text,
    ATTRIBUTE_COLOR,
};
use gschem_editor::{Editor, UndoKind};

/// One line of an edit script
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Line(Point, Point),
    Box(Point, i32, i32),
    Circle(Point, i32),
    Net(Point, Point),
    Text(Point, String),
    Attach(String),
    Move(i32, i32),
    Rotate(Point, i32),
    Mirror(i32),
    Delete,
    Zoom(Bounds),
    Undo,
    Redo,
    Save(PathBuf),
    Print,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "line" => {
                let [x1, y1, x2, y2] = numbers(rest)?;
                Command::Line(Point::new(x1, y1), Point::new(x2, y2))
            }
            "box" => {
                let [x, y, w, h] = numbers(rest)?;
                Command::Box(Point::new(x, y), w, h)
            }
            "circle" => {
                let [x, y, r] = numbers(rest)?;
                Command::Circle(Point::new(x, y), r)
            }
            "net" => {
                let [x1, y1, x2, y2] = numbers(rest)?;
                Command::Net(Point::new(x1, y1), Point::new(x2, y2))
            }
            "text" => {
                let mut parts = rest.splitn(3, ' ');
                let x = number(parts.next())?;
                let y = number(parts.next())?;
                let string = parts.next().unwrap_or("").to_string();
                if string.is_empty() {
                    bail!("text needs a string");
                }
                Command::Text(Point::new(x, y), string)
            }
            "attach" => {
                if !rest.contains('=') {
                    bail!("attach needs KEY=VALUE");
                }
                Command::Attach(rest.to_string())
            }
            "move" => {
                let [dx, dy] = numbers(rest)?;
                Command::Move(dx, dy)
            }
            "rotate" => {
                let [cx, cy, angle] = numbers(rest)?;
                Command::Rotate(Point::new(cx, cy), angle)
            }
            "mirror" => {
                let [cx] = numbers(rest)?;
                Command::Mirror(cx)
            }
            "zoom" => {
                let [left, top, right, bottom] = numbers(rest)?;
                Command::Zoom(Bounds::new(left, top, right, bottom))
            }
            "delete" => Command::Delete,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "print" => Command::Print,
            "save" => {
                if rest.is_empty() {
                    bail!("save needs a path");
                }
                Command::Save(PathBuf::from(rest))
            }
            _ => bail!("unknown command {name:?}"),
        };

        Ok(command)
    }
}

fn number(word: Option<&str>) -> anyhow::Result<i32> {
    let word = word.ok_or_else(|| anyhow!("missing number"))?;
    word.parse::<i32>()
        .with_context(|| format!("invalid number {word:?}"))
}

fn numbers<const N: usize>(rest: &str) -> anyhow::Result<[i32; N]> {
    let mut words = rest.split_whitespace();
    let mut result = [0; N];
    for n in result.iter_mut() {
        *n = number(words.next())?;
    }

    if words.next().is_some() {
        bail!("expected {N} numbers");
    }
    Ok(result)
}

/// Most recently added object that is not an attribute
fn selection(graph: &ObjectGraph) -> Option<ObjectId> {
    graph
        .iter()
        .filter(|(_, obj)| obj.attached_to().is_none())
        .map(|(id, _)| id)
        .last()
}

/// Run a single command against the current page. Undo failures are logged
/// by the editor and do not stop the script.
pub(crate) fn execute<W: Write>(
    editor: &mut Editor,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()> {
    let page = editor
        .current_page_mut()
        .ok_or_else(|| anyhow!("no page open"))?;

    let kind = match command {
        Command::Line(p1, p2) => ObjectKind::Line(Line::new(p1, p2)),
        Command::Box(corner, w, h) => ObjectKind::Box(BoxShape::new(corner, w, h)),
        Command::Circle(center, r) => ObjectKind::Circle(Circle::new(center, r)),
        Command::Net(p1, p2) => ObjectKind::Net(Net { p1, p2 }),
        Command::Text(origin, string) => ObjectKind::Text(Text::new(origin, &string)),
        Command::Zoom(bounds) => {
            page.set_viewport(bounds);
            let _ = editor.savestate(UndoKind::ViewportOnly);
            return Ok(());
        }
        Command::Undo => {
            let _ = editor.undo();
            return Ok(());
        }
        Command::Redo => {
            let _ = editor.redo();
            return Ok(());
        }
        Command::Save(path) => {
            editor.save_page(Some(&path))?;
            return Ok(());
        }
        Command::Print => {
            gschem_core::write(page.objects(), out)?;
            out.flush()?;
            return Ok(());
        }
        command => {
            let id = selection(page.objects()).ok_or_else(|| anyhow!("nothing selected"))?;
            edit_selection(page.objects_mut(), id, command)?;
            let _ = editor.savestate(UndoKind::All);
            return Ok(());
        }
    };

    page.objects_mut().add(kind);
    let _ = editor.savestate(UndoKind::All);
    Ok(())
}

fn edit_selection(
    graph: &mut ObjectGraph,
    id: ObjectId,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Attach(attribute) => {
            let origin = graph
                .get(id)
                .and_then(Object::bounds)
                .map(|b| Point::new(b.left, b.top))
                .unwrap_or_default();
            let text = Object::new(ObjectKind::Text(Text::new(origin, &attribute)))
                .with_color(ATTRIBUTE_COLOR);
            let attrib = graph.add_object(text);
            if !graph.attach(id, attrib) {
                graph.remove(attrib);
                bail!("cannot attach {attribute:?}");
            }
        }
        Command::Move(dx, dy) => graph.translate(id, dx, dy),
        Command::Rotate(center, angle) => graph.rotate(id, center, angle),
        Command::Mirror(cx) => graph.mirror(id, cx),
        Command::Delete => {
            graph.remove(id);
        }
        command => bail!("{command:?} does not act on the selection"),
    }

    Ok(())
}

/// Run every command of `input`, stopping at the first invalid line
pub(crate) fn run<R: BufRead, W: Write>(
    editor: &mut Editor,
    input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    for (n, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let command: Command = trimmed
            .parse()
            .with_context(|| format!("line {}: {trimmed}", n + 1))?;
        log::debug!("Running {command:?}");
        execute(editor, command, out).with_context(|| format!("line {}: {trimmed}", n + 1))?;
    }

    Ok(())
}

pub(crate) fn run_stdin(editor: &mut Editor) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(editor, stdin.lock(), &mut stdout.lock())
}
