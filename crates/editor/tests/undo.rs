use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use gschem_core::{
    write_file, Bounds, BoxShape, Circle, Line, Net, ObjectGraph, ObjectKind, Point, Text,
};
use gschem_editor::{Config, Editor, Notification, UndoError, UndoFiles, UndoKind, UndoMode};
use tempfile::TempDir;

struct Setup {
    editor: Editor,
    work: TempDir,
    undo_dir: TempDir,
}

impl Setup {
    fn new(mode: UndoMode) -> Setup {
        Setup::with_config(mode, |_| {})
    }

    fn with_config<F: FnOnce(&mut Config)>(mode: UndoMode, f: F) -> Setup {
        let work = tempfile::tempdir().unwrap();
        let undo_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.undo.mode = mode;
        f(&mut config);

        let editor = Editor::with_undo_files(config, UndoFiles::new(undo_dir.path(), 4242));
        Setup {
            editor,
            work,
            undo_dir,
        }
    }

    /// Write a small schematic and open it
    fn open_sample(&mut self) -> PathBuf {
        let mut graph = ObjectGraph::new();
        let resistor = graph.add(ObjectKind::Box(BoxShape::new(Point::new(100, 100), 400, 200)));
        let refdes = graph.add(ObjectKind::Text(Text::new(Point::new(100, 350), "refdes=R1")));
        graph.attach(resistor, refdes);
        graph.add(ObjectKind::Net(Net {
            p1: Point::new(500, 200),
            p2: Point::new(900, 200),
        }));

        let path = self.work.path().join("amp.sch");
        write_file(&graph, &path).unwrap();
        self.editor.open_page(&path).unwrap();
        path
    }

    fn objects(&self) -> &ObjectGraph {
        self.editor.current_page().unwrap().objects()
    }

    fn edit<F: FnOnce(&mut ObjectGraph)>(&mut self, f: F) {
        let page = self.editor.current_page_mut().unwrap();
        f(page.objects_mut());
        self.editor.savestate(UndoKind::All).unwrap();
    }

    fn undo_file(&self, index: u64) -> PathBuf {
        self.editor.undo_files().path_for(index)
    }
}

fn edits(setup: &mut Setup) {
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 500))));
    });
    setup.edit(|g| {
        let id = g.add(ObjectKind::Circle(Circle::new(Point::new(2000, 2000), 300)));
        let value = g.add(ObjectKind::Text(Text::new(Point::new(2000, 2400), "value=10k")));
        g.attach(id, value);
    });
    setup.edit(|g| {
        let last = g.last().unwrap();
        g.translate(last, 100, -50);
    });
    setup.edit(|g| {
        let first = g.iter().next().map(|(id, _)| id).unwrap();
        g.rotate(first, Point::new(0, 0), 90);
    });
    setup.edit(|g| {
        let first = g.iter().next().map(|(id, _)| id).unwrap();
        g.remove(first);
    });
}

fn round_trip(mode: UndoMode) {
    let mut setup = Setup::new(mode);
    let path = setup.open_sample();
    let before = setup.objects().deep_copy();

    edits(&mut setup);
    assert_ne!(setup.objects(), &before);

    for _ in 0..5 {
        assert!(setup.editor.undo().unwrap());
    }

    assert_eq!(setup.objects(), &before);
    let page = setup.editor.current_page().unwrap();
    assert_eq!(page.filename(), path);
    assert!(page.is_changed());
    assert!(!page.history().can_undo());
    assert!(page.history().can_redo());
}

#[test]
fn round_trip_disk() {
    round_trip(UndoMode::Disk);
}

#[test]
fn round_trip_memory() {
    round_trip(UndoMode::Memory);
}

#[test]
fn redo_after_undo() {
    for mode in [UndoMode::Disk, UndoMode::Memory] {
        let mut setup = Setup::new(mode);
        setup.open_sample();
        edits(&mut setup);
        let after = setup.objects().deep_copy();

        for _ in 0..3 {
            setup.editor.undo().unwrap();
        }
        for _ in 0..3 {
            assert!(setup.editor.redo().unwrap());
        }

        assert_eq!(setup.objects(), &after);
        assert!(!setup.editor.redo().unwrap());
    }
}

#[test]
fn commit_after_undo_prunes_redo() {
    let mut setup = Setup::new(UndoMode::Disk);
    setup.open_sample();
    edits(&mut setup);

    setup.editor.undo().unwrap();
    setup.editor.undo().unwrap();
    assert!(setup.editor.current_page().unwrap().history().can_redo());

    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(7, 7), Point::new(8, 8))));
    });

    let history = setup.editor.current_page().unwrap().history();
    assert!(!history.can_redo());
    assert_eq!(history.len(), 5);
    assert!(!setup.editor.redo().unwrap());

    // Files of the discarded levels are gone
    assert!(!setup.undo_file(4).exists());
    assert!(!setup.undo_file(5).exists());
    assert!(setup.undo_file(6).exists());
}

#[test]
fn undo_at_bottom_is_idempotent() {
    let mut setup = Setup::new(UndoMode::Memory);
    setup.open_sample();
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(10, 0))));
    });

    assert!(setup.editor.undo().unwrap());
    let objects = setup.objects().deep_copy();
    let current = setup.editor.current_page().unwrap().history().current();

    for _ in 0..3 {
        assert!(!setup.editor.undo().unwrap());
        assert_eq!(setup.objects(), &objects);
        assert_eq!(
            setup.editor.current_page().unwrap().history().current(),
            current
        );
    }
}

#[test]
fn trim_keeps_depth_limit() {
    let mut setup = Setup::with_config(UndoMode::Disk, |config| {
        config.undo.levels = 3;
        config.undo.padding = 2;
    });
    setup.open_sample();
    for x in 0..5 {
        setup.edit(|g| {
            g.add(ObjectKind::Line(Line::new(Point::new(x, 0), Point::new(x, 10))));
        });
    }

    // Six commits, the periodic check has not run yet
    assert_eq!(setup.editor.current_page().unwrap().history().len(), 6);
    assert_eq!(setup.editor.undo_files().allocated(), 6);

    assert_eq!(setup.editor.trim_history(), 3);
    assert_eq!(setup.editor.current_page().unwrap().history().len(), 3);

    for index in 0..3 {
        assert!(!setup.undo_file(index).exists());
    }
    for index in 3..6 {
        assert!(setup.undo_file(index).exists());
    }
}

#[test]
fn periodic_trim() {
    let mut setup = Setup::with_config(UndoMode::Memory, |config| {
        config.undo.levels = 3;
        config.undo.padding = 2;
        config.undo.trim_every = 10;
    });
    setup.editor.new_page(setup.work.path().join("new.sch"));
    for x in 0..8 {
        setup.edit(|g| {
            g.add(ObjectKind::Line(Line::new(Point::new(x, 0), Point::new(x, 10))));
        });
    }
    assert_eq!(setup.editor.current_page().unwrap().history().len(), 9);

    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(9, 0), Point::new(9, 10))));
    });
    assert_eq!(setup.editor.current_page().unwrap().history().len(), 3);
}

#[test]
fn memory_restore_is_a_copy() {
    let mut setup = Setup::new(UndoMode::Memory);
    setup.editor.new_page(setup.work.path().join("new.sch"));
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(100, 0))));
        g.add(ObjectKind::Circle(Circle::new(Point::new(50, 50), 25)));
    });
    let two = setup.objects().deep_copy();

    setup.edit(|g| {
        let last = g.last().unwrap();
        g.translate(last, 10, 10);
    });

    assert!(setup.editor.undo().unwrap());
    assert_eq!(setup.objects().len(), 2);
    assert_eq!(setup.objects(), &two);

    // Editing the restored graph leaves the snapshot alone
    setup.edit(|g| {
        g.clear();
    });
    assert!(setup.editor.undo().unwrap());
    assert_eq!(setup.objects(), &two);
}

#[test]
fn restore_notifies_once() {
    for mode in [UndoMode::Disk, UndoMode::Memory] {
        let mut setup = Setup::new(mode);
        setup.open_sample();
        edits(&mut setup);
        setup.editor.take_notifications();

        setup.editor.undo().unwrap();
        let page = setup.editor.current_page().unwrap().id();
        assert_eq!(
            setup.editor.take_notifications(),
            vec![
                Notification::Redraw(page),
                Notification::Menus {
                    can_undo: true,
                    can_redo: true
                }
            ]
        );

        setup.editor.set_dont_redraw(true);
        setup.editor.undo().unwrap();
        assert_eq!(
            setup.editor.take_notifications(),
            vec![Notification::Menus {
                can_undo: true,
                can_redo: true
            }]
        );

        // Nothing happens at the end of the history
        setup.editor.set_dont_redraw(false);
        while setup.editor.undo().unwrap() {}
        setup.editor.take_notifications();
        setup.editor.undo().unwrap();
        assert!(setup.editor.take_notifications().is_empty());
    }
}

#[test]
fn missing_undo_file_leaves_state() {
    let mut setup = Setup::new(UndoMode::Disk);
    setup.open_sample();
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 10))));
    });

    let missing = setup.undo_file(0);
    std::fs::remove_file(&missing).unwrap();

    let page = setup.editor.current_page().unwrap();
    let id = page.id();
    let current = page.history().current();
    let objects = page.objects().deep_copy();

    match setup.editor.undo() {
        Err(UndoError::RestoreSourceMissing(path)) => assert_eq!(path, missing),
        other => panic!("unexpected result {other:?}"),
    }

    let page = setup.editor.current_page().unwrap();
    assert_eq!(page.id(), id);
    assert_eq!(page.history().current(), current);
    assert_eq!(page.objects(), &objects);
}

#[test]
fn undo_file_names_never_reused() {
    let mut setup = Setup::new(UndoMode::Disk);
    setup.open_sample();
    edits(&mut setup);
    for _ in 0..5 {
        setup.editor.undo().unwrap();
    }
    edits(&mut setup);

    assert_eq!(setup.editor.undo_files().allocated(), 11);
    for index in 1..6 {
        assert!(!setup.undo_file(index).exists());
    }
    assert!(setup.undo_file(0).exists());
    for index in 6..11 {
        assert!(setup.undo_file(index).exists());
    }
}

#[test]
fn viewport_only_levels() {
    let mut setup = Setup::new(UndoMode::Disk);
    setup.open_sample();
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 10))));
    });
    let edited = setup.objects().deep_copy();
    let edited_view = setup.editor.current_page().unwrap().viewport();

    let zoomed = Bounds::new(0, 0, 500, 500);
    setup.editor.current_page_mut().unwrap().set_viewport(zoomed);
    setup.editor.savestate(UndoKind::ViewportOnly).unwrap();
    assert_eq!(setup.editor.undo_files().allocated(), 2);

    // Back to the edit, view goes with it
    assert!(setup.editor.undo().unwrap());
    assert_eq!(setup.objects(), &edited);
    assert_eq!(setup.editor.current_page().unwrap().viewport(), edited_view);

    // Content for the zoom level comes from the edit before it
    assert!(setup.editor.undo().unwrap());
    assert!(setup.editor.redo().unwrap());
    assert!(setup.editor.redo().unwrap());
    assert_eq!(setup.objects(), &edited);
    assert_eq!(setup.editor.current_page().unwrap().viewport(), zoomed);
}

#[test]
fn separated_attribute_round_trip() {
    for mode in [UndoMode::Disk, UndoMode::Memory] {
        let mut setup = Setup::new(mode);
        setup.editor.new_page(setup.work.path().join("new.sch"));
        setup.edit(|g| {
            let circle = g.add(ObjectKind::Circle(Circle::new(Point::new(0, 0), 100)));
            g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(500, 0))));
            let value = g.add(ObjectKind::Text(Text::new(Point::new(0, 150), "value=10k")));
            assert!(g.attach(circle, value));
        });
        let before = setup.objects().deep_copy();

        setup.edit(|g| {
            g.add(ObjectKind::Line(Line::new(Point::new(0, 100), Point::new(500, 100))));
        });
        assert!(setup.editor.undo().unwrap());

        assert_eq!(setup.objects(), &before, "{mode} restore differs");
        let (circle, _) = setup.objects().iter().next().unwrap();
        assert_eq!(
            setup.objects().attribute_value(circle, "value"),
            Some("10k")
        );
    }
}

#[test]
fn trimmed_zoom_levels_still_undo() {
    for mode in [UndoMode::Disk, UndoMode::Memory] {
        let mut setup = Setup::with_config(mode, |config| {
            config.undo.levels = 3;
            config.undo.padding = 0;
        });
        setup.editor.new_page(setup.work.path().join("new.sch"));
        let zooms: Vec<Bounds> = (1..5).map(|n| Bounds::new(0, 0, n * 1000, n * 1000)).collect();
        for zoom in &zooms {
            setup.editor.current_page_mut().unwrap().set_viewport(*zoom);
            setup.editor.savestate(UndoKind::ViewportOnly).unwrap();
        }
        setup.edit(|g| {
            g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 10))));
        });

        assert_eq!(setup.editor.trim_history(), 3);

        assert!(setup.editor.undo().unwrap());
        assert!(setup.objects().is_empty());
        assert_eq!(setup.editor.current_page().unwrap().viewport(), zooms[3]);

        assert!(setup.editor.undo().unwrap());
        assert!(setup.objects().is_empty());
        assert_eq!(setup.editor.current_page().unwrap().viewport(), zooms[2]);

        assert!(!setup.editor.undo().unwrap());
        assert!(!setup.editor.current_page().unwrap().history().can_undo());
    }
}

#[test]
fn parent_link_follows_replaced_page() {
    let mut setup = Setup::new(UndoMode::Disk);
    let parent = setup.editor.new_page(setup.work.path().join("top.sch"));
    setup.editor.new_page(setup.work.path().join("sub.sch"));
    setup.editor.current_page_mut().unwrap().set_navigation(1, Some(parent));
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 10))));
    });
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(5, 0), Point::new(5, 10))));
    });
    let child = setup.editor.current_page().unwrap().id();

    setup.editor.goto_page(parent).unwrap();
    setup.edit(|g| {
        g.add(ObjectKind::Circle(Circle::new(Point::new(0, 0), 10)));
    });
    assert!(setup.editor.undo().unwrap());
    let new_parent = setup.editor.current_page().unwrap().id();
    assert_ne!(new_parent, parent);
    assert_eq!(setup.editor.page(child).unwrap().up(), Some(new_parent));

    setup.editor.goto_page(child).unwrap();
    assert!(setup.editor.undo().unwrap());
    let page = setup.editor.current_page().unwrap();
    assert_eq!(page.up(), Some(new_parent));
    assert_eq!(page.page_control(), 1);
}

#[test]
fn view_changes_do_not_mark_changed() {
    let mut setup = Setup::new(UndoMode::Memory);
    setup.open_sample();

    for size in [1000, 2000] {
        let page = setup.editor.current_page_mut().unwrap();
        page.set_viewport(Bounds::new(0, 0, size, size));
        setup.editor.savestate(UndoKind::ViewportOnly).unwrap();
    }

    assert!(setup.editor.undo().unwrap());
    let page = setup.editor.current_page().unwrap();
    assert_eq!(page.viewport(), Bounds::new(0, 0, 1000, 1000));
    assert!(!page.is_changed());
}

#[test]
fn autosave_backup_on_commit() {
    let mut setup = Setup::with_config(UndoMode::Memory, |config| {
        config.autosave.interval = 60;
    });
    let path = setup.open_sample();
    let backup = backup_of(&path);

    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 10))));
    });
    assert!(!backup.exists());
    assert!(setup.editor.current_page().unwrap().ops_since_last_backup() > 0);

    assert!(setup
        .editor
        .tick_autosave(Instant::now() + Duration::from_secs(61)));
    setup.edit(|g| {
        g.add(ObjectKind::Line(Line::new(Point::new(5, 0), Point::new(5, 10))));
    });
    assert!(backup.exists());
    assert_eq!(
        setup.editor.current_page().unwrap().ops_since_last_backup(),
        1
    );

    setup.editor.save_page(None).unwrap();
    assert!(!backup.exists());
    assert!(!setup.editor.current_page().unwrap().is_changed());
}

#[test]
fn closing_and_dropping_remove_files() {
    let mut setup = Setup::new(UndoMode::Disk);
    setup.open_sample();
    edits(&mut setup);
    let other = setup.editor.new_page(setup.work.path().join("other.sch"));
    assert_eq!(setup.editor.undo_files().allocated(), 7);

    setup.editor.close_page(other).unwrap();
    assert!(!setup.undo_file(6).exists());
    assert!(setup.undo_file(5).exists());

    let dir = setup.undo_dir.path().to_path_buf();
    drop(setup.editor);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn failed_capture_keeps_history() {
    let mut setup = Setup::new(UndoMode::Disk);
    setup.open_sample();
    let len = setup.editor.current_page().unwrap().history().len();

    std::fs::remove_dir_all(setup.undo_dir.path()).unwrap();
    let page = setup.editor.current_page_mut().unwrap();
    page.objects_mut()
        .add(ObjectKind::Line(Line::new(Point::new(0, 0), Point::new(0, 10))));

    assert!(matches!(
        setup.editor.savestate(UndoKind::All),
        Err(UndoError::CaptureFailed(_))
    ));
    assert_eq!(setup.editor.current_page().unwrap().history().len(), len);
    assert_eq!(setup.objects().len(), 4);
}

fn backup_of(path: &Path) -> PathBuf {
    let name = path.file_name().unwrap().to_string_lossy();
    path.with_file_name(format!("#{name}#"))
}
