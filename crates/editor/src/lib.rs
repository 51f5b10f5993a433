pub(crate) mod editor;

pub use editor::{
    autosave::AutoSave,
    config::{read_config, AutoSaveConfig, Config, UndoConfig, UndoMode},
    pages::{
        Direction, EntryId, Page, PageError, PageId, Pages, UndoHistory, UndoKind, ViewState,
        DEFAULT_VIEWPORT,
    },
    redraw::{Notification, Notifier},
    undo::{ControllerState, UndoController, UndoError, UndoFiles},
    Editor,
};
