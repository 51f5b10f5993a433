mod logging;
mod script;

use std::{
    fs,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use argh::FromArgs;
use gschem_editor::{read_config, Config, Editor};

const CONFIG_DIR: &str = "gschem";
const CONFIG_FILE: &str = "config.toml";
const UNTITLED: &str = "untitled.sch";

#[derive(FromArgs)]
/// Schematic capture editor. Opens a schematic and runs an edit script
/// against it, reading commands from stdin if no script is given.
struct Cli {
    /// configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// turn debugging information on
    #[argh(switch, short = 'd')]
    debug: bool,

    /// edit script to run
    #[argh(option, short = 's')]
    script: Option<PathBuf>,

    /// schematic to open
    #[argh(positional)]
    file: Option<PathBuf>,
}

fn main() {
    let cli: Cli = argh::from_env();

    let log_path = logging::log_path();
    let logging = logging::setup(&log_path, cli.debug);
    if let Err(e) = &logging {
        eprintln!("gschem: failed to set up logging to {log_path:?}: {e}");
    }

    if let Err(e) = run(cli) {
        match logging {
            Ok(()) => log::error!("{e:#}"),
            Err(_) => eprintln!("gschem: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let mut editor = Editor::new(config);

    match &cli.file {
        Some(file) if file.exists() => {
            editor.open_page(file)?;
        }
        Some(file) => {
            log::info!("{file:?} does not exist, starting a new page");
            editor.new_page(file.clone());
        }
        None => {
            editor.new_page(UNTITLED);
        }
    }

    match &cli.script {
        Some(path) => {
            let file = fs::File::open(path)?;
            let stdout = io::stdout();
            script::run(&mut editor, BufReader::new(file), &mut stdout.lock())?;
        }
        None => script::run_stdin(&mut editor)?,
    }

    if let Some(id) = editor.pages().any_unsaved_changes() {
        if let Some(page) = editor.page(id) {
            log::warn!("Exiting with unsaved changes in {:?}", page.filename());
        }
    }

    Ok(())
}

/// Read the given config or the default one if it exists
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return read_config(path);
    }

    let default = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE));
    match default {
        Some(path) if path.exists() => match read_config(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::error!("Failed to read config {path:?}, using defaults: {e}");
                Ok(Config::default())
            }
        },
        _ => Ok(Config::default()),
    }
}
