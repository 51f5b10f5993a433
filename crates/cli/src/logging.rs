use std::{
    backtrace::Backtrace,
    env,
    path::{Path, PathBuf},
    panic,
};

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;

const LOG_DIR: &str = "gschem";
const LOG_FILE: &str = "gschem.log";

/// Log file in the user cache directory, or the temp directory if there is
/// no cache directory
pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(LOG_DIR))
        .unwrap_or_else(env::temp_dir)
        .join(LOG_FILE)
}

/// Log everything to `path` and warnings to stderr. Panics are logged with
/// a backtrace before the process dies.
pub fn setup(path: &Path, debug: bool) -> anyhow::Result<()> {
    let log = path.to_path_buf();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "<unknown>".into());

        let payload = info.payload();
        let cause = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("<cause unknown>");

        log::error!("gschem panicked at {location}: {cause}");
        log::error!("{}", Backtrace::capture());
        eprintln!("gschem: internal error at {location}: {cause}, see {log:?}");
    }));

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{l} {d(%H:%M:%S.%3f)} {f}:{L} {m}{n}",
        )))
        .build(path)?;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("gschem: {l}: {m}{n}")))
        .build();

    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Warn)))
                .build("stderr", Box::new(stderr)),
        )
        .build(Root::builder().appenders(["file", "stderr"]).build(level))?;

    log4rs::init_config(config)?;
    log::debug!("Logging to {path:?}");
    Ok(())
}
