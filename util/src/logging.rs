use std::{fmt, path::Path};

use log::{Level, LevelFilter, Record};
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller,
                trigger::size::SizeTrigger,
                CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::{Filter, Response},
    Handle,
};

const FILE_SIZE_LIMIT: u64 = 50_000_000;
const ARCHIVED_LOGS: u32 = 10;

const FILE_PATTERN: &str = "[{d(%H:%M:%S)} {l}]: {m}{n}";
const CONSOLE_PATTERN: &str = "{h([{d(%H:%M:%S)} {l}]: {m})}{n}";

/// The level used when none is requested: debug with debug assertions, info otherwise.
#[cfg(debug_assertions)]
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;
/// The level used when none is requested: debug with debug assertions, info otherwise.
#[cfg(not(debug_assertions))]
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Configures log4rs to log to the console and to a rolling file in the given directory.
///
/// Messages are in the form `[HH:MM:SS Level]: message`, and are colored by level on the console.
/// Debug and trace messages are only accepted from modules whose path starts with `crate_filter`.
///
/// The current log is `latest.log`. Once it grows past 50 MB it is compressed to `log-1.gz`, and older
/// archives shift up until ten are kept.
pub fn init_logger(crate_filter: &str, log_dir: &Path, level: LevelFilter) -> anyhow::Result<Handle> {
    let config = build_config(crate_filter, log_dir, level)?;
    Ok(log4rs::init_config(config)?)
}

/// Builds the configuration installed by [`init_logger`] without installing it.
pub fn build_config(crate_filter: &str, log_dir: &Path, level: LevelFilter) -> anyhow::Result<Config> {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let archive_pattern = log_dir.join("log-{}.gz");
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(&archive_pattern.to_string_lossy(), ARCHIVED_LOGS)?;
    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(
            log_dir.join("latest.log"),
            Box::new(CompoundPolicy::new(
                Box::new(SizeTrigger::new(FILE_SIZE_LIMIT)),
                Box::new(roller),
            )),
        )?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(CrateFilter::new(crate_filter)))
                .build("console", Box::new(console)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(CrateFilter::new(crate_filter)))
                .build("logfile", Box::new(logfile)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("logfile")
                .build(level),
        )?;

    Ok(config)
}

// Only allow debug logging from our crates
struct CrateFilter {
    filter: String,
}

impl CrateFilter {
    pub fn new(filter: &str) -> Self {
        CrateFilter {
            filter: filter.to_owned(),
        }
    }
}

impl Filter for CrateFilter {
    fn filter(&self, record: &Record) -> Response {
        if record.level() != Level::Debug && record.level() != Level::Trace {
            return Response::Neutral;
        }

        match record.module_path() {
            Some(path) if path.starts_with(&self.filter) => Response::Accept,
            _ => Response::Reject,
        }
    }
}

impl fmt::Debug for CrateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrateFilter")
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(filter: &CrateFilter, level: Level, module_path: Option<&str>) -> Response {
        filter.filter(
            &Record::builder()
                .level(level)
                .module_path(module_path)
                .args(format_args!("test"))
                .build(),
        )
    }

    #[test]
    fn crate_filter() {
        let filter = CrateFilter::new("nbt");
        assert!(matches!(response(&filter, Level::Debug, Some("nbt::io::read")), Response::Accept));
        assert!(matches!(response(&filter, Level::Trace, Some("nbt_tool")), Response::Accept));
        assert!(matches!(response(&filter, Level::Debug, Some("flate2::gz")), Response::Reject));
        assert!(matches!(response(&filter, Level::Debug, None), Response::Reject));
        assert!(matches!(response(&filter, Level::Warn, Some("flate2")), Response::Neutral));
    }

    #[test]
    fn config_builds() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let config = build_config("nbt", dir.path(), LevelFilter::Info).expect("Failed to build config");
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Info);
    }
}
