use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::StartupError;

/// `[14:05] [WARN|WEATHER] request failed: ...`
///
/// The terminal is in raw mode while the kiosk runs, so lines end with an explicit carriage
/// return.
const PATTERN: &str = "[{d(%H:%M)}] [{l}|{t}] {m}\r{n}";

pub fn init(level: LevelFilter) -> Result<log4rs::Handle, StartupError> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let config = LogConfig::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(level))
        .map_err(|err| StartupError::Logging(err.to_string()))?;

    log4rs::init_config(config).map_err(|err| StartupError::Logging(err.to_string()))
}
