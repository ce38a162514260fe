use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use time::{OffsetDateTime, UtcOffset};

pub const DISPLAY_WIDTH: usize = 1920;
pub const DISPLAY_HEIGHT: usize = 1080;

/// Render tick. Only the clock needs to change between refreshes, so once a second is enough.
pub const TICK: Duration = Duration::from_secs(1);

/// Number of ticks between background refreshes.
pub const REFRESH_EVERY: u32 = 120;

/// Upper bound on any single HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_FRAMEBUFFER: &str = "/dev/fb0";

#[derive(Clone, Debug)]
pub struct Config {
    /// data.go.kr API key. Weather and fine dust stay unavailable without it.
    pub service_key: Option<String>,
    pub assets_dir: PathBuf,
    pub framebuffer: PathBuf,
    pub log_level: LevelFilter,
    pub offset: UtcOffset,
}

impl Config {
    /// Read the configuration from the process environment. Must be called before any other
    /// thread is started, since the local UTC offset can only be determined reliably while the
    /// process is single-threaded.
    pub fn from_env() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Self::from_vars(|name| env::var(name).ok(), offset)
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>, offset: UtcOffset) -> Self {
        Self {
            service_key: var("service_key").filter(|key| !key.trim().is_empty()),
            assets_dir: var("KIOSK_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            framebuffer: var("KIOSK_FRAMEBUFFER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRAMEBUFFER)),
            log_level: var("KIOSK_LOG")
                .and_then(|level| LevelFilter::from_str(&level).ok())
                .unwrap_or(LevelFilter::Info),
            offset,
        }
    }

    pub fn background_path(&self) -> PathBuf {
        self.assets_dir.join("background").join("news.png")
    }
}

/// Wall-clock time in the kiosk's local offset.
pub fn now_local(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned(), UtcOffset::UTC)
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.service_key, None);
        assert_eq!(config.framebuffer, PathBuf::from("/dev/fb0"));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(
            config.background_path(),
            PathBuf::from("assets/background/news.png")
        );
    }

    #[test]
    fn test_blank_service_key_is_missing() {
        assert_eq!(config(&[("service_key", "  ")]).service_key, None);
        assert_eq!(
            config(&[("service_key", "abc")]).service_key.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("KIOSK_ASSETS_DIR", "/srv/kiosk"),
            ("KIOSK_FRAMEBUFFER", "/dev/fb1"),
            ("KIOSK_LOG", "debug"),
        ]);

        assert_eq!(config.framebuffer, PathBuf::from("/dev/fb1"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(
            config.background_path(),
            PathBuf::from("/srv/kiosk/background/news.png")
        );
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        assert_eq!(config(&[("KIOSK_LOG", "loud")]).log_level, LevelFilter::Info);
    }
}
