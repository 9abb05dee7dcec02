use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Environment variable holding the log level when `-v` is not given.
pub const LOG_ENV: &str = "S3_LOG";

/// Pick the log level: `-v` wins, then `$S3_LOG`, then warnings only.
pub fn level(verbose: bool) -> LevelFilter {
    level_from(verbose, std::env::var(LOG_ENV).ok().as_deref())
}

fn level_from(verbose: bool, value: Option<&str>) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    value
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

/// Install a stderr logger. Records never go to stdout, which belongs to the
/// commands being run.
pub fn init(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // Fails only if a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Never);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_means_debug() {
        assert_eq!(level(true), LevelFilter::Debug);
        assert_eq!(level_from(true, Some("error")), LevelFilter::Debug);
    }

    #[test]
    fn level_names_are_read_from_env_value() {
        assert_eq!(level_from(false, Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from(false, Some("error")), LevelFilter::Error);
        assert_eq!(level_from(false, Some("off")), LevelFilter::Off);
        assert_eq!(level_from(false, Some("TRACE")), LevelFilter::Trace);
    }

    #[test]
    fn unset_or_invalid_level_means_warn() {
        assert_eq!(level_from(false, None), LevelFilter::Warn);
        assert_eq!(level_from(false, Some("loud")), LevelFilter::Warn);
        assert_eq!(level_from(false, Some("")), LevelFilter::Warn);
    }
}
