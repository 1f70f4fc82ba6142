use std::io::Write;

use time_format::TimeStampMs;

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(
            time_format::now_ms().ok(),
            record.level(),
            record.target(),
            &record.args().to_string());
        // Nowhere left to report a failed write to stderr
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_timestamp(time: Option<TimeStampMs>) -> String {
    let format = time_format::DateFormat::Custom("%H:%M:%S.{ms}");
    time.and_then(|time| time_format::format_common_ms_local(time, format).ok())
        .unwrap_or_else(|| "???".to_string())
}

fn format_record(time: Option<TimeStampMs>, level: log::Level, target: &str, message: &str) -> String {
    format!("{} [{:5}] {} {}", format_timestamp(time), level, target, message)
}

static LOGGER: Logger = Logger;

/// Initialise the global logger, writing to stderr.
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_max_level(level);
    log::set_logger(&LOGGER)
}

#[cfg(test)]
mod test {
    use super::format_record;

    #[test]
    fn record_layout() {
        let line = format_record(None, log::Level::Warn, "meshload_obj::loader", "Unable to find material");
        assert_eq!(line, "??? [WARN ] meshload_obj::loader Unable to find material");
    }
}
