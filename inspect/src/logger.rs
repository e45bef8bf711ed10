use std::fmt::Write;

use jiff::{Zoned, tz::TimeZone};
use log::{Level, Record};
use logforth::{
    append::Stderr,
    layout::{JsonLayout, Layout},
};

use crate::args::{Args, LogStyle};

/// One line per record: UTC timestamp, level, emitting crate, message.
#[derive(Debug, Clone, Copy)]
struct LineLayout {
    color: bool,
}

impl LineLayout {
    fn level_label(&self, level: Level) -> String {
        if !self.color {
            return format!("{level:>5}");
        }

        let code = match level {
            Level::Error => 31,
            Level::Warn => 33,
            Level::Info => 32,
            Level::Debug => 34,
            Level::Trace => 35,
        };

        format!("\x1b[{code}m{level:>5}\x1b[0m")
    }
}

impl Layout for LineLayout {
    fn format(
        &self,
        record: &Record<'_>,
        _diagnostics: &[Box<dyn logforth::diagnostic::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let mut output = String::new();
        let now = Zoned::now().with_time_zone(TimeZone::UTC);
        let target = record.target().split("::").next().unwrap_or_default();

        write!(
            output,
            "{} {}  {target}: {}",
            now.strftime("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.level_label(record.level()),
            record.args()
        )?;

        Ok(output.into_bytes())
    }
}

/// Installs the global logger. Records go to stderr; stdout only carries payloads.
pub(super) fn init(args: &Args) {
    logforth::builder()
        .dispatch(|d| {
            let d = d.filter(args.log_level.env_filter());

            match args.log_style {
                LogStyle::Color => d.append(Stderr::default().with_layout(LineLayout { color: true })),
                LogStyle::Text => d.append(Stderr::default().with_layout(LineLayout { color: false })),
                LogStyle::Json => d.append(Stderr::default().with_layout(JsonLayout::default())),
            }
        })
        .apply();
}
