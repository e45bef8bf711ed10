use std::{fmt, io::IsTerminal, path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use config::{Config, PayloadKind};
use logforth::filter::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "inspect", version, about = "Validate chat-completion response payloads")]
pub struct Args {
    /// Payload file to read. Standard input is read when omitted.
    pub input: Option<PathBuf>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "INSPECT_CONFIG_PATH", default_value = "./inspect.toml")]
    pub config: PathBuf,
    /// Record type to validate the input as: completion, chunk or image.
    /// Overrides input.kind from the configuration.
    #[arg(long, short, env = "INSPECT_KIND")]
    pub kind: Option<PayloadKind>,
    /// Print every validated chunk instead of the assembled completion.
    #[arg(long)]
    pub no_assemble: bool,
    /// Set the logging level.
    #[arg(long = "log", env = "INSPECT_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "INSPECT_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
}

impl Args {
    /// Loads the configuration file, if present, and applies command line overrides.
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            Config::default()
        };

        if let Some(kind) = self.kind {
            config.input.kind = kind;
        }

        if self.no_assemble {
            config.stream.assemble = false;
        }

        Ok(config)
    }

    /// Reads the whole payload input.
    pub fn read_input(&self) -> anyhow::Result<String> {
        match &self.input {
            Some(path) => {
                std::fs::read_to_string(path).with_context(|| format!("Failed to read input file '{}'", path.display()))
            }
            None => std::io::read_to_string(std::io::stdin()).context("Failed to read standard input"),
        }
    }
}

/// Crates whose records follow `--log`. Dependencies stay at `warn`.
const WORKSPACE_TARGETS: &[&str] = &["inspect", "response", "config"];

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogStyle {
    /// Coloured lines, the default when stderr is a terminal
    Color,
    /// Plain lines, the default when stderr is redirected
    Text,
    /// One JSON object per record
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stderr().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Nothing but the report and the final error
    Off,
    Error,
    /// Configuration warnings and chunks dropped from an assembled stream
    #[default]
    Warn,
    Info,
    /// Also every rejected record and unrecognised finish reason
    Debug,
    Trace,
}

impl LogLevel {
    fn directives(self) -> String {
        match self {
            LogLevel::Off => String::from("off"),
            level => std::iter::once(String::from("warn"))
                .chain(WORKSPACE_TARGETS.iter().map(|target| format!("{target}={level}")))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::from_str(&self.directives()).expect("directives only name workspace crates and fixed levels")
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value_name(self, f)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value_name(self, f)
    }
}

/// Writes the name clap accepts for `value` on the command line.
fn write_value_name(value: &impl ValueEnum, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = value.to_possible_value().ok_or(fmt::Error)?;
    f.write_str(name.get_name())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use config::PayloadKind;

    use super::{Args, LogLevel};

    #[test]
    fn overrides_apply_without_config_file() {
        let args = Args::parse_from([
            "inspect",
            "--config",
            "/definitely/not/here/inspect.toml",
            "--kind",
            "chunk",
            "--no-assemble",
            "--log",
            "debug",
        ]);

        let config = args.config().unwrap();

        assert_eq!(config.input.kind, PayloadKind::Chunk);
        assert!(!config.stream.assemble);
        assert_eq!(args.log_level, LogLevel::Debug);
        assert!(args.input.is_none());
    }

    #[test]
    fn log_level_only_raises_workspace_crates() {
        assert_eq!(LogLevel::Off.directives(), "off");
        assert_eq!(LogLevel::Debug.directives(), "warn,inspect=debug,response=debug,config=debug");
        assert_eq!(LogLevel::default().to_string(), "warn");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = Args::try_parse_from(["inspect", "--kind", "embedding"]);

        assert!(result.is_err());
    }
}
