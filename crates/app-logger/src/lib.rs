use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub use log::{debug, error, info, trace, warn, LevelFilter};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use sanitize_filename::sanitize_with_options;

const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} [{M}] {m}{n}";
const CONSOLE_PATTERN: &str = "{h({l:<5})} {m}{n}";

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerConfigBuilder<'a> {
    config: LoggerConfig<'a>,
}

impl<'a> LoggerConfigBuilder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name_suffix(mut self, name_suffix: &'a str) -> Self {
        self.config.name_suffix = Some(name_suffix);
        self
    }

    #[must_use]
    pub fn program_name(mut self, program_name: &'a str) -> Self {
        self.config.program_name = Some(program_name);
        self
    }

    /// Directory the run log is written to.
    ///
    /// Defaults to the OS temp directory.
    #[must_use]
    pub fn log_directory(mut self, log_directory: &'a Path) -> Self {
        self.config.log_directory = Some(log_directory);
        self
    }

    #[must_use]
    pub fn file_log_level(mut self, log_level: LevelFilter) -> Self {
        self.config.file_log_level = Some(log_level);
        self
    }

    #[must_use]
    pub fn console_log_level(mut self, log_level: LevelFilter) -> Self {
        self.config.console_log_level = Some(log_level);
        self
    }

    #[must_use]
    pub fn build(self) -> LoggerConfig<'a> {
        self.config
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerConfig<'a> {
    pub(crate) name_suffix: Option<&'a str>,
    pub(crate) program_name: Option<&'a str>,
    pub(crate) log_directory: Option<&'a Path>,
    pub(crate) file_log_level: Option<LevelFilter>,
    pub(crate) console_log_level: Option<LevelFilter>,
}

impl<'a> From<LoggerConfigBuilder<'a>> for LoggerConfig<'a> {
    fn from(builder: LoggerConfigBuilder<'a>) -> Self {
        builder.build()
    }
}

impl LoggerConfig<'_> {
    #[must_use]
    pub fn builder() -> LoggerConfigBuilder<'static> {
        LoggerConfigBuilder::new()
    }
}

/// Sets up the global logger: one appender for the run log file and one for the console.
///
/// Returns the path of the log file alongside the handle so callers can point users at it.
pub fn init<'a, T: Into<LoggerConfig<'a>>>(cfg: T) -> anyhow::Result<(log4rs::Handle, PathBuf)> {
    let cfg: LoggerConfig = cfg.into();

    let log_file = log_file_path(&cfg);
    fs::create_dir_all(log_file.parent().ok_or_else(|| {
        anyhow::anyhow!(
            "Failed to get parent directory of log file path: {:?}",
            &log_file
        )
    })?)?;

    let config = Config::builder();
    let config = {
        let log = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(&log_file)?;
        let log_level = cfg.file_log_level.unwrap_or(LevelFilter::Debug);
        config.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("logfile", Box::new(log)),
        )
    };
    let config = {
        let console = ConsoleAppender::builder()
            .target(Target::Stdout)
            .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
            .build();
        let log_level = cfg.console_log_level.unwrap_or(if cfg!(debug_assertions) {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        });
        config.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("console", Box::new(console)),
        )
    };
    let config = config.build(
        Root::builder()
            .appender("logfile")
            .appender("console")
            .build(LevelFilter::Trace),
    )?;

    let handle = log4rs::init_config(config)?;

    debug!("Logging to {:?}", &log_file);

    Ok((handle, log_file))
}

fn log_file_path(config: &LoggerConfig) -> PathBuf {
    let program_name = config
        .program_name
        .map_or_else(|| env!("CARGO_PKG_NAME").to_string(), ToString::to_string);

    let mut file_name = program_name;

    if let Some(suffix) = config.name_suffix {
        file_name = format!("{file_name}_{suffix}");
    }

    file_name = format!("{file_name}.log");

    let file_name = sanitize_with_options(
        file_name,
        sanitize_filename::Options {
            truncate: true,
            replacement: "^",
            ..Default::default()
        },
    );

    config
        .log_directory
        .map_or_else(env::temp_dir, Path::to_path_buf)
        .join(file_name)
}
