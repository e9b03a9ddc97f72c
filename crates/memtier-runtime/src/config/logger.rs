use super::GlobalConfig;
use crate::config::{launch::LaunchLogLevel, profiling::ProfilingLogLevel};
use alloc::{string::ToString, sync::Arc, vec::Vec};
use core::fmt::Display;
use hashbrown::HashMap;

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Where the messages of one logging channel go, and how many of them.
///
/// Every destination can be enabled at once.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Append messages to this file.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Keep the existing content of `file` (default) instead of truncating it.
    ///
    /// When another channel writes to the same file, the first one to open it decides.
    #[serde(default = "default_append")]
    pub append: bool,

    /// Print messages to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Print messages to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Forward messages to the `log` facade at this level.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// Verbosity of the channel; nothing is registered while it's disabled.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: default_append(),
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

fn default_append() -> bool {
    true
}

/// Level used when forwarding messages to the `log` facade.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// `log::info!`.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// `log::debug!`.
    #[serde(rename = "debug")]
    Debug,

    /// `log::trace!`.
    #[serde(rename = "trace")]
    Trace,
}

/// Verbosity of a logging channel.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Routes launch and profiling messages to the destinations picked in the [GlobalConfig].
#[derive(Debug)]
pub struct Logger {
    sinks: Vec<Sink>,
    launch: Vec<usize>,
    profiling: Vec<usize>,
    /// The configuration the sinks were opened from.
    pub config: Arc<GlobalConfig>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(GlobalConfig::get())
    }
}

impl Logger {
    /// Opens every destination enabled for the launch and profiling channels.
    ///
    /// A destination used by both channels is opened once and shared.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let mut registry = SinkRegistry::default();

        let launch = match config.launch.logger.level {
            LaunchLogLevel::Disabled => Vec::new(),
            _ => registry.register(&config.launch.logger),
        };
        let profiling = match config.profiling.logger.level {
            ProfilingLogLevel::Disabled => Vec::new(),
            _ => registry.register(&config.profiling.logger),
        };

        Self {
            sinks: registry.sinks,
            launch,
            profiling,
            config,
        }
    }

    /// Writes `msg` to every launch destination.
    pub fn log_launch<S: Display>(&mut self, msg: &S) {
        Self::write(&mut self.sinks, &self.launch, msg);
    }

    /// Writes `msg` to every profiling destination.
    pub fn log_profiling<S: Display>(&mut self, msg: &S) {
        Self::write(&mut self.sinks, &self.profiling, msg);
    }

    /// Verbosity of the launch channel.
    pub fn log_level_launch(&self) -> LaunchLogLevel {
        self.config.launch.logger.level
    }

    /// Verbosity of the profiling channel.
    pub fn log_level_profiling(&self) -> ProfilingLogLevel {
        self.config.profiling.logger.level
    }

    fn write<S: Display>(sinks: &mut [Sink], channel: &[usize], msg: &S) {
        match channel {
            [] => {}
            [index] => sinks[*index].write(msg),
            indices => {
                let msg = msg.to_string();
                for index in indices {
                    sinks[*index].write(&msg);
                }
            }
        }
    }
}

#[derive(Hash, PartialEq, Eq)]
enum SinkId {
    File(PathBuf),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

#[derive(Default)]
struct SinkRegistry {
    sinks: Vec<Sink>,
    by_id: HashMap<SinkId, usize>,
}

impl SinkRegistry {
    /// Returns the indices of the sinks enabled by `config`, opening the missing ones.
    fn register<L: LogLevel>(&mut self, config: &LoggerConfig<L>) -> Vec<usize> {
        let mut channel = Vec::new();

        if let Some(path) = &config.file {
            let append = config.append;
            channel.extend(self.index_of(SinkId::File(path.clone()), || {
                FileSink::open(path, append).map(Sink::File)
            }));
        }
        if config.stdout {
            channel.extend(self.index_of(SinkId::Stdout, || Some(Sink::Stdout)));
        }
        if config.stderr {
            channel.extend(self.index_of(SinkId::Stderr, || Some(Sink::Stderr)));
        }
        if let Some(level) = config.log {
            channel.extend(self.index_of(SinkId::Log(level), || Some(Sink::Log(level))));
        }

        channel
    }

    fn index_of(&mut self, id: SinkId, open: impl FnOnce() -> Option<Sink>) -> Option<usize> {
        if let Some(index) = self.by_id.get(&id) {
            return Some(*index);
        }

        let sink = open()?;
        let index = self.sinks.len();
        self.sinks.push(sink);
        self.by_id.insert(id, index);
        Some(index)
    }
}

#[derive(Debug)]
enum Sink {
    File(FileSink),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl Sink {
    fn write<S: Display>(&mut self, msg: &S) {
        match self {
            Sink::File(file) => file.write(msg),
            Sink::Stdout => println!("{msg}"),
            Sink::Stderr => eprintln!("{msg}"),
            Sink::Log(LogCrateLevel::Info) => log::info!("{msg}"),
            Sink::Log(LogCrateLevel::Debug) => log::debug!("{msg}"),
            Sink::Log(LogCrateLevel::Trace) => log::trace!("{msg}"),
        }
    }
}

#[derive(Debug)]
struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    fn open(path: &Path, append: bool) -> Option<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path);

        match file {
            Ok(file) => Some(Self {
                writer: BufWriter::new(file),
            }),
            Err(err) => {
                log::warn!("Can't open log file {}: {err}", path.display());
                None
            }
        }
    }

    // Flushed after every message so the file stays readable while the program runs.
    fn write<S: Display>(&mut self, msg: &S) {
        if let Err(err) = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush()) {
            log::warn!("Can't write to log file: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_file(path: PathBuf) -> GlobalConfig {
        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Basic;
        config.launch.logger.file = Some(path.clone());
        config.launch.logger.append = false;
        config.profiling.logger.level = ProfilingLogLevel::Basic;
        config.profiling.logger.file = Some(path);
        config.profiling.logger.stderr = true;
        config
    }

    #[test_log::test]
    fn disabled_channels_open_nothing() {
        let mut config = GlobalConfig::default();
        config.launch.logger.stdout = true;
        let logger = Logger::new(Arc::new(config));

        assert!(logger.sinks.is_empty());
        assert!(logger.launch.is_empty());
        assert!(logger.profiling.is_empty());
    }

    #[test_log::test]
    fn same_file_is_opened_once() {
        let path = std::env::temp_dir().join(format!("memtier-logger-{}.log", std::process::id()));
        let mut logger = Logger::new(Arc::new(config_with_file(path.clone())));

        assert_eq!(logger.sinks.len(), 2);
        assert_eq!(logger.launch, vec![0]);
        assert_eq!(logger.profiling, vec![0, 1]);

        logger.log_launch(&"launch line");
        logger.log_profiling(&"profiling line");
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(content, "launch line\nprofiling line\n");
    }
}
