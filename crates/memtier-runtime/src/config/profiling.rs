use super::logger::{LogLevel, LoggerConfig};

/// Configuration of the profiling logger.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProfilingConfig {
    /// Where and how much to log about profiled work.
    #[serde(default)]
    pub logger: LoggerConfig<ProfilingLogLevel>,
}

/// Verbosity of the profiling logger.
#[derive(Default, Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum ProfilingLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    /// Duration of every profiled closure and benchmark summaries.
    #[serde(rename = "basic")]
    Basic,
    /// Also logs every individual benchmark sample.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for ProfilingLogLevel {}
