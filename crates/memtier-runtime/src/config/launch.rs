use super::logger::{LogLevel, LoggerConfig};

/// Configuration of the launch logger.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Where and how much to log about kernel launches.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

/// Verbosity of the launch logger.
#[derive(Default, Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum LaunchLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,
    /// One line per launch.
    #[serde(rename = "basic")]
    Basic,
    /// Launch line plus the resources requested by the kernel.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}
