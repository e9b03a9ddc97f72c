use super::{execution::ExecutionConfig, launch::LaunchConfig, profiling::ProfilingConfig};
use alloc::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static MEMTIER_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for memtier, combining execution, launch logging and
/// profiling settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Resources of the emulated device.
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Configuration for logging kernel launches.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Configuration for profiling memtier operations.
    #[serde(default)]
    pub profiling: ProfilingConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `memtier.toml` or `MemTier.toml` in
    /// the current directory or its parents. If no file is found, a default configuration is used.
    /// Environment variables are applied on top, see [GlobalConfig::override_from_env].
    ///
    /// # Notes
    ///
    /// Calling this function is somewhat expensive, because of a global static lock. Clients read
    /// it once when they are created.
    pub fn get() -> Arc<Self> {
        let mut state = MEMTIER_GLOBAL_CONFIG.lock();
        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Save this configuration as toml to the provided file path.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        use std::io::Write;

        let content = toml::to_string_pretty(self)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`. Attempting
    /// to set the configuration after it has been initialized will cause a panic.
    pub fn set(config: Self) {
        let mut state = MEMTIER_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Parses a configuration from the content of a toml file.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Overrides configuration fields based on environment variables.
    ///
    /// - `MEMTIER_DEBUG_LOG`: `stdout`, `stderr`, `1`/`true` (to `/tmp/memtier.log`),
    ///   `0`/`false` (disables both loggers) or a file path.
    /// - `MEMTIER_DEBUG_OPTION`: `debug` or `profile`.
    /// - `MEMTIER_WORKERS`: number of worker threads.
    pub fn override_from_env(mut self) -> Self {
        use super::{launch::LaunchLogLevel, profiling::ProfilingLogLevel};

        if let Ok(val) = std::env::var("MEMTIER_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Full;
            self.profiling.logger.level = ProfilingLogLevel::Basic;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                    self.profiling.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                    self.profiling.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/memtier.log";
                    self.launch.logger.file = Some(file_path.into());
                    self.profiling.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                    self.profiling.logger.level = ProfilingLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                    self.profiling.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("MEMTIER_DEBUG_OPTION") {
            match val.as_str() {
                "debug" => {
                    self.launch.logger.level = LaunchLogLevel::Full;
                    self.profiling.logger.level = ProfilingLogLevel::Full;
                }
                "profile" => {
                    self.profiling.logger.level = ProfilingLogLevel::Basic;
                }
                _ => {}
            }
        };

        if let Ok(val) = std::env::var("MEMTIER_WORKERS") {
            match val.parse::<usize>() {
                Ok(workers) => self.execution.workers = Some(workers),
                Err(err) => log::warn!("Ignoring MEMTIER_WORKERS={val}: {err}"),
            }
        }

        self
    }

    // Loads configuration from `memtier.toml` or `MemTier.toml` in the current directory or its parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is reached.
    // Returns a default configuration if no file is found.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in ["memtier.toml", "MemTier.toml"] {
                if let Some(config) = Self::from_file_path(dir.join(name)) {
                    return config;
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    // Loads configuration from a specified file path, skipping malformed files.
    fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> Option<Self> {
        let content = std::fs::read_to_string(path.as_ref()).ok()?;
        match Self::from_toml(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                log::warn!(
                    "The file {} doesn't have the right format => {err}",
                    path.as_ref().display()
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{launch::LaunchLogLevel, profiling::ProfilingLogLevel};
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test_log::test]
    fn empty_file_is_default() {
        let config = GlobalConfig::from_toml("").unwrap();

        assert_eq!(config.execution, ExecutionConfig::default());
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
    }

    #[test_log::test]
    fn parses_every_section() {
        let content = r#"
            [execution]
            workers = 3
            max_units_per_group = 256

            [launch.logger]
            level = "full"
            stderr = true

            [profiling.logger]
            level = "basic"
            log = "debug"
        "#;
        let config = GlobalConfig::from_toml(content).unwrap();

        assert_eq!(config.execution.workers, Some(3));
        assert_eq!(config.execution.max_units_per_group, 256);
        assert_eq!(config.execution.max_shared_memory_size, 48 * 1024);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Full);
        assert!(config.launch.logger.stderr);
        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Basic);
        assert_eq!(
            config.profiling.logger.log,
            Some(crate::config::LogCrateLevel::Debug)
        );
    }

    #[test_log::test]
    fn saved_config_is_loaded_back() {
        let path =
            std::env::temp_dir().join(format!("memtier-config-{}.toml", std::process::id()));
        let mut config = GlobalConfig::default();
        config.execution.workers = Some(2);
        config.launch.logger.level = LaunchLogLevel::Basic;
        config.profiling.logger.stdout = true;

        config.save(&path).unwrap();
        let loaded = GlobalConfig::from_file_path(&path);
        let _ = std::fs::remove_file(&path);
        let loaded = loaded.unwrap();

        assert_eq!(loaded.execution, config.execution);
        assert_eq!(loaded.launch.logger.level, LaunchLogLevel::Basic);
        assert!(loaded.profiling.logger.stdout);
    }

    #[test_log::test]
    fn rejects_unknown_level() {
        let content = r#"
            [launch.logger]
            level = "verbose"
        "#;

        assert!(GlobalConfig::from_toml(content).is_err());
    }

    #[test_log::test]
    #[serial]
    fn env_overrides_workers_and_loggers() {
        // SAFETY: serialized with every other test touching the environment.
        unsafe {
            std::env::set_var("MEMTIER_WORKERS", "5");
            std::env::set_var("MEMTIER_DEBUG_LOG", "stderr");
        }
        let config = GlobalConfig::default().override_from_env();
        unsafe {
            std::env::remove_var("MEMTIER_WORKERS");
            std::env::remove_var("MEMTIER_DEBUG_LOG");
        }

        assert_eq!(config.execution.workers, Some(5));
        assert_eq!(config.execution.resolved_workers(), 5);
        assert!(config.launch.logger.stderr);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Full);
        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Basic);
    }

    #[test_log::test]
    #[serial]
    fn env_ignores_invalid_workers() {
        unsafe {
            std::env::set_var("MEMTIER_WORKERS", "many");
        }
        let config = GlobalConfig::default().override_from_env();
        unsafe {
            std::env::remove_var("MEMTIER_WORKERS");
        }

        assert_eq!(config.execution.workers, None);
        assert!(config.execution.resolved_workers() >= 1);
    }
}
