//! Facade configuration.
//!
//! Loads optional settings from `daylog.toml` in a given directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::format::DEFAULT_TEMPLATE;
use crate::sink::CaptureBuffer;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "daylog.toml";

/// Settings for a [`LogFacade`](crate::LogFacade).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacadeConfig {
    /// Root under which the dated directory is created
    pub base_dir: PathBuf,
    /// Keep sinks attached between calls instead of detaching after each one
    pub persistent_sinks: bool,
    /// Line template shared by every sink
    pub template: String,
    /// Echo every message to the console
    pub console: bool,
    /// Colorize console output
    pub color: bool,
    /// Static fields rendered into every record's `extra` segment
    pub extra: Map<String, Value>,
    /// Route console output into this buffer instead of stdout/stderr
    #[serde(skip)]
    pub console_capture: Option<CaptureBuffer>,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("logs"),
            persistent_sinks: false,
            template: DEFAULT_TEMPLATE.to_string(),
            console: true,
            color: true,
            extra: Map::new(),
            console_capture: None,
        }
    }
}

impl FacadeConfig {
    /// Load configuration from `dir`.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if the file exists and parses successfully
    /// - `Ok(None)` if the file does not exist
    /// - `Err(...)` if the file exists but fails to read or parse
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: FacadeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_persistent_sinks(mut self, persistent: bool) -> Self {
        self.persistent_sinks = persistent;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_console_capture(mut self, buffer: CaptureBuffer) -> Self {
        self.console_capture = Some(buffer);
        self
    }
}
