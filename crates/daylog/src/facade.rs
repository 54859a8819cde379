use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;

use crate::category::Category;
use crate::config::FacadeConfig;
use crate::engine::Engine;
use crate::error::FacadeError;
use crate::format::{Record, TextFormatter};
use crate::sink::{ConsoleSink, FileSink, Sink};
use crate::value::{compose, LogValue};

struct Inner {
    /// Registered file sinks keyed by category name
    sinks: BTreeMap<String, FileSink>,
    engine: Engine,
}

/// Per-day, per-category logger with a console echo.
///
/// Construction creates `<base_dir>/<YYYY-MM-DD>` and registers file sinks
/// for the `default` and `error` categories. Every [`log`](Self::log) call
/// writes to the console and, when the category has one, to its file.
///
/// ```rust,ignore
/// use daylog::{values, LogFacade};
///
/// let logger = LogFacade::new()?;
/// logger.log("default", "Startup", ["listening on :8080"]);
/// logger.log("error", "Db", values!["connect failed after", 3, "attempts"]);
/// ```
pub struct LogFacade {
    log_dir: PathBuf,
    config: FacadeConfig,
    inner: Mutex<Inner>,
}

impl LogFacade {
    /// Create a facade with the default configuration, logging under `logs/`.
    pub fn new() -> Result<Self, FacadeError> {
        Self::with_config(FacadeConfig::default())
    }

    pub fn with_config(config: FacadeConfig) -> Result<Self, FacadeError> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        let log_dir = config.base_dir.join(today);

        // Best effort: a missing directory surfaces as a sink open error below.
        if let Err(e) = create_log_dir(&log_dir) {
            tracing::warn!(
                path = %log_dir.display(),
                error = %e,
                "Failed to create log directory"
            );
        }

        let facade = Self {
            log_dir,
            config,
            inner: Mutex::new(Inner {
                sinks: BTreeMap::new(),
                engine: Engine::new(),
            }),
        };

        facade.register_file_sink(Category::Default)?;
        facade.register_file_sink(Category::Error)?;

        Ok(facade)
    }

    /// Register an append-only `<category>.log` file for `category`.
    ///
    /// Fails with [`FacadeError::AlreadyRegistered`] if the category already
    /// has a file sink; the existing sink is left untouched. Names that are
    /// not plain file stems fail with [`FacadeError::InvalidCategory`].
    pub fn register_file_sink(&self, category: impl Into<Category>) -> Result<(), FacadeError> {
        let category = category.into();
        let path = {
            let mut inner = self.lock();

            if inner.sinks.contains_key(category.as_str()) {
                return Err(FacadeError::AlreadyRegistered(category.to_string()));
            }

            let formatter = TextFormatter::new(self.config.template.as_str());
            let sink = FileSink::open(&self.log_dir, category.as_str(), formatter)?;
            let path = sink.path().to_path_buf();
            inner.sinks.insert(category.to_string(), sink);
            path
        };

        // Diagnostics go out after the lock is released: a host subscriber
        // may forward them straight back into `log`.
        tracing::info!(
            category = %category,
            path = %path.display(),
            "Registered file sink"
        );

        Ok(())
    }

    /// Log `values` under `category`, tagged with `scope`.
    ///
    /// Unregistered categories still reach the console; their file output
    /// is dropped without an error.
    pub fn log<C, I, V>(&self, category: C, scope: &str, values: I)
    where
        C: Into<Category>,
        I: IntoIterator<Item = V>,
        V: Into<LogValue>,
    {
        let category = category.into();
        let values: Vec<LogValue> = values.into_iter().map(Into::into).collect();
        let composed = compose(&values);

        let mut record = Record::new(category.level(), scope, composed.message);
        record.data = composed.data;
        record.extra = self.config.extra.clone();

        let has_file = {
            let mut inner = self.lock();

            if self.config.console {
                inner.engine.attach(Sink::Console(self.console_sink()));
            }

            let file = inner.sinks.get(category.as_str()).cloned();
            let has_file = file.is_some();
            if let Some(file) = file {
                inner.engine.attach(Sink::File(file));
            }

            inner.engine.emit(&record);
            inner.engine.flush();

            if !self.config.persistent_sinks {
                inner.engine.detach_all();
            }
            has_file
        };

        if !has_file {
            tracing::trace!(category = %category, "No file sink registered, console only");
        }
    }

    /// Shorthand for `log(Category::Error, ..)`.
    pub fn error<I, V>(&self, scope: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<LogValue>,
    {
        self.log(Category::Error, scope, values);
    }

    /// Shorthand for `log(Category::Default, ..)`.
    pub fn debug<I, V>(&self, scope: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<LogValue>,
    {
        self.log(Category::Default, scope, values);
    }

    /// The dated directory this facade writes into.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    pub fn is_registered(&self, category: impl Into<Category>) -> bool {
        self.lock().sinks.contains_key(category.into().as_str())
    }

    /// Registered categories, sorted by name.
    pub fn categories(&self) -> Vec<Category> {
        self.lock()
            .sinks
            .keys()
            .map(|name| Category::from(name.as_str()))
            .collect()
    }

    /// Path of the file backing `category`, if it has one.
    pub fn log_path(&self, category: impl Into<Category>) -> Option<PathBuf> {
        self.lock()
            .sinks
            .get(category.into().as_str())
            .map(|sink| sink.path().to_path_buf())
    }

    /// Number of sinks currently attached to the engine.
    pub fn attached_sinks(&self) -> usize {
        self.lock().engine.len()
    }

    fn console_sink(&self) -> ConsoleSink {
        let formatter =
            TextFormatter::new(self.config.template.as_str()).with_color(self.config.color);
        match &self.config.console_capture {
            Some(buffer) => ConsoleSink::capture(buffer.clone(), formatter),
            None => ConsoleSink::stdio(formatter),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn create_log_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}
