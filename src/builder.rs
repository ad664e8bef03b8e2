use std::ffi::OsString;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::cli::{self, AppInfo};
use crate::error::ConfigError;
use crate::file::{self, FileLayer};
use crate::ops::{self, Actions, StdoutActions};
use crate::option::OptionKey;
use crate::resolve::{self, ResolveInput};
use crate::schema::Schema;
use crate::snapshot::Snapshot;
use crate::types::{Handled, Outcome, SearchPath};

type Callback = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Builder for a [`Config`].
///
/// ```ignore
/// let config = Config::builder(schema)
///     .app_name("myapp")
///     .version(env!("CARGO_PKG_VERSION"))
///     .search_paths(vec![SearchPath::Platform, SearchPath::Cwd])
///     .build()?;
/// ```
pub struct ConfigBuilder {
    schema: Schema,
    app: AppInfo,
    file_name: Option<String>,
    search_paths: Vec<SearchPath>,
}

impl ConfigBuilder {
    fn new(schema: Schema) -> Self {
        Self {
            schema,
            app: AppInfo::default(),
            file_name: None,
            search_paths: Vec::new(),
        }
    }

    /// Set the application name, used in `--help` and to derive the default
    /// config file name (`"{app_name}.toml"`).
    pub fn app_name(mut self, name: &str) -> Self {
        self.app.name = Some(name.to_string());
        self
    }

    /// Enable `--version`, which reports this string.
    pub fn version(mut self, version: &str) -> Self {
        self.app.version = Some(version.to_string());
        self
    }

    /// One-line description shown at the top of `--help`.
    pub fn about(mut self, text: &str) -> Self {
        self.app.about = Some(text.to_string());
        self
    }

    /// Override the config file name looked up in the search paths
    /// (default: `"{app_name}.toml"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Directories searched for a config file when `--config` is not given.
    ///
    /// Paths are listed in **priority-ascending** order: the last entry has
    /// the highest priority, and only the highest-priority file found is
    /// loaded. No discovery happens unless search paths are set.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths.push(path);
        self
    }

    /// The config file name, or error if it cannot be derived.
    fn effective_file_name(&self) -> Result<String, ConfigError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.app.name.as_deref().ok_or(ConfigError::AppNameRequired)?;
        Ok(format!("{app}.toml"))
    }

    fn discovery(&self) -> Result<Option<Discovery>, ConfigError> {
        if self.search_paths.is_empty() {
            return Ok(None);
        }
        let file_name = self.effective_file_name()?;
        let app_name = match &self.app.name {
            Some(name) => name.clone(),
            None if self.search_paths.contains(&SearchPath::Platform) => {
                return Err(ConfigError::AppNameRequired);
            }
            None => String::new(),
        };
        Ok(Some(Discovery {
            search_paths: self.search_paths.clone(),
            file_name,
            app_name,
        }))
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let discovery = self.discovery()?;
        Ok(Config::from_parts(self.schema, self.app, discovery))
    }
}

struct Discovery {
    search_paths: Vec<SearchPath>,
    file_name: String,
    app_name: String,
}

/// A configuration context: the committed option values plus the callbacks
/// to run after every commit.
///
/// Every parse works on fresh state and only touches the committed values in
/// its final step, a single atomic swap. A failed parse leaves the previous
/// configuration in place. Readers ([`get`](Self::get),
/// [`snapshot`](Self::snapshot)) never block and never observe a partial
/// commit. Before the first successful parse every option reads as its
/// default.
pub struct Config {
    schema: Arc<Schema>,
    app: AppInfo,
    discovery: Option<Discovery>,
    current: ArcSwap<Snapshot>,
    callbacks: Mutex<Vec<Callback>>,
}

impl Config {
    pub fn builder(schema: Schema) -> ConfigBuilder {
        ConfigBuilder::new(schema)
    }

    /// A context with no version string and no config file discovery.
    pub fn new(schema: Schema) -> Self {
        Self::from_parts(schema, AppInfo::default(), None)
    }

    fn from_parts(schema: Schema, app: AppInfo, discovery: Option<Discovery>) -> Self {
        let schema = Arc::new(schema);
        let defaults = Snapshot::defaults(Arc::clone(&schema));
        Self {
            schema,
            app,
            discovery,
            current: ArcSwap::from_pointee(defaults),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Parse `args` (program name first), printing help, version and
    /// show-config output to stdout.
    pub fn parse_args<I, T>(&self, args: I) -> Result<Outcome, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.parse_args_with(args, &mut StdoutActions)
    }

    /// Parse `args` (program name first), sending help, version and
    /// show-config output to `actions`.
    ///
    /// The command line is parsed first. `--help` and `--version` are
    /// handled right away and nothing is committed. Otherwise the file
    /// named by `--config` (or the discovered file, if any) is loaded,
    /// command-line values are laid over file values per option, every
    /// value is converted and validated, and the result is committed.
    /// Callbacks then run in registration order, except for
    /// `--show-config`, which reports the committed values instead.
    pub fn parse_args_with<I, T>(
        &self,
        args: I,
        actions: &mut dyn Actions,
    ) -> Result<Outcome, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = cli::parse(&self.schema, &self.app, args)?;

        if let Some(help) = &cli.help {
            actions.help(help);
            return Ok(Outcome::Handled(Handled::Help));
        }
        if cli.version {
            if let Some(version) = &self.app.version {
                actions.version(version);
            }
            return Ok(Outcome::Handled(Handled::Version));
        }

        let file = match &cli.config_path {
            Some(path) => file::load(path, &self.schema)?,
            None => self.discover()?,
        };
        let show_config = cli.show_config;
        let snapshot = resolve::resolve(
            &self.schema,
            ResolveInput {
                cli: cli.cells,
                file,
            },
        )?;
        let snapshot = self.commit(snapshot);

        if show_config {
            ops::show_config(&snapshot, actions);
            return Ok(Outcome::Handled(Handled::ShowConfig));
        }
        self.notify(&snapshot);
        Ok(Outcome::Committed(snapshot))
    }

    /// Load options from a config file alone, as if the command line were
    /// `--config <path>`.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Arc<Snapshot>, ConfigError> {
        let file = file::load(path.as_ref(), &self.schema)?;
        let snapshot = resolve::resolve(
            &self.schema,
            ResolveInput {
                file,
                ..ResolveInput::default()
            },
        )?;
        let snapshot = self.commit(snapshot);
        self.notify(&snapshot);
        Ok(snapshot)
    }

    /// The committed value of an option.
    ///
    /// # Panics
    ///
    /// Panics if `key` was issued by a different schema.
    pub fn get<U: Clone + 'static>(&self, key: &OptionKey<U>) -> U {
        self.current.load().get(key).clone()
    }

    /// The committed configuration as a whole.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Register a callback to run after every successful commit.
    ///
    /// Callbacks accumulate for the lifetime of the context and run
    /// synchronously, in registration order, on the parsing thread.
    pub fn on_commit<F>(&self, callback: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// A commented TOML config file holding every file option's default.
    pub fn template(&self) -> String {
        self.schema.template()
    }

    fn discover(&self) -> Result<FileLayer, ConfigError> {
        let Some(d) = &self.discovery else {
            return Ok(FileLayer::default());
        };
        match file::discover(&d.search_paths, &d.file_name, &d.app_name)? {
            Some((path, content)) => file::parse(&path, &content, &self.schema),
            None => Ok(FileLayer::default()),
        }
    }

    fn commit(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        tracing::debug!(options = self.schema.len(), "committed configuration");
        snapshot
    }

    fn notify(&self, snapshot: &Snapshot) {
        // Run outside the lock so callbacks may register further callbacks.
        let callbacks: Vec<Callback> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        tracing::debug!(count = callbacks.len(), "running commit callbacks");
        for callback in &callbacks {
            callback(snapshot);
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app", &self.app)
            .field("current", &self.current.load_full())
            .finish_non_exhaustive()
    }
}
