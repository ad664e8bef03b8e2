use std::path::PathBuf;
use std::sync::Arc;

use crate::snapshot::Snapshot;

/// Where to look for a config file when `--config` is not given.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}

/// What a successful parse call did.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A new configuration was committed and callbacks have run.
    Committed(Arc<Snapshot>),
    /// A built-in flag was handled through the [`Actions`](crate::Actions) sink.
    Handled(Handled),
}

impl Outcome {
    /// The committed snapshot, if this parse produced one.
    pub fn committed(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Outcome::Committed(snapshot) => Some(snapshot),
            Outcome::Handled(_) => None,
        }
    }
}

/// A built-in request that short-circuited the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// `--help`: nothing was committed.
    Help,
    /// `--version`: nothing was committed.
    Version,
    /// `--show-config`: the configuration was committed and shown, but
    /// callbacks did not run.
    ShowConfig,
}
