//! Resolution pipeline: turn parsed layers into a committed-ready snapshot.
//!
//! Operates on pre-parsed layers (`ResolveInput`) with no I/O, so the full
//! pipeline is testable with synthetic inputs. Steps:
//!
//! 1. Merge command-line and file cells per option (command line wins)
//! 2. Convert every backend cell to its user type
//! 3. Run every validator against the converted values
//!
//! Validation only starts once every option has been converted, so
//! validators always see final merged values. Nothing here touches the
//! committed state; a failure simply drops the work in progress.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::file::FileLayer;
use crate::merge::merge;
use crate::option::BackendCell;
use crate::schema::Schema;
use crate::snapshot::Snapshot;

/// Parsed layers for one resolution.
#[derive(Default)]
pub(crate) struct ResolveInput {
    /// One slot per option; `None` where the command line was silent.
    pub cli: Vec<Option<BackendCell>>,
    pub file: FileLayer,
}

pub(crate) fn resolve(schema: &Arc<Schema>, input: ResolveInput) -> Result<Snapshot, ConfigError> {
    tracing::debug!(file = ?input.file.path, "resolving configuration");
    let cells = merge(schema, input.cli, input.file.cells);

    let values = schema
        .options()
        .iter()
        .zip(&cells)
        .map(|(option, cell)| option.to_user(cell))
        .collect::<Result<Vec<_>, _>>()?;

    for (option, value) in schema.options().iter().zip(&values) {
        option.check(value.as_ref())?;
    }

    let origins = cells.iter().map(BackendCell::origin).collect();
    Ok(Snapshot::new(Arc::clone(schema), values, origins))
}
