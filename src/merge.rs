use crate::option::{BackendCell, Origin};
use crate::schema::Schema;

/// Combine the layers into one backend cell per option.
///
/// Starts from the command-line slots (defaults where an option was not
/// given), then lays file values on top of every option the command line
/// did not set explicitly. Precedence is decided per option.
pub(crate) fn merge(
    schema: &Schema,
    mut cli: Vec<Option<BackendCell>>,
    file: Vec<(usize, BackendCell)>,
) -> Vec<BackendCell> {
    cli.resize_with(schema.len(), || None);
    let mut cells: Vec<BackendCell> = schema
        .options()
        .iter()
        .zip(cli)
        .map(|(option, cell)| cell.unwrap_or_else(|| option.default_cell()))
        .collect();

    for (index, file_cell) in file {
        let Some(slot) = cells.get_mut(index) else {
            continue;
        };
        if slot.origin() == Origin::CommandLine {
            tracing::debug!(
                option = schema.options()[index].meta().name,
                "command line overrides config file"
            );
            continue;
        }
        *slot = file_cell;
    }
    cells
}
