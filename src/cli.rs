//! Command-line layer, built on [clap](https://docs.rs/clap)'s builder API.
//!
//! Every option with a command-line name becomes one clap [`Arg`] whose id
//! is the option's internal name and whose value parser is the option's
//! [`Scalar`](crate::Scalar) parser, so clap hands back typed items. Four
//! built-in flags are always registered alongside them: `--help`,
//! `--version` (only when a version string is configured), `--show-config`
//! and `--config <PATH>`. clap's own help and version handling is switched
//! off; the caller decides what to do with those requests.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::error::{ConfigError, Layer};
use crate::option::BackendCell;
use crate::schema::Schema;

pub(crate) const HELP: &str = "help";
pub(crate) const VERSION: &str = "version";
pub(crate) const SHOW_CONFIG: &str = "show-config";
pub(crate) const CONFIG: &str = "config";

/// Names claimed by the built-in flags.
pub(crate) fn is_reserved(name: &str) -> bool {
    matches!(name, HELP | VERSION | SHOW_CONFIG | CONFIG)
}

/// Program metadata shown in `--help` and `--version`.
#[derive(Debug, Clone, Default)]
pub(crate) struct AppInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub about: Option<String>,
}

/// Everything one command-line parse produced.
#[derive(Default)]
pub(crate) struct CliLayer {
    /// One slot per schema option; `None` where the option was not given.
    pub cells: Vec<Option<BackendCell>>,
    /// Rendered help text, present when `--help` was given.
    pub help: Option<String>,
    pub version: bool,
    pub show_config: bool,
    pub config_path: Option<PathBuf>,
}

pub(crate) fn command(schema: &Schema, app: &AppInfo) -> Command {
    let mut cmd = Command::new(app.name.clone().unwrap_or_else(|| "app".to_string()))
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(HELP)
                .long(HELP)
                .action(ArgAction::SetTrue)
                .help("Show this message and exit"),
        );
    if let Some(about) = &app.about {
        cmd = cmd.about(about.clone());
    }
    if let Some(version) = &app.version {
        cmd = cmd.version(version.clone()).arg(
            Arg::new(VERSION)
                .long(VERSION)
                .action(ArgAction::SetTrue)
                .help("Show version and exit"),
        );
    }
    cmd = cmd
        .arg(
            Arg::new(SHOW_CONFIG)
                .long(SHOW_CONFIG)
                .action(ArgAction::SetTrue)
                .help("Show final configuration and exit"),
        )
        .arg(
            Arg::new(CONFIG)
                .long(CONFIG)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Set)
                .help("Load options from file, command line options override ones from file"),
        );
    for option in schema.options() {
        if let Some(arg) = option.arg() {
            cmd = cmd.arg(arg);
        }
    }
    cmd
}

/// Parse `args` (program name first) against the schema's command-line
/// options.
pub(crate) fn parse<I, T>(schema: &Schema, app: &AppInfo, args: I) -> Result<CliLayer, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = command(schema, app);
    let matches = cmd
        .try_get_matches_from_mut(args)
        .map_err(|err| command_line_error(schema, err))?;

    let mut layer = CliLayer {
        version: flag(&matches, VERSION),
        show_config: flag(&matches, SHOW_CONFIG),
        config_path: matches.get_one::<PathBuf>(CONFIG).cloned(),
        ..CliLayer::default()
    };
    if flag(&matches, HELP) {
        layer.help = Some(cmd.render_help().to_string());
    }

    for option in schema.options() {
        let cell = option.cell_from_matches(&matches)?;
        if cell.is_some() {
            tracing::trace!(option = option.meta().name, "set on command line");
        }
        layer.cells.push(cell);
    }
    tracing::debug!(
        given = layer.cells.iter().filter(|c| c.is_some()).count(),
        config = ?layer.config_path,
        "parsed command line"
    );
    Ok(layer)
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    // `version` is only registered when a version string is configured.
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

/// Translate a clap error, recognising options that exist in the schema
/// but may not be set from the command line.
fn command_line_error(schema: &Schema, err: clap::Error) -> ConfigError {
    if err.kind() == ErrorKind::UnknownArgument
        && let Some(ContextValue::String(arg)) = err.get(ContextKind::InvalidArg)
        && let Some(meta) = schema.cmd_forbidden(bare_name(arg))
    {
        return ConfigError::SchemaViolation {
            option: meta.name.to_string(),
            layer: Layer::CommandLine,
        };
    }
    ConfigError::CommandLine(err)
}

/// `--cfg_only_int=10` -> `cfg_only_int`.
fn bare_name(arg: &str) -> &str {
    let arg = arg.trim_start_matches('-');
    arg.split_once('=').map_or(arg, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{self, TestKeys};
    use crate::option::Origin;

    fn parse_args(args: &[&str]) -> Result<(CliLayer, TestKeys), ConfigError> {
        let (schema, keys) = test::schema();
        let app = AppInfo {
            name: Some("test".into()),
            version: Some("version test".into()),
            about: None,
        };
        parse(&schema, &app, args).map(|layer| (layer, keys))
    }

    #[test]
    fn empty_args_give_no_cells() {
        let (layer, _) = parse_args(&["test"]).unwrap();
        assert_eq!(layer.cells.len(), 6);
        assert!(layer.cells.iter().all(Option::is_none));
        assert!(layer.help.is_none());
        assert!(!layer.version);
        assert!(!layer.show_config);
        assert!(layer.config_path.is_none());
    }

    #[test]
    fn given_options_produce_cells() {
        let (layer, keys) =
            parse_args(&["test", "--number=143", "-f1", "--power2=8", "--power2=32"]).unwrap();
        let number = layer.cells[keys.number.index].as_ref().unwrap();
        assert_eq!(number.origin(), Origin::CommandLine);
        assert!(layer.cells[keys.flag.index].is_some());
        assert!(layer.cells[keys.power2.index].is_some());
        assert!(layer.cells[keys.text.index].is_none());
    }

    #[test]
    fn bare_bool_flag_is_accepted() {
        let (layer, keys) = parse_args(&["test", "--flag"]).unwrap();
        assert!(layer.cells[keys.flag.index].is_some());
    }

    #[test]
    fn builtin_flags_are_reported() {
        let (layer, _) = parse_args(&["test", "--show-config", "--config", "app.toml"]).unwrap();
        assert!(layer.show_config);
        assert_eq!(layer.config_path, Some(PathBuf::from("app.toml")));

        let (layer, _) = parse_args(&["test", "--version"]).unwrap();
        assert!(layer.version);
    }

    #[test]
    fn help_renders_option_descriptions() {
        let (layer, _) = parse_args(&["test", "--help"]).unwrap();
        let help = layer.help.unwrap();
        assert!(help.contains("--number"));
        assert!(help.contains("Unsigned short number"));
        assert!(help.contains("--show-config"));
        assert!(!help.contains("cfg_only_int"));
    }

    #[test]
    fn version_flag_absent_without_version() {
        let (schema, _) = test::schema();
        let result = parse(&schema, &AppInfo::default(), ["test", "--version"]);
        assert!(matches!(result, Err(ConfigError::CommandLine(_))));
    }

    #[test]
    fn cfg_only_option_is_schema_violation() {
        let err = parse_args(&["test", "--cfg_only_int=10"]).err().unwrap();
        match err {
            ConfigError::SchemaViolation { option, layer } => {
                assert_eq!(option, "cfg_only_int");
                assert_eq!(layer, Layer::CommandLine);
            }
            other => panic!("Expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn unknown_option_is_command_line_error() {
        let err = parse_args(&["test", "--nope"]).err().unwrap();
        assert!(matches!(err, ConfigError::CommandLine(_)));
    }

    #[test]
    fn out_of_range_value_rejected() {
        let err = parse_args(&["test", "--number=70000"]).err().unwrap();
        assert!(matches!(err, ConfigError::CommandLine(_)));
    }

    #[test]
    fn repeated_scalar_rejected() {
        let err = parse_args(&["test", "--number=1", "--number=2"]).err().unwrap();
        assert!(matches!(err, ConfigError::CommandLine(_)));
    }

    #[test]
    fn bare_name_strips_dashes_and_value() {
        assert_eq!(bare_name("--cfg_only_int=10"), "cfg_only_int");
        assert_eq!(bare_name("--cfg_only_int"), "cfg_only_int");
        assert_eq!(bare_name("-x"), "x");
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved("help"));
        assert!(is_reserved("config"));
        assert!(!is_reserved("number"));
    }
}
