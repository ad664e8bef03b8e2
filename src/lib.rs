//! Declarative, typed option schemas merged from the command line and a
//! config file.
//!
//! Declare each option once (its type, default, names and validator) and
//! optfig parses it from the command line, from an INI or TOML config file, or
//! both, with command-line values winning over file values and both
//! winning over compiled-in defaults.
//!
//! ```ignore
//! let mut schema = Schema::builder();
//! let number = schema.add(
//!     OptionDef::scalar("number", 80u16)
//!         .cmd_name("number")
//!         .short('n')
//!         .cfg_name("common.number")
//!         .description("Unsigned short number"),
//! )?;
//! let config = Config::builder(schema.build())
//!     .app_name("myapp")
//!     .version("1.0")
//!     .build()?;
//!
//! match config.parse_args(std::env::args_os())? {
//!     Outcome::Committed(snapshot) => println!("number = {}", snapshot.get(&number)),
//!     Outcome::Handled(_) => return Ok(()),
//! }
//! ```
//!
//! # Options
//!
//! An [`OptionDef`] has an internal name (used by show-config and error
//! messages), an optional command-line name, an optional config file name
//! and a description. Leaving out the command-line name forbids the command
//! line for that option; leaving out the config file name forbids the file.
//! Setting an option from a forbidden source is an error, not something to
//! ignore.
//!
//! Options come in three shapes ([`Shape`]):
//!
//! - **Scalar**: one [`Scalar`] value. Given twice on the command line or
//!   in an INI file it is an error.
//! - **Sequence**: a `Vec<T>`. Repeated `--item=x` flags accumulate in order;
//!   in a file the key repeats (INI) or holds an array (TOML).
//! - **Set**: any [`SetLike`] container (`BTreeSet`, `HashSet`, or counted
//!   multisets `BTreeMap<T, usize>` / `HashMap<T, usize>`). Values are
//!   collected as a list and folded into the container after merging, so
//!   the container decides deduplication and iteration order.
//!
//! [`SchemaBuilder::add`] hands back a typed [`OptionKey`] used to read the
//! value. Duplicate or reserved names are rejected when the option is added.
//!
//! # Parsing
//!
//! One parse call runs the whole pipeline:
//!
//! ```text
//! command line  ──▶ --help / --version?  ──▶ Handled, nothing committed
//!      │
//!      ▼
//! config file (--config PATH, or discovered via search paths)
//!      │
//!      ▼
//! merge per option: command line > file > default
//!      │
//!      ▼
//! convert every value, then validate every value
//!      │
//!      ▼
//! atomic commit ──▶ --show-config? ──▶ Handled (values shown)
//!      │
//!      ▼
//! callbacks, in registration order ──▶ Committed
//! ```
//!
//! Any error aborts the parse before the commit step, so the previously
//! committed configuration stays in place. Committed values live in an
//! immutable [`Snapshot`]; [`Config`] publishes each new snapshot with a
//! single atomic pointer swap, so readers on other threads never observe a
//! half-applied parse.
//!
//! # Config files
//!
//! Files are INI-style, or TOML when the file name ends in `.toml`. A
//! config file name of `section.key` addresses `key` inside `[section]`; an
//! unqualified name lives at the top level. In INI files values are
//! unquoted and a list option repeats its key once per value:
//!
//! ```ini
//! cfg_only_int=12345
//!
//! [common]
//! text=text from file
//! number=8080
//! flag=1
//!
//! [power2]
//! item=64
//! item=128
//! item=256
//! ```
//!
//! The same file in TOML writes the list as an array:
//!
//! ```toml
//! cfg_only_int = 12345
//!
//! [common]
//! text = "text from file"
//! number = 8080
//! flag = true
//!
//! [power2]
//! item = [64, 128, 256]
//! ```
//!
//! Unknown keys are errors and are reported with their line numbers.
//! [`Config::template`] writes a commented TOML file holding every default.
//!
//! # Built-in flags
//!
//! `--help`, `--show-config`, `--config <PATH>`, and `--version` (when a
//! version is configured) are always available. Their output goes to an
//! [`Actions`] sink; [`Config::parse_args`] uses [`StdoutActions`], and
//! [`Config::parse_args_with`] takes your own.
//!
//! # Logging
//!
//! optfig emits [`tracing`](https://docs.rs/tracing) events (`debug` for
//! layer loading and commits, `trace` per option). It never installs a
//! subscriber.

pub mod adapter;
pub mod error;
pub mod scalar;
pub mod types;

mod builder;
mod cli;
mod file;
mod merge;
mod ops;
mod option;
mod resolve;
mod schema;
mod snapshot;
mod validate;

#[cfg(test)]
mod fixtures;

pub use adapter::{Adapter, Rendered, SetLike, Shape};
pub use builder::{Config, ConfigBuilder};
pub use error::{ConfigError, Layer};
pub use ops::{Actions, StdoutActions};
pub use option::{OptionDef, OptionKey, OptionMeta, Origin};
pub use scalar::Scalar;
pub use schema::{Schema, SchemaBuilder};
pub use snapshot::Snapshot;
pub use types::{Handled, Outcome, SearchPath};
