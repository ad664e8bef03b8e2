//! Option descriptors and their type-erased form.
//!
//! An [`OptionDef`] is static metadata for one option: its names, default
//! value and validator. Adding it to a [`SchemaBuilder`](crate::SchemaBuilder)
//! returns an [`OptionKey`], the typed handle used to read the committed
//! value back.
//!
//! Internally the schema stores descriptors behind the object-safe
//! [`ErasedOption`] trait so options of different types can live in one
//! ordered list. The generic implementation is the only place that knows
//! the concrete [`Adapter`]; everything else moves values around as
//! [`BackendCell`]s and [`StoredValue`]s.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use clap::{Arg, ArgAction, ArgMatches};

use crate::adapter::{Adapter, Rendered, ScalarAdapter, SequenceAdapter, SetAdapter, SetLike, Shape};
use crate::error::ConfigError;
use crate::scalar::{self, Scalar};

type Validator<U> = Box<dyn Fn(&U) -> bool + Send + Sync>;

/// Names and documentation of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMeta {
    /// Internal label; also the key used by show-config.
    pub name: &'static str,
    /// Long command-line name. `None` forbids the command line.
    pub cmd_name: Option<&'static str>,
    /// Single-letter command-line alias.
    pub short: Option<char>,
    /// Config file key, `section.key` or `key`. `None` forbids the file.
    pub cfg_name: Option<&'static str>,
    pub description: &'static str,
}

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Default,
    CommandLine,
    File,
}

/// Declarative description of one option.
///
/// ```ignore
/// let number = OptionDef::scalar("number", 80u16)
///     .cmd_name("number")
///     .short('n')
///     .cfg_name("common.number")
///     .description("Unsigned short number");
/// ```
pub struct OptionDef<A: Adapter> {
    meta: OptionMeta,
    default: A::Backend,
    validator: Option<Validator<A::User>>,
}

impl<T: Scalar> OptionDef<ScalarAdapter<T>> {
    /// A single-valued option.
    pub fn scalar(name: &'static str, default: T) -> Self {
        Self::with_default(name, default)
    }
}

impl<T: Scalar> OptionDef<SequenceAdapter<T>> {
    /// A list option; repeated occurrences accumulate in order.
    pub fn sequence(name: &'static str, default: Vec<T>) -> Self {
        Self::with_default(name, default)
    }
}

impl<C: SetLike> OptionDef<SetAdapter<C>> {
    /// A set (or counted multiset) option, collected as a list and folded
    /// into `C` after merging.
    pub fn set(name: &'static str, default: C) -> Self {
        Self::with_default(name, SetAdapter::<C>::to_backend(&default))
    }
}

impl<A: Adapter> OptionDef<A> {
    fn with_default(name: &'static str, default: A::Backend) -> Self {
        Self {
            meta: OptionMeta {
                name,
                cmd_name: None,
                short: None,
                cfg_name: None,
                description: "",
            },
            default,
            validator: None,
        }
    }

    /// Allow the option on the command line as `--<name>`.
    pub fn cmd_name(mut self, name: &'static str) -> Self {
        self.meta.cmd_name = Some(name);
        self
    }

    /// Add a `-<c>` alias. Requires a command-line name; the schema rejects a
    /// short name on its own.
    pub fn short(mut self, c: char) -> Self {
        self.meta.short = Some(c);
        self
    }

    /// Allow the option in the config file under `name` (`section.key`).
    pub fn cfg_name(mut self, name: &'static str) -> Self {
        self.meta.cfg_name = Some(name);
        self
    }

    /// Use the option's own name on the command line and in the file.
    pub fn everywhere(self) -> Self {
        let name = self.meta.name;
        self.cmd_name(name).cfg_name(name)
    }

    pub fn description(mut self, text: &'static str) -> Self {
        self.meta.description = text;
        self
    }

    /// Reject values for which `check` returns false. Runs on the final,
    /// merged value.
    pub fn validate<F>(mut self, check: F) -> Self
    where
        F: Fn(&A::User) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(check));
        self
    }

    pub fn meta(&self) -> &OptionMeta {
        &self.meta
    }
}

impl<A: Adapter> fmt::Debug for OptionDef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("meta", &self.meta)
            .field("default", &self.default)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Typed handle to an option registered in a schema.
pub struct OptionKey<U> {
    pub(crate) schema: u64,
    pub(crate) index: usize,
    pub(crate) name: &'static str,
    _marker: PhantomData<fn() -> U>,
}

impl<U> OptionKey<U> {
    pub(crate) fn new(schema: u64, index: usize, name: &'static str) -> Self {
        Self {
            schema,
            index,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<U> Clone for OptionKey<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for OptionKey<U> {}

impl<U> fmt::Debug for OptionKey<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionKey")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish()
    }
}

/// Single slot holding one option's backend value.
pub(crate) struct BackendCell {
    value: Box<dyn Any + Send + Sync>,
    origin: Origin,
}

impl BackendCell {
    fn new<T: Any + Send + Sync>(value: T, origin: Origin) -> Self {
        Self {
            value: Box::new(value),
            origin,
        }
    }

    pub(crate) fn origin(&self) -> Origin {
        self.origin
    }

    fn get<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

/// A converted user value that still knows how to render itself.
pub(crate) trait StoredValue: Send + Sync {
    fn value(&self) -> &dyn Any;
    fn render(&self) -> Rendered;
}

struct Stored<A: Adapter> {
    value: A::User,
}

impl<A: Adapter> StoredValue for Stored<A> {
    fn value(&self) -> &dyn Any {
        &self.value
    }

    fn render(&self) -> Rendered {
        A::render(&self.value)
    }
}

/// Object-safe view of an [`OptionDef`].
pub(crate) trait ErasedOption: Send + Sync {
    fn meta(&self) -> &OptionMeta;

    fn shape(&self) -> Shape;

    /// The clap argument for this option, if it has a command-line name.
    fn arg(&self) -> Option<Arg>;

    fn default_cell(&self) -> BackendCell;

    /// The default converted to the user type, unvalidated.
    fn default_value(&self) -> Box<dyn StoredValue>;

    /// Items supplied on the command line, or `None` if the option was absent.
    fn cell_from_matches(&self, matches: &ArgMatches) -> Result<Option<BackendCell>, ConfigError>;

    fn cell_from_toml(&self, value: &toml::Value) -> Result<BackendCell, String>;

    /// Build a cell from the raw texts of every occurrence of the key in an
    /// INI file, in file order.
    fn cell_from_texts(&self, texts: &[String]) -> Result<BackendCell, String>;

    fn to_user(&self, cell: &BackendCell) -> Result<Box<dyn StoredValue>, ConfigError>;

    /// Run the validator against a converted value.
    fn check(&self, value: &dyn StoredValue) -> Result<(), ConfigError>;

    /// The default as it should be written to a config file.
    fn default_toml(&self) -> toml_edit::Value;
}

impl<A: Adapter> ErasedOption for OptionDef<A> {
    fn meta(&self) -> &OptionMeta {
        &self.meta
    }

    fn shape(&self) -> Shape {
        A::SHAPE
    }

    fn arg(&self) -> Option<Arg> {
        let long = self.meta.cmd_name?;
        let mut arg = Arg::new(self.meta.name)
            .long(long)
            .help(self.meta.description)
            .value_name(A::Item::VALUE_NAME)
            .value_parser(scalar::parse_item::<A::Item>);
        if let Some(short) = self.meta.short {
            arg = arg.short(short);
        }
        let arg = match A::SHAPE {
            Shape::Scalar if A::Item::IS_FLAG => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .default_missing_value("true"),
            Shape::Scalar => arg.action(ArgAction::Set),
            Shape::Sequence | Shape::Set => arg.action(ArgAction::Append),
        };
        Some(arg)
    }

    fn default_cell(&self) -> BackendCell {
        BackendCell::new(self.default.clone(), Origin::Default)
    }

    fn default_value(&self) -> Box<dyn StoredValue> {
        Box::new(Stored::<A> {
            value: A::to_user(&self.default),
        })
    }

    fn cell_from_matches(&self, matches: &ArgMatches) -> Result<Option<BackendCell>, ConfigError> {
        if self.meta.cmd_name.is_none() {
            return Ok(None);
        }
        let values = matches
            .try_get_many::<A::Item>(self.meta.name)
            .map_err(|e| ConfigError::Internal(format!("{}: {e}", self.meta.name)))?;
        let Some(values) = values else {
            return Ok(None);
        };
        Ok(A::collect(values.cloned().collect())
            .map(|backend| BackendCell::new(backend, Origin::CommandLine)))
    }

    fn cell_from_toml(&self, value: &toml::Value) -> Result<BackendCell, String> {
        let items = match (A::SHAPE, value) {
            (Shape::Scalar, toml::Value::Array(_)) => {
                return Err("expected a single value, found an array".into());
            }
            (_, toml::Value::Array(values)) => values
                .iter()
                .map(scalar::item_from_toml::<A::Item>)
                .collect::<Result<Vec<_>, _>>()?,
            (_, value) => vec![scalar::item_from_toml::<A::Item>(value)?],
        };
        let backend = A::collect(items).ok_or_else(|| "no value given".to_string())?;
        Ok(BackendCell::new(backend, Origin::File))
    }

    fn cell_from_texts(&self, texts: &[String]) -> Result<BackendCell, String> {
        if A::SHAPE == Shape::Scalar && texts.len() > 1 {
            return Err(format!("given {} times, expected a single value", texts.len()));
        }
        let items = texts
            .iter()
            .map(|text| scalar::parse_item::<A::Item>(text))
            .collect::<Result<Vec<_>, _>>()?;
        let backend = A::collect(items).ok_or_else(|| "no value given".to_string())?;
        Ok(BackendCell::new(backend, Origin::File))
    }

    fn to_user(&self, cell: &BackendCell) -> Result<Box<dyn StoredValue>, ConfigError> {
        let backend = cell.get::<A::Backend>().ok_or_else(|| {
            ConfigError::Internal(format!("backend type mismatch for '{}'", self.meta.name))
        })?;
        Ok(Box::new(Stored::<A> {
            value: A::to_user(backend),
        }))
    }

    fn check(&self, value: &dyn StoredValue) -> Result<(), ConfigError> {
        let Some(check) = &self.validator else {
            return Ok(());
        };
        let user = value.value().downcast_ref::<A::User>().ok_or_else(|| {
            ConfigError::Internal(format!("value type mismatch for '{}'", self.meta.name))
        })?;
        if check(user) {
            Ok(())
        } else {
            Err(ConfigError::Validation {
                option: self.meta.name.to_string(),
                value: value.render().to_string(),
            })
        }
    }

    fn default_toml(&self) -> toml_edit::Value {
        let items = A::items(&self.default);
        match A::SHAPE {
            Shape::Scalar => items
                .first()
                .map(Scalar::to_toml)
                .unwrap_or_else(|| toml_edit::Value::from("")),
            Shape::Sequence | Shape::Set => {
                let array: toml_edit::Array = items.iter().map(Scalar::to_toml).collect();
                toml_edit::Value::Array(array)
            }
        }
    }
}
