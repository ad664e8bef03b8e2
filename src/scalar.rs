//! Element types an option can hold.
//!
//! Every option, whatever its shape, is built from [`Scalar`] items: a
//! `u16` port is one item, a `Vec<String>` is a list of them, a
//! `BTreeSet<u32>` is a list of them folded into a set. The trait is the
//! single place where text (from the command line or a config file) becomes
//! a typed value and where a typed value becomes text again.

use std::cmp::Reverse;
use std::fmt;
use std::path::PathBuf;

/// A single option value that can be parsed from and rendered to text.
///
/// Implement this for your own types (typically small enums) to use them as
/// option values:
///
/// ```ignore
/// impl Scalar for Color {
///     const VALUE_NAME: &'static str = "COLOR";
///
///     fn parse_text(text: &str) -> Result<Self, String> {
///         match text.to_ascii_lowercase().as_str() {
///             "red" => Ok(Color::Red),
///             "green" => Ok(Color::Green),
///             other => Err(format!("unknown color '{other}'")),
///         }
///     }
///
///     fn render(&self) -> String {
///         format!("{self:?}").to_uppercase()
///     }
/// }
/// ```
pub trait Scalar: Clone + fmt::Debug + Send + Sync + 'static {
    /// Placeholder shown for the value in `--help` output.
    const VALUE_NAME: &'static str = "VALUE";

    /// Whether a bare `--flag` (no value) means "true".
    const IS_FLAG: bool = false;

    fn parse_text(text: &str) -> Result<Self, String>;

    fn render(&self) -> String;

    /// The value as it should appear in a generated config file.
    fn to_toml(&self) -> toml_edit::Value {
        toml_edit::Value::from(self.render())
    }
}

/// Parse a boolean from common string representations.
pub fn parse_bool(text: &str) -> Result<bool, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!(
            "invalid boolean: '{text}' (expected true/false, yes/no, on/off, 1/0)"
        )),
    }
}

impl Scalar for bool {
    const VALUE_NAME: &'static str = "BOOL";
    const IS_FLAG: bool = true;

    fn parse_text(text: &str) -> Result<Self, String> {
        parse_bool(text)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn to_toml(&self) -> toml_edit::Value {
        toml_edit::Value::from(*self)
    }
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const VALUE_NAME: &'static str = "NUM";

                fn parse_text(text: &str) -> Result<Self, String> {
                    text.trim()
                        .parse::<$ty>()
                        .map_err(|e| format!("invalid {}: '{text}' ({e})", stringify!($ty)))
                }

                fn render(&self) -> String {
                    self.to_string()
                }

                fn to_toml(&self) -> toml_edit::Value {
                    // Values beyond i64 are written as strings; the loader
                    // parses strings with `parse_text`, so they still round-trip.
                    i64::try_from(*self)
                        .map(toml_edit::Value::from)
                        .unwrap_or_else(|_| toml_edit::Value::from(self.to_string()))
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const VALUE_NAME: &'static str = "NUM";

                fn parse_text(text: &str) -> Result<Self, String> {
                    text.trim()
                        .parse::<$ty>()
                        .map_err(|e| format!("invalid {}: '{text}' ({e})", stringify!($ty)))
                }

                fn render(&self) -> String {
                    self.to_string()
                }

                fn to_toml(&self) -> toml_edit::Value {
                    toml_edit::Value::from(f64::from(*self))
                }
            }
        )*
    };
}

float_scalar!(f32, f64);

impl Scalar for String {
    const VALUE_NAME: &'static str = "TEXT";

    fn parse_text(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl Scalar for char {
    const VALUE_NAME: &'static str = "CHAR";

    fn parse_text(text: &str) -> Result<Self, String> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("expected a single character, got '{text}'")),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Scalar for PathBuf {
    const VALUE_NAME: &'static str = "PATH";

    fn parse_text(text: &str) -> Result<Self, String> {
        if text.is_empty() {
            return Err("path must not be empty".into());
        }
        Ok(PathBuf::from(text))
    }

    fn render(&self) -> String {
        self.display().to_string()
    }
}

/// Reverses the ordering of the wrapped value, so `BTreeSet<Reverse<u32>>`
/// iterates from largest to smallest.
impl<T: Scalar> Scalar for Reverse<T> {
    const VALUE_NAME: &'static str = T::VALUE_NAME;
    const IS_FLAG: bool = T::IS_FLAG;

    fn parse_text(text: &str) -> Result<Self, String> {
        T::parse_text(text).map(Reverse)
    }

    fn render(&self) -> String {
        self.0.render()
    }

    fn to_toml(&self) -> toml_edit::Value {
        self.0.to_toml()
    }
}

/// Adapter usable as a clap `value_parser`.
pub(crate) fn parse_item<T: Scalar>(text: &str) -> Result<T, String> {
    T::parse_text(text)
}

/// Parse one item from a TOML value.
///
/// Strings go through [`Scalar::parse_text`] directly; numbers, booleans and
/// datetimes are rendered to text first, so `flag = 1`, `flag = "on"` and
/// `flag = true` are all accepted for a boolean option.
pub(crate) fn item_from_toml<T: Scalar>(value: &toml::Value) -> Result<T, String> {
    match value {
        toml::Value::String(s) => T::parse_text(s),
        toml::Value::Integer(i) => T::parse_text(&i.to_string()),
        toml::Value::Float(f) => T::parse_text(&f.to_string()),
        toml::Value::Boolean(b) => T::parse_text(&b.to_string()),
        toml::Value::Datetime(d) => T::parse_text(&d.to_string()),
        toml::Value::Array(_) => Err("nested arrays are not supported".into()),
        toml::Value::Table(_) => Err("expected a value, found a table".into()),
    }
}
