//! The ordered, fixed set of options that defines one configuration.
//!
//! A [`Schema`] is assembled once through [`SchemaBuilder`]. Every name an
//! option claims (its internal name, long and short command-line names, and
//! config file key) is checked as the option is added, so ambiguous schemas
//! are rejected up front instead of resolving collisions at parse time.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::adapter::Adapter;
use crate::cli;
use crate::error::ConfigError;
use crate::option::{ErasedOption, OptionDef, OptionKey, OptionMeta};

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// Collects option definitions and hands out typed keys.
///
/// ```ignore
/// let mut schema = Schema::builder();
/// let number = schema.add(OptionDef::scalar("number", 80u16).cmd_name("number"))?;
/// let schema = schema.build();
/// ```
pub struct SchemaBuilder {
    id: u64,
    options: Vec<Box<dyn ErasedOption>>,
    names: HashSet<&'static str>,
    cmd_names: HashSet<&'static str>,
    shorts: HashSet<char>,
    cfg_names: HashMap<&'static str, usize>,
}

impl SchemaBuilder {
    fn new() -> Self {
        Self {
            id: NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed),
            options: Vec::new(),
            names: HashSet::new(),
            cmd_names: HashSet::new(),
            shorts: HashSet::new(),
            cfg_names: HashMap::new(),
        }
    }

    /// Register an option. Fails if any of its names is malformed, reserved,
    /// or already claimed by another option.
    pub fn add<A: Adapter>(
        &mut self,
        def: OptionDef<A>,
    ) -> Result<OptionKey<A::User>, ConfigError> {
        let meta = def.meta().clone();
        self.check(&meta)?;

        let index = self.options.len();
        self.names.insert(meta.name);
        if let Some(cmd) = meta.cmd_name {
            self.cmd_names.insert(cmd);
            if let Some(short) = meta.short {
                self.shorts.insert(short);
            }
        }
        if let Some(cfg) = meta.cfg_name {
            self.cfg_names.insert(cfg, index);
        }
        tracing::trace!(option = meta.name, index, "registered option");
        self.options.push(Box::new(def));
        Ok(OptionKey::new(self.id, index, meta.name))
    }

    fn check(&self, meta: &OptionMeta) -> Result<(), ConfigError> {
        check_plain_name(meta.name)?;
        if cli::is_reserved(meta.name) {
            return Err(ConfigError::ReservedName {
                name: meta.name.to_string(),
            });
        }
        if self.names.contains(meta.name) {
            return Err(duplicate("option name", meta.name));
        }

        if meta.cmd_name.is_none()
            && let Some(short) = meta.short
        {
            return Err(ConfigError::InvalidName {
                name: short.to_string(),
                reason: format!("option '{}' has a short name but no command-line name", meta.name),
            });
        }

        if let Some(cmd) = meta.cmd_name {
            check_plain_name(cmd)?;
            if cli::is_reserved(cmd) {
                return Err(ConfigError::ReservedName {
                    name: cmd.to_string(),
                });
            }
            if self.cmd_names.contains(cmd) {
                return Err(duplicate("command-line name", cmd));
            }
            if let Some(short) = meta.short {
                if !short.is_ascii_alphanumeric() {
                    return Err(ConfigError::InvalidName {
                        name: short.to_string(),
                        reason: "short names must be ASCII letters or digits".into(),
                    });
                }
                if self.shorts.contains(&short) {
                    return Err(duplicate("short name", &short.to_string()));
                }
            }
        }

        if let Some(cfg) = meta.cfg_name {
            check_cfg_name(cfg)?;
            if self.cfg_names.contains_key(cfg) {
                return Err(duplicate("config file name", cfg));
            }
            // A key cannot be both a value and a section: `a` vs `a.b`.
            if let Some(other) = self
                .cfg_names
                .keys()
                .find(|other| is_section_of(other, cfg) || is_section_of(cfg, other))
            {
                return Err(ConfigError::InvalidName {
                    name: cfg.to_string(),
                    reason: format!("overlaps with config file name '{other}'"),
                });
            }
        }
        Ok(())
    }

    pub fn build(self) -> Schema {
        Schema {
            id: self.id,
            options: self.options,
            cfg_names: self.cfg_names,
        }
    }
}

fn duplicate(kind: &'static str, name: &str) -> ConfigError {
    ConfigError::DuplicateName {
        kind,
        name: name.to_string(),
    }
}

/// True if `section` is a dotted prefix of `key` (`a` of `a.b`).
fn is_section_of(section: &str, key: &str) -> bool {
    key.strip_prefix(section)
        .is_some_and(|rest| rest.starts_with('.'))
}

fn check_plain_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.starts_with('-') {
        "must not start with '-'"
    } else if name.contains('=') {
        "must not contain '='"
    } else if name.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    })
}

fn check_cfg_name(name: &str) -> Result<(), ConfigError> {
    check_plain_name(name)?;
    if name.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidName {
            name: name.to_string(),
            reason: "dotted segments must not be empty".into(),
        });
    }
    Ok(())
}

/// An ordered set of option descriptors.
pub struct Schema {
    id: u64,
    options: Vec<Box<dyn ErasedOption>>,
    cfg_names: HashMap<&'static str, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Option metadata in registration order.
    pub fn metas(&self) -> impl Iterator<Item = &OptionMeta> {
        self.options.iter().map(|o| o.meta())
    }

    /// Generate a TOML config file holding the default of every option that
    /// may be set from a file, each preceded by its description.
    pub fn template(&self) -> String {
        crate::ops::generate_template(self)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn options(&self) -> &[Box<dyn ErasedOption>] {
        &self.options
    }

    pub(crate) fn by_cfg_name(&self, key: &str) -> Option<usize> {
        self.cfg_names.get(key).copied()
    }

    /// A command-line-forbidden option that `name` refers to, matched by its
    /// internal or file name.
    pub(crate) fn cmd_forbidden(&self, name: &str) -> Option<&OptionMeta> {
        self.metas()
            .find(|m| m.cmd_name.is_none() && (m.name == name || m.cfg_name == Some(name)))
    }

    /// A file-forbidden option that `key` refers to, matched by its internal
    /// or command-line name.
    pub(crate) fn file_forbidden(&self, key: &str) -> Option<&OptionMeta> {
        self.metas()
            .find(|m| m.cfg_name.is_none() && (m.name == key || m.cmd_name == Some(key)))
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("options", &self.metas().map(|m| m.name).collect::<Vec<_>>())
            .finish()
    }
}
