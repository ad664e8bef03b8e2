//! Immutable, fully resolved configuration values.

use std::fmt;
use std::sync::Arc;

use crate::adapter::Rendered;
use crate::option::{OptionKey, Origin, StoredValue};
use crate::schema::Schema;

/// One committed configuration: a converted, validated value per option.
///
/// Snapshots are never mutated. A new parse produces a new snapshot and
/// [`Config`](crate::Config) swaps it in; readers holding an `Arc<Snapshot>`
/// keep seeing the values they started with.
pub struct Snapshot {
    schema: Arc<Schema>,
    values: Vec<Box<dyn StoredValue>>,
    origins: Vec<Origin>,
}

impl Snapshot {
    pub(crate) fn new(
        schema: Arc<Schema>,
        values: Vec<Box<dyn StoredValue>>,
        origins: Vec<Origin>,
    ) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        debug_assert_eq!(origins.len(), schema.len());
        Self {
            schema,
            values,
            origins,
        }
    }

    /// Every option at its compiled-in default.
    pub(crate) fn defaults(schema: Arc<Schema>) -> Self {
        let values = schema.options().iter().map(|o| o.default_value()).collect();
        let origins = vec![Origin::Default; schema.len()];
        Self::new(schema, values, origins)
    }

    /// The value of an option.
    ///
    /// # Panics
    ///
    /// Panics if `key` was issued by a different schema.
    pub fn get<U: 'static>(&self, key: &OptionKey<U>) -> &U {
        self.check_key(key);
        match self.values[key.index].value().downcast_ref::<U>() {
            Some(value) => value,
            None => panic!("option '{}' does not hold the requested type", key.name),
        }
    }

    /// Which input supplied the value of an option.
    ///
    /// # Panics
    ///
    /// Panics if `key` was issued by a different schema.
    pub fn origin<U>(&self, key: &OptionKey<U>) -> Origin {
        self.check_key(key);
        self.origins[key.index]
    }

    /// `(name, rendered value)` for every option, in schema order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Rendered)> + '_ {
        self.schema
            .metas()
            .zip(&self.values)
            .map(|(meta, value)| (meta.name, value.render()))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn check_key<U>(&self, key: &OptionKey<U>) {
        assert!(
            key.schema == self.schema.id(),
            "option key '{}' belongs to a different schema",
            key.name
        );
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries().map(|(name, value)| (name, value.to_string())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test;
    use crate::option::OptionDef;

    #[test]
    fn defaults_hold_every_default() {
        let (schema, keys) = test::schema();
        let snapshot = Snapshot::defaults(Arc::new(schema));
        assert_eq!(snapshot.get(&keys.text), "default text");
        assert_eq!(*snapshot.get(&keys.number), 80);
        assert!(!*snapshot.get(&keys.flag));
        assert_eq!(*snapshot.get(&keys.cmd_only_int), 100);
        assert_eq!(*snapshot.get(&keys.cfg_only_int), 500);
        assert!(snapshot.get(&keys.power2).is_empty());
        assert_eq!(snapshot.origin(&keys.number), Origin::Default);
    }

    #[test]
    fn entries_follow_schema_order() {
        let (schema, _) = test::schema();
        let snapshot = Snapshot::defaults(Arc::new(schema));
        let names: Vec<_> = snapshot.entries().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["text", "number", "flag", "cmd_only_int", "cfg_only_int", "power2"]
        );
        let (_, power2) = snapshot.entries().last().unwrap();
        assert_eq!(power2, Rendered::List(vec![]));
    }

    #[test]
    #[should_panic(expected = "different schema")]
    fn foreign_key_panics() {
        let (schema, _) = test::schema();
        let snapshot = Snapshot::defaults(Arc::new(schema));

        let mut other = Schema::builder();
        let foreign = other.add(OptionDef::scalar("text", String::new())).unwrap();
        snapshot.get(&foreign);
    }
}
