//! Built-in flag handling and template generation.
//!
//! `--help`, `--version` and `--show-config` are routed to an [`Actions`]
//! sink. The default method bodies print to stdout; override any of them to
//! capture or restyle the output.

use std::fmt;

use crate::adapter::Rendered;
use crate::schema::Schema;
use crate::snapshot::Snapshot;

/// Receives help, version and show-config requests.
///
/// Show-config is delivered as a sequence: `show_config_begin`, then one
/// `show_value` (scalars) or `show_list` (sequences and sets) per option in
/// schema order, then `show_config_end`.
pub trait Actions {
    fn help(&mut self, text: &str) {
        print!("{text}");
    }

    fn version(&mut self, version: &str) {
        println!("{version}");
    }

    fn show_config_begin(&mut self) {
        println!("# config begin");
        println!("options:");
    }

    fn show_value(&mut self, name: &str, value: &str) {
        println!(" {name}: {value}");
    }

    fn show_list(&mut self, name: &str, values: &[String]) {
        println!(" {name}:");
        for value in values {
            println!("  - {value}");
        }
    }

    fn show_config_end(&mut self) {
        println!("# config end");
    }
}

/// Prints everything to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutActions;

impl Actions for StdoutActions {}

pub(crate) fn show_config(snapshot: &Snapshot, actions: &mut dyn Actions) {
    actions.show_config_begin();
    for (name, value) in snapshot.entries() {
        match value {
            Rendered::Plain(text) => actions.show_value(name, &text),
            Rendered::List(items) => actions.show_list(name, &items),
        }
    }
    actions.show_config_end();
}

/// Generate a commented TOML file holding the default of every file-enabled
/// option. Top-level keys come first, then one `[section]` per distinct
/// section in order of first appearance.
pub(crate) fn generate_template(schema: &Schema) -> String {
    let mut top = Vec::new();
    let mut sections: Vec<(&str, Vec<(usize, &str)>)> = Vec::new();
    for (index, meta) in schema.metas().enumerate() {
        let Some(cfg) = meta.cfg_name else { continue };
        match cfg.rsplit_once('.') {
            None => top.push((index, cfg)),
            Some((section, leaf)) => match sections.iter_mut().find(|(s, _)| *s == section) {
                Some((_, entries)) => entries.push((index, leaf)),
                None => sections.push((section, vec![(index, leaf)])),
            },
        }
    }
    Template {
        schema,
        top,
        sections,
    }
    .to_string()
}

/// File-enabled options grouped the way they are written out.
struct Template<'a> {
    schema: &'a Schema,
    top: Vec<(usize, &'a str)>,
    sections: Vec<(&'a str, Vec<(usize, &'a str)>)>,
}

impl Template<'_> {
    fn write_entries(&self, f: &mut fmt::Formatter<'_>, entries: &[(usize, &str)]) -> fmt::Result {
        for &(index, leaf) in entries {
            let option = &self.schema.options()[index];
            for line in option.meta().description.lines() {
                writeln!(f, "# {line}")?;
            }
            writeln!(f, "{} = {}", toml_edit::Key::new(leaf), option.default_toml())?;
        }
        Ok(())
    }
}

impl fmt::Display for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_entries(f, &self.top)?;
        for (i, (section, entries)) in self.sections.iter().enumerate() {
            if i > 0 || !self.top.is_empty() {
                writeln!(f)?;
            }
            let header: Vec<String> = section
                .split('.')
                .map(|segment| toml_edit::Key::new(segment).to_string())
                .collect();
            writeln!(f, "[{}]", header.join("."))?;
            self.write_entries(f, entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file;
    use crate::fixtures::test::{self, RecordingActions};
    use crate::resolve::{ResolveInput, resolve};
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn show_config_renders_scalars_and_lists() {
        let (schema, _) = test::schema();
        let schema = Arc::new(schema);
        let content = "[power2]\nitem = [4, 8]\n";
        let snapshot = resolve(
            &schema,
            ResolveInput {
                file: file::parse(Path::new("t.toml"), content, &schema).unwrap(),
                ..ResolveInput::default()
            },
        )
        .unwrap();

        let mut actions = RecordingActions::default();
        show_config(&snapshot, &mut actions);
        assert_eq!(
            actions.out,
            "# config begin\noptions:\n\
             \x20text: default text\n\
             \x20number: 80\n\
             \x20flag: false\n\
             \x20cmd_only_int: 100\n\
             \x20cfg_only_int: 500\n\
             \x20power2:\n\
             \x20 - 4\n\
             \x20 - 8\n\
             # config end\n"
        );
    }

    #[test]
    fn template_lists_file_options_by_section() {
        let (schema, _) = test::schema();
        let template = generate_template(&schema);
        assert_eq!(
            template,
            "# Can be set via config file only\n\
             cfg_only_int = 500\n\
             \n\
             [common]\n\
             # Some text\n\
             text = \"default text\"\n\
             # Unsigned short number\n\
             number = 80\n\
             # Boolean flag\n\
             flag = false\n\
             \n\
             [power2]\n\
             # Power of 2 numbers\n\
             item = []\n"
        );
    }

    #[test]
    fn template_omits_cmd_only_options() {
        let (schema, _) = test::schema();
        let template = generate_template(&schema);
        assert!(!template.contains("cmd-only-int"));
        assert!(!template.contains("cmd_only_int"));
    }

    #[test]
    fn template_reloads_to_defaults() {
        let (schema, keys) = test::schema();
        let schema = Arc::new(schema);
        let template = generate_template(&schema);
        let layer = file::parse(Path::new("template.toml"), &template, &schema).unwrap();
        assert_eq!(layer.cells.len(), 5);
        let snapshot = resolve(
            &schema,
            ResolveInput {
                file: layer,
                ..ResolveInput::default()
            },
        )
        .unwrap();
        assert_eq!(snapshot.get(&keys.text), "default text");
        assert_eq!(*snapshot.get(&keys.number), 80);
        assert_eq!(*snapshot.get(&keys.cfg_only_int), 500);
        assert!(snapshot.get(&keys.power2).is_empty());
    }

    #[test]
    fn template_quotes_keys_that_need_it() {
        let mut b = Schema::builder();
        b.add(crate::OptionDef::scalar("odd", 1u8).cfg_name("limits.c++"))
            .unwrap();
        let schema = b.build();
        let template = generate_template(&schema);
        assert!(template.contains("[limits]\n\"c++\" = 1\n"));
        let layer = file::parse(Path::new("t.toml"), &template, &schema).unwrap();
        assert_eq!(layer.cells.len(), 1);
    }
}
