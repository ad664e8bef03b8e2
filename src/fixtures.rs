#[cfg(test)]
pub mod test {
    use crate::{Actions, Config, OptionDef, OptionKey, Schema};

    /// Keys for the fixture schema built by [`schema`].
    pub struct TestKeys {
        pub text: OptionKey<String>,
        pub number: OptionKey<u16>,
        pub flag: OptionKey<bool>,
        pub cmd_only_int: OptionKey<i32>,
        pub cfg_only_int: OptionKey<i32>,
        pub power2: OptionKey<Vec<u32>>,
    }

    pub fn is_power_of_two(values: &Vec<u32>) -> bool {
        values.iter().all(|x| x.is_power_of_two())
    }

    /// Six options covering every combination of allowed sources.
    pub fn schema() -> (Schema, TestKeys) {
        let mut b = Schema::builder();
        let keys = TestKeys {
            text: b
                .add(
                    OptionDef::scalar("text", "default text".to_string())
                        .cmd_name("text")
                        .cfg_name("common.text")
                        .description("Some text"),
                )
                .unwrap(),
            number: b
                .add(
                    OptionDef::scalar("number", 80u16)
                        .cmd_name("number")
                        .cfg_name("common.number")
                        .description("Unsigned short number"),
                )
                .unwrap(),
            flag: b
                .add(
                    OptionDef::scalar("flag", false)
                        .cmd_name("flag")
                        .short('f')
                        .cfg_name("common.flag")
                        .description("Boolean flag"),
                )
                .unwrap(),
            cmd_only_int: b
                .add(
                    OptionDef::scalar("cmd_only_int", 100i32)
                        .cmd_name("cmd-only-int")
                        .description("Can be set via command line only"),
                )
                .unwrap(),
            cfg_only_int: b
                .add(
                    OptionDef::scalar("cfg_only_int", 500i32)
                        .cfg_name("cfg_only_int")
                        .description("Can be set via config file only"),
                )
                .unwrap(),
            power2: b
                .add(
                    OptionDef::sequence("power2", Vec::<u32>::new())
                        .cmd_name("power2")
                        .cfg_name("power2.item")
                        .description("Power of 2 numbers")
                        .validate(is_power_of_two),
                )
                .unwrap(),
        };
        (b.build(), keys)
    }

    /// The fixture schema wrapped in a [`Config`] with a version string.
    pub fn config() -> (Config, TestKeys) {
        let (schema, keys) = schema();
        let config = Config::builder(schema)
            .app_name("test")
            .version("version test")
            .build()
            .unwrap();
        (config, keys)
    }

    /// Captures all action output in one string.
    #[derive(Default)]
    pub struct RecordingActions {
        pub out: String,
    }

    impl Actions for RecordingActions {
        fn help(&mut self, text: &str) {
            self.out = text.to_string();
        }

        fn version(&mut self, version: &str) {
            self.out = version.to_string();
        }

        fn show_config_begin(&mut self) {
            self.out = "# config begin\noptions:\n".to_string();
        }

        fn show_value(&mut self, name: &str, value: &str) {
            self.out.push_str(&format!(" {name}: {value}\n"));
        }

        fn show_list(&mut self, name: &str, values: &[String]) {
            self.out.push_str(&format!(" {name}:\n"));
            for value in values {
                self.out.push_str(&format!("  - {value}\n"));
            }
        }

        fn show_config_end(&mut self) {
            self.out.push_str("# config end\n");
        }
    }

    #[test]
    fn fixture_schema_builds() {
        let (schema, keys) = schema();
        assert_eq!(schema.len(), 6);
        assert_eq!(keys.power2.name(), "power2");
    }
}
