//! Option schema for the optfig demo application.
//!
//! | Option   | Command line        | Config file     | Type                         |
//! |----------|---------------------|-----------------|------------------------------|
//! | `text`   | `--text`, `-t`      | `common.text`   | `String`                     |
//! | `number` | `--number`, `-n`    | `common.number` | `u16`                        |
//! | `flag`   | `--flag`, `-f`      | `common.flag`   | `bool`                       |
//! | `power2` | `--power2`          | `power2.item`   | `BTreeSet<Reverse<u32>>`     |
//! | `color`  | `--color`           | `common.color`  | [`Color`]                    |

use std::cmp::Reverse;
use std::collections::BTreeSet;

use optfig::{ConfigError, OptionDef, OptionKey, Scalar, Schema};

/// RGB color, parsed case-insensitively and shown in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Scalar for Color {
    const VALUE_NAME: &'static str = "COLOR";

    fn parse_text(text: &str) -> Result<Self, String> {
        match text.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            other => Err(format!("unknown color '{other}' (expected red, green or blue)")),
        }
    }

    fn render(&self) -> String {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
        }
        .to_string()
    }
}

pub type Power2 = BTreeSet<Reverse<u32>>;

pub struct DemoKeys {
    pub text: OptionKey<String>,
    pub number: OptionKey<u16>,
    pub flag: OptionKey<bool>,
    pub power2: OptionKey<Power2>,
    pub color: OptionKey<Color>,
}

pub fn schema() -> Result<(Schema, DemoKeys), ConfigError> {
    let mut b = Schema::builder();
    let keys = DemoKeys {
        text: b.add(
            OptionDef::scalar("text", "default text".to_string())
                .cmd_name("text")
                .short('t')
                .cfg_name("common.text")
                .description("Some text"),
        )?,
        number: b.add(
            OptionDef::scalar("number", 80u16)
                .cmd_name("number")
                .short('n')
                .cfg_name("common.number")
                .description("Unsigned short number"),
        )?,
        flag: b.add(
            OptionDef::scalar("flag", false)
                .cmd_name("flag")
                .short('f')
                .cfg_name("common.flag")
                .description("Boolean flag"),
        )?,
        power2: b.add(
            OptionDef::set("power2", Power2::from([Reverse(32), Reverse(64), Reverse(128)]))
                .cmd_name("power2")
                .cfg_name("power2.item")
                .description("Power of 2 numbers")
                .validate(|set: &Power2| set.iter().all(|Reverse(x)| x.is_power_of_two())),
        )?,
        color: b.add(
            OptionDef::scalar("color", Color::Red)
                .cmd_name("color")
                .cfg_name("common.color")
                .description("RGB color (red|green|blue)"),
        )?,
    };
    Ok((b.build(), keys))
}
