//! # optfig demo application
//!
//! A sample CLI tool that shows how an application declares its options
//! with optfig and reacts to the parse outcome. It exists purely to
//! demonstrate and manually verify optfig's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example optfig_demo -- --number 42 -f --power2 4 --power2 8
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature             | How to exercise it                                                 |
//! |---------------------|--------------------------------------------------------------------|
//! | Compiled defaults   | `cargo run --example optfig_demo`                                  |
//! | Help / version      | `cargo run --example optfig_demo -- --help` (or `--version`)       |
//! | Show config         | `cargo run --example optfig_demo -- --show-config --color blue`    |
//! | Config file         | `cargo run --example optfig_demo -- --config demo.toml`            |
//! | INI config file     | `cargo run --example optfig_demo -- --config demo.ini`             |
//! | Discovered file     | Create `optfig-demo.toml` in cwd, then run with no arguments       |
//! | Template            | `OPTFIG_DEMO_TEMPLATE=1 cargo run --example optfig_demo`           |
//! | Validation error    | `cargo run --example optfig_demo -- --power2 3`                    |
//! | Logging             | `RUST_LOG=optfig=debug cargo run --example optfig_demo`            |

mod config;

use std::process::ExitCode;

use optfig::{Actions, Config, ConfigError, Outcome, SearchPath};
use tracing_subscriber::EnvFilter;

use config::DemoKeys;

/// Decorates the default stdout output with banners.
struct DemoActions;

impl Actions for DemoActions {
    fn help(&mut self, text: &str) {
        println!("********\n* HELP *\n********");
        print!("{text}");
    }

    fn version(&mut self, version: &str) {
        println!("***********\n* VERSION *\n***********");
        println!("{version}");
    }

    fn show_config_begin(&mut self) {
        println!("***********\n* OPTIONS *\n***********");
        println!("# config begin");
        println!("options:");
    }
}

fn run() -> Result<(), ConfigError> {
    let (schema, keys) = config::schema()?;
    let config = Config::builder(schema)
        .app_name("optfig-demo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("optfig demo: a sample CLI app for showcasing optfig")
        .search_paths(vec![
            SearchPath::Platform,
            SearchPath::Home(".optfig-demo"),
            SearchPath::Cwd,
        ])
        .build()?;

    if std::env::var_os("OPTFIG_DEMO_TEMPLATE").is_some() {
        print!("{}", config.template());
        return Ok(());
    }

    let number = keys.number;
    config.on_commit(move |snapshot| {
        tracing::info!(number = snapshot.get(&number), "configuration committed");
    });

    match config.parse_args_with(std::env::args_os(), &mut DemoActions)? {
        Outcome::Committed(_) => {
            println!("Config was successfully parsed");
            print_values(&config, &keys);
        }
        Outcome::Handled(handled) => tracing::debug!(?handled, "built-in flag handled"),
    }
    Ok(())
}

fn print_values(config: &Config, keys: &DemoKeys) {
    let power2: Vec<String> = config
        .get(&keys.power2)
        .into_iter()
        .map(|r| r.0.to_string())
        .collect();
    println!("text   = {}", config.get(&keys.text));
    println!("number = {}", config.get(&keys.number));
    println!("flag   = {}", config.get(&keys.flag));
    println!("power2 = {}", power2.join(" "));
    println!("color  = {:?}", config.get(&keys.color));
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("config error: {e}");
            ExitCode::FAILURE
        }
    }
}
