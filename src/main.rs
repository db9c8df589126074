//! StashKV - Command-Line Front End
//!
//! Runs the storage facade against a file-backed name/value store, which
//! makes it possible to inspect and edit a store from a shell. The file
//! plays the role of the browser's durable store; TTLs and the startup
//! sweep behave exactly as they would there.

use anyhow::{bail, Context as _};
use stashkv::codec;
use stashkv::{DriverKind, Storage, StorageConfig};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// A single storage operation requested on the command line
#[derive(Debug)]
enum Command {
    Get(String),
    Set {
        key: String,
        value: String,
        ttl: Option<u64>,
    },
    Has(String),
    Remove(String),
    Keys,
    Empty,
    Purge,
}

/// CLI configuration
#[derive(Debug)]
struct Config {
    /// Path of the file-backed store
    store: String,
    /// Driver preference, overriding the config file and environment
    driver: Option<DriverKind>,
    /// Optional JSON config file
    config_file: Option<String>,
    command: Command,
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> anyhow::Result<Self> {
        let mut args = std::env::args().skip(1);

        let mut store = "stashkv.json".to_string();
        let mut driver = None;
        let mut config_file = None;
        let mut ttl = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store" | "-s" => {
                    store = args.next().context("--store requires a value")?;
                }
                "--driver" | "-d" => {
                    let name = args.next().context("--driver requires a value")?;
                    driver = Some(name.parse()?);
                }
                "--config" | "-c" => {
                    config_file = Some(args.next().context("--config requires a value")?);
                }
                "--ttl" | "-t" => {
                    let secs = args.next().context("--ttl requires a value")?;
                    ttl = Some(secs.parse().context("--ttl must be a number of seconds")?);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("StashKV version {}", stashkv::VERSION);
                    std::process::exit(0);
                }
                other if other.starts_with('-') => bail!("unknown argument: {}", other),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let name = positional.next().context("missing command, see --help")?;
        let mut operand = |what: &str| positional.next().with_context(|| format!("{} requires {}", name, what));

        let command = match name.as_str() {
            "get" => Command::Get(operand("a key")?),
            "set" => Command::Set {
                key: operand("a key")?,
                value: operand("a value")?,
                ttl,
            },
            "has" => Command::Has(operand("a key")?),
            "rm" | "remove" => Command::Remove(operand("a key")?),
            "keys" => Command::Keys,
            "empty" => Command::Empty,
            "purge" => Command::Purge,
            other => bail!("unknown command: {}", other),
        };

        Ok(Self {
            store,
            driver,
            config_file,
            command,
        })
    }

    /// Storage settings: file, then environment, then command line
    fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        let base = match &self.config_file {
            Some(path) => StorageConfig::from_file(path)
                .with_context(|| format!("failed to load config file {}", path))?,
            None => StorageConfig::default(),
        };

        let mut config = base.apply_env()?;
        if let Some(driver) = self.driver {
            config.driver = driver;
        }
        Ok(config)
    }
}

fn print_help() {
    println!(
        r#"
StashKV - Unified Key/Value Storage with TTL

USAGE:
    stashkv [OPTIONS] <COMMAND>

COMMANDS:
    get <KEY>              Print the value stored under KEY
    set <KEY> <VALUE>      Store VALUE (JSON, or a plain string)
    has <KEY>              Print whether KEY holds a live entry
    rm <KEY>               Remove KEY
    keys                   List live keys
    empty                  Remove every entry
    purge                  Remove expired entries now

OPTIONS:
    -s, --store <FILE>     Store file (default: stashkv.json)
    -d, --driver <NAME>    persistent | cookie | memory | auto
    -c, --config <FILE>    JSON config file
    -t, --ttl <SECS>       Time to live for `set`
    -v, --version          Print version information
    -h, --help             Print this help message

ENVIRONMENT:
    STASHKV_LOG            Log filter (default: warn)
    STASHKV_DRIVER         Driver preference

EXAMPLES:
    stashkv set name '"Ariz"'
    stashkv set session token123 --ttl 3600
    stashkv get name
"#
    );
}

fn run(config: Config) -> anyhow::Result<()> {
    let storage_config = config.storage_config()?;

    let storage = Storage::open_file(&config.store, &storage_config)
        .with_context(|| format!("failed to open store {}", config.store))?;
    debug!(driver = %storage.driver_kind(), store = %config.store, "Storage ready");

    match config.command {
        Command::Get(key) => match storage.get(&key) {
            Some(value) => println!("{}", value),
            None => bail!("no such key: {}", key),
        },
        Command::Set { key, value, ttl } => {
            let value = codec::decode(&value).into_value();
            let stored = match ttl {
                Some(secs) => storage.set_with_ttl(&key, value, Duration::from_secs(secs)),
                None => storage.set(&key, value),
            };
            if !stored {
                bail!("failed to store {}", key);
            }
        }
        Command::Has(key) => println!("{}", storage.has(&key)),
        Command::Remove(key) => println!("{}", storage.remove(&key)),
        Command::Keys => {
            let mut keys = storage.keys();
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
        Command::Empty => println!("{}", storage.empty()),
        Command::Purge => println!("{}", storage.purge_expired()),
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STASHKV_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_args()?;
    run(config)
}
