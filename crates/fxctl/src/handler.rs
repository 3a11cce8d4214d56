//! Command handler for fxctl

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Subcommand};
use foundationex::{
    parse_hex_color, pretty_print_json, Coordinate, FileStore, JsonCodec, KeyValueStore, RawCodec,
    RawValue, StoreExt,
};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a hex color (`#RRGGBB` or `#RRGGBBAA`) into channel fractions
    Hex {
        /// Color string, leading `#` optional
        color: String,
    },

    /// Bounding region of a radius around a coordinate
    #[command(allow_negative_numbers = true)]
    Region {
        latitude: f64,
        longitude: f64,
        /// Radius in miles
        miles: f64,
    },

    /// Pretty-print JSON from a file, or stdin when no file is given
    Pretty { file: Option<PathBuf> },

    /// Read and write the settings store under the data directory
    #[command(subcommand)]
    Defaults(DefaultsCommand),
}

#[derive(Subcommand, Debug)]
pub enum DefaultsCommand {
    /// Print the value stored under a key
    Get { key: String },

    /// Store a value under a key
    Set {
        key: String,
        #[command(flatten)]
        value: ValueArg,
    },

    /// Remove a key
    Delete { key: String },

    /// List stored keys with their kinds
    List,

    /// Rewrite the store file without superseded records
    Compact,
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct ValueArg {
    #[arg(long)]
    int: Option<i64>,
    #[arg(long)]
    bool: Option<bool>,
    #[arg(long)]
    string: Option<String>,
    /// JSON document, stored as data
    #[arg(long)]
    json: Option<String>,
}

pub struct CommandHandler {
    data: PathBuf,
}

impl CommandHandler {
    pub fn new<P: AsRef<Path>>(data: P) -> Self {
        Self {
            data: data.as_ref().to_path_buf(),
        }
    }

    /// Run one command, returning the text to print
    pub fn handle(&self, command: Command) -> Result<String> {
        match command {
            Command::Hex { color } => self.handle_hex(&color),
            Command::Region {
                latitude,
                longitude,
                miles,
            } => self.handle_region(latitude, longitude, miles),
            Command::Pretty { file } => self.handle_pretty(file.as_deref()),
            Command::Defaults(action) => self.handle_defaults(action),
        }
    }

    fn handle_hex(&self, color: &str) -> Result<String> {
        let rgba = parse_hex_color(color).with_context(|| format!("invalid color {:?}", color))?;
        Ok(serde_json::to_string(&rgba)?)
    }

    fn handle_region(&self, latitude: f64, longitude: f64, miles: f64) -> Result<String> {
        let region = Coordinate::new(latitude, longitude).region(miles);
        Ok(serde_json::to_string_pretty(&region)?)
    }

    fn handle_pretty(&self, file: Option<&Path>) -> Result<String> {
        let data = match file {
            Some(path) => {
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
            }
            None => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
        };
        Ok(pretty_print_json(&data))
    }

    fn handle_defaults(&self, action: DefaultsCommand) -> Result<String> {
        let store = FileStore::open(&self.data)
            .with_context(|| format!("failed to open store in {}", self.data.display()))?;

        let output = match action {
            DefaultsCommand::Get { key } => match store.get(&key)? {
                Some(value) => format_value(&value),
                None => "(nil)".to_string(),
            },
            DefaultsCommand::Set { key, value } => {
                let written = set_value(&store, &key, value)?;
                if written {
                    "OK".to_string()
                } else {
                    "(unchanged)".to_string()
                }
            }
            DefaultsCommand::Delete { key } => {
                let existed = store.get(&key)?.is_some();
                store.remove(&key)?;
                let removed = if existed { "1" } else { "0" };
                removed.to_string()
            }
            DefaultsCommand::List => {
                let mut lines = Vec::new();
                for key in store.keys()? {
                    if let Some(value) = store.get(&key)? {
                        lines.push(format!("{} ({})", key, value.kind()));
                    }
                }
                lines.join("\n")
            }
            DefaultsCommand::Compact => {
                let before = store.record_count();
                store.compact()?;
                info!(before, after = store.record_count(), "compacted store");
                format!("{} -> {} records", before, store.record_count())
            }
        };

        store.close()?;
        Ok(output)
    }
}

fn set_value(store: &FileStore, key: &str, value: ValueArg) -> Result<bool> {
    let written = if let Some(int) = value.int {
        store.encode(key, &int, &RawCodec)?
    } else if let Some(flag) = value.bool {
        store.encode(key, &flag, &RawCodec)?
    } else if let Some(string) = value.string {
        store.encode(key, &string, &RawCodec)?
    } else if let Some(json) = value.json {
        let document: serde_json::Value =
            serde_json::from_str(&json).context("--json is not valid JSON")?;
        store.encode(key, &document, &JsonCodec)?
    } else {
        false
    };
    Ok(written)
}

fn format_value(value: &RawValue) -> String {
    match value {
        RawValue::Int(n) => n.to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::String(s) => format!("{:?}", s),
        RawValue::Data(bytes) => match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(_) => pretty_print_json(bytes),
            Err(_) => format!("<{} bytes>", bytes.len()),
        },
    }
}
