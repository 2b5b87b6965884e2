use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const DEFAULT_LISTING_URL: &str = "https://pokeapi.co/api/v2/pokemon/";
const DEFAULT_CONFIG_FILE: &str = "pokefilter";

/// Run settings, layered: built-in defaults, then `pokefilter.toml`, then
/// `POKEFILTER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub listing_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub cache: bool,
    pub cache_dir: PathBuf,
    /// Filter table from the config file. Kept untyped so that shape errors
    /// are reported by `Filter::from_json`.
    pub filter: Option<Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            user_agent: concat!("pokefilter/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            cache: true,
            cache_dir: PathBuf::from(".pokemon_cache"),
            filter: None,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("POKEFILTER").try_parsing(true))
            .build()
            .and_then(Config::try_deserialize)
            .context("Failed to load settings")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The criteria used when nothing else is configured.
pub fn default_filter() -> Value {
    json!({
        "types": ["grass", "poison", "electric"],
        "height_range": [1, 100],
        "xp_range": [20, 200],
    })
}

/// Overlay `overrides` onto `base` key by key. Non-object inputs are replaced wholesale.
pub fn merge_filter(base: Value, overrides: Value) -> Value {
    match (base, overrides) {
        (Value::Object(mut base), Value::Object(overrides)) => {
            base.extend(overrides);
            Value::Object(base)
        }
        (_, overrides) => overrides,
    }
}

/// Build an override document from CLI flags. Empty input means "no override".
pub fn cli_overrides(types: &[String], height: Option<&[i64]>, xp: Option<&[i64]>) -> Value {
    let mut doc = Map::new();
    if !types.is_empty() {
        doc.insert("types".into(), json!(types));
    }
    if let Some(h) = height {
        doc.insert("height_range".into(), json!(h));
    }
    if let Some(x) = xp {
        doc.insert("xp_range".into(), json!(x));
    }
    Value::Object(doc)
}
