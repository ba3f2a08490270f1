//! Loader configuration.
//!
//! Defaults can be overridden through environment variables:
//!
//! - `IP_TAGS_KNOWLEDGE_BASE`: path of the JSON knowledge base
//! - `IP_TAGS_STRICT`: `1`/`true` to reject networks with host bits set

use std::path::PathBuf;

/// Environment variable naming the knowledge base file.
pub const ENV_KNOWLEDGE_BASE: &str = "IP_TAGS_KNOWLEDGE_BASE";

/// Environment variable enabling strict network parsing.
pub const ENV_STRICT: &str = "IP_TAGS_STRICT";

const DEFAULT_KNOWLEDGE_BASE: &str = "knowledge_base.json";

/// How `ip_network` strings are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkParsing {
    /// Host bits below the mask are cleared (`10.0.0.1/24` is `10.0.0.0/24`).
    #[default]
    Lenient,
    /// Host bits below the mask are an error.
    Strict,
}

/// Configuration for loading a knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the JSON knowledge base
    pub knowledge_base: PathBuf,
    /// Network parsing mode
    pub network_parsing: NetworkParsing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            knowledge_base: PathBuf::from(DEFAULT_KNOWLEDGE_BASE),
            network_parsing: NetworkParsing::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_KNOWLEDGE_BASE).filter(|p| !p.is_empty()) {
            config.knowledge_base = PathBuf::from(path);
        }
        if let Some(strict) = lookup(ENV_STRICT) {
            if matches!(strict.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
                config.network_parsing = NetworkParsing::Strict;
            }
        }
        config
    }
}
