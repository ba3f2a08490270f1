//! Knowledge base records.
//!
//! A knowledge base is a JSON array of `{"tag": ..., "ip_network": ...}`
//! objects. Records may repeat; repeats are harmless.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::time::Instant;

use prefix_tags::{IndexBuilder, Prefix, PrefixTagIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, NetworkParsing};
use crate::error::LoadError;

/// One `(network, tag)` pair as stored in the knowledge base.
///
/// Strings borrow from the input buffer unless they contain JSON escapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<'a> {
    #[serde(borrow)]
    pub tag: Cow<'a, str>,
    #[serde(borrow)]
    pub ip_network: Cow<'a, str>,
}

impl<'a> Record<'a> {
    pub fn new(ip_network: impl Into<Cow<'a, str>>, tag: impl Into<Cow<'a, str>>) -> Self {
        Self {
            tag: tag.into(),
            ip_network: ip_network.into(),
        }
    }

    fn prefix(&self, parsing: NetworkParsing) -> prefix_tags::Result<Prefix<u32>> {
        match parsing {
            NetworkParsing::Lenient => Prefix::parse_lenient(&self.ip_network),
            NetworkParsing::Strict => self.ip_network.parse(),
        }
    }
}

/// Parses a JSON knowledge base held in memory.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record<'_>>, LoadError> {
    let records: Vec<Record<'_>> = serde_json::from_slice(bytes)?;
    debug!(records = records.len(), "parsed knowledge base");
    Ok(records)
}

/// Builds an index from records, failing on the first invalid one.
pub fn build_index<'r, 'a: 'r, I>(
    records: I,
    parsing: NetworkParsing,
) -> Result<PrefixTagIndex, LoadError>
where
    I: IntoIterator<Item = &'r Record<'a>>,
{
    let records = records.into_iter();
    let mut builder = IndexBuilder::with_capacity(records.size_hint().0);
    for (index, record) in records.enumerate() {
        record
            .prefix(parsing)
            .and_then(|prefix| builder.insert(prefix, &record.tag))
            .map_err(|source| LoadError::Record {
                index,
                network: record.ip_network.to_string(),
                tag: record.tag.to_string(),
                source,
            })?;
    }
    Ok(builder.finish())
}

/// Reads, parses and indexes the knowledge base named by `config`.
pub fn load_index(config: &Config) -> Result<PrefixTagIndex, LoadError> {
    load_index_from(&config.knowledge_base, config.network_parsing)
}

/// Reads, parses and indexes the knowledge base at `path`.
pub fn load_index_from(
    path: &Path,
    parsing: NetworkParsing,
) -> Result<PrefixTagIndex, LoadError> {
    let start = Instant::now();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&bytes)?;
    let index = build_index(&records, parsing)?;
    info!(
        path = %path.display(),
        records = records.len(),
        prefixes = index.len(),
        tags = index.tag_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded knowledge base"
    );
    Ok(index)
}
