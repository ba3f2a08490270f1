//! # tagkb - tag knowledge base for `prefix-tags`
//!
//! Everything around the prefix trie that a tagging service needs:
//!
//! - **Loading**: a JSON knowledge base of `{"tag", "ip_network"}` records
//!   becomes a [`PrefixTagIndex`].
//! - **Publishing**: [`SharedIndex`] holds the current index and swaps in a
//!   freshly built one on reload; readers never see a partial build.
//! - **Reports**: the sorted tag list rendered as JSON, text or an HTML table.
//!
//! ## Example
//!
//! ```rust
//! use tagkb::{build_index, parse_records, report, NetworkParsing, SharedIndex};
//!
//! let kb = br#"[
//!     {"tag": "foo", "ip_network": "192.0.2.0/24"},
//!     {"tag": "bar", "ip_network": "192.0.2.8/29"}
//! ]"#;
//! let records = parse_records(kb).unwrap();
//! let shared = SharedIndex::new(build_index(&records, NetworkParsing::Lenient).unwrap());
//!
//! let index = shared.current();
//! let tags = index.lookup_str("192.0.2.9").unwrap();
//! assert_eq!(report::tags_json(&tags), r#"["bar","foo"]"#);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod shared;

pub use config::{Config, NetworkParsing};
pub use error::LoadError;
pub use prefix_tags::{self, PrefixTagIndex};
pub use record::{build_index, load_index, load_index_from, parse_records, Record};
pub use shared::SharedIndex;
