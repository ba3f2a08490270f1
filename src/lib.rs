//! # prefix-tags
//!
//! Answers "which tags apply to this address?" over a set of possibly
//! overlapping `(prefix, tag)` entries.
//!
//! Unlike a routing table, every registered prefix that contains the address
//! contributes its tags, not only the most specific one. A lookup walks at most
//! `BITS` levels of a binary trie, so its cost does not depend on how many
//! prefixes are stored.
//!
//! ## Example
//!
//! ```rust
//! use prefix_tags::{parse_ipv4, Prefix, PrefixTagIndex};
//!
//! let entries = [
//!     ("192.0.2.0/24", "foo"),
//!     ("192.0.2.8/29", "bar"),
//!     ("10.20.0.0/16", "bar"),
//!     ("10.20.30.40/32", "SPAM"),
//! ];
//! let index = PrefixTagIndex::build(
//!     entries
//!         .iter()
//!         .map(|(net, tag)| (net.parse::<Prefix<u32>>().unwrap(), *tag)),
//! )
//! .unwrap();
//!
//! assert_eq!(index.lookup(parse_ipv4("192.0.2.9").unwrap()), ["bar", "foo"]);
//! assert_eq!(index.lookup(parse_ipv4("10.20.30.40").unwrap()), ["SPAM", "bar"]);
//! assert!(index.lookup(parse_ipv4("10.120.30.40").unwrap()).is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod address;
mod error;
mod parse;
mod prefix;

pub use address::Address;
pub use error::{Error, ErrorKind, Result};
pub use parse::parse_ipv4;
pub use prefix::Prefix;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::validate_tag;

// =============================================================================
// Node arena
// =============================================================================

/// Index of a node in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Ref(u32);

impl Ref {
    const NULL: Ref = Ref(u32::MAX);
    const ROOT: Ref = Ref(0);

    #[inline]
    fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    fn idx(self) -> usize {
        debug_assert!(!self.is_null());
        self.0 as usize
    }
}

/// Sentinel for a pure branch node.
const NO_TAGS: u32 = u32::MAX;

/// Tag ids attached to one node. Most prefixes carry one or two tags.
type TagIds = SmallVec<[u32; 2]>;

/// Trie node: children by next bit, plus an optional tag set.
#[derive(Clone, Copy, Debug)]
struct Node {
    children: [Ref; 2],
    /// Index into `tag_sets`, or `NO_TAGS`.
    tags: u32,
}

impl Node {
    const EMPTY: Node = Node {
        children: [Ref::NULL, Ref::NULL],
        tags: NO_TAGS,
    };

    #[inline]
    fn has_tags(&self) -> bool {
        self.tags != NO_TAGS
    }
}

// =============================================================================
// Build phase
// =============================================================================

/// Accumulates `(prefix, tag)` entries and produces an immutable
/// [`PrefixTagIndex`].
///
/// Every entry is validated before it touches the trie, so a rejected entry
/// leaves the builder exactly as it was.
pub struct IndexBuilder<A: Address = u32> {
    nodes: Vec<Node>,
    tag_sets: Vec<TagIds>,
    /// Tag strings in first-seen order; ids index into this.
    tags: Vec<Box<str>>,
    interner: HashMap<Box<str>, u32>,
    /// `(tag set, tag id)` pairs already stored.
    seen: HashSet<(u32, u32)>,
    entries: usize,
    _addr: PhantomData<A>,
}

impl<A: Address> IndexBuilder<A> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a builder sized for roughly `entries` entries.
    pub fn with_capacity(entries: usize) -> Self {
        let mut nodes = Vec::with_capacity(entries.saturating_mul(2).max(1));
        nodes.push(Node::EMPTY);
        Self {
            nodes,
            tag_sets: Vec::with_capacity(entries),
            tags: Vec::new(),
            interner: HashMap::new(),
            seen: HashSet::with_capacity(entries),
            entries: 0,
            _addr: PhantomData,
        }
    }

    /// Attaches `tag` to `prefix`.
    ///
    /// Returns `false` if the pair was already present, in which case nothing
    /// changes.
    pub fn insert(&mut self, prefix: Prefix<A>, tag: &str) -> Result<bool> {
        validate_tag(tag)?;

        let node = self.descend_or_create(prefix);
        let id = self.intern(tag);
        let mut set_idx = self.nodes[node].tags;
        if set_idx == NO_TAGS {
            set_idx = arena_index(self.tag_sets.len());
            self.tag_sets.push(TagIds::new());
            self.nodes[node].tags = set_idx;
        }
        if !self.seen.insert((set_idx, id)) {
            return Ok(false);
        }
        self.tag_sets[set_idx as usize].push(id);
        self.entries += 1;
        Ok(true)
    }

    /// Like [`insert`](Self::insert), for prefixes given as raw values.
    pub fn insert_raw(&mut self, addr: u128, len: u32, tag: &str) -> Result<bool> {
        let prefix = Prefix::from_raw(addr, len)?;
        self.insert(prefix, tag)
    }

    /// Number of distinct `(prefix, tag)` pairs inserted so far.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Freezes the trie.
    ///
    /// Tag ids are renumbered so that id order matches lexicographic tag
    /// order; lookups can then sort ids instead of strings.
    pub fn finish(mut self) -> PrefixTagIndex<A> {
        let mut order: Vec<u32> = (0..arena_index(self.tags.len())).collect();
        order.sort_unstable_by(|&a, &b| self.tags[a as usize].cmp(&self.tags[b as usize]));

        let mut remap = vec![0u32; order.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id as usize] = new_id as u32;
        }
        let tags: Box<[Box<str>]> = order
            .iter()
            .map(|&old_id| mem::take(&mut self.tags[old_id as usize]))
            .collect();

        for set in &mut self.tag_sets {
            for id in set.iter_mut() {
                *id = remap[*id as usize];
            }
            set.sort_unstable();
            set.shrink_to_fit();
        }

        debug!(
            entries = self.entries,
            prefixes = self.tag_sets.len(),
            nodes = self.nodes.len(),
            tags = tags.len(),
            "prefix tag index built"
        );

        PrefixTagIndex {
            nodes: self.nodes.into_boxed_slice(),
            tag_sets: self.tag_sets.into_boxed_slice(),
            tags,
            entries: self.entries,
            _addr: PhantomData,
        }
    }

    /// Walks the top `prefix.len()` bits, creating missing nodes.
    fn descend_or_create(&mut self, prefix: Prefix<A>) -> usize {
        let mut cur = Ref::ROOT;
        for depth in 0..prefix.len() {
            let bit = prefix.addr().bit(depth) as usize;
            let next = self.nodes[cur.idx()].children[bit];
            cur = if next.is_null() {
                let child = Ref(arena_index(self.nodes.len()));
                self.nodes.push(Node::EMPTY);
                self.nodes[cur.idx()].children[bit] = child;
                child
            } else {
                next
            };
        }
        cur.idx()
    }

    fn intern(&mut self, tag: &str) -> u32 {
        if let Some(&id) = self.interner.get(tag) {
            return id;
        }
        let id = arena_index(self.tags.len());
        self.tags.push(tag.into());
        self.interner.insert(tag.into(), id);
        id
    }
}

impl<A: Address> Default for IndexBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an arena length to the next `u32` index.
#[inline]
fn arena_index(len: usize) -> u32 {
    assert!(len < NO_TAGS as usize, "prefix tag arena exhausted");
    len as u32
}

// =============================================================================
// Immutable index
// =============================================================================

/// Read-only binary trie mapping addresses to the tags of every registered
/// prefix that contains them.
///
/// The index is `Send + Sync` and never mutated after construction, so any
/// number of threads may query it at once. To change the data, build a new
/// index and swap it in.
#[derive(Clone)]
pub struct PrefixTagIndex<A: Address = u32> {
    /// Node 0 is the root (prefix length 0).
    nodes: Box<[Node]>,
    /// Sorted tag ids per registered prefix.
    tag_sets: Box<[TagIds]>,
    /// Tag table, sorted lexicographically.
    tags: Box<[Box<str>]>,
    entries: usize,
    _addr: PhantomData<A>,
}

/// One registered prefix containing a looked-up address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match<'a, A: Address> {
    pub prefix: Prefix<A>,
    /// Tags of this prefix alone, sorted.
    pub tags: Vec<&'a str>,
}

impl<A: Address> PrefixTagIndex<A> {
    /// Builds an index from `(prefix, tag)` entries.
    ///
    /// Fails on the first invalid entry; no index is produced in that case.
    pub fn build<I, T>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Prefix<A>, T)>,
        T: AsRef<str>,
    {
        let entries = entries.into_iter();
        let mut builder = IndexBuilder::with_capacity(entries.size_hint().0);
        for (prefix, tag) in entries {
            builder.insert(prefix, tag.as_ref())?;
        }
        Ok(builder.finish())
    }

    /// Returns the tags of every registered prefix containing `addr`,
    /// deduplicated and sorted lexicographically.
    ///
    /// An empty result means no registered prefix contains the address.
    pub fn lookup(&self, addr: A) -> Vec<&str> {
        let mut acc: SmallVec<[u32; 8]> = SmallVec::new();
        for (_, node) in self.path(addr) {
            if node.has_tags() {
                acc.extend_from_slice(&self.tag_sets[node.tags as usize]);
            }
        }
        acc.sort_unstable();
        acc.dedup();
        acc.into_iter().map(|id| self.tag(id)).collect()
    }

    /// Like [`lookup`](Self::lookup), for a raw address value of unchecked
    /// width. Out-of-range values fail before any traversal.
    pub fn lookup_raw(&self, value: u128) -> Result<Vec<&str>> {
        let addr = A::from_u128(value).ok_or(Error::AddressOutOfRange {
            value,
            width: A::BITS,
        })?;
        Ok(self.lookup(addr))
    }

    /// Every registered prefix containing `addr`, least specific first.
    pub fn matches(&self, addr: A) -> Vec<Match<'_, A>> {
        self.path(addr)
            .filter(|(_, node)| node.has_tags())
            .map(|(depth, node)| Match {
                prefix: Prefix::from_parts(addr.mask(depth), depth),
                tags: self.tags_of(node),
            })
            .collect()
    }

    /// The most specific registered prefix containing `addr`, with its own
    /// tags. This is routing semantics; [`lookup`](Self::lookup) is usually
    /// what callers want.
    pub fn longest_match(&self, addr: A) -> Option<Match<'_, A>> {
        self.path(addr)
            .filter(|(_, node)| node.has_tags())
            .last()
            .map(|(depth, node)| Match {
                prefix: Prefix::from_parts(addr.mask(depth), depth),
                tags: self.tags_of(node),
            })
    }

    /// All registered prefixes with their tags, in address order with
    /// shorter prefixes before the longer ones they contain.
    pub fn iter(&self) -> Iter<'_, A> {
        Iter {
            index: self,
            stack: vec![(Ref::ROOT, 0, A::ZERO)],
        }
    }

    /// Number of registered prefixes.
    pub fn len(&self) -> usize {
        self.tag_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_sets.is_empty()
    }

    /// Number of distinct `(prefix, tag)` pairs.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Number of distinct tags.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_usage(&self) -> usize {
        let nodes = self.nodes.len() * mem::size_of::<Node>();
        let sets: usize = self
            .tag_sets
            .iter()
            .map(|s| {
                let spilled = if s.spilled() { s.capacity() * 4 } else { 0 };
                mem::size_of::<TagIds>() + spilled
            })
            .sum();
        let tags: usize = self
            .tags
            .iter()
            .map(|t| t.len() + mem::size_of::<Box<str>>())
            .sum();
        nodes + sets + tags
    }

    /// Nodes visited by a lookup of `addr`, with their depth.
    fn path(&self, addr: A) -> Path<'_, A> {
        Path {
            nodes: &self.nodes,
            addr,
            depth: 0,
            next: Ref::ROOT,
        }
    }

    #[inline]
    fn tag(&self, id: u32) -> &str {
        &self.tags[id as usize]
    }

    fn tags_of(&self, node: &Node) -> Vec<&str> {
        self.tag_sets[node.tags as usize]
            .iter()
            .map(|&id| self.tag(id))
            .collect()
    }
}

impl PrefixTagIndex<u32> {
    /// Parses a dotted-quad address and looks it up.
    pub fn lookup_str(&self, text: &str) -> Result<Vec<&str>> {
        let addr = parse_ipv4(text)?;
        Ok(self.lookup(addr))
    }
}

impl<A: Address> Default for PrefixTagIndex<A> {
    fn default() -> Self {
        IndexBuilder::new().finish()
    }
}

impl<A: Address> fmt::Debug for PrefixTagIndex<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Descent from the root along the bits of one address.
struct Path<'a, A> {
    nodes: &'a [Node],
    addr: A,
    depth: u8,
    next: Ref,
}

impl<'a, A: Address> Iterator for Path<'a, A> {
    type Item = (u8, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_null() {
            return None;
        }
        let node = &self.nodes[self.next.idx()];
        let depth = self.depth;
        self.next = if depth < A::BITS {
            node.children[self.addr.bit(depth) as usize]
        } else {
            Ref::NULL
        };
        self.depth += 1;
        Some((depth, node))
    }
}

/// Iterator over registered prefixes, returned by [`PrefixTagIndex::iter`].
pub struct Iter<'a, A: Address> {
    index: &'a PrefixTagIndex<A>,
    /// Pending nodes with their depth and (masked) address.
    stack: Vec<(Ref, u8, A)>,
}

impl<'a, A: Address> Iterator for Iter<'a, A> {
    type Item = (Prefix<A>, Vec<&'a str>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((r, depth, addr)) = self.stack.pop() {
            let node = &self.index.nodes[r.idx()];
            // Push the 1-branch first so the 0-branch is visited first.
            if !node.children[1].is_null() {
                self.stack.push((node.children[1], depth + 1, addr.with_bit(depth)));
            }
            if !node.children[0].is_null() {
                self.stack.push((node.children[0], depth + 1, addr));
            }
            if node.has_tags() {
                return Some((Prefix::from_parts(addr, depth), self.index.tags_of(node)));
            }
        }
        None
    }
}

impl<'a, A: Address> IntoIterator for &'a PrefixTagIndex<A> {
    type Item = (Prefix<A>, Vec<&'a str>);
    type IntoIter = Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod proptests;
