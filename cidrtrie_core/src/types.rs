//! Data structures for the prefix trie

use crate::arena::{Arena, Link};
use crate::constants::ADDRESS_BYTES;

/// Longest-prefix-match trie keyed by fixed-width big-endian addresses.
///
/// Not internally synchronized: mutation takes `&mut self`, so sharing a tree
/// across threads needs an external lock.
pub struct PrefixTree<V> {
    pub(crate) arena: Arena<V>,
    pub(crate) root: Link, // never recycled
    pub(crate) len: usize, // nodes carrying a value
}

/// Normalized prefix: a canonical 16-byte address plus a contiguous mask.
///
/// IPv4 input is embedded as an IPv4-mapped IPv6 address (`::ffff:a.b.c.d`)
/// so both families share one trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    pub addr: [u8; ADDRESS_BYTES],
    pub mask: [u8; ADDRESS_BYTES],
}

/// Snapshot of allocator usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Chunks grown so far.
    pub chunks: usize,
    /// Slots reserved across all chunks.
    pub capacity: usize,
    /// High-water mark of slots ever handed out.
    pub slots_used: usize,
    /// Slots waiting on the free list.
    pub free: usize,
    /// Nodes currently linked into the tree, root included.
    pub live: usize,
}
