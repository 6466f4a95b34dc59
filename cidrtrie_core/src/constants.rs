//! Constants and configuration for the prefix trie

/// Canonical address width: every key is an IPv6-sized byte string.
pub const ADDRESS_BYTES: usize = 16;
pub const ADDRESS_BITS: u8 = 128;

/// IPv4 prefixes live under `::ffff:0:0/96`, so their lengths shift by this much.
pub const V4_MAPPED_OFFSET: u8 = 96;

/// Mask used for bare host addresses.
pub const FULL_MASK: [u8; ADDRESS_BYTES] = [0xff; ADDRESS_BYTES];

/// Chunk growth step: 200, 600, 1400, 3000, 6200 ...
pub const CHUNK_STEP: usize = 200;

pub const METRIC_INSERTS: &str = "cidrtrie_inserts_total";
pub const METRIC_DELETES: &str = "cidrtrie_deletes_total";
pub const METRIC_LOOKUPS: &str = "cidrtrie_lookups_total";
pub const METRIC_CHUNKS: &str = "cidrtrie_chunks_allocated_total";
pub const METRIC_LIVE_NODES: &str = "cidrtrie_live_nodes";
