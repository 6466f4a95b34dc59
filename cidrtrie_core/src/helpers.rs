//! Helper functions for bit-level trie walks

use crate::constants::ADDRESS_BYTES;

/// Bit `index` of a big-endian byte string, most significant bit first.
#[inline]
pub fn get_bit(key: &[u8], index: usize) -> bool {
    debug_assert!(index < key.len() * 8);
    key[index / 8] & (0x80 >> (index % 8)) != 0
}

/// Number of leading set bits in `mask`. Anything after the first zero bit is ignored.
#[inline]
pub fn prefix_len(mask: &[u8]) -> usize {
    let mut n = 0;
    for &b in mask {
        if b == 0xff {
            n += 8;
        } else {
            n += b.leading_ones() as usize;
            break;
        }
    }
    n
}

/// Contiguous mask of `prefix_len` bits across the canonical width.
#[inline]
pub fn mask(prefix_len: u8) -> [u8; ADDRESS_BYTES] {
    let bits = if prefix_len == 0 {
        0
    } else if prefix_len >= 128 {
        !0u128
    } else {
        !(!0u128 >> prefix_len)
    };
    bits.to_be_bytes()
}

// Packs a chunk number and a slot within that chunk into one link.
#[inline]
pub fn pack(chunk: u32, slot: u32) -> u64 {
    ((chunk as u64) << 32) | (slot as u64)
}

#[inline]
pub fn unpack(link: u64) -> (u32, u32) {
    ((link >> 32) as u32, link as u32)
}
