//! Node storage for the prefix trie.
//!
//! Nodes live in a sequence of chunks. Each chunk is a `Vec` created with a
//! fixed capacity and only ever pushed to while it has room, so a slot never
//! moves once handed out. Released nodes are chained through their `right`
//! field into a free list that is drained before any new chunk is grown.

use crate::constants::{CHUNK_STEP, METRIC_CHUNKS};
use crate::helpers::{pack, unpack};
use crate::types::ArenaStats;
use log::trace;
use metrics::counter;

/// Packed (chunk, slot) reference to a node.
pub(crate) type Link = u64;

/// Absent child, absent parent, or end of the free list.
pub(crate) const NIL: Link = u64::MAX;

pub(crate) struct Node<V> {
    pub left: Link,
    pub right: Link, // doubles as "next free" while on the free list
    pub parent: Link,
    pub value: Option<V>,
}

impl<V> Node<V> {
    fn empty() -> Self {
        Node {
            left: NIL,
            right: NIL,
            parent: NIL,
            value: None,
        }
    }

    #[inline]
    pub fn child(&self, right: bool) -> Link {
        if right {
            self.right
        } else {
            self.left
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.left != NIL || self.right != NIL
    }
}

pub(crate) struct Arena<V> {
    chunks: Vec<Vec<Node<V>>>,
    free: Link,
    free_len: usize,
    next_chunk: usize,
}

impl<V> Arena<V> {
    /// `preallocate` sizes the first chunk; anything below `CHUNK_STEP` is rounded up.
    pub fn with_capacity(preallocate: usize) -> Self {
        let first = preallocate.max(CHUNK_STEP);
        Arena {
            chunks: vec![Vec::with_capacity(first)],
            free: NIL,
            free_len: 0,
            next_chunk: first * 2 + CHUNK_STEP,
        }
    }

    /// Hands out a cleared node, preferring the free list over fresh storage.
    pub fn allocate(&mut self) -> Link {
        if self.free != NIL {
            let link = self.free;
            self.free = self.get(link).right;
            self.free_len -= 1;
            // release all prior links; the value was dropped on recycle
            let node = self.get_mut(link);
            node.left = NIL;
            node.right = NIL;
            node.parent = NIL;
            trace!("[ALLOC] Reusing freed node {:?}", unpack(link));
            return link;
        }

        let full = self
            .chunks
            .last()
            .map_or(true, |c| c.len() == c.capacity());
        if full {
            let size = self.next_chunk;
            self.next_chunk = size * 2 + CHUNK_STEP;
            self.chunks.push(Vec::with_capacity(size));
            counter!(METRIC_CHUNKS).increment(1);
            trace!(
                "[ALLOC] Filled chunk, growing chunk #{} with {} slots",
                self.chunks.len() - 1,
                size
            );
        }
        let chunk_no = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_no];
        let slot = chunk.len();
        chunk.push(Node::empty());
        pack(chunk_no as u32, slot as u32)
    }

    /// Pushes `link` onto the free list and hands back whatever value it held.
    pub fn recycle(&mut self, link: Link) -> Option<V> {
        let free = self.free;
        let node = self.get_mut(link);
        let value = node.value.take();
        node.left = NIL;
        node.parent = NIL;
        node.right = free;
        self.free = link;
        self.free_len += 1;
        value
    }

    #[inline]
    pub fn get(&self, link: Link) -> &Node<V> {
        let (chunk, slot) = unpack(link);
        &self.chunks[chunk as usize][slot as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, link: Link) -> &mut Node<V> {
        let (chunk, slot) = unpack(link);
        &mut self.chunks[chunk as usize][slot as usize]
    }

    pub fn stats(&self) -> ArenaStats {
        let slots_used: usize = self.chunks.iter().map(Vec::len).sum();
        ArenaStats {
            chunks: self.chunks.len(),
            capacity: self.chunks.iter().map(Vec::capacity).sum(),
            slots_used,
            free: self.free_len,
            live: slots_used - self.free_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_hands_out_cleared_nodes() {
        let mut arena: Arena<u32> = Arena::with_capacity(0);
        let a = arena.allocate();
        let b = arena.allocate();
        assert_ne!(a, b);
        let node = arena.get(b);
        assert_eq!(node.left, NIL);
        assert_eq!(node.right, NIL);
        assert_eq!(node.parent, NIL);
        assert!(node.value.is_none());
    }

    #[test]
    fn recycled_nodes_are_reused_lifo() {
        let mut arena: Arena<&str> = Arena::with_capacity(0);
        let a = arena.allocate();
        let b = arena.allocate();
        arena.get_mut(b).value = Some("b");
        arena.get_mut(b).left = a;

        assert_eq!(arena.recycle(a), None);
        assert_eq!(arena.recycle(b), Some("b"));
        assert_eq!(arena.stats().free, 2);

        assert_eq!(arena.allocate(), b);
        assert_eq!(arena.allocate(), a);
        let node = arena.get(b);
        assert_eq!(node.left, NIL);
        assert_eq!(node.right, NIL);
        assert!(node.value.is_none());
        assert_eq!(arena.stats().free, 0);
        assert_eq!(arena.stats().slots_used, 2);
    }

    #[test]
    fn chunks_grow_geometrically_without_moving_nodes() {
        let mut arena: Arena<usize> = Arena::with_capacity(0);
        let first = arena.allocate();
        let addr = arena.get(first) as *const Node<usize>;
        for _ in 0..CHUNK_STEP * 5 {
            arena.allocate();
        }
        let stats = arena.stats();
        assert_eq!(stats.chunks, 3);
        assert!(stats.capacity >= CHUNK_STEP + 3 * CHUNK_STEP + 7 * CHUNK_STEP);
        assert_eq!(stats.slots_used, CHUNK_STEP * 5 + 1);
        assert_eq!(arena.get(first) as *const Node<usize>, addr);
    }

    #[test]
    fn preallocate_hint_sizes_first_chunk() {
        let arena: Arena<()> = Arena::with_capacity(5000);
        let stats = arena.stats();
        assert_eq!(stats.chunks, 1);
        assert!(stats.capacity >= 5000);
        assert_eq!(stats.slots_used, 0);
    }
}
