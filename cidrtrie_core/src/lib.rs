pub mod constants;
pub mod errors;
pub mod helpers;
pub mod public_api;
pub mod telemetry;
pub mod types;

mod arena;

use arena::{Arena, Link, NIL};
use constants::*;
use helpers::{get_bit, prefix_len};
use log::{debug, info, trace};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;

pub use crate::errors::Error;
pub use crate::types::{ArenaStats, Cidr, PrefixTree};

impl<V> PrefixTree<V> {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            // Fallback: simple env_logger with RFC‑3339 ts off.
            let _ = env_logger::builder()
                .format_timestamp(None)
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    /// Create an empty tree holding only the root node.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty tree whose first storage chunk holds at least
    /// `preallocate` nodes.
    pub fn with_capacity(preallocate: usize) -> Self {
        Self::ensure_logging();
        let mut arena = Arena::with_capacity(preallocate);
        let root = arena.allocate();
        info!("[NEW] Prefix tree created, preallocate={}", preallocate);
        PrefixTree {
            arena,
            root,
            len: 0,
        }
    }

    /// Number of registered prefixes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Register `value` under the prefix formed by the leading set bits of `mask`.
    ///
    /// With `overwrite == false` an already-valued prefix is left untouched and
    /// `NodeBusy` is returned.
    pub fn insert(&mut self, key: &[u8], mask: &[u8], value: V, overwrite: bool) -> Result<(), Error> {
        counter!(METRIC_INSERTS).increment(1);
        if key.len() != mask.len() {
            return Err(Error::BadAddress);
        }
        let depth = prefix_len(mask);
        debug!(
            "[INSERT] key={:02x?}, prefix_len={}, overwrite={}",
            key, depth, overwrite
        );

        // Follow the existing path as far as it goes.
        let mut node = self.root;
        let mut bit = 0;
        while bit < depth {
            let next = self.arena.get(node).child(get_bit(key, bit));
            if next == NIL {
                break;
            }
            node = next;
            bit += 1;
        }

        if bit == depth {
            let existing = self.arena.get_mut(node);
            if existing.value.is_some() && !overwrite {
                debug!("[INSERT] Prefix already holds a value.");
                return Err(Error::NodeBusy);
            }
            if existing.value.replace(value).is_none() {
                self.len += 1;
            }
            return Ok(());
        }

        trace!("[INSERT] Growing path from bit {} to {}", bit, depth);
        while bit < depth {
            let next = self.arena.allocate();
            self.arena.get_mut(next).parent = node;
            let parent = self.arena.get_mut(node);
            if get_bit(key, bit) {
                parent.right = next;
            } else {
                parent.left = next;
            }
            node = next;
            bit += 1;
        }
        self.arena.get_mut(node).value = Some(value);
        self.len += 1;
        gauge!(METRIC_LIVE_NODES).set(self.arena.stats().live as f64);
        Ok(())
    }

    /// Remove the prefix formed by the leading set bits of `mask`.
    ///
    /// With `whole_range == false` only that exact prefix's value goes away and
    /// longer prefixes below it survive. With `whole_range == true` the whole
    /// subtree is dropped, values included.
    pub fn delete(&mut self, key: &[u8], mask: &[u8], whole_range: bool) -> Result<(), Error> {
        counter!(METRIC_DELETES).increment(1);
        if key.len() != mask.len() {
            return Err(Error::BadAddress);
        }
        let depth = prefix_len(mask);
        debug!(
            "[DELETE] key={:02x?}, prefix_len={}, whole_range={}",
            key, depth, whole_range
        );

        let mut node = self.root;
        for bit in 0..depth {
            node = self.arena.get(node).child(get_bit(key, bit));
            if node == NIL {
                debug!("[DELETE] Walk ended at bit {}. Prefix not found.", bit);
                return Err(Error::NotFound);
            }
        }

        if whole_range {
            self.remove_range(node);
        } else {
            let target = self.arena.get_mut(node);
            if target.value.take().is_none() {
                debug!("[DELETE] Node holds no value. Prefix not found.");
                return Err(Error::NotFound);
            }
            self.len -= 1;
            // keep it, just trim the value: longer prefixes hang below
            if node != self.root && !self.arena.get(node).has_children() {
                self.prune(node);
            }
        }
        gauge!(METRIC_LIVE_NODES).set(self.arena.stats().live as f64);
        Ok(())
    }

    /// Longest-prefix match for `key`, looking at no more bits than `mask` has set.
    ///
    /// A width mismatch is reported as `BadAddress`, never as "no match".
    pub fn lookup(&self, key: &[u8], mask: &[u8]) -> Result<Option<&V>, Error> {
        counter!(METRIC_LOOKUPS).increment(1);
        if key.len() != mask.len() {
            return Err(Error::BadAddress);
        }
        let depth = prefix_len(mask);

        let mut best = None;
        let mut node = self.root;
        let mut bit = 0;
        loop {
            let current = self.arena.get(node);
            if let Some(v) = current.value.as_ref() {
                best = Some(v);
            }
            if bit == depth {
                break;
            }
            node = current.child(get_bit(key, bit));
            if node == NIL {
                break;
            }
            bit += 1;
        }
        trace!(
            "[LOOKUP] key={:02x?}, walked={} bits, matched={}",
            key,
            bit,
            best.is_some()
        );
        Ok(best)
    }

    /// Drop every prefix. The root stays and all other nodes go to the free list.
    pub fn clear(&mut self) {
        info!("[CLEAR] Clearing tree with {} prefixes.", self.len);
        self.remove_range(self.root);
        gauge!(METRIC_LIVE_NODES).set(self.arena.stats().live as f64);
    }

    // Detaches `top` with everything below it. For the root only the
    // descendants and its own value go.
    fn remove_range(&mut self, top: Link) {
        let mut removed = 0usize;
        let mut stack = Vec::with_capacity(64);

        if top == self.root {
            let root = self.arena.get_mut(top);
            if root.value.take().is_some() {
                removed += 1;
            }
            stack.extend([root.left, root.right].into_iter().filter(|&l| l != NIL));
            root.left = NIL;
            root.right = NIL;
        } else {
            let parent = self.arena.get(top).parent;
            self.detach(parent, top);
            stack.push(top);
            // the parent may now be a dead end
            if parent != self.root {
                let p = self.arena.get(parent);
                if p.value.is_none() && !p.has_children() {
                    self.prune(parent);
                }
            }
        }

        while let Some(link) = stack.pop() {
            let node = self.arena.get(link);
            for child in [node.left, node.right] {
                if child != NIL {
                    stack.push(child);
                }
            }
            if self.arena.recycle(link).is_some() {
                removed += 1;
            }
        }
        self.len -= removed;
        debug!("[DELETE] Range removed {} prefixes.", removed);
    }

    // Recycles the childless, valueless `node` and climbs, releasing every
    // ancestor left in the same state. Stops at the root.
    fn prune(&mut self, mut node: Link) {
        loop {
            let parent = self.arena.get(node).parent;
            self.detach(parent, node);
            self.arena.recycle(node);
            trace!("[PRUNE] Recycled node {:?}", helpers::unpack(node));

            if parent == self.root {
                break;
            }
            let p = self.arena.get(parent);
            if p.value.is_some() || p.has_children() {
                break;
            }
            node = parent;
        }
    }

    fn detach(&mut self, parent: Link, child: Link) {
        let p = self.arena.get_mut(parent);
        if p.right == child {
            p.right = NIL;
        } else {
            p.left = NIL;
        }
    }
}

impl<V> Default for PrefixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
