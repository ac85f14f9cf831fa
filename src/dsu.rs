//! # Disjoint Set Union
//!
//! Union-Find over a contiguous range of integer indices, used to group
//! reciprocally-overlapping genomic loci within a sample.
//!
//! Sized once at construction; indices must pre-exist. `find` applies full
//! path compression; `union` attaches b's root under a's root without rank
//! balancing, which is sufficient at per-sample cluster-count scale.

/// Disjoint sets over indices `0..n`.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    /// Create `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Find the representative of `x`'s set, compressing parent pointers
    /// along the way. Panics if `x >= len()`.
    pub fn find(&mut self, x: usize) -> usize {
        let parent = self.parent[x];
        if parent != x {
            let root = self.find(parent);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Merge the sets containing `a` and `b`, attaching b's root under a's.
    /// A no-op when they already share a root.
    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent[root_b] = root_a;
        }
    }

    /// Check whether two indices share a set.
    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}
